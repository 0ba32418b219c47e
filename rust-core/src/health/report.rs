//! Per-cycle health report

use super::bands::Component;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Three-level component status shown to operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Normal,
    Warning,
    Faulty,
}

impl HealthStatus {
    /// Grade `level` against `threshold`
    ///
    /// Faulty strictly above the threshold, Warning strictly above
    /// `warning_ratio * threshold`.
    pub fn grade(level: f64, threshold: f64, warning_ratio: f64) -> Self {
        if level > threshold {
            HealthStatus::Faulty
        } else if level > threshold * warning_ratio {
            HealthStatus::Warning
        } else {
            HealthStatus::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Normal => "normal",
            HealthStatus::Warning => "warning",
            HealthStatus::Faulty => "faulty",
        }
    }
}

/// Status of one component plus the values it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,

    /// Magnitude the threshold was compared against
    pub level: f64,

    pub threshold: f64,
}

impl ComponentHealth {
    pub fn is_faulty(&self) -> bool {
        self.status == HealthStatus::Faulty
    }

    /// 100 at zero level, 50 at the threshold, 0 at twice the threshold
    pub fn health_percent(&self) -> f64 {
        if self.threshold <= 0.0 {
            return if self.level > 0.0 { 0.0 } else { 100.0 };
        }
        (100.0 * (1.0 - self.level / (2.0 * self.threshold))).clamp(0.0, 100.0)
    }
}

/// Health of every classified component for one cycle
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthReport {
    components: BTreeMap<Component, ComponentHealth>,
}

impl HealthReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, component: Component, health: ComponentHealth) {
        self.components.insert(component, health);
    }

    pub fn get(&self, component: Component) -> Option<&ComponentHealth> {
        self.components.get(&component)
    }

    /// False for faulty-free and for unclassified components
    pub fn is_faulty(&self, component: Component) -> bool {
        self.get(component).is_some_and(ComponentHealth::is_faulty)
    }

    pub fn faulty_components(&self) -> Vec<Component> {
        self.components
            .iter()
            .filter(|(_, h)| h.is_faulty())
            .map(|(&c, _)| c)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Component, &ComponentHealth)> {
        self.components.iter().map(|(&c, h)| (c, h))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

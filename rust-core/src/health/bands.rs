//! Machine components and their characteristic vibration bands

use crate::error::MonitorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Monitored drive-train component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Motor,
    #[serde(alias = "pully")]
    Pulley,
    Belt,
    Bearing,
    Gear,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::Motor,
        Component::Pulley,
        Component::Belt,
        Component::Bearing,
        Component::Gear,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Component::Motor => "motor",
            Component::Pulley => "pulley",
            Component::Belt => "belt",
            Component::Bearing => "bearing",
            Component::Gear => "gear",
        }
    }

    /// Mean-magnitude threshold used by the aggregate classifier
    pub fn aggregate_threshold(&self) -> f64 {
        match self {
            Component::Motor => 5.0,
            Component::Belt => 3.0,
            Component::Bearing => 4.0,
            Component::Pulley => 2.0,
            Component::Gear => 4.0,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Component {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "motor" => Ok(Component::Motor),
            "pulley" | "pully" => Ok(Component::Pulley),
            "belt" => Ok(Component::Belt),
            "bearing" => Ok(Component::Bearing),
            "gear" => Ok(Component::Gear),
            other => Err(MonitorError::InvalidConfig(format!("unknown component '{other}'"))),
        }
    }
}

/// Characteristic frequency and fault threshold of one component
///
/// Thresholds are configuration, never derived from observed spectra.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentBand {
    pub component: Component,

    /// Expected vibration frequency in Hz
    pub frequency_hz: f64,

    /// Magnitude above which the component is faulty
    pub threshold: f64,
}

impl ComponentBand {
    pub const fn new(component: Component, frequency_hz: f64, threshold: f64) -> Self {
        Self {
            component,
            frequency_hz,
            threshold,
        }
    }
}

/// Default bands: rotation frequencies of the test rig, thresholds in raw
/// modulus units for a 64-sample Hann frame (a bin-centred tone of
/// amplitude A peaks near 15.75 * A)
pub fn default_bands() -> Vec<ComponentBand> {
    vec![
        ComponentBand::new(Component::Motor, 60.0, 12.5),
        ComponentBand::new(Component::Pulley, 30.0, 8.0),
        ComponentBand::new(Component::Belt, 15.0, 5.5),
        ComponentBand::new(Component::Bearing, 120.0, 9.5),
        ComponentBand::new(Component::Gear, 45.0, 8.0),
    ]
}

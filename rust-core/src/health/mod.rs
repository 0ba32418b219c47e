//! Component fault classification

pub mod bands;
pub mod classifier;
pub mod report;

pub use bands::{default_bands, Component, ComponentBand};
pub use classifier::{ClassifierMode, FaultClassifier};
pub use report::{ComponentHealth, HealthReport, HealthStatus};

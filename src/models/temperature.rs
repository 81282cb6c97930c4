//! Sampling temperature constraints.

use serde::{Deserialize, Serialize};

/// Temperature used when the caller does not pick one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

const FIXED_TOLERANCE: f64 = 1e-9;

/// Which temperatures a model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureConstraint {
    /// Any value in `min..=max`.
    Range { min: f64, max: f64, default: f64 },
    /// Exactly one value.
    Fixed(f64),
}

impl Default for TemperatureConstraint {
    fn default() -> Self {
        Self::Range {
            min: 0.0,
            max: 2.0,
            default: DEFAULT_TEMPERATURE,
        }
    }
}

impl TemperatureConstraint {
    /// The value to use when the caller expresses no preference.
    pub fn default_value(&self) -> f64 {
        match *self {
            Self::Range { default, .. } => default,
            Self::Fixed(value) => value,
        }
    }

    pub fn validate(&self, temperature: f64) -> bool {
        match *self {
            Self::Range { min, max, .. } => (min..=max).contains(&temperature),
            Self::Fixed(value) => (temperature - value).abs() < FIXED_TOLERANCE,
        }
    }

    /// Clamp into range, or snap to the fixed value.
    pub fn corrected(&self, temperature: f64) -> f64 {
        match *self {
            Self::Range { min, max, default } => {
                if temperature.is_nan() {
                    default
                } else {
                    temperature.clamp(min, max)
                }
            }
            Self::Fixed(value) => value,
        }
    }

    pub fn description(&self) -> String {
        match *self {
            Self::Range { min, max, default } => {
                format!("Range: {min} to {max} (default: {default})")
            }
            Self::Fixed(value) => format!("Fixed at {value}"),
        }
    }
}

//! Provider kinds, capability descriptors, and temperature rules.

pub mod capabilities;
pub mod temperature;

pub use capabilities::ModelCapabilities;
pub use temperature::{TemperatureConstraint, DEFAULT_TEMPERATURE};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Human-readable provider name reported in capabilities and responses.
pub const AZURE_FRIENDLY_NAME: &str = "Azure OpenAI";

/// Which backend served a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum ProviderType {
    Azure,
}

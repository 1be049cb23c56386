//! Module configuration model
//!
//! The configuration mirrors what the host control surface collects in its
//! form: connection parameters plus per-slot template, fixture, and preset
//! definitions. All per-slot fields arrive as text and are validated during
//! the registry rebuild; malformed slots degrade to silent skips there.

use serde::{Deserialize, Serialize};

/// One template slot of the configuration form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSlot {
    /// Template name
    #[serde(default)]
    pub name: String,
    /// Channel spec: comma-separated `offset:attribute:bits`
    #[serde(default)]
    pub channels: String,
}

/// One fixture slot of the configuration form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureSlot {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// DMX base address, 1-512
    #[serde(default)]
    pub address: String,
    /// Template reference
    #[serde(default, rename = "type")]
    pub type_name: String,
}

/// One global preset slot of the configuration form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetSlot {
    /// Preset name
    #[serde(default)]
    pub name: String,
    /// Template the preset applies to
    #[serde(default, rename = "type")]
    pub type_name: String,
    /// Attribute to set
    #[serde(default)]
    pub attribute: String,
    /// Value to apply, 0-65535
    #[serde(default)]
    pub value: String,
}

/// Full module configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Target Art-Net node IP or hostname; blank means unconfigured
    #[serde(default)]
    pub host: String,
    /// Flat Art-Net universe number, 0-32767
    #[serde(default)]
    pub universe: u16,
    /// Template slots
    #[serde(default)]
    pub templates: Vec<TemplateSlot>,
    /// Fixture slots
    #[serde(default)]
    pub fixtures: Vec<FixtureSlot>,
    /// Global preset slots
    #[serde(default)]
    pub presets: Vec<PresetSlot>,
}

impl ModuleConfig {
    /// Art-Net Net component of the universe (bits 8-14)
    pub fn net(&self) -> u8 {
        ((self.universe >> 8) & 0x7f) as u8
    }

    /// Art-Net Sub-Net component of the universe (bits 4-7)
    pub fn subnet(&self) -> u8 {
        ((self.universe >> 4) & 0x0f) as u8
    }

    /// Art-Net Universe component (bits 0-3)
    pub fn uni(&self) -> u8 {
        (self.universe & 0x0f) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_decomposition() {
        let config = ModuleConfig {
            universe: 0x7abc & 0x7fff,
            ..Default::default()
        };
        assert_eq!(config.net(), 0x7a);
        assert_eq!(config.subnet(), 0xb);
        assert_eq!(config.uni(), 0xc);

        let zero = ModuleConfig::default();
        assert_eq!(zero.net(), 0);
        assert_eq!(zero.subnet(), 0);
        assert_eq!(zero.uni(), 0);
    }
}

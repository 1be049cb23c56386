//! The patch: all three registries rebuilt as a unit

use serde::{Deserialize, Serialize};

use crate::config::ModuleConfig;
use crate::fixture::FixtureRegistry;
use crate::preset::PresetRegistry;
use crate::template::TemplateRegistry;

/// The complete fixture patch derived from one configuration apply.
///
/// Rebuilt wholesale whenever the configuration changes; fixtures start with
/// empty value maps, so a re-apply resets all live attribute values. That
/// reset is deliberate: attribute values are runtime state of the previous
/// patch, not of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Named channel layouts
    pub templates: TemplateRegistry,
    /// Placed fixtures
    pub fixtures: FixtureRegistry,
    /// Global presets
    pub presets: PresetRegistry,
}

impl Patch {
    /// Rebuild the three registries from a configuration
    pub fn from_config(config: &ModuleConfig) -> Self {
        let mut templates = TemplateRegistry::new();
        for slot in &config.templates {
            templates.insert(&slot.name, &slot.channels);
        }
        let fixtures = FixtureRegistry::from_slots(&config.fixtures);
        let presets = PresetRegistry::from_slots(&config.presets);

        tracing::debug!(
            templates = templates.len(),
            fixtures = fixtures.len(),
            presets = presets.len(),
            "patch rebuilt"
        );

        Self {
            templates,
            fixtures,
            presets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FixtureSlot, PresetSlot, TemplateSlot};

    #[test]
    fn test_rebuild_from_config() {
        let config = ModuleConfig {
            host: "127.0.0.1".to_string(),
            universe: 0,
            templates: vec![TemplateSlot {
                name: "RGB".to_string(),
                channels: "1:Red:8, 2:Green:8, 3:Blue:8".to_string(),
            }],
            fixtures: vec![FixtureSlot {
                name: "Front".to_string(),
                address: "1".to_string(),
                type_name: "RGB".to_string(),
            }],
            presets: vec![PresetSlot {
                name: "Red Full".to_string(),
                type_name: "RGB".to_string(),
                attribute: "Red".to_string(),
                value: "255".to_string(),
            }],
        };

        let patch = Patch::from_config(&config);
        assert_eq!(patch.templates.len(), 1);
        assert_eq!(patch.fixtures.len(), 1);
        assert_eq!(patch.presets.len(), 1);
    }

    #[test]
    fn test_reapply_resets_values() {
        let config = ModuleConfig {
            fixtures: vec![FixtureSlot {
                name: "Front".to_string(),
                address: "1".to_string(),
                type_name: "RGB".to_string(),
            }],
            ..Default::default()
        };

        let mut patch = Patch::from_config(&config);
        patch.fixtures.get_mut(1).unwrap().set_value("Dimmer", 99);

        let rebuilt = Patch::from_config(&config);
        assert_eq!(rebuilt.fixtures.get(1).unwrap().value("Dimmer"), 0);
    }
}

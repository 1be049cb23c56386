//! Global presets: named (type, attribute, value) shortcuts

use serde::{Deserialize, Serialize};

use crate::config::PresetSlot;

/// A named value shortcut applicable to every fixture of a given type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Display name, matched exactly by `set_preset` actions
    pub name: String,
    /// Template the preset applies to
    pub type_name: String,
    /// Attribute to set
    pub attribute: String,
    /// Value to apply
    pub value: u16,
}

impl Preset {
    /// Build a preset from a config slot. Blank name/type/attribute or a
    /// non-numeric value drops the slot.
    pub fn from_slot(slot: &PresetSlot) -> Option<Self> {
        let name = slot.name.trim();
        let attribute = slot.attribute.trim();
        if name.is_empty() || slot.type_name.trim().is_empty() || attribute.is_empty() {
            return None;
        }
        let value = slot.value.trim().parse::<u16>().ok()?;
        Some(Self {
            name: name.to_string(),
            type_name: slot.type_name.clone(),
            attribute: attribute.to_string(),
            value,
        })
    }
}

/// Registry of presets, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetRegistry {
    presets: Vec<Preset>,
}

impl PresetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from config slots, dropping invalid slots
    pub fn from_slots(slots: &[PresetSlot]) -> Self {
        let presets = slots.iter().filter_map(Preset::from_slot).collect();
        Self { presets }
    }

    /// Exact-name lookup
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Iterate presets in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    /// Number of presets
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(name: &str, type_name: &str, attribute: &str, value: &str) -> PresetSlot {
        PresetSlot {
            name: name.to_string(),
            type_name: type_name.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_invalid_slots_dropped() {
        let registry = PresetRegistry::from_slots(&[
            slot("Full", "RGB", "Dimmer", "255"),
            slot("", "RGB", "Dimmer", "255"),
            slot("Half", "RGB", "", "128"),
            slot("Broken", "RGB", "Dimmer", "bright"),
        ]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("Full").unwrap().value, 255);
        assert!(registry.find("Half").is_none());
    }

    #[test]
    fn test_exact_name_match() {
        let registry = PresetRegistry::from_slots(&[slot("Full", "RGB", "Dimmer", "255")]);
        assert!(registry.find("full").is_none());
        assert!(registry.find("Full").is_some());
    }
}

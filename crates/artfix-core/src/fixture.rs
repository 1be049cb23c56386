//! Fixture instances placed at DMX addresses
//!
//! A fixture is a placed instance of a template. It holds the current value
//! of every attribute that has been set so far; attributes that were never
//! touched read back as 0.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::FixtureSlot;

/// A placed template instance with live attribute values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// 1-based configuration slot, stable across value mutations
    pub index: u32,
    /// 1-based DMX base address. Kept as configured; the compositor range
    /// check decides whether any channel actually lands in the universe.
    pub address: i32,
    /// Display name
    pub name: String,
    /// Template reference; may dangle if the template was removed
    pub type_name: String,
    /// Current attribute values, populated lazily by operations
    pub values: HashMap<String, u16>,
}

impl Fixture {
    /// Build a fixture from a config slot. Returns `None` when the name is
    /// blank, the address does not parse, or the type is blank; such slots
    /// are skipped entirely rather than stored half-formed.
    pub fn from_slot(index: u32, slot: &FixtureSlot) -> Option<Self> {
        let name = slot.name.trim();
        if name.is_empty() || slot.type_name.trim().is_empty() {
            return None;
        }
        let address = slot.address.trim().parse::<i32>().ok()?;
        Some(Self {
            index,
            address,
            name: name.to_string(),
            type_name: slot.type_name.clone(),
            values: HashMap::new(),
        })
    }

    /// Current value of an attribute, 0 when never set
    pub fn value(&self, attribute: &str) -> u16 {
        self.values.get(attribute).copied().unwrap_or(0)
    }

    /// Write an attribute value. The caller is responsible for clamping to
    /// the attribute's declared width; the store does not re-validate.
    pub fn set_value(&mut self, attribute: &str, value: u16) {
        self.values.insert(attribute.to_string(), value);
    }
}

/// Registry of fixtures, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureRegistry {
    fixtures: Vec<Fixture>,
}

impl FixtureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from config slots. Slot `i` (0-based) becomes
    /// fixture index `i + 1`; invalid slots are dropped without shifting
    /// the indices of their siblings.
    pub fn from_slots(slots: &[FixtureSlot]) -> Self {
        let fixtures = slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| Fixture::from_slot(i as u32 + 1, slot))
            .collect();
        Self { fixtures }
    }

    /// Look up a fixture by its configuration index
    pub fn get(&self, index: u32) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.index == index)
    }

    /// Mutable lookup by configuration index
    pub fn get_mut(&mut self, index: u32) -> Option<&mut Fixture> {
        self.fixtures.iter_mut().find(|f| f.index == index)
    }

    /// Iterate fixtures in registry order
    pub fn iter(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter()
    }

    /// Mutable iteration in registry order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Fixture> {
        self.fixtures.iter_mut()
    }

    /// Number of fixtures
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(name: &str, address: &str, type_name: &str) -> FixtureSlot {
        FixtureSlot {
            name: name.to_string(),
            address: address.to_string(),
            type_name: type_name.to_string(),
        }
    }

    #[test]
    fn test_invalid_slots_skipped() {
        let registry = FixtureRegistry::from_slots(&[
            slot("Front", "1", "RGB"),
            slot("", "11", "RGB"),
            slot("Back", "not-a-number", "RGB"),
            slot("Side", "21", ""),
            slot("Spot", "31", "Mover"),
        ]);

        assert_eq!(registry.len(), 2);
        // Indices stay aligned to configuration slots
        assert_eq!(registry.get(1).unwrap().name, "Front");
        assert!(registry.get(2).is_none());
        assert_eq!(registry.get(5).unwrap().name, "Spot");
    }

    #[test]
    fn test_values_default_zero_and_set() {
        let mut registry = FixtureRegistry::from_slots(&[slot("Front", "1", "RGB")]);
        let fixture = registry.get_mut(1).unwrap();

        assert_eq!(fixture.value("Dimmer"), 0);
        fixture.set_value("Dimmer", 200);
        assert_eq!(fixture.value("Dimmer"), 200);
    }
}

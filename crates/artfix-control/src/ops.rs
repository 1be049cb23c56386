//! Transient attribute-mutation semantics
//!
//! Pure value arithmetic for the step and toggle operations, plus the flash
//! stash that remembers pre-flash values until the button is released.

use std::collections::HashMap;

use artfix_core::ChannelBits;

/// Clamp a value to the range an attribute width can carry
pub fn clamp_to_width(value: i64, bits: ChannelBits) -> u16 {
    value.clamp(0, bits.max_value() as i64) as u16
}

/// Apply a signed delta to the current value, clamping to [0, width max]
pub fn step_value(current: u16, delta: i64, bits: ChannelBits) -> u16 {
    clamp_to_width(current as i64 + delta, bits)
}

/// Two-value alternation keyed off equality with `val1`: the current value
/// toggles to `val2` only when it is exactly `val1`; anything else toggles
/// to `val1`.
pub fn toggle_value(current: u16, val1: u16, val2: u16) -> u16 {
    if current == val1 {
        val2
    } else {
        val1
    }
}

/// Pre-flash value stash, keyed by (fixture index, attribute name).
///
/// A re-triggered flash overwrites the stash (last stash wins); release
/// takes the entry out, so a second release finds nothing and becomes a
/// no-op.
#[derive(Debug, Clone, Default)]
pub struct FlashStore {
    stashed: HashMap<(u32, String), u16>,
}

impl FlashStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the pre-flash value for a fixture attribute
    pub fn stash(&mut self, fixture: u32, attribute: &str, value: u16) {
        self.stashed.insert((fixture, attribute.to_string()), value);
    }

    /// Take the stashed value out, if any
    pub fn take(&mut self, fixture: u32, attribute: &str) -> Option<u16> {
        self.stashed.remove(&(fixture, attribute.to_string()))
    }

    /// Drop all stashed values
    pub fn clear(&mut self) {
        self.stashed.clear();
    }

    /// Number of active stashes
    pub fn len(&self) -> usize {
        self.stashed.len()
    }

    /// Check if no flash is active
    pub fn is_empty(&self) -> bool {
        self.stashed.is_empty()
    }
}

//! Fixture templates: named channel layouts
//!
//! A template maps logical attribute names (e.g. "Dimmer", "Pan") to
//! relative channel offsets and widths. Fixtures reference templates by
//! name and inherit their layout.

use serde::{Deserialize, Serialize};

/// Width of a template channel on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelBits {
    /// Single-slot channel, values 0-255
    Eight,
    /// Two-slot channel (MSB then LSB), values 0-65535
    Sixteen,
}

impl ChannelBits {
    /// Largest value this width can carry
    pub fn max_value(&self) -> u16 {
        match self {
            ChannelBits::Eight => 255,
            ChannelBits::Sixteen => 65535,
        }
    }

    /// Number of bits, for labels and choice ids
    pub fn bit_count(&self) -> u8 {
        match self {
            ChannelBits::Eight => 8,
            ChannelBits::Sixteen => 16,
        }
    }

    /// Number of DMX slots the channel occupies
    pub fn slot_count(&self) -> i32 {
        match self {
            ChannelBits::Eight => 1,
            ChannelBits::Sixteen => 2,
        }
    }
}

/// One channel of a template, relative to a fixture's base address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// 1-based offset from the fixture base address. `None` when the
    /// configured offset was not numeric; such a channel never reaches the
    /// wire but its attribute still appears in choices and variables.
    pub offset: Option<i32>,
    /// Logical attribute name (e.g. "Dimmer")
    pub attribute: String,
    /// Channel width
    pub bits: ChannelBits,
}

/// A named channel layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// User-defined unique name
    pub name: String,
    /// Channels in declaration order
    pub channels: Vec<Channel>,
}

/// Parse a comma-separated `offset:attribute:bits` list.
///
/// Each segment is trimmed and colon-split. Segments with fewer than two
/// parts are dropped silently. `bits` is optional and falls back to 8 for
/// anything that is not exactly 16.
pub fn parse_channel_spec(spec: &str) -> Vec<Channel> {
    let mut channels = Vec::new();
    for segment in spec.split(',') {
        let parts: Vec<&str> = segment.split(':').map(str::trim).collect();
        if parts.len() < 2 {
            continue;
        }
        let offset = parts[0].parse::<i32>().ok();
        if offset.is_none() {
            tracing::warn!(segment = segment.trim(), "non-numeric channel offset");
        }
        let bits = match parts.get(2).and_then(|p| p.parse::<u32>().ok()) {
            Some(16) => ChannelBits::Sixteen,
            _ => ChannelBits::Eight,
        };
        channels.push(Channel {
            offset,
            attribute: parts[1].to_string(),
            bits,
        });
    }
    channels
}

/// Registry of templates, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and insert a template. A blank name or blank spec yields no
    /// entry. Re-inserting an existing name replaces its channels in place.
    pub fn insert(&mut self, name: &str, channel_spec: &str) {
        let name = name.trim();
        if name.is_empty() || channel_spec.trim().is_empty() {
            return;
        }
        let channels = parse_channel_spec(channel_spec);
        if let Some(existing) = self.templates.iter_mut().find(|t| t.name == name) {
            existing.channels = channels;
        } else {
            self.templates.push(Template {
                name: name.to_string(),
                channels,
            });
        }
    }

    /// Look up a template by name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Iterate templates in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

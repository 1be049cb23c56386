//! ArtFix Core - Fixture Patch Domain Model
//!
//! This crate contains the data model for the ArtFix control module:
//! - Templates: named channel layouts mapping attributes to offsets/widths
//! - Fixtures: placed template instances with live attribute values
//! - Presets: named (type, attribute, value) shortcuts
//! - Compositor: full-universe recompute of the 512-slot DMX frame
//!
//! Malformed configuration degrades to per-entity silent skips rather than
//! errors; the module keeps running with whatever parsed cleanly.

#![warn(missing_docs)]

/// Buffer compositor and channel accounting
pub mod compositor;
/// Configuration model
pub mod config;
/// Fixture instances and registry
pub mod fixture;
/// Patch bundle of the three registries
pub mod patch;
/// Global presets and registry
pub mod preset;
/// Templates, channels, and channel-spec parsing
pub mod template;

pub use compositor::{channels_used, compose, compose_into, DMX_CHANNELS};
pub use config::{FixtureSlot, ModuleConfig, PresetSlot, TemplateSlot};
pub use fixture::{Fixture, FixtureRegistry};
pub use patch::Patch;
pub use preset::{Preset, PresetRegistry};
pub use template::{parse_channel_spec, Channel, ChannelBits, Template, TemplateRegistry};

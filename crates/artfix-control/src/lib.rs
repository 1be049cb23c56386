//! ArtFix Control - Art-Net fixture control surface
//!
//! This crate turns the [`artfix_core`] patch model into a live control
//! module:
//! - [`artnet`] - Art-Net (ArtDmx) output with keep-alive retransmission
//! - [`ops`] - step/toggle/flash value semantics and the flash stash
//! - [`surface`] - dynamic generation of actions, feedbacks, variables,
//!   preset buttons, and the configuration form
//! - [`instance`] - the module root: config lifecycle, commit path, and
//!   operation dispatch against the host boundary
//! - [`error`] - error types
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use artfix_control::{ControlAction, FixtureInstance, NullHost};
//! use artfix_core::ModuleConfig;
//!
//! let mut instance = FixtureInstance::new(Box::new(NullHost));
//! instance.init(ModuleConfig {
//!     host: "127.0.0.1".to_string(),
//!     ..Default::default()
//! });
//! instance.apply(&ControlAction::BlackoutAll);
//! ```

#![warn(missing_docs)]

/// Art-Net sender
pub mod artnet;
/// Error types
pub mod error;
/// Module instance and host boundary
pub mod instance;
/// Transient value semantics
pub mod ops;
/// Control-surface generation
pub mod surface;

pub use artnet::{ArtNetConfig, ArtNetSender, ARTNET_PORT, DEFAULT_REFRESH_INTERVAL_MS};
pub use error::{ControlError, Result};
pub use instance::{FixtureInstance, Host, InstanceStatus, NullHost};
pub use ops::{clamp_to_width, step_value, toggle_value, FlashStore};
pub use surface::{
    attribute_choices, build_surface, config_fields, fixture_choices, preset_choices,
    variable_slug, variable_values, ActionDescriptor, AttributeRef, Choice, CompareOp,
    ControlAction, Feedback, FeedbackDescriptor, OptionField, OptionKind, PresetButton,
    SurfaceDefinition, VariableDefinition,
};

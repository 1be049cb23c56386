//! Module instance: configuration lifecycle and operation dispatch
//!
//! [`FixtureInstance`] is the root object the host framework drives. It owns
//! the patch, the Art-Net sender, and the flash stash, and runs every
//! operation synchronously to completion: mutate the store, recompose the
//! full frame, flush it to the sender, then tell the host to re-evaluate
//! feedbacks and refresh variables. Nothing here suspends mid-mutation, so
//! there is no partial-state visibility window.

use artfix_core::{compose, ModuleConfig, Patch, DMX_CHANNELS};

use crate::artnet::{ArtNetConfig, ArtNetSender, DEFAULT_REFRESH_INTERVAL_MS};
use crate::ops::{self, FlashStore};
use crate::surface::{self, ControlAction, Feedback, SurfaceDefinition};

/// Connection status reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceStatus {
    /// Startup in progress
    Connecting,
    /// Configured and sending
    Ok,
    /// Configuration incomplete (no target host)
    BadConfig,
    /// A subsystem failed (sender construction); the instance keeps running
    Error,
}

/// Host framework boundary.
///
/// The host renders the surface, invokes actions, and polls feedbacks; the
/// instance pushes notifications through this trait. All methods default to
/// no-ops so headless use needs no boilerplate.
pub trait Host {
    /// The operation surface was regenerated after a config apply
    fn surface_rebuilt(&mut self, _surface: &SurfaceDefinition) {}

    /// Attribute state changed; bound feedbacks need re-evaluation
    fn feedbacks_invalidated(&mut self) {}

    /// Fresh values for every exposed variable
    fn variables_updated(&mut self, _values: &[(String, serde_json::Value)]) {}

    /// Connection status transition
    fn status_changed(&mut self, _status: InstanceStatus, _message: Option<&str>) {}
}

/// Host that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {}

/// The Art-Net fixture module instance
pub struct FixtureInstance {
    config: ModuleConfig,
    patch: Patch,
    sender: Option<ArtNetSender>,
    sender_error: Option<String>,
    flash: FlashStore,
    surface: SurfaceDefinition,
    status: InstanceStatus,
    host: Box<dyn Host>,
}

impl FixtureInstance {
    /// Create an unconfigured instance
    pub fn new(host: Box<dyn Host>) -> Self {
        let patch = Patch::default();
        let surface = surface::build_surface(&patch);
        Self {
            config: ModuleConfig::default(),
            patch,
            sender: None,
            sender_error: None,
            flash: FlashStore::new(),
            surface,
            status: InstanceStatus::Connecting,
            host,
        }
    }

    /// First configuration apply
    pub fn init(&mut self, config: ModuleConfig) {
        tracing::debug!("initializing Art-Net fixture module");
        self.set_status(InstanceStatus::Connecting, None);
        self.apply_config(config);
    }

    /// Re-apply after the user edits the configuration
    pub fn config_updated(&mut self, config: ModuleConfig) {
        tracing::debug!("config updated, re-initializing");
        self.apply_config(config);
    }

    /// Teardown; stops the sender
    pub fn destroy(&mut self) {
        if let Some(mut sender) = self.sender.take() {
            sender.stop();
        }
        tracing::debug!("module destroyed");
    }

    fn apply_config(&mut self, config: ModuleConfig) {
        self.config = config;
        self.init_sender();
        self.patch = Patch::from_config(&self.config);
        self.rebuild_surface();
        self.commit();

        if self.config.host.trim().is_empty() {
            self.set_status(InstanceStatus::BadConfig, Some("Target Host not configured"));
        } else if let Some(message) = self.sender_error.clone() {
            self.set_status(InstanceStatus::Error, Some(&message));
        } else {
            self.set_status(InstanceStatus::Ok, None);
        }
    }

    /// Replace the sender: the old one is fully stopped before the new one
    /// is constructed, so no write can reach a torn-down socket
    fn init_sender(&mut self) {
        if let Some(mut sender) = self.sender.take() {
            sender.stop();
        }
        self.sender_error = None;

        let host = self.config.host.trim();
        if host.is_empty() {
            return;
        }

        let artnet = ArtNetConfig {
            host: host.to_string(),
            net: self.config.net(),
            subnet: self.config.subnet(),
            universe: self.config.uni(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        };
        match ArtNetSender::new(&artnet) {
            Ok(sender) => {
                tracing::info!(
                    host,
                    universe = self.config.universe,
                    net = artnet.net,
                    subnet = artnet.subnet,
                    uni = artnet.universe,
                    "Art-Net sender initialized"
                );
                self.sender = Some(sender);
            }
            Err(e) => {
                tracing::error!(error = %e, "Art-Net initialization failed");
                self.sender_error = Some(e.to_string());
            }
        }
    }

    fn rebuild_surface(&mut self) {
        self.surface = surface::build_surface(&self.patch);
        self.host.surface_rebuilt(&self.surface);
    }

    fn set_status(&mut self, status: InstanceStatus, message: Option<&str>) {
        self.status = status;
        self.host.status_changed(status, message);
    }

    /// Invoke an action. Dangling fixture, attribute, or preset references
    /// make the operation a silent no-op.
    pub fn apply(&mut self, action: &ControlAction) {
        match action {
            ControlAction::SetAttribute {
                fixture,
                attribute,
                value,
            } => {
                let value = ops::clamp_to_width(*value as i64, attribute.bits);
                self.set_attribute_value(*fixture, &attribute.name, value);
            }
            ControlAction::SetPreset { fixture, preset } => {
                let Some(preset) = self.patch.presets.find(preset).cloned() else {
                    return;
                };
                self.set_attribute_value(*fixture, &preset.attribute, preset.value);
            }
            ControlAction::StepAttribute {
                fixture,
                attribute,
                coarse,
                fine,
            } => {
                let Some(current) = self
                    .patch
                    .fixtures
                    .get(*fixture)
                    .map(|f| f.value(&attribute.name))
                else {
                    return;
                };
                let delta = *coarse as i64 + *fine as i64;
                let next = ops::step_value(current, delta, attribute.bits);
                self.set_attribute_value(*fixture, &attribute.name, next);
            }
            ControlAction::SetRawChannel {
                fixture,
                offset,
                value,
            } => self.set_raw_channel(*fixture, *offset, *value),
            ControlAction::FlashAttribute {
                fixture,
                attribute,
                value,
            } => {
                let Some(current) = self
                    .patch
                    .fixtures
                    .get(*fixture)
                    .map(|f| f.value(&attribute.name))
                else {
                    return;
                };
                self.flash.stash(*fixture, &attribute.name, current);
                let value = ops::clamp_to_width(*value as i64, attribute.bits);
                self.set_attribute_value(*fixture, &attribute.name, value);
            }
            ControlAction::ToggleAttribute {
                fixture,
                attribute,
                val1,
                val2,
            } => {
                let Some(current) = self
                    .patch
                    .fixtures
                    .get(*fixture)
                    .map(|f| f.value(&attribute.name))
                else {
                    return;
                };
                let next = ops::toggle_value(current, *val1, *val2);
                let next = ops::clamp_to_width(next as i64, attribute.bits);
                self.set_attribute_value(*fixture, &attribute.name, next);
            }
            ControlAction::BlackoutAll => self.blackout_all(),
        }
    }

    /// Release a momentary action. Only `flash_attribute` has release
    /// semantics: the stashed pre-flash value is restored and the stash
    /// removed; a release without a stash is a no-op.
    pub fn release(&mut self, action: &ControlAction) {
        if let ControlAction::FlashAttribute {
            fixture, attribute, ..
        } = action
        {
            if let Some(previous) = self.flash.take(*fixture, &attribute.name) {
                self.set_attribute_value(*fixture, &attribute.name, previous);
            }
        }
    }

    /// The set-attribute primitive every attribute operation funnels into
    fn set_attribute_value(&mut self, fixture: u32, attribute: &str, value: u16) {
        let Some(fixture) = self.patch.fixtures.get_mut(fixture) else {
            return;
        };
        fixture.set_value(attribute, value);
        self.commit();
    }

    /// Escape hatch: write a raw byte at a fixture-relative slot of the
    /// live frame and flush, without touching the attribute model
    fn set_raw_channel(&mut self, fixture: u32, offset: i32, value: u16) {
        let Some(fixture) = self.patch.fixtures.get(fixture) else {
            return;
        };
        let slot = fixture.address as i64 - 1 + offset as i64 - 1;
        if !(0..DMX_CHANNELS as i64).contains(&slot) {
            return;
        }
        if let Some(sender) = &self.sender {
            sender.set_value(slot as usize, (value % 256) as u8);
            self.flush();
        }
    }

    /// Zero every known attribute of every fixture, then commit once
    fn blackout_all(&mut self) {
        let Patch {
            templates,
            fixtures,
            ..
        } = &mut self.patch;
        for fixture in fixtures.iter_mut() {
            let Some(template) = templates.get(&fixture.type_name) else {
                continue;
            };
            for channel in &template.channels {
                fixture.set_value(&channel.attribute, 0);
            }
        }
        self.commit();
    }

    /// The commit path: recompose, flush, and notify the host
    fn commit(&mut self) {
        self.recompose();
        self.flush();
        self.host.feedbacks_invalidated();
        let values = surface::variable_values(&self.patch);
        self.host.variables_updated(&values);
    }

    fn recompose(&mut self) {
        if let Some(sender) = &self.sender {
            let frame = compose(&self.patch.fixtures, &self.patch.templates);
            sender.set_values(&frame);
        }
    }

    fn flush(&self) {
        if let Some(sender) = &self.sender {
            if let Err(e) = sender.transmit() {
                tracing::warn!(error = %e, "DMX transmit failed");
            }
        }
    }

    /// Evaluate a feedback against the current patch
    pub fn evaluate_feedback(&self, feedback: &Feedback) -> bool {
        feedback.evaluate(&self.patch)
    }

    /// Current patch
    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    /// Current derived surface
    pub fn surface(&self) -> &SurfaceDefinition {
        &self.surface
    }

    /// Current status
    pub fn status(&self) -> InstanceStatus {
        self.status
    }

    /// Snapshot of the sender's live frame, if a sender exists
    pub fn dmx_values(&self) -> Option<[u8; DMX_CHANNELS]> {
        self.sender.as_ref().map(|s| s.values())
    }
}

impl Drop for FixtureInstance {
    fn drop(&mut self) {
        self.destroy();
    }
}

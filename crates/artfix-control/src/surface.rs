//! Dynamic control-surface generation
//!
//! Everything the host framework shows the user (selector choices, action
//! and feedback descriptors, variables, generated preset buttons, the
//! configuration form itself) is derived from the live patch by the pure
//! functions in this module. Nothing here is patched incrementally: the
//! whole surface is regenerated whenever the registries change, so the
//! displayed choices can never drift from the model.

use serde::{Deserialize, Serialize};
use serde_json::json;

use artfix_core::{
    channels_used, ChannelBits, FixtureRegistry, ModuleConfig, Patch, PresetRegistry,
    TemplateRegistry,
};

/// One entry of a selector dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Stable identifier stored in the host's button config
    pub id: String,
    /// Human-readable label
    pub label: String,
}

impl Choice {
    /// Convenience constructor
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// An attribute at its declared width, identified by the `"Attr:bits"`
/// choice id every attribute-targeting operation uses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeRef {
    /// Attribute name as written in the template
    pub name: String,
    /// Declared width
    pub bits: ChannelBits,
}

impl AttributeRef {
    /// Construct from parts
    pub fn new(name: impl Into<String>, bits: ChannelBits) -> Self {
        Self {
            name: name.into(),
            bits,
        }
    }

    /// Parse a `"Attr:bits"` choice id; a missing or unrecognized width
    /// reads as 8-bit
    pub fn parse(id: &str) -> Self {
        match id.split_once(':') {
            Some((name, bits)) => Self {
                name: name.to_string(),
                bits: if bits == "16" {
                    ChannelBits::Sixteen
                } else {
                    ChannelBits::Eight
                },
            },
            None => Self {
                name: id.to_string(),
                bits: ChannelBits::Eight,
            },
        }
    }

    /// The composite `"Attr:bits"` identity used for deduplication and
    /// choice ids
    pub fn choice_id(&self) -> String {
        format!("{}:{}", self.name, self.bits.bit_count())
    }
}

/// A user-invokable operation, fully bound to its targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlAction {
    /// Set an attribute to a value (clamped to the attribute width)
    SetAttribute {
        /// Target fixture index
        fixture: u32,
        /// Target attribute
        attribute: AttributeRef,
        /// Value to apply
        value: u16,
    },
    /// Apply a named global preset to a fixture
    SetPreset {
        /// Target fixture index
        fixture: u32,
        /// Preset name, matched exactly
        preset: String,
    },
    /// Add a signed delta to an attribute, clamped to [0, width max].
    /// 8-bit attributes use `coarse` alone; 16-bit attributes sum `coarse`
    /// and `fine` so one button can nudge either byte.
    StepAttribute {
        /// Target fixture index
        fixture: u32,
        /// Target attribute
        attribute: AttributeRef,
        /// Primary delta
        coarse: i32,
        /// Fine delta, 16-bit only
        fine: i32,
    },
    /// Write straight into the live DMX frame at a fixture-relative slot,
    /// bypassing the attribute model entirely
    SetRawChannel {
        /// Target fixture index
        fixture: u32,
        /// 1-based offset from the fixture base address
        offset: i32,
        /// Value, applied modulo 256
        value: u16,
    },
    /// Momentary flash: press applies the value, release restores the
    /// pre-flash value
    FlashAttribute {
        /// Target fixture index
        fixture: u32,
        /// Target attribute
        attribute: AttributeRef,
        /// Flash value
        value: u16,
    },
    /// Alternate between two values keyed off equality with `val1`
    ToggleAttribute {
        /// Target fixture index
        fixture: u32,
        /// Target attribute
        attribute: AttributeRef,
        /// Primary value
        val1: u16,
        /// Secondary value
        val2: u16,
    },
    /// Zero every known attribute of every fixture
    BlackoutAll,
}

impl ControlAction {
    /// Stable action identifier, as registered with the host
    pub fn id(&self) -> &'static str {
        match self {
            ControlAction::SetAttribute { .. } => "set_attribute",
            ControlAction::SetPreset { .. } => "set_preset",
            ControlAction::StepAttribute { .. } => "step_attribute",
            ControlAction::SetRawChannel { .. } => "set_raw_channel",
            ControlAction::FlashAttribute { .. } => "flash_attribute",
            ControlAction::ToggleAttribute { .. } => "toggle_attribute",
            ControlAction::BlackoutAll => "blackout_all",
        }
    }
}

/// Comparison operator for the `attribute_compare` feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater or equal
    Ge,
    /// Less or equal
    Le,
}

impl CompareOp {
    /// All operators in display order
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::Gt,
        CompareOp::Lt,
        CompareOp::Ge,
        CompareOp::Le,
    ];

    /// Operator symbol used as choice id and label
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }

    /// Evaluate `a OP b`
    pub fn compare(&self, a: u16, b: u16) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            CompareOp::Gt => a > b,
            CompareOp::Lt => a < b,
            CompareOp::Ge => a >= b,
            CompareOp::Le => a <= b,
        }
    }
}

/// A boolean feedback bound to its targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Feedback {
    /// True while the fixture's attribute equals the named preset's value
    ActivePreset {
        /// Target fixture index
        fixture: u32,
        /// Preset name, matched exactly
        preset: String,
    },
    /// Compare an attribute against a literal
    AttributeCompare {
        /// Target fixture index
        fixture: u32,
        /// Target attribute
        attribute: AttributeRef,
        /// Comparison operator
        op: CompareOp,
        /// Literal to compare against
        value: u16,
    },
}

impl Feedback {
    /// Stable feedback identifier, as registered with the host
    pub fn id(&self) -> &'static str {
        match self {
            Feedback::ActivePreset { .. } => "active_preset",
            Feedback::AttributeCompare { .. } => "attribute_compare",
        }
    }

    /// Evaluate against the current patch. Dangling fixture or preset
    /// references evaluate to false rather than erroring.
    pub fn evaluate(&self, patch: &Patch) -> bool {
        match self {
            Feedback::ActivePreset { fixture, preset } => {
                let Some(fixture) = patch.fixtures.get(*fixture) else {
                    return false;
                };
                let Some(preset) = patch.presets.find(preset) else {
                    return false;
                };
                fixture.value(&preset.attribute) == preset.value
            }
            Feedback::AttributeCompare {
                fixture,
                attribute,
                op,
                value,
            } => {
                let Some(fixture) = patch.fixtures.get(*fixture) else {
                    return false;
                };
                op.compare(fixture.value(&attribute.name), *value)
            }
        }
    }
}

/// Kinds of user-editable option fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionKind {
    /// Read-only explanatory text
    StaticText {
        /// Displayed text
        value: String,
    },
    /// Free text input
    TextInput {
        /// Pre-filled value
        default: String,
    },
    /// Numeric input
    Number {
        /// Pre-filled value
        default: i64,
        /// Minimum accepted value
        min: i64,
        /// Maximum accepted value
        max: i64,
    },
    /// Single-select dropdown
    Dropdown {
        /// Available entries
        choices: Vec<Choice>,
        /// Pre-selected choice id
        default: String,
    },
}

/// One option field of an action, feedback, or the configuration form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionField {
    /// Field identifier
    pub id: String,
    /// Field label
    pub label: String,
    /// Field kind and constraints
    pub kind: OptionKind,
}

impl OptionField {
    fn new(id: impl Into<String>, label: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
        }
    }
}

/// Descriptor of an action the host can bind to a button
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDescriptor {
    /// Stable identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Option fields shown when binding the action
    pub options: Vec<OptionField>,
}

/// Descriptor of a boolean feedback the host can bind to a button style
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackDescriptor {
    /// Stable identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Option fields shown when binding the feedback
    pub options: Vec<OptionField>,
}

/// A variable exposed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Variable identifier
    pub id: String,
    /// Display name
    pub name: String,
}

/// A generated one-click preset button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetButton {
    /// Stable identifier
    pub id: String,
    /// Grouping category shown by the host
    pub category: String,
    /// Button face text
    pub label: String,
    /// Action bound to the press
    pub action: ControlAction,
    /// Feedback highlighting the button while active
    pub feedback: Feedback,
}

/// The complete derived operation surface. Outbound-only: it is pushed to
/// the host whole and regenerated on every config apply, never read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceDefinition {
    /// Bindable actions
    pub actions: Vec<ActionDescriptor>,
    /// Bindable feedbacks
    pub feedbacks: Vec<FeedbackDescriptor>,
    /// Exposed variables
    pub variables: Vec<VariableDefinition>,
    /// Generated per-fixture preset buttons
    pub preset_buttons: Vec<PresetButton>,
}

/// Deduplicated attribute choices in first-seen order across all templates
pub fn attribute_choices(templates: &TemplateRegistry) -> Vec<Choice> {
    let mut choices = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for template in templates.iter() {
        for channel in &template.channels {
            let attr = AttributeRef::new(&channel.attribute, channel.bits);
            let id = attr.choice_id();
            if seen.insert(id.clone()) {
                let label = format!("{} ({}-bit)", channel.attribute, channel.bits.bit_count());
                choices.push(Choice::new(id, label));
            }
        }
    }
    if choices.is_empty() {
        choices.push(Choice::new("", "No attributes defined"));
    }
    choices
}

/// Fixture choices in registry order, with a sentinel entry when none are
/// configured
pub fn fixture_choices(fixtures: &FixtureRegistry) -> Vec<Choice> {
    if fixtures.is_empty() {
        return vec![Choice::new("0", "No fixtures defined")];
    }
    fixtures
        .iter()
        .map(|f| Choice::new(f.index.to_string(), f.name.clone()))
        .collect()
}

/// Preset choices labeled `"{type}: {name}"`, with a sentinel when none are
/// configured
pub fn preset_choices(presets: &PresetRegistry) -> Vec<Choice> {
    if presets.is_empty() {
        return vec![Choice::new("", "No presets defined")];
    }
    presets
        .iter()
        .map(|p| Choice::new(p.name.clone(), format!("{}: {}", p.type_name, p.name)))
        .collect()
}

/// Variable-id fragment for an attribute name: lower-cased, spaces replaced
/// with underscores
pub fn variable_slug(attribute: &str) -> String {
    attribute.to_lowercase().replace(' ', "_")
}

fn fixture_dropdown(fixtures: &FixtureRegistry) -> OptionField {
    let choices = fixture_choices(fixtures);
    let default = choices[0].id.clone();
    OptionField::new("fixture", "Fixture", OptionKind::Dropdown { choices, default })
}

fn attribute_dropdown(templates: &TemplateRegistry) -> OptionField {
    let choices = attribute_choices(templates);
    let default = choices[0].id.clone();
    OptionField::new("attribute", "Attribute", OptionKind::Dropdown { choices, default })
}

fn preset_dropdown(presets: &PresetRegistry) -> OptionField {
    let choices = preset_choices(presets);
    let default = choices[0].id.clone();
    OptionField::new("preset", "Preset", OptionKind::Dropdown { choices, default })
}

fn number(id: &str, label: &str, default: i64, min: i64, max: i64) -> OptionField {
    OptionField::new(id, label, OptionKind::Number { default, min, max })
}

fn action_descriptors(patch: &Patch) -> Vec<ActionDescriptor> {
    let fixture = || fixture_dropdown(&patch.fixtures);
    let attribute = || attribute_dropdown(&patch.templates);

    vec![
        ActionDescriptor {
            id: "set_attribute",
            name: "Set Attribute Value",
            options: vec![
                fixture(),
                attribute(),
                number("value8", "Value (0-255)", 0, 0, 255),
                number("value16", "Value (0-65535)", 0, 0, 65535),
            ],
        },
        ActionDescriptor {
            id: "set_preset",
            name: "Set Global Preset",
            options: vec![fixture(), preset_dropdown(&patch.presets)],
        },
        ActionDescriptor {
            id: "step_attribute",
            name: "Step Attribute Value",
            options: vec![
                fixture(),
                attribute(),
                number("step8", "Step Amount (0-255)", 0, -255, 255),
                number("step16_coarse", "Coarse Step (changes MSB)", 0, -65535, 65535),
                number("step16_fine", "Fine Step (changes LSB)", 0, -65535, 65535),
            ],
        },
        ActionDescriptor {
            id: "set_raw_channel",
            name: "Set Raw Channel Offset",
            options: vec![
                fixture(),
                number("offset", "Channel Offset (1-based)", 1, 1, 512),
                number("value", "Value (0-255)", 0, 0, 255),
            ],
        },
        ActionDescriptor {
            id: "flash_attribute",
            name: "Flash Attribute Value",
            options: vec![
                fixture(),
                attribute(),
                number("value8", "Flash Value (0-255)", 255, 0, 255),
                number("value16", "Flash Value (0-65535)", 65535, 0, 65535),
            ],
        },
        ActionDescriptor {
            id: "toggle_attribute",
            name: "Toggle Attribute Value",
            options: vec![
                fixture(),
                attribute(),
                number("val1_8", "Value 1 (0-255)", 255, 0, 255),
                number("val2_8", "Value 2 (0-255)", 0, 0, 255),
                number("val1_16", "Value 1 (0-65535)", 65535, 0, 65535),
                number("val2_16", "Value 2 (0-65535)", 0, 0, 65535),
            ],
        },
        ActionDescriptor {
            id: "blackout_all",
            name: "Blackout All",
            options: vec![],
        },
    ]
}

fn feedback_descriptors(patch: &Patch) -> Vec<FeedbackDescriptor> {
    let op_choices = CompareOp::ALL
        .iter()
        .map(|op| Choice::new(op.symbol(), op.symbol()))
        .collect();

    vec![
        FeedbackDescriptor {
            id: "active_preset",
            name: "Active Preset",
            options: vec![
                fixture_dropdown(&patch.fixtures),
                preset_dropdown(&patch.presets),
            ],
        },
        FeedbackDescriptor {
            id: "attribute_compare",
            name: "Attribute Comparison",
            options: vec![
                fixture_dropdown(&patch.fixtures),
                attribute_dropdown(&patch.templates),
                OptionField::new(
                    "op",
                    "Operation",
                    OptionKind::Dropdown {
                        choices: op_choices,
                        default: CompareOp::Gt.symbol().to_string(),
                    },
                ),
                number("value", "Value", 128, 0, 65535),
            ],
        },
    ]
}

fn variable_definitions(patch: &Patch) -> Vec<VariableDefinition> {
    let mut variables = Vec::new();
    for fixture in patch.fixtures.iter() {
        variables.push(VariableDefinition {
            id: format!("fixture_{}_name", fixture.index),
            name: format!("Fixture {} Name", fixture.index),
        });

        if let Some(template) = patch.templates.get(&fixture.type_name) {
            let mut seen = std::collections::HashSet::new();
            for channel in &template.channels {
                if seen.insert(channel.attribute.clone()) {
                    variables.push(VariableDefinition {
                        id: format!("fixture_{}_{}", fixture.index, variable_slug(&channel.attribute)),
                        name: format!("Fixture {} {}", fixture.index, channel.attribute),
                    });
                }
            }
        }
    }

    variables.push(VariableDefinition {
        id: "fixture_count_total".to_string(),
        name: "Total Fixtures".to_string(),
    });
    variables.push(VariableDefinition {
        id: "dmx_channels_used".to_string(),
        name: "DMX Channels Used".to_string(),
    });
    variables
}

/// Resolve the declared width of an attribute within a template, for
/// binding generated preset buttons
fn attribute_bits(templates: &TemplateRegistry, type_name: &str, attribute: &str) -> ChannelBits {
    templates
        .get(type_name)
        .and_then(|t| t.channels.iter().find(|c| c.attribute == attribute))
        .map(|c| c.bits)
        .unwrap_or(ChannelBits::Sixteen)
}

fn preset_buttons(patch: &Patch) -> Vec<PresetButton> {
    let mut buttons = Vec::new();
    for preset in patch.presets.iter() {
        // One button per fixture of the applicable type
        for fixture in patch.fixtures.iter() {
            if fixture.type_name != preset.type_name {
                continue;
            }
            let bits = attribute_bits(&patch.templates, &preset.type_name, &preset.attribute);
            buttons.push(PresetButton {
                id: format!(
                    "fixture_{}_preset_{}",
                    fixture.index,
                    variable_slug(&preset.name)
                ),
                category: format!("{} Presets", fixture.name),
                label: format!("{}\n{}", fixture.name, preset.name),
                action: ControlAction::SetAttribute {
                    fixture: fixture.index,
                    attribute: AttributeRef::new(&preset.attribute, bits),
                    value: preset.value,
                },
                feedback: Feedback::ActivePreset {
                    fixture: fixture.index,
                    preset: preset.name.clone(),
                },
            });
        }
    }
    buttons
}

/// Regenerate the whole operation surface from the patch
pub fn build_surface(patch: &Patch) -> SurfaceDefinition {
    SurfaceDefinition {
        actions: action_descriptors(patch),
        feedbacks: feedback_descriptors(patch),
        variables: variable_definitions(patch),
        preset_buttons: preset_buttons(patch),
    }
}

/// Current values for every exposed variable
pub fn variable_values(patch: &Patch) -> Vec<(String, serde_json::Value)> {
    let mut values = Vec::new();
    for fixture in patch.fixtures.iter() {
        values.push((
            format!("fixture_{}_name", fixture.index),
            json!(fixture.name),
        ));
        if let Some(template) = patch.templates.get(&fixture.type_name) {
            let mut seen = std::collections::HashSet::new();
            for channel in &template.channels {
                if seen.insert(channel.attribute.clone()) {
                    values.push((
                        format!("fixture_{}_{}", fixture.index, variable_slug(&channel.attribute)),
                        json!(fixture.value(&channel.attribute)),
                    ));
                }
            }
        }
    }

    values.push(("fixture_count_total".to_string(), json!(patch.fixtures.len())));
    values.push((
        "dmx_channels_used".to_string(),
        json!(channels_used(&patch.fixtures, &patch.templates)),
    ));
    values
}

/// Generate the dynamic configuration form for the current config.
///
/// Section sizes follow the configured slot counts (at least one template
/// and fixture section, matching the host form defaults), and the fixture
/// and preset type dropdowns offer the template names as currently typed.
pub fn config_fields(config: &ModuleConfig) -> Vec<OptionField> {
    let mut fields = vec![
        OptionField::new(
            "info",
            "Usage Info",
            OptionKind::StaticText {
                value: "Define templates (fixture types) first, then assign them to fixtures. \
                        Global presets can be applied to any fixture of their type."
                    .to_string(),
            },
        ),
        OptionField::new(
            "host",
            "Target Host",
            OptionKind::TextInput {
                default: config.host.clone(),
            },
        ),
        number("universe", "Universe", config.universe as i64, 0, 32767),
    ];

    let template_count = config.templates.len().max(1);
    let template_choices: Vec<Choice> = (0..template_count)
        .map(|i| {
            let name = config
                .templates
                .get(i)
                .map(|t| t.name.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Type {}", i + 1));
            Choice::new(name.clone(), name)
        })
        .collect();

    for i in 0..template_count {
        let slot = config.templates.get(i);
        fields.push(OptionField::new(
            format!("template_{}_name", i + 1),
            "Template Name",
            OptionKind::TextInput {
                default: slot
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| format!("Type {}", i + 1)),
            },
        ));
        fields.push(OptionField::new(
            format!("template_{}_channels", i + 1),
            "Channels (offset:attribute:bits, ...)",
            OptionKind::TextInput {
                default: slot
                    .map(|t| t.channels.clone())
                    .unwrap_or_else(|| "1:Dimmer:8".to_string()),
            },
        ));
    }

    let fixture_count = config.fixtures.len().max(1);
    for i in 0..fixture_count {
        let slot = config.fixtures.get(i);
        fields.push(OptionField::new(
            format!("fixture_{}_name", i + 1),
            "Name",
            OptionKind::TextInput {
                default: slot
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| format!("Fixture {}", i + 1)),
            },
        ));
        fields.push(number(
            &format!("fixture_{}_address", i + 1),
            "DMX Address",
            slot.and_then(|f| f.address.trim().parse().ok())
                .unwrap_or(1 + i as i64 * 10),
            1,
            512,
        ));
        fields.push(OptionField::new(
            format!("fixture_{}_type", i + 1),
            "Fixture Type",
            OptionKind::Dropdown {
                choices: template_choices.clone(),
                default: slot
                    .map(|f| f.type_name.clone())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| template_choices[0].id.clone()),
            },
        ));
    }

    for (i, slot) in config.presets.iter().enumerate() {
        fields.push(OptionField::new(
            format!("preset_{}_name", i + 1),
            "Preset Name",
            OptionKind::TextInput {
                default: slot.name.clone(),
            },
        ));
        fields.push(OptionField::new(
            format!("preset_{}_type", i + 1),
            "Applicable to Type",
            OptionKind::Dropdown {
                choices: template_choices.clone(),
                default: if slot.type_name.is_empty() {
                    template_choices[0].id.clone()
                } else {
                    slot.type_name.clone()
                },
            },
        ));
        fields.push(OptionField::new(
            format!("preset_{}_attribute", i + 1),
            "Attribute",
            OptionKind::TextInput {
                default: slot.attribute.clone(),
            },
        ));
        fields.push(number(
            &format!("preset_{}_value", i + 1),
            "Value",
            slot.value.trim().parse().unwrap_or(255),
            0,
            65535,
        ));
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use artfix_core::{FixtureSlot, PresetSlot, TemplateSlot};

    fn demo_patch() -> Patch {
        let config = ModuleConfig {
            host: "127.0.0.1".to_string(),
            universe: 0,
            templates: vec![
                TemplateSlot {
                    name: "RGB".to_string(),
                    channels: "1:Red:8, 2:Green:8, 3:Blue:8".to_string(),
                },
                TemplateSlot {
                    name: "Mover".to_string(),
                    // Red repeats at a different width; Pan is 16-bit
                    channels: "1:Pan:16, 3:Red:8, 4:Red:16".to_string(),
                },
            ],
            fixtures: vec![
                FixtureSlot {
                    name: "Front".to_string(),
                    address: "1".to_string(),
                    type_name: "RGB".to_string(),
                },
                FixtureSlot {
                    name: "Spot".to_string(),
                    address: "10".to_string(),
                    type_name: "Mover".to_string(),
                },
            ],
            presets: vec![PresetSlot {
                name: "Red Full".to_string(),
                type_name: "RGB".to_string(),
                attribute: "Red".to_string(),
                value: "255".to_string(),
            }],
        };
        Patch::from_config(&config)
    }

    #[test]
    fn test_attribute_choices_dedup_first_seen() {
        let patch = demo_patch();
        let choices = attribute_choices(&patch.templates);
        let ids: Vec<&str> = choices.iter().map(|c| c.id.as_str()).collect();
        // Red:8 appears in both templates but is listed once, at its first
        // position; Red:16 is a distinct identity
        assert_eq!(ids, vec!["Red:8", "Green:8", "Blue:8", "Pan:16", "Red:16"]);
        assert_eq!(choices[3].label, "Pan (16-bit)");
    }

    #[test]
    fn test_sentinel_choices() {
        let empty = Patch::default();
        assert_eq!(
            fixture_choices(&empty.fixtures),
            vec![Choice::new("0", "No fixtures defined")]
        );
        assert_eq!(
            attribute_choices(&empty.templates),
            vec![Choice::new("", "No attributes defined")]
        );
        assert_eq!(
            preset_choices(&empty.presets),
            vec![Choice::new("", "No presets defined")]
        );
    }

    #[test]
    fn test_attribute_ref_round_trip() {
        let attr = AttributeRef::parse("Pan:16");
        assert_eq!(attr.name, "Pan");
        assert_eq!(attr.bits, ChannelBits::Sixteen);
        assert_eq!(attr.choice_id(), "Pan:16");

        assert_eq!(AttributeRef::parse("Dimmer").bits, ChannelBits::Eight);
        assert_eq!(AttributeRef::parse("Dimmer:12").bits, ChannelBits::Eight);
    }

    #[test]
    fn test_surface_action_set() {
        let surface = build_surface(&demo_patch());
        let ids: Vec<&str> = surface.actions.iter().map(|a| a.id).collect();
        assert_eq!(
            ids,
            vec![
                "set_attribute",
                "set_preset",
                "step_attribute",
                "set_raw_channel",
                "flash_attribute",
                "toggle_attribute",
                "blackout_all",
            ]
        );
        let feedback_ids: Vec<&str> = surface.feedbacks.iter().map(|f| f.id).collect();
        assert_eq!(feedback_ids, vec!["active_preset", "attribute_compare"]);
    }

    #[test]
    fn test_preset_buttons_per_matching_fixture() {
        let surface = build_surface(&demo_patch());
        // One preset applicable to one RGB fixture
        assert_eq!(surface.preset_buttons.len(), 1);
        let button = &surface.preset_buttons[0];
        assert_eq!(button.id, "fixture_1_preset_red_full");
        assert_eq!(button.category, "Front Presets");
        match &button.action {
            ControlAction::SetAttribute {
                fixture,
                attribute,
                value,
            } => {
                assert_eq!(*fixture, 1);
                assert_eq!(attribute.name, "Red");
                assert_eq!(attribute.bits, ChannelBits::Eight);
                assert_eq!(*value, 255);
            }
            other => panic!("unexpected action {other:?}"),
        }
        assert_eq!(
            button.feedback,
            Feedback::ActivePreset {
                fixture: 1,
                preset: "Red Full".to_string()
            }
        );
    }

    #[test]
    fn test_variable_definitions_and_values() {
        let mut patch = demo_patch();
        patch.fixtures.get_mut(2).unwrap().set_value("Pan", 1000);

        let definitions = variable_definitions(&patch);
        let ids: Vec<&str> = definitions.iter().map(|v| v.id.as_str()).collect();
        assert!(ids.contains(&"fixture_1_name"));
        assert!(ids.contains(&"fixture_2_pan"));
        assert!(ids.contains(&"fixture_count_total"));
        assert!(ids.contains(&"dmx_channels_used"));

        let values = variable_values(&patch);
        let lookup = |id: &str| {
            values
                .iter()
                .find(|(k, _)| k == id)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(lookup("fixture_1_name"), json!("Front"));
        assert_eq!(lookup("fixture_2_pan"), json!(1000));
        assert_eq!(lookup("fixture_count_total"), json!(2));
        // Spot's widest channel: address 10 + offset 4 (16-bit) ends at
        // 0-based slot 13
        assert_eq!(lookup("dmx_channels_used"), json!(14));
    }

    #[test]
    fn test_variable_slug() {
        assert_eq!(variable_slug("Color Wheel"), "color_wheel");
        assert_eq!(variable_slug("Dimmer"), "dimmer");
    }

    #[test]
    fn test_feedback_evaluation() {
        let mut patch = demo_patch();
        patch.fixtures.get_mut(1).unwrap().set_value("Red", 255);

        let active = Feedback::ActivePreset {
            fixture: 1,
            preset: "Red Full".to_string(),
        };
        assert!(active.evaluate(&patch));

        patch.fixtures.get_mut(1).unwrap().set_value("Red", 254);
        assert!(!active.evaluate(&patch));

        let compare = Feedback::AttributeCompare {
            fixture: 1,
            attribute: AttributeRef::new("Red", ChannelBits::Eight),
            op: CompareOp::Ge,
            value: 200,
        };
        assert!(compare.evaluate(&patch));

        // Dangling references evaluate to false, never error
        let dangling = Feedback::ActivePreset {
            fixture: 99,
            preset: "Red Full".to_string(),
        };
        assert!(!dangling.evaluate(&patch));
    }

    #[test]
    fn test_surface_serializes_for_host() {
        let surface = build_surface(&demo_patch());
        let encoded = serde_json::to_value(&surface).unwrap();

        let actions = encoded["actions"].as_array().unwrap();
        assert_eq!(actions.len(), 7);
        assert_eq!(actions[0]["id"], json!("set_attribute"));
        assert_eq!(encoded["feedbacks"][1]["id"], json!("attribute_compare"));
        assert_eq!(
            encoded["preset_buttons"][0]["id"],
            json!("fixture_1_preset_red_full")
        );
    }

    #[test]
    fn test_config_fields_sections() {
        let config = ModuleConfig {
            host: "10.0.0.5".to_string(),
            universe: 3,
            templates: vec![TemplateSlot {
                name: "RGB".to_string(),
                channels: "1:Red:8".to_string(),
            }],
            fixtures: vec![FixtureSlot {
                name: "Front".to_string(),
                address: "1".to_string(),
                type_name: "RGB".to_string(),
            }],
            presets: vec![PresetSlot {
                name: "Full".to_string(),
                type_name: "RGB".to_string(),
                attribute: "Red".to_string(),
                value: "255".to_string(),
            }],
        };

        let fields = config_fields(&config);
        let find = |id: &str| fields.iter().find(|f| f.id == id).unwrap();

        assert!(matches!(
            &find("host").kind,
            OptionKind::TextInput { default } if default == "10.0.0.5"
        ));
        assert!(matches!(
            &find("universe").kind,
            OptionKind::Number { default: 3, .. }
        ));
        assert!(matches!(
            &find("fixture_1_type").kind,
            OptionKind::Dropdown { default, .. } if default == "RGB"
        ));
        assert!(fields.iter().any(|f| f.id == "preset_1_value"));
    }

    #[test]
    fn test_config_fields_minimum_sections() {
        // An empty config still renders one template and one fixture section
        let fields = config_fields(&ModuleConfig::default());
        assert!(fields.iter().any(|f| f.id == "template_1_name"));
        assert!(fields.iter().any(|f| f.id == "fixture_1_name"));
        assert!(!fields.iter().any(|f| f.id == "preset_1_name"));
    }
}

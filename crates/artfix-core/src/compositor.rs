//! Buffer compositor: fixtures + templates -> 512-slot DMX frame
//!
//! The compositor recomputes the whole universe from scratch on every call.
//! At the target scale (at most ~100 fixtures with ~20 channels each) the
//! full pass is cheap enough that incremental updates are not worth the
//! bookkeeping.

use crate::fixture::FixtureRegistry;
use crate::template::{ChannelBits, TemplateRegistry};

/// Slots in one DMX universe
pub const DMX_CHANNELS: usize = 512;

/// Compose the full output buffer.
///
/// Fixtures are visited in registry order and their channels in declaration
/// order; later writes win on slot collisions. Fixtures whose template
/// dangles contribute nothing. A channel whose absolute slot range falls
/// outside the universe is dropped as a unit, including the in-range half
/// of a boundary-straddling 16-bit pair.
pub fn compose(fixtures: &FixtureRegistry, templates: &TemplateRegistry) -> [u8; DMX_CHANNELS] {
    let mut buffer = [0u8; DMX_CHANNELS];
    compose_into(fixtures, templates, &mut buffer);
    buffer
}

/// Compose into an existing buffer, zeroing it first
pub fn compose_into(
    fixtures: &FixtureRegistry,
    templates: &TemplateRegistry,
    buffer: &mut [u8; DMX_CHANNELS],
) {
    buffer.fill(0);

    for fixture in fixtures.iter() {
        let Some(template) = templates.get(&fixture.type_name) else {
            tracing::trace!(fixture = fixture.index, type_name = %fixture.type_name,
                "no template for fixture, skipping");
            continue;
        };

        for channel in &template.channels {
            let Some(slot) = absolute_slot(fixture.address, channel.offset) else {
                continue;
            };
            let value = fixture.value(&channel.attribute);

            match channel.bits {
                ChannelBits::Sixteen => {
                    if (0..=(DMX_CHANNELS as i64 - 2)).contains(&slot) {
                        let slot = slot as usize;
                        buffer[slot] = (value >> 8) as u8;
                        buffer[slot + 1] = (value & 0xff) as u8;
                    }
                }
                ChannelBits::Eight => {
                    if (0..DMX_CHANNELS as i64).contains(&slot) {
                        buffer[slot as usize] = (value & 0xff) as u8;
                    }
                }
            }
        }
    }
}

/// Highest composed slot + 1, or 0 when nothing lands in the universe.
///
/// Only channels that pass the compositor's range check count; a fixture
/// with an unresolved template or an out-of-range channel contributes
/// nothing.
pub fn channels_used(fixtures: &FixtureRegistry, templates: &TemplateRegistry) -> u16 {
    let mut used: u16 = 0;

    for fixture in fixtures.iter() {
        let Some(template) = templates.get(&fixture.type_name) else {
            continue;
        };
        for channel in &template.channels {
            let Some(slot) = absolute_slot(fixture.address, channel.offset) else {
                continue;
            };
            let end = slot + channel.bits.slot_count() as i64 - 1;
            if slot >= 0 && end < DMX_CHANNELS as i64 {
                used = used.max(end as u16 + 1);
            }
        }
    }

    used
}

/// 0-based absolute slot of a channel, `None` for unplaceable offsets
fn absolute_slot(address: i32, offset: Option<i32>) -> Option<i64> {
    let offset = offset?;
    Some(address as i64 - 1 + offset as i64 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FixtureSlot, ModuleConfig, TemplateSlot};
    use crate::patch::Patch;

    fn patch(templates: &[(&str, &str)], fixtures: &[(&str, &str, &str)]) -> Patch {
        let config = ModuleConfig {
            templates: templates
                .iter()
                .map(|(name, channels)| TemplateSlot {
                    name: name.to_string(),
                    channels: channels.to_string(),
                })
                .collect(),
            fixtures: fixtures
                .iter()
                .map(|(name, address, type_name)| FixtureSlot {
                    name: name.to_string(),
                    address: address.to_string(),
                    type_name: type_name.to_string(),
                })
                .collect(),
            ..Default::default()
        };
        Patch::from_config(&config)
    }

    #[test]
    fn test_single_8bit_channel() {
        let mut p = patch(&[("Dim", "1:Dimmer:8")], &[("Front", "10", "Dim")]);
        p.fixtures.get_mut(1).unwrap().set_value("Dimmer", 200);

        let buffer = compose(&p.fixtures, &p.templates);
        assert_eq!(buffer[9], 200);
        for (i, byte) in buffer.iter().enumerate() {
            if i != 9 {
                assert_eq!(*byte, 0);
            }
        }
    }

    #[test]
    fn test_16bit_msb_lsb() {
        let mut p = patch(&[("Mover", "1:Pan:16")], &[("Spot", "1", "Mover")]);
        p.fixtures.get_mut(1).unwrap().set_value("Pan", 0x1234);

        let buffer = compose(&p.fixtures, &p.templates);
        assert_eq!(buffer[0], 0x12);
        assert_eq!(buffer[1], 0x34);
    }

    #[test]
    fn test_last_write_wins() {
        let mut p = patch(
            &[("Dim", "1:Dimmer:8")],
            &[("First", "5", "Dim"), ("Second", "5", "Dim")],
        );
        p.fixtures.get_mut(1).unwrap().set_value("Dimmer", 10);
        p.fixtures.get_mut(2).unwrap().set_value("Dimmer", 20);

        let buffer = compose(&p.fixtures, &p.templates);
        assert_eq!(buffer[4], 20);
    }

    #[test]
    fn test_range_edges() {
        // 8-bit at the last slot is included
        let mut p = patch(&[("Dim", "1:Dimmer:8")], &[("Edge", "512", "Dim")]);
        p.fixtures.get_mut(1).unwrap().set_value("Dimmer", 7);
        assert_eq!(compose(&p.fixtures, &p.templates)[511], 7);

        // 16-bit straddling the boundary is dropped whole
        let mut p = patch(&[("Mover", "1:Pan:16")], &[("Edge", "512", "Mover")]);
        p.fixtures.get_mut(1).unwrap().set_value("Pan", 0xffff);
        let buffer = compose(&p.fixtures, &p.templates);
        assert_eq!(buffer[511], 0);
    }

    #[test]
    fn test_dangling_template_skipped() {
        let mut p = patch(&[("Dim", "1:Dimmer:8")], &[("Ghost", "1", "Missing")]);
        p.fixtures.get_mut(1).unwrap().set_value("Dimmer", 99);
        assert_eq!(compose(&p.fixtures, &p.templates), [0u8; DMX_CHANNELS]);
    }

    #[test]
    fn test_non_numeric_offset_never_composes() {
        let mut p = patch(&[("Odd", "x:Dimmer:8")], &[("F", "1", "Odd")]);
        p.fixtures.get_mut(1).unwrap().set_value("Dimmer", 50);
        assert_eq!(compose(&p.fixtures, &p.templates), [0u8; DMX_CHANNELS]);
    }

    #[test]
    fn test_channels_used() {
        let p = patch(
            &[("RGB", "1:Red:8, 2:Green:8, 3:Blue:8"), ("Mover", "1:Pan:16")],
            &[("Front", "10", "RGB"), ("Spot", "100", "Mover")],
        );
        // Spot's Pan occupies slots 99 and 100 (0-based), so 101 channels
        assert_eq!(channels_used(&p.fixtures, &p.templates), 101);
    }

    #[test]
    fn test_channels_used_empty_and_unresolved() {
        let p = patch(&[], &[]);
        assert_eq!(channels_used(&p.fixtures, &p.templates), 0);

        let p = patch(&[], &[("Ghost", "1", "Missing")]);
        assert_eq!(channels_used(&p.fixtures, &p.templates), 0);

        // Out-of-range channels do not count either
        let p = patch(&[("Mover", "1:Pan:16")], &[("Edge", "512", "Mover")]);
        assert_eq!(channels_used(&p.fixtures, &p.templates), 0);
    }
}

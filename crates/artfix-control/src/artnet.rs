//! Art-Net output sender (ArtDmx, Art-Net 4)
//!
//! The sender owns the UDP socket and the live 512-byte value array. The
//! module writes composed frames into the array and calls [`ArtNetSender::transmit`];
//! a background keep-alive thread retransmits the current frame at the
//! configured refresh interval so nodes do not time out between user
//! interactions.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use artfix_core::DMX_CHANNELS;

use crate::{error::ControlError, Result};

/// Standard Art-Net UDP port
pub const ARTNET_PORT: u16 = 6454;

/// Default keep-alive retransmission interval
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;

/// Sender construction parameters, using the three-level Art-Net
/// Net/Sub-Net/Universe addressing decomposition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtNetConfig {
    /// Target node IP or hostname
    pub host: String,
    /// Net, 0-127
    pub net: u8,
    /// Sub-Net, 0-15
    pub subnet: u8,
    /// Universe, 0-15
    pub universe: u8,
    /// Keep-alive retransmission interval; 0 disables the refresh thread
    pub refresh_interval_ms: u64,
}

impl ArtNetConfig {
    /// 15-bit Port-Address carried in ArtDmx packets
    pub fn port_address(&self) -> u16 {
        ((self.net as u16 & 0x7f) << 8) | ((self.subnet as u16 & 0x0f) << 4) | (self.universe as u16 & 0x0f)
    }
}

struct SenderState {
    values: [u8; DMX_CHANNELS],
    sequence: u8,
    running: bool,
}

struct Shared {
    socket: UdpSocket,
    target: SocketAddr,
    port_address: u16,
    state: Mutex<SenderState>,
    wake: Condvar,
}

/// Art-Net sender owning the socket and the live DMX frame
pub struct ArtNetSender {
    shared: Arc<Shared>,
    refresh: Option<JoinHandle<()>>,
}

impl ArtNetSender {
    /// Create a sender and start its keep-alive thread
    pub fn new(config: &ArtNetConfig) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_broadcast(true)?;

        let target = (config.host.as_str(), ARTNET_PORT)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                ControlError::DmxError(format!("cannot resolve Art-Net target '{}'", config.host))
            })?;

        let shared = Arc::new(Shared {
            socket,
            target,
            port_address: config.port_address(),
            state: Mutex::new(SenderState {
                values: [0u8; DMX_CHANNELS],
                sequence: 0,
                running: true,
            }),
            wake: Condvar::new(),
        });

        let refresh = if config.refresh_interval_ms > 0 {
            let shared = Arc::clone(&shared);
            let interval = Duration::from_millis(config.refresh_interval_ms);
            let handle = std::thread::Builder::new()
                .name("artnet-refresh".to_string())
                .spawn(move || {
                    let mut state = shared.state.lock();
                    while state.running {
                        let timed_out = shared.wake.wait_for(&mut state, interval).timed_out();
                        if !state.running {
                            break;
                        }
                        if timed_out {
                            if let Err(e) = send_locked(&shared, &mut state) {
                                tracing::warn!(error = %e, "Art-Net keep-alive transmit failed");
                            }
                        }
                    }
                })?;
            Some(handle)
        } else {
            None
        };

        tracing::info!(
            host = %config.host,
            net = config.net,
            subnet = config.subnet,
            universe = config.universe,
            "Art-Net sender created"
        );

        Ok(Self { shared, refresh })
    }

    /// Snapshot of the live value array
    pub fn values(&self) -> [u8; DMX_CHANNELS] {
        self.shared.state.lock().values
    }

    /// Replace the whole live value array
    pub fn set_values(&self, values: &[u8; DMX_CHANNELS]) {
        self.shared.state.lock().values = *values;
    }

    /// Write a single slot of the live value array; out-of-range slots are
    /// ignored
    pub fn set_value(&self, slot: usize, value: u8) {
        if slot < DMX_CHANNELS {
            self.shared.state.lock().values[slot] = value;
        }
    }

    /// The Port-Address this sender transmits on
    pub fn port_address(&self) -> u16 {
        self.shared.port_address
    }

    /// Send the current frame now
    pub fn transmit(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        if !state.running {
            return Ok(());
        }
        send_locked(&self.shared, &mut state)
    }

    /// Stop the sender: no further packets leave after this returns.
    /// Idempotent.
    pub fn stop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.running = false;
        }
        self.shared.wake.notify_all();
        if let Some(handle) = self.refresh.take() {
            let _ = handle.join();
        }
        tracing::debug!("Art-Net sender stopped");
    }
}

impl Drop for ArtNetSender {
    fn drop(&mut self) {
        self.stop();
    }
}

fn send_locked(shared: &Shared, state: &mut SenderState) -> Result<()> {
    let packet = build_artdmx_packet(shared.port_address, state.sequence, &state.values);
    shared.socket.send_to(&packet, shared.target)?;
    state.sequence = state.sequence.wrapping_add(1);
    tracing::trace!(port_address = shared.port_address, "sent ArtDmx packet");
    Ok(())
}

/// Build an ArtDmx packet (OpDmx 0x5000)
fn build_artdmx_packet(port_address: u16, sequence: u8, values: &[u8; DMX_CHANNELS]) -> Vec<u8> {
    let mut packet = vec![0u8; 18 + DMX_CHANNELS];

    // Header: "Art-Net\0"
    packet[0..8].copy_from_slice(b"Art-Net\0");

    // OpCode: OpDmx (little-endian)
    packet[8..10].copy_from_slice(&0x5000u16.to_le_bytes());

    // Protocol version 14 (big-endian)
    packet[10..12].copy_from_slice(&14u16.to_be_bytes());

    // Sequence and physical port
    packet[12] = sequence;
    packet[13] = 0;

    // Port-Address (little-endian)
    packet[14..16].copy_from_slice(&port_address.to_le_bytes());

    // Data length (big-endian)
    packet[16..18].copy_from_slice(&(DMX_CHANNELS as u16).to_be_bytes());

    packet[18..].copy_from_slice(values);
    packet
}

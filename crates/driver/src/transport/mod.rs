//! The I/O boundary: what the dispatch core requires from a transport.
//!
//! A transport delivers raw wire messages into a channel (the inbound side)
//! and implements [`OutputSink`] (the outbound side). The core treats the
//! wire framing and the meaning of colors as opaque.

use std::time::Instant;

use launchpad_library::{Color, Pad};
use thiserror::Error;

pub mod midi;
pub mod sim;

/// Capability to light a single button on the surface.
pub trait OutputSink: Send + Sync {
    /// Lights `pad` with `color`. If the underlying connection is
    /// unavailable the write is logged and dropped; the surface keeps
    /// operating visually degraded.
    fn send(&self, pad: Pad, color: Color);
}

/// One raw message as delivered by a transport, before normalization.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub bytes: Vec<u8>,
    pub timestamp: Instant,
}

impl RawMessage {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            timestamp: Instant::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("MIDI backend unavailable: {0}")]
    Backend(#[from] midir::InitError),

    #[error("no MIDI {direction} port matching \"{pattern}\"")]
    PortNotFound {
        direction: &'static str,
        pattern: String,
    },

    #[error("failed to open MIDI {direction} port: {message}")]
    Connect {
        direction: &'static str,
        message: String,
    },

    #[error("device init write failed: {0}")]
    Init(#[from] midir::SendError),
}

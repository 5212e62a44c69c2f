//! Normalization of raw transport messages into input events.

use launchpad_library::{EventKind, InputEvent};
use midly::live::LiveEvent;
use midly::MidiMessage;
use tracing::debug;

use crate::transport::RawMessage;

/// Decodes one raw wire message. Anything that is not a note or
/// control-change transition is logged and dropped; the loop never stops
/// over garbage input.
pub fn normalize(raw: &RawMessage) -> Option<InputEvent> {
    let event = match LiveEvent::parse(&raw.bytes) {
        Ok(event) => event,
        Err(err) => {
            debug!(bytes = ?raw.bytes, %err, "dropping malformed message");
            return None;
        }
    };

    let (kind, control_id, value) = match event {
        LiveEvent::Midi {
            message: MidiMessage::NoteOn { key, vel },
            ..
        } => (EventKind::NoteOn, key.as_int(), vel.as_int()),
        LiveEvent::Midi {
            message: MidiMessage::NoteOff { key, vel },
            ..
        } => (EventKind::NoteOff, key.as_int(), vel.as_int()),
        LiveEvent::Midi {
            message: MidiMessage::Controller { controller, value },
            ..
        } => (EventKind::ControlChange, controller.as_int(), value.as_int()),
        other => {
            debug!(?other, "ignoring unhandled message");
            return None;
        }
    };

    Some(InputEvent {
        kind,
        control_id,
        value,
        timestamp: raw.timestamp,
    })
}

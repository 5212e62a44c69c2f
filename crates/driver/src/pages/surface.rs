use std::sync::Arc;

use launchpad_library::{EventKind, InputEvent, Pad};
use tracing::debug;

use super::PageHandler;
use crate::transport::OutputSink;

/// Pad-level callbacks for a page that treats the surface as one bank of
/// momentary buttons.
pub trait PadSurface: Send {
    /// A pad went down (full-velocity press).
    fn pad_on(&mut self, pad: Pad, sink: &dyn OutputSink);

    /// A pad came back up.
    fn pad_off(&mut self, pad: Pad, sink: &dyn OutputSink);

    /// Redraws everything this surface owns; called on page activation.
    fn draw(&mut self, sink: &dyn OutputSink);
}

/// Adapts a [`PadSurface`] to the page contract: note events are decoded
/// into pad coordinates, value 127 becomes on and value 0 becomes off.
/// Everything else is logged and ignored.
pub struct SurfacePage<S> {
    surface: S,
    interface: Option<Arc<dyn OutputSink>>,
}

impl<S: PadSurface> SurfacePage<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            interface: None,
        }
    }
}

impl<S: PadSurface> PageHandler for SurfacePage<S> {
    fn set_interface(&mut self, sink: Arc<dyn OutputSink>) {
        self.interface = Some(sink);
    }

    fn prepare(&mut self) {
        if let Some(sink) = &self.interface {
            self.surface.draw(sink.as_ref());
        }
    }

    fn handle_event(&mut self, event: &InputEvent) {
        let Some(sink) = &self.interface else {
            debug!("surface page has no interface yet, dropping event");
            return;
        };

        match event.kind {
            EventKind::NoteOn => {
                let pad = Pad::from_note_id(event.control_id);
                if !pad.is_valid() {
                    debug!(id = event.control_id, "note off the surface");
                    return;
                }
                match event.value {
                    127 => self.surface.pad_on(pad, sink.as_ref()),
                    0 => self.surface.pad_off(pad, sink.as_ref()),
                    value => debug!(x = pad.x, y = pad.y, value, "unrecognized pad value"),
                }
            }
            // The device itself signals release as a zero-velocity note-on,
            // but a real note-off means the same thing whatever its value.
            EventKind::NoteOff => {
                let pad = Pad::from_note_id(event.control_id);
                if pad.is_valid() {
                    self.surface.pad_off(pad, sink.as_ref());
                }
            }
            EventKind::ControlChange => {
                debug!(
                    id = event.control_id,
                    value = event.value,
                    "control message"
                );
            }
        }
    }
}

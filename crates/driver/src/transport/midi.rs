//! Hardware transport: a real Launchpad over MIDI.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use launchpad_library::{Color, Pad};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use midly::live::LiveEvent;
use midly::MidiMessage;
use tracing::{debug, error, info};

use crate::settings::Settings;
use crate::transport::{OutputSink, RawMessage, TransportError};

/// An open hardware connection. Dropping it closes both directions, so the
/// owner must keep it alive for as long as the listener runs.
pub struct MidiTransport {
    sender: Arc<MidiSender>,
    _input: MidiInputConnection<Sender<RawMessage>>,
}

impl MidiTransport {
    /// Discovers the device by port name, opens both directions and resets
    /// the LED state. Discovery failure is terminal; it is never retried.
    pub fn connect(settings: &Settings) -> Result<(Self, Receiver<RawMessage>), TransportError> {
        let mut midi_in = MidiInput::new(&settings.client_name)?;
        midi_in.ignore(Ignore::None);
        let midi_out = MidiOutput::new(&settings.client_name)?;

        let in_port = find_port(
            midi_in.ports(),
            |port| midi_in.port_name(port),
            &settings.port_match,
            "input",
        )?;
        let out_port = find_port(
            midi_out.ports(),
            |port| midi_out.port_name(port),
            &settings.port_match,
            "output",
        )?;

        let out_conn = midi_out
            .connect(&out_port, "launchpad-out")
            .map_err(|err| TransportError::Connect {
                direction: "output",
                message: err.to_string(),
            })?;
        let sender = MidiSender {
            conn: Mutex::new(out_conn),
        };
        sender.reset()?;

        let (raw_tx, raw_rx) = mpsc::channel();
        let input = midi_in
            .connect(
                &in_port,
                "launchpad-in",
                move |_stamp, bytes, tx: &mut Sender<RawMessage>| {
                    // A send error means the listener is gone; the
                    // connection is about to be torn down with it.
                    let _ = tx.send(RawMessage::new(bytes));
                },
                raw_tx,
            )
            .map_err(|err| TransportError::Connect {
                direction: "input",
                message: err.to_string(),
            })?;

        info!("connected to the Launchpad and ready to start");
        Ok((
            Self {
                sender: Arc::new(sender),
                _input: input,
            },
            raw_rx,
        ))
    }

    pub fn sender(&self) -> Arc<MidiSender> {
        Arc::clone(&self.sender)
    }
}

fn find_port<P>(
    ports: Vec<P>,
    name_of: impl Fn(&P) -> Result<String, midir::PortInfoError>,
    pattern: &str,
    direction: &'static str,
) -> Result<P, TransportError> {
    for port in ports {
        match name_of(&port) {
            Ok(name) if name.contains(pattern) => {
                info!(%name, direction, "found Launchpad port");
                return Ok(port);
            }
            Ok(name) => debug!(%name, direction, "skipping port"),
            Err(err) => debug!(%err, direction, "skipping unnamed port"),
        }
    }
    Err(TransportError::PortNotFound {
        direction,
        pattern: pattern.to_string(),
    })
}

/// Translates `(pad, color)` into the device's wire format, one write per
/// send. No state beyond the connection handle.
pub struct MidiSender {
    conn: Mutex<MidiOutputConnection>,
}

impl MidiSender {
    /// Clears all LEDs and selects the X-Y button layout the grid
    /// addressing assumes.
    fn reset(&self) -> Result<(), TransportError> {
        self.raw_write(&[0xB0, 0x00, 0x00])?;
        self.raw_write(&[0xB0, 0x00, 0x01])?;
        Ok(())
    }

    fn raw_write(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        };
        conn.send(bytes)?;
        Ok(())
    }
}

/// Picks the wire message lighting `pad`: a note-on for the grid and side
/// column, a control-change for the top row.
fn led_message(pad: Pad, color: Color) -> Option<MidiMessage> {
    if let Some(id) = pad.control_id() {
        return Some(MidiMessage::Controller {
            controller: id.into(),
            value: color.velocity().into(),
        });
    }
    pad.note_id().map(|id| MidiMessage::NoteOn {
        key: id.into(),
        vel: color.velocity().into(),
    })
}

impl OutputSink for MidiSender {
    fn send(&self, pad: Pad, color: Color) {
        let Some(message) = led_message(pad, color) else {
            debug!(x = pad.x, y = pad.y, "refusing to light an unaddressable pad");
            return;
        };

        let event = LiveEvent::Midi {
            channel: 0.into(),
            message,
        };
        let mut buf = Vec::with_capacity(3);
        if event.write(&mut buf).is_err() {
            error!("could not encode the LED message");
            return;
        }
        if let Err(err) = self.raw_write(&buf) {
            error!(%err, "could not write to the Launchpad");
        }
    }
}

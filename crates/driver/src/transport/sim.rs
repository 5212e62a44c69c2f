//! Simulated transport: a Launchpad stand-in rendered in the terminal.
//!
//! Input comes from stdin commands instead of button widgets; each tap
//! fabricates the exact raw messages the hardware would produce, a full
//! press followed by its release after a short pulse. Output renders the
//! three control groups as colored cells.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossterm::style::{Color as TermColor, Stylize};
use crossterm::{cursor, queue, terminal};
use launchpad_library::{color, Color, Pad};
use tracing::debug;

use crate::listener::StopHandle;
use crate::settings::Settings;
use crate::transport::{OutputSink, RawMessage};

/// Labels of the round top-row controls, left to right.
const TOP_LABELS: [&str; 8] = ["^", "v", "<", ">", "SE", "U1", "U2", "MX"];

const HELP: &str = "commands: p <x> <y> (pad), t <n> (top row), s <n> (side column), q (quit)";

/// Starts the simulator: renders the initial frame and spawns the stdin
/// feeder. Quitting (or stdin reaching EOF) trips the stop handle before
/// the raw channel drops.
pub fn start(
    settings: &Settings,
    stop: StopHandle,
) -> io::Result<(Arc<SimSender>, Receiver<RawMessage>)> {
    let sender = Arc::new(SimSender::new());
    sender.redraw();

    let (raw_tx, raw_rx) = mpsc::channel();
    let pulse = Duration::from_millis(settings.press_pulse_ms);
    spawn_feeder(raw_tx, stop, pulse)?;

    Ok((sender, raw_rx))
}

struct SimCells {
    grid: [[Color; 8]; 8],
    top: [Color; 8],
    side: [Color; 8],
}

impl SimCells {
    fn new() -> Self {
        Self {
            grid: [[color::OFF; 8]; 8],
            top: [color::OFF; 8],
            side: [color::OFF; 8],
        }
    }
}

/// The outbound half of the simulator: a cell buffer redrawn on every
/// write.
pub struct SimSender {
    cells: Mutex<SimCells>,
}

impl SimSender {
    fn new() -> Self {
        Self {
            cells: Mutex::new(SimCells::new()),
        }
    }

    fn redraw(&self) {
        let cells = match self.cells.lock() {
            Ok(cells) => cells,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Terminal writes are best-effort.
        let _ = draw_frame(&cells);
    }
}

impl OutputSink for SimSender {
    fn send(&self, pad: Pad, color: Color) {
        {
            let mut cells = match self.cells.lock() {
                Ok(cells) => cells,
                Err(poisoned) => poisoned.into_inner(),
            };
            if pad.is_top_row() && pad.is_valid() {
                cells.top[pad.x as usize] = color;
            } else if pad.is_side_column() && pad.is_valid() {
                cells.side[pad.y as usize] = color;
            } else if pad.is_grid() {
                cells.grid[pad.y as usize][pad.x as usize] = color;
            } else {
                debug!(x = pad.x, y = pad.y, "refusing to light an unaddressable pad");
                return;
            }
        }
        self.redraw();
    }
}

fn term_color(color: Color) -> TermColor {
    // Spread the 0..=3 channels over the full range.
    TermColor::Rgb {
        r: color.red() * 85,
        g: color.green() * 85,
        b: 0,
    }
}

fn draw_frame(cells: &SimCells) -> io::Result<()> {
    let mut out = io::stdout().lock();
    queue!(
        out,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::All)
    )?;

    for label in TOP_LABELS {
        write!(out, "{label:>2} ")?;
    }
    writeln!(out)?;
    for color in cells.top {
        write!(out, "{} ", "  ".on(term_color(color)))?;
    }
    writeln!(out)?;
    writeln!(out)?;

    for y in 0..8 {
        for x in 0..8 {
            write!(out, "{} ", "  ".on(term_color(cells.grid[y][x])))?;
        }
        write!(out, "  {}", "  ".on(term_color(cells.side[y])))?;
        writeln!(out)?;
    }

    writeln!(out)?;
    writeln!(out, "{HELP}")?;
    write!(out, "> ")?;
    out.flush()
}

enum SimCommand {
    Tap(Pad),
    Quit,
}

fn parse_command(line: &str) -> Option<SimCommand> {
    let mut parts = line.split_whitespace();
    let command = match parts.next()? {
        "q" | "quit" => SimCommand::Quit,
        "p" => {
            let x: i8 = parts.next()?.parse().ok()?;
            let y: i8 = parts.next()?.parse().ok()?;
            let pad = Pad::grid(x, y);
            if !pad.is_grid() {
                return None;
            }
            SimCommand::Tap(pad)
        }
        "t" => {
            let index: i8 = parts.next()?.parse().ok()?;
            let pad = Pad::top(index);
            if !pad.is_valid() {
                return None;
            }
            SimCommand::Tap(pad)
        }
        "s" => {
            let index: i8 = parts.next()?.parse().ok()?;
            let pad = Pad::side(index);
            if !pad.is_valid() {
                return None;
            }
            SimCommand::Tap(pad)
        }
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(command)
}

/// The raw press/release pair a finger on `pad` would put on the wire.
fn wire_pair(pad: Pad) -> Option<(RawMessage, RawMessage)> {
    if let Some(id) = pad.control_id() {
        return Some((
            RawMessage::new(&[0xB0, id, 127]),
            RawMessage::new(&[0xB0, id, 0]),
        ));
    }
    let id = pad.note_id()?;
    Some((
        RawMessage::new(&[0x90, id, 127]),
        RawMessage::new(&[0x90, id, 0]),
    ))
}

/// A tap is a press, a short bounded hold, then the release. The sleep
/// happens on the feeder thread, never on the event loop.
fn tap(raw_tx: &Sender<RawMessage>, pad: Pad, pulse: Duration) {
    let Some((press, release)) = wire_pair(pad) else {
        return;
    };
    if raw_tx.send(press).is_err() {
        return;
    }
    thread::sleep(pulse);
    let _ = raw_tx.send(release);
}

fn spawn_feeder(raw_tx: Sender<RawMessage>, stop: StopHandle, pulse: Duration) -> io::Result<()> {
    thread::Builder::new()
        .name("sim-feeder".into())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                if stop.is_stopped() {
                    break;
                }
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(SimCommand::Quit) => break,
                    Some(SimCommand::Tap(pad)) => tap(&raw_tx, pad, pulse),
                    None => {
                        if !line.trim().is_empty() {
                            eprintln!("{HELP}");
                        }
                    }
                }
            }
            // Quit and EOF both stop the listener before the channel drops.
            stop.stop();
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taps_fabricate_the_hardware_wire_format() {
        let (press, release) = wire_pair(Pad::grid(3, 2)).unwrap();
        assert_eq!(press.bytes, vec![0x90, 35, 127]);
        assert_eq!(release.bytes, vec![0x90, 35, 0]);

        let (press, _) = wire_pair(Pad::side(2)).unwrap();
        assert_eq!(press.bytes, vec![0x90, 40, 127]);

        let (press, release) = wire_pair(Pad::top(5)).unwrap();
        assert_eq!(press.bytes, vec![0xB0, 0x6D, 127]);
        assert_eq!(release.bytes, vec![0xB0, 0x6D, 0]);
    }

    #[test]
    fn commands_parse_into_taps() {
        assert!(matches!(
            parse_command("p 3 2"),
            Some(SimCommand::Tap(pad)) if pad == Pad::grid(3, 2)
        ));
        assert!(matches!(
            parse_command("t 0"),
            Some(SimCommand::Tap(pad)) if pad == Pad::top(0)
        ));
        assert!(matches!(
            parse_command("s 7"),
            Some(SimCommand::Tap(pad)) if pad == Pad::side(7)
        ));
        assert!(matches!(parse_command("q"), Some(SimCommand::Quit)));
    }

    #[test]
    fn out_of_range_and_malformed_commands_are_rejected() {
        assert!(parse_command("p 8 0").is_none());
        assert!(parse_command("p -1 0").is_none());
        assert!(parse_command("t 8").is_none());
        assert!(parse_command("s").is_none());
        assert!(parse_command("p 1").is_none());
        assert!(parse_command("p 1 2 3").is_none());
        assert!(parse_command("x 1 2").is_none());
        assert!(parse_command("").is_none());
    }
}

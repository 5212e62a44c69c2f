use std::collections::HashSet;

use launchpad_library::{grid, Color, Pad};

use super::surface::PadSurface;
use crate::transport::OutputSink;

/// Lights pads with a fixed color while they are held down and restores
/// the background color on release. Re-entering the page repaints the
/// whole surface from the held-pad state.
pub struct PaintSurface {
    on_color: Color,
    off_color: Color,
    held: HashSet<Pad>,
}

impl PaintSurface {
    pub fn new(on_color: Color, off_color: Color) -> Self {
        Self {
            on_color,
            off_color,
            held: HashSet::new(),
        }
    }

    fn color_of(&self, pad: Pad) -> Color {
        if self.held.contains(&pad) {
            self.on_color
        } else {
            self.off_color
        }
    }
}

impl PadSurface for PaintSurface {
    fn pad_on(&mut self, pad: Pad, sink: &dyn OutputSink) {
        self.held.insert(pad);
        sink.send(pad, self.on_color);
    }

    fn pad_off(&mut self, pad: Pad, sink: &dyn OutputSink) {
        self.held.remove(&pad);
        sink.send(pad, self.off_color);
    }

    fn draw(&mut self, sink: &dyn OutputSink) {
        for y in 0..grid::GRID_SIZE {
            for x in 0..grid::GRID_SIZE {
                let pad = Pad::grid(x, y);
                sink.send(pad, self.color_of(pad));
            }
            let side = Pad::side(y);
            sink.send(side, self.color_of(side));
        }
    }
}

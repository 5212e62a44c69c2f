//! Device-level primitives for the Launchpad control surface: the grid
//! addressing scheme, LED colors and the normalized input event type shared
//! by the driver and its transports.

pub mod color;
pub mod event;
pub mod grid;

pub use color::Color;
pub use event::{EventKind, InputEvent};
pub use grid::Pad;

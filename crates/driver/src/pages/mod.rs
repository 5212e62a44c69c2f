use std::sync::Arc;

use launchpad_library::InputEvent;

use crate::transport::OutputSink;

pub mod monitor;
pub mod paint;
pub mod surface;

/// One swappable screenful of button behavior.
///
/// Pages are constructed inert, bound to an output sink with
/// [`set_interface`](PageHandler::set_interface) and then live for the
/// process lifetime; switching pages recycles them, it never destroys them.
pub trait PageHandler: Send {
    /// Binds the page to the sink it draws through. Idempotent, side
    /// effect only; safe to call before or after the page is added to a
    /// router.
    fn set_interface(&mut self, sink: Arc<dyn OutputSink>);

    /// Called each time the page becomes the active page, including the
    /// very first activation. Pages redraw their entire visual state here;
    /// pages with nothing to draw no-op.
    fn prepare(&mut self);

    /// Called for every event routed to this page while it is active.
    /// Must not block; events arrive serially on the listener thread.
    fn handle_event(&mut self, event: &InputEvent);
}

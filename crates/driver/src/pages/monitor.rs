use std::sync::Arc;

use launchpad_library::InputEvent;
use tracing::debug;

use super::PageHandler;
use crate::transport::OutputSink;

/// A page that does nothing but log the traffic routed to it. Useful as a
/// scratch page and for watching what the surface actually emits.
#[derive(Default)]
pub struct MonitorPage;

impl MonitorPage {
    pub fn new() -> Self {
        Self
    }
}

impl PageHandler for MonitorPage {
    fn set_interface(&mut self, _sink: Arc<dyn OutputSink>) {
        // Nothing to draw; the sink is not retained.
    }

    fn prepare(&mut self) {
        debug!("monitor page active");
    }

    fn handle_event(&mut self, event: &InputEvent) {
        debug!(
            kind = ?event.kind,
            id = event.control_id,
            value = event.value,
            "message"
        );
    }
}

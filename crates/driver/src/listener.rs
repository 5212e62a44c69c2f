use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::input;
use crate::router::PageRouter;
use crate::transport::RawMessage;

/// Upper bound on one blocking wait, so a stop request takes effect within
/// a bounded time.
const POLL_WAIT: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("page router has no pages configured")]
    NoPages,

    #[error("listener already ran; construct a fresh one to run again")]
    ListenerSpent,

    #[error("transport connection lost")]
    TransportLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerState {
    Idle,
    Running,
    Stopped,
}

/// Cooperative stop flag shared between the listener, the transports and
/// the Ctrl-C handler.
#[derive(Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives the receive loop: raw messages in, normalized events dispatched
/// to the router, strictly in arrival order on a single thread.
pub struct Listener {
    raw_rx: Receiver<RawMessage>,
    router: PageRouter,
    stop: StopHandle,
    state: ListenerState,
}

impl Listener {
    pub fn new(raw_rx: Receiver<RawMessage>, router: PageRouter, stop: StopHandle) -> Self {
        Self {
            raw_rx,
            router,
            stop,
            state: ListenerState::Idle,
        }
    }

    /// Runs the receive loop on the calling thread until stopped or the
    /// transport goes away. One-shot: the listener ends up `Stopped` and a
    /// later call is an error.
    pub fn run(&mut self) -> Result<(), DriverError> {
        if self.state != ListenerState::Idle {
            return Err(DriverError::ListenerSpent);
        }
        if self.router.page_count() == 0 {
            self.state = ListenerState::Stopped;
            return Err(DriverError::NoPages);
        }
        self.state = ListenerState::Running;

        debug!("preparing the initial page");
        self.router.prepare();
        info!("listener running");

        let result = loop {
            if self.stop.is_stopped() {
                break Ok(());
            }
            match self.raw_rx.recv_timeout(POLL_WAIT) {
                Ok(raw) => {
                    if let Some(event) = input::normalize(&raw) {
                        self.router.handle_event(&event);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    // A transport that closed because we are stopping is a
                    // clean exit; anything else lost the device.
                    if self.stop.is_stopped() {
                        break Ok(());
                    }
                    error!("transport connection lost");
                    break Err(DriverError::TransportLost);
                }
            }
        };

        self.state = ListenerState::Stopped;
        info!("listener stopped");
        result
    }

    /// Moves the listener onto its own worker thread.
    pub fn spawn(mut self) -> io::Result<JoinHandle<Result<(), DriverError>>> {
        thread::Builder::new()
            .name("pad-listener".into())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    use launchpad_library::{EventKind, InputEvent};

    use super::*;
    use crate::pages::PageHandler;
    use crate::router::NavControls;
    use crate::transport::OutputSink;

    const NAV: NavControls = NavControls {
        previous: 0x6A,
        next: 0x6B,
    };

    #[derive(Default)]
    struct PageLog {
        prepares: usize,
        events: Vec<(EventKind, u8, u8)>,
    }

    struct RecorderPage {
        log: Arc<Mutex<PageLog>>,
    }

    impl PageHandler for RecorderPage {
        fn set_interface(&mut self, _sink: Arc<dyn OutputSink>) {}

        fn prepare(&mut self) {
            self.log.lock().unwrap().prepares += 1;
        }

        fn handle_event(&mut self, event: &InputEvent) {
            self.log
                .lock()
                .unwrap()
                .events
                .push((event.kind, event.control_id, event.value));
        }
    }

    fn one_page_router() -> (PageRouter, Arc<Mutex<PageLog>>) {
        let mut router = PageRouter::new(NAV);
        let log = Arc::new(Mutex::new(PageLog::default()));
        router.add_page(Box::new(RecorderPage {
            log: Arc::clone(&log),
        }));
        (router, log)
    }

    #[test]
    fn refuses_to_run_with_no_pages() {
        let (_tx, rx) = mpsc::channel();
        let router = PageRouter::new(NAV);
        let mut listener = Listener::new(rx, router, StopHandle::new());

        assert!(matches!(listener.run(), Err(DriverError::NoPages)));
    }

    #[test]
    fn drains_queued_messages_in_order_then_reports_a_lost_transport() {
        let (tx, rx) = mpsc::channel();
        let (router, log) = one_page_router();
        let listener = Listener::new(rx, router, StopHandle::new());

        tx.send(RawMessage::new(&[0x90, 35, 127])).unwrap();
        tx.send(RawMessage::new(&[0x90, 35, 0])).unwrap();
        tx.send(RawMessage::new(&[0xB0, 0x68, 127])).unwrap();
        drop(tx);

        let handle = listener.spawn().unwrap();
        let result = handle.join().unwrap();

        assert!(matches!(result, Err(DriverError::TransportLost)));
        let log = log.lock().unwrap();
        assert_eq!(log.prepares, 1);
        assert_eq!(
            log.events,
            vec![
                (EventKind::NoteOn, 35, 127),
                (EventKind::NoteOn, 35, 0),
                (EventKind::ControlChange, 0x68, 127),
            ]
        );
    }

    #[test]
    fn malformed_messages_are_dropped_not_fatal() {
        let (tx, rx) = mpsc::channel();
        let (router, log) = one_page_router();
        let listener = Listener::new(rx, router, StopHandle::new());

        tx.send(RawMessage::new(&[0x42])).unwrap();
        tx.send(RawMessage::new(&[])).unwrap();
        tx.send(RawMessage::new(&[0x90, 0, 127])).unwrap();
        drop(tx);

        let handle = listener.spawn().unwrap();
        let _ = handle.join().unwrap();

        assert_eq!(log.lock().unwrap().events, vec![(EventKind::NoteOn, 0, 127)]);
    }

    #[test]
    fn stop_makes_run_return_cleanly_and_the_listener_is_spent() {
        let (_tx, rx) = mpsc::channel();
        let (router, log) = one_page_router();
        let stop = StopHandle::new();
        let mut listener = Listener::new(rx, router, stop.clone());

        stop.stop();
        assert!(listener.run().is_ok());
        assert_eq!(log.lock().unwrap().prepares, 1);

        assert!(matches!(listener.run(), Err(DriverError::ListenerSpent)));
    }

    #[test]
    fn disconnect_after_stop_is_a_clean_exit() {
        let (tx, rx) = mpsc::channel();
        let (router, _log) = one_page_router();
        let stop = StopHandle::new();
        let mut listener = Listener::new(rx, router, stop.clone());

        drop(tx);
        stop.stop();

        assert!(listener.run().is_ok());
    }
}

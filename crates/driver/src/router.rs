use std::sync::Arc;

use launchpad_library::{EventKind, InputEvent};
use tracing::{debug, warn};

use crate::pages::PageHandler;
use crate::transport::OutputSink;

/// The two control ids a transport dedicates to page navigation. Which
/// physical buttons these are is the transport's business; the router only
/// needs them to be distinct.
#[derive(Debug, Clone, Copy)]
pub struct NavControls {
    pub previous: u8,
    pub next: u8,
}

/// Full-velocity press. Anything else on a reserved id is page content.
const NAV_PRESS: u8 = 127;

/// Owns the page sequence and the active-page cursor, and intercepts the
/// reserved navigation controls before anything reaches page content.
/// Pages never see a navigation press and never move the cursor
/// themselves.
pub struct PageRouter {
    pages: Vec<Box<dyn PageHandler>>,
    current_page: usize,
    interface: Option<Arc<dyn OutputSink>>,
    nav: NavControls,
}

impl PageRouter {
    pub fn new(nav: NavControls) -> Self {
        Self {
            pages: Vec::new(),
            current_page: 0,
            interface: None,
            nav,
        }
    }

    /// Appends a page in navigation order. A page added after the
    /// interface is bound gets it immediately.
    pub fn add_page(&mut self, mut page: Box<dyn PageHandler>) {
        if let Some(interface) = &self.interface {
            page.set_interface(Arc::clone(interface));
        }
        self.pages.push(page);
        debug!(pages = self.pages.len(), "page added");
    }

    /// Binds the output sink, propagating it to every registered page.
    pub fn set_interface(&mut self, interface: Arc<dyn OutputSink>) {
        for page in &mut self.pages {
            page.set_interface(Arc::clone(&interface));
        }
        self.interface = Some(interface);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Activates the current page.
    pub fn prepare(&mut self) {
        let Some(page) = self.pages.get_mut(self.current_page) else {
            warn!("router has no pages to prepare");
            return;
        };
        debug!(page = self.current_page + 1, "preparing page");
        page.prepare();
    }

    /// Routes one event: navigation presses are consumed here, everything
    /// else goes verbatim to the active page.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if self.pages.is_empty() {
            warn!("router has no pages, dropping event");
            return;
        }

        if event.kind == EventKind::ControlChange && event.value == NAV_PRESS {
            if event.control_id == self.nav.previous {
                self.previous_page();
                return;
            }
            if event.control_id == self.nav.next {
                self.next_page();
                return;
            }
        }

        self.pages[self.current_page].handle_event(event);
    }

    /// Steps to the previous page, wrapping at the front, and activates
    /// it. The outgoing page is left untouched.
    pub fn previous_page(&mut self) {
        if self.pages.is_empty() {
            return;
        }
        self.current_page = (self.current_page + self.pages.len() - 1) % self.pages.len();
        debug!(page = self.current_page + 1, "switching to previous page");
        self.prepare();
    }

    /// Steps to the next page, wrapping at the back, and activates it.
    pub fn next_page(&mut self) {
        if self.pages.is_empty() {
            return;
        }
        self.current_page = (self.current_page + 1) % self.pages.len();
        debug!(page = self.current_page + 1, "switching to next page");
        self.prepare();
    }
}

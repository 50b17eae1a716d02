//! The full behavior bundle wired to a page.
//!
//! Components do not depend on one another's internals; they share only the
//! document. The bundle fans every event out to each of them in turn.

use crate::config::NavConfig;
use crate::dom::{Behavior, Document, PageEvent};
use crate::menu::{MenuController, MenuState};
use crate::scroll::SmoothScroller;
use crate::spy::ScrollSpy;

/// The menu controller, scroll spy and smooth scroller attached as one unit.
pub struct Behaviors {
    pub menu: MenuController,
    pub spy: ScrollSpy,
    pub scroller: SmoothScroller,
}

impl Behaviors {
    /// Construct and attach all behaviors to the document.
    pub fn attach<D: Document>(config: &NavConfig, doc: &mut D) -> Self {
        let mut menu = MenuController::new(config);
        let mut spy = ScrollSpy::new(config);
        let mut scroller = SmoothScroller::new(config);
        menu.attach(doc);
        spy.attach(doc);
        scroller.attach(doc);
        Self {
            menu,
            spy,
            scroller,
        }
    }

    /// Deliver one event to every component.
    pub fn handle<D: Document>(&mut self, doc: &mut D, event: &PageEvent) {
        self.menu.handle(doc, event);
        self.scroller.handle(doc, event);
        self.spy.handle(doc, event);
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu.state()
    }

    /// Detach everything, restoring scroll lock, markers and focusability.
    pub fn detach<D: Document>(&mut self, doc: &mut D) {
        self.menu.detach(doc);
        self.scroller.detach(doc);
        self.spy.detach(doc);
    }
}

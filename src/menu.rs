//! Mobile menu controller.
//!
//! Owns the open/closed state of the mobile navigation and the dimming
//! overlay. Every closing gesture (overlay click, in-menu link click,
//! Escape, crossing to the desktop breakpoint) funnels through the same
//! toggle operation the trigger uses.
//!
//! Each DOM hook (trigger, menu) is optional and independently skipped when
//! absent; a page without a hamburger simply gets no menu wiring.

use crate::config::NavConfig;
use crate::dom::{Behavior, Document, Key, NodeId, PageEvent};

/// Class marking the trigger, menu and overlay while the menu is open.
pub const OPEN_CLASS: &str = "active";

/// Open/closed state of the mobile menu. One instance per page session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Closed,
    Open,
}

/// Watches resize events for crossings of the desktop breakpoint.
///
/// The open-menu auto-close must react to breakpoint *changes* only, not to
/// every resize tick, so the last match state is latched and compared.
#[derive(Debug)]
struct BreakpointWatcher {
    min_width: u32,
    last_matches: Option<bool>,
}

impl BreakpointWatcher {
    fn new(min_width: u32) -> Self {
        Self {
            min_width,
            last_matches: None,
        }
    }

    /// Record the initial match state without treating it as a change.
    fn prime(&mut self, width: u32) {
        self.last_matches = Some(width >= self.min_width);
    }

    /// Returns the new match state iff it changed since the last call.
    fn observe(&mut self, width: u32) -> Option<bool> {
        let matches = width >= self.min_width;
        let changed = self.last_matches != Some(matches);
        self.last_matches = Some(matches);
        if changed {
            Some(matches)
        } else {
            None
        }
    }
}

/// Controls the mobile navigation menu and its dimming overlay.
#[derive(Debug)]
pub struct MenuController {
    state: MenuState,
    trigger: Option<NodeId>,
    menu: Option<NodeId>,
    overlay: Option<NodeId>,
    nav_links: Vec<NodeId>,
    breakpoint: BreakpointWatcher,
}

impl MenuController {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            state: MenuState::Closed,
            trigger: None,
            menu: None,
            overlay: None,
            nav_links: Vec::new(),
            breakpoint: BreakpointWatcher::new(config.desktop_breakpoint),
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn trigger(&self) -> Option<NodeId> {
        self.trigger
    }

    pub fn overlay(&self) -> Option<NodeId> {
        self.overlay
    }

    /// Flip the menu state and apply all presentation and accessibility
    /// side effects of the new state.
    fn toggle<D: Document>(&mut self, doc: &mut D) {
        self.state = match self.state {
            MenuState::Closed => MenuState::Open,
            MenuState::Open => MenuState::Closed,
        };
        let open = self.state == MenuState::Open;

        for node in [self.trigger, self.menu, self.overlay].into_iter().flatten() {
            if open {
                doc.add_class(node, OPEN_CLASS);
            } else {
                doc.remove_class(node, OPEN_CLASS);
            }
        }

        doc.lock_scroll(open);
        if let Some(trigger) = self.trigger {
            doc.set_attr(trigger, "aria-expanded", if open { "true" } else { "false" });
        }
        if let Some(menu) = self.menu {
            doc.set_attr(menu, "aria-hidden", if open { "false" } else { "true" });
        }
    }
}

impl<D: Document> Behavior<D> for MenuController {
    fn attach(&mut self, doc: &mut D) {
        self.trigger = doc.first_by_class("hamburger");
        self.menu = doc.nav_menu();
        self.nav_links = doc.nav_menu_links();
        self.overlay = Some(doc.create_element("overlay"));
        self.breakpoint.prime(doc.viewport_width());

        if let Some(trigger) = self.trigger {
            doc.set_attr(trigger, "aria-controls", "mobile-menu");
            doc.set_attr(trigger, "aria-expanded", "false");
            doc.set_attr(trigger, "aria-label", "Toggle navigation menu");
        }
        if let Some(menu) = self.menu {
            doc.set_attr(menu, "id", "mobile-menu");
            doc.set_attr(menu, "aria-hidden", "true");
            doc.set_attr(menu, "aria-labelledby", "menu-button");
        }
    }

    fn handle(&mut self, doc: &mut D, event: &PageEvent) {
        match *event {
            PageEvent::Click { target } => {
                if Some(target) == self.trigger {
                    self.toggle(doc);
                } else if self.state == MenuState::Open
                    && (Some(target) == self.overlay || self.nav_links.contains(&target))
                {
                    // Overlay is only interactive while the menu is open;
                    // a link click while open closes it before navigating.
                    self.toggle(doc);
                }
            }
            PageEvent::KeyDown { key: Key::Escape } => {
                if self.state == MenuState::Open {
                    self.toggle(doc);
                }
            }
            PageEvent::Resize { width } => {
                if let Some(matches) = self.breakpoint.observe(width) {
                    // Crossing into desktop layout dismisses the open menu;
                    // crossing back to narrow never opens it.
                    if matches && self.state == MenuState::Open {
                        self.toggle(doc);
                    }
                }
            }
            _ => {}
        }
    }

    fn detach(&mut self, doc: &mut D) {
        if self.state == MenuState::Open {
            self.toggle(doc);
        }
        self.trigger = None;
        self.menu = None;
        self.overlay = None;
        self.nav_links.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::SyntheticPage;

    fn mobile_page() -> SyntheticPage {
        SyntheticPage::from_json(
            r##"{
                "viewport_width": 400,
                "elements": [
                    {"classes": ["hamburger"]},
                    {"nav_menu": true},
                    {"nav_link": true, "href": "#home"},
                    {"nav_link": true, "href": "#about"},
                    {"id": "home", "offset_top": 0, "height": 600},
                    {"id": "about", "offset_top": 600, "height": 400}
                ]
            }"##,
        )
        .unwrap()
    }

    fn attached_menu(page: &mut SyntheticPage) -> MenuController {
        let mut menu = MenuController::new(&NavConfig::default());
        menu.attach(page);
        menu
    }

    fn dispatch(menu: &mut MenuController, page: &mut SyntheticPage, events: Vec<PageEvent>) {
        for event in events {
            menu.handle(page, &event);
        }
    }

    #[test]
    fn attach_sets_initial_aria_state() {
        let mut page = mobile_page();
        let menu = attached_menu(&mut page);

        let trigger = menu.trigger().unwrap();
        assert_eq!(page.attr(trigger, "aria-controls").as_deref(), Some("mobile-menu"));
        assert_eq!(page.attr(trigger, "aria-expanded").as_deref(), Some("false"));
        assert_eq!(
            page.attr(trigger, "aria-label").as_deref(),
            Some("Toggle navigation menu")
        );

        let list = page.nav_menu().unwrap();
        assert_eq!(page.attr(list, "id").as_deref(), Some("mobile-menu"));
        assert_eq!(page.attr(list, "aria-hidden").as_deref(), Some("true"));
        assert_eq!(page.attr(list, "aria-labelledby").as_deref(), Some("menu-button"));
    }

    #[test]
    fn trigger_click_opens_with_all_side_effects() {
        let mut page = mobile_page();
        let mut menu = attached_menu(&mut page);
        let trigger = menu.trigger().unwrap();
        let overlay = menu.overlay().unwrap();
        let list = page.nav_menu().unwrap();

        let events = page.click(trigger);
        dispatch(&mut menu, &mut page, events);

        assert_eq!(menu.state(), MenuState::Open);
        assert!(page.has_class(trigger, "active"));
        assert!(page.has_class(list, "active"));
        assert!(page.has_class(overlay, "active"));
        assert!(page.scroll_locked());
        assert_eq!(page.attr(trigger, "aria-expanded").as_deref(), Some("true"));
        assert_eq!(page.attr(list, "aria-hidden").as_deref(), Some("false"));
    }

    #[test]
    fn open_then_close_restores_every_flag() {
        let mut page = mobile_page();
        let mut menu = attached_menu(&mut page);
        let trigger = menu.trigger().unwrap();
        let overlay = menu.overlay().unwrap();
        let list = page.nav_menu().unwrap();

        let events = page.click(trigger);
        dispatch(&mut menu, &mut page, events);
        let events = page.key(Key::Escape);
        dispatch(&mut menu, &mut page, events);

        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!page.has_class(trigger, "active"));
        assert!(!page.has_class(list, "active"));
        assert!(!page.has_class(overlay, "active"));
        assert!(!page.scroll_locked());
        assert_eq!(page.attr(trigger, "aria-expanded").as_deref(), Some("false"));
        assert_eq!(page.attr(list, "aria-hidden").as_deref(), Some("true"));
    }

    #[test]
    fn overlay_click_closes_only_while_open() {
        let mut page = mobile_page();
        let mut menu = attached_menu(&mut page);
        let trigger = menu.trigger().unwrap();
        let overlay = menu.overlay().unwrap();

        // Closed: overlay is not interactive.
        let events = page.click(overlay);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Closed);

        let events = page.click(trigger);
        dispatch(&mut menu, &mut page, events);
        let events = page.click(overlay);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn nav_link_click_closes_open_menu() {
        let mut page = mobile_page();
        let mut menu = attached_menu(&mut page);
        let trigger = menu.trigger().unwrap();
        let link = page.nav_menu_links()[0];

        // Clicking a link with the menu closed does nothing.
        let events = page.click(link);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Closed);

        let events = page.click(trigger);
        dispatch(&mut menu, &mut page, events);
        let events = page.click(link);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn escape_is_inert_while_closed() {
        let mut page = mobile_page();
        let mut menu = attached_menu(&mut page);
        let events = page.key(Key::Escape);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn crossing_to_desktop_closes_open_menu() {
        let mut page = mobile_page();
        let mut menu = attached_menu(&mut page);
        let trigger = menu.trigger().unwrap();

        let events = page.click(trigger);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Open);

        let events = page.resize(1024);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!page.scroll_locked());
    }

    #[test]
    fn crossing_back_to_narrow_never_opens() {
        let mut page = mobile_page();
        let mut menu = attached_menu(&mut page);

        let events = page.resize(1024);
        dispatch(&mut menu, &mut page, events);
        let events = page.resize(375);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn resize_ticks_on_same_side_do_not_retrigger() {
        let mut page = mobile_page();
        let mut menu = attached_menu(&mut page);
        let trigger = menu.trigger().unwrap();

        // Open at 400, then widen to 800 (crossing closes it), then reopen
        // at 900 — further desktop-side ticks must leave it open.
        let events = page.click(trigger);
        dispatch(&mut menu, &mut page, events);
        let events = page.resize(800);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Closed);

        let events = page.click(trigger);
        dispatch(&mut menu, &mut page, events);
        let events = page.resize(900);
        dispatch(&mut menu, &mut page, events);
        let events = page.resize(1200);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Open);
    }

    #[test]
    fn page_without_trigger_degrades_gracefully() {
        let mut page = SyntheticPage::from_json(
            r##"{
                "viewport_width": 400,
                "elements": [
                    {"nav_menu": true},
                    {"nav_link": true, "href": "#home"},
                    {"id": "home", "offset_top": 0, "height": 600}
                ]
            }"##,
        )
        .unwrap();
        let mut menu = MenuController::new(&NavConfig::default());
        menu.attach(&mut page);
        assert!(menu.trigger().is_none());

        // Clicks and keys are absorbed without panicking or opening.
        let link = page.nav_menu_links()[0];
        let events = page.click(link);
        dispatch(&mut menu, &mut page, events);
        let events = page.key(Key::Escape);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn page_without_menu_list_still_wires_trigger() {
        let mut page = SyntheticPage::from_json(
            r##"{
                "viewport_width": 400,
                "elements": [
                    {"classes": ["hamburger"]}
                ]
            }"##,
        )
        .unwrap();
        let mut menu = MenuController::new(&NavConfig::default());
        menu.attach(&mut page);

        let trigger = menu.trigger().unwrap();
        let events = page.click(trigger);
        dispatch(&mut menu, &mut page, events);
        assert_eq!(menu.state(), MenuState::Open);
        assert!(page.scroll_locked());
    }

    #[test]
    fn detach_while_open_restores_scroll() {
        let mut page = mobile_page();
        let mut menu = attached_menu(&mut page);
        let trigger = menu.trigger().unwrap();

        let events = page.click(trigger);
        dispatch(&mut menu, &mut page, events);
        assert!(page.scroll_locked());

        menu.detach(&mut page);
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!page.scroll_locked());
    }
}

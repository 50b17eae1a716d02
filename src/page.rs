//! Synthetic page: the concrete [`Document`] implementation.
//!
//! A page is described by a [`PageLayout`] (deserialized from JSON): a flat
//! list of elements with ids, classes, hrefs and geometry, plus the initial
//! viewport width. [`SyntheticPage`] implements the document surface over
//! that description and exposes a gesture API producing [`PageEvent`]s for
//! the host loop, standing in for the browser's own event dispatch.

use serde::Deserialize;

use crate::dom::{Document, Key, NodeId, PageEvent, TimerId};

// ---------------------------------------------------------------------------
// Layout description
// ---------------------------------------------------------------------------

/// One element in a page layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElementSpec {
    /// Element id, the anchor target namespace.
    pub id: Option<String>,
    /// Class list.
    pub classes: Vec<String>,
    /// Link destination, for anchors.
    pub href: Option<String>,
    /// Vertical offset of the top edge from the document top.
    pub offset_top: i64,
    /// Rendered height.
    pub height: i64,
    /// Marks the navigation menu container (the list inside the nav landmark).
    pub nav_menu: bool,
    /// Marks a link inside the navigation menu.
    pub nav_link: bool,
}

/// A complete page description.
#[derive(Debug, Clone, Deserialize)]
pub struct PageLayout {
    /// Initial viewport width.
    pub viewport_width: u32,
    /// Elements in document order.
    pub elements: Vec<ElementSpec>,
}

// ---------------------------------------------------------------------------
// Snapshot views (CLI / TUI introspection)
// ---------------------------------------------------------------------------

/// Read-only view of a navigation link.
#[derive(Debug, Clone)]
pub struct LinkView {
    pub node: NodeId,
    pub href: Option<String>,
    pub active: bool,
}

/// Read-only view of an identified page section.
#[derive(Debug, Clone)]
pub struct SectionView {
    pub node: NodeId,
    pub id: String,
    pub offset_top: i64,
    pub height: i64,
}

// ---------------------------------------------------------------------------
// Synthetic page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Element {
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    href: Option<String>,
    offset_top: i64,
    height: i64,
    nav_menu: bool,
    nav_link: bool,
}

impl Element {
    fn from_spec(spec: ElementSpec) -> Self {
        Self {
            id: spec.id,
            classes: spec.classes,
            attrs: Vec::new(),
            href: spec.href,
            offset_top: spec.offset_top,
            height: spec.height,
            nav_menu: spec.nav_menu,
            nav_link: spec.nav_link,
        }
    }
}

/// Concrete [`Document`] over a [`PageLayout`].
///
/// Gesture methods (`scroll`, `click`, `key`, `resize`, `tick_frame`,
/// `advance_time`) return the events the browser would dispatch for that
/// gesture; the caller feeds them to the attached behaviors. Programmatic
/// effects triggered from inside a handler (an animated `scroll_to`) queue
/// follow-up events, drained via [`SyntheticPage::drain_events`].
#[derive(Debug)]
pub struct SyntheticPage {
    elements: Vec<Element>,
    viewport_width: u32,
    scroll_y: i64,
    scroll_locked: bool,
    fragment: Option<String>,
    focused: Option<NodeId>,
    frame_requested: bool,
    frame_request_count: usize,
    clock_ms: u64,
    next_timer: u64,
    timers: Vec<(TimerId, u64)>,
    effects: Vec<PageEvent>,
}

impl SyntheticPage {
    pub fn from_layout(layout: PageLayout) -> Self {
        Self {
            elements: layout.elements.into_iter().map(Element::from_spec).collect(),
            viewport_width: layout.viewport_width,
            scroll_y: 0,
            scroll_locked: false,
            fragment: None,
            focused: None,
            frame_requested: false,
            frame_request_count: 0,
            clock_ms: 0,
            next_timer: 0,
            timers: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Parse a JSON layout and build a page from it.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let layout: PageLayout = serde_json::from_str(json)?;
        Ok(Self::from_layout(layout))
    }

    // --- gestures ---

    /// User scroll to the given offset. Inert while background scrolling is
    /// suppressed (menu open).
    pub fn scroll(&mut self, y: i64) -> Vec<PageEvent> {
        if self.scroll_locked {
            return Vec::new();
        }
        self.scroll_y = y;
        vec![PageEvent::Scroll]
    }

    /// User activation of an element.
    pub fn click(&mut self, node: NodeId) -> Vec<PageEvent> {
        vec![PageEvent::Click { target: node }]
    }

    /// Key press.
    pub fn key(&mut self, key: Key) -> Vec<PageEvent> {
        vec![PageEvent::KeyDown { key }]
    }

    /// Viewport resize.
    pub fn resize(&mut self, width: u32) -> Vec<PageEvent> {
        self.viewport_width = width;
        vec![PageEvent::Resize { width }]
    }

    /// Deliver the next animation frame, if one was requested.
    ///
    /// Requests are coalesced: however many times `request_frame` was called
    /// since the last tick, at most one [`PageEvent::Frame`] is produced.
    pub fn tick_frame(&mut self) -> Vec<PageEvent> {
        if self.frame_requested {
            self.frame_requested = false;
            vec![PageEvent::Frame]
        } else {
            Vec::new()
        }
    }

    /// Advance the synthetic clock, firing timers that come due, in
    /// scheduling order.
    pub fn advance_time(&mut self, ms: u64) -> Vec<PageEvent> {
        self.clock_ms += ms;
        let now = self.clock_ms;
        let mut due: Vec<(TimerId, u64)> = Vec::new();
        self.timers.retain(|&(id, at)| {
            if at <= now {
                due.push((id, at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(id, at)| (at, id.0));
        due.into_iter()
            .map(|(id, _)| PageEvent::Timer { id })
            .collect()
    }

    /// Take the events queued by programmatic effects since the last drain.
    pub fn drain_events(&mut self) -> Vec<PageEvent> {
        std::mem::take(&mut self.effects)
    }

    // --- introspection ---

    /// All navigation menu links with their current active marker.
    pub fn link_views(&self) -> Vec<LinkView> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.nav_link)
            .map(|(node, e)| LinkView {
                node,
                href: e.href.clone(),
                active: e.classes.iter().any(|c| c == "active-nav"),
            })
            .collect()
    }

    /// All identified content elements: the anchor-target sections. The menu
    /// container is excluded even once it has been given an id.
    pub fn section_views(&self) -> Vec<SectionView> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.id.is_some() && e.href.is_none() && !e.nav_menu)
            .map(|(node, e)| SectionView {
                node,
                id: e.id.clone().unwrap_or_default(),
                offset_top: e.offset_top,
                height: e.height,
            })
            .collect()
    }

    /// Reflow: move/resize an element, as dynamic content or a viewport
    /// change would.
    pub fn set_geometry(&mut self, node: NodeId, offset_top: i64, height: i64) {
        if let Some(e) = self.elements.get_mut(node) {
            e.offset_top = offset_top;
            e.height = height;
        }
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Number of animation-frame requests made so far (coalescing checks).
    pub fn frame_request_count(&self) -> usize {
        self.frame_request_count
    }
}

impl Document for SyntheticPage {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements
            .iter()
            .position(|e| e.id.as_deref() == Some(id))
    }

    fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.elements
            .iter()
            .position(|e| e.classes.iter().any(|c| c == class))
    }

    fn nav_menu(&self) -> Option<NodeId> {
        self.elements.iter().position(|e| e.nav_menu)
    }

    fn nav_menu_links(&self) -> Vec<NodeId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.nav_link)
            .map(|(i, _)| i)
            .collect()
    }

    fn anchor_links(&self) -> Vec<NodeId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.href.is_some())
            .map(|(i, _)| i)
            .collect()
    }

    fn href(&self, node: NodeId) -> Option<String> {
        self.elements.get(node).and_then(|e| e.href.clone())
    }

    fn create_element(&mut self, class: &str) -> NodeId {
        self.elements.push(Element {
            id: None,
            classes: vec![class.to_owned()],
            attrs: Vec::new(),
            href: None,
            offset_top: 0,
            height: 0,
            nav_menu: false,
            nav_link: false,
        });
        self.elements.len() - 1
    }

    fn offset_top(&self, node: NodeId) -> i64 {
        self.elements.get(node).map_or(0, |e| e.offset_top)
    }

    fn client_height(&self, node: NodeId) -> i64 {
        self.elements.get(node).map_or(0, |e| e.height)
    }

    fn scroll_y(&self) -> i64 {
        self.scroll_y
    }

    fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.elements.get_mut(node) {
            if !e.classes.iter().any(|c| c == class) {
                e.classes.push(class.to_owned());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.elements.get_mut(node) {
            e.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.elements
            .get(node)
            .map_or(false, |e| e.classes.iter().any(|c| c == class))
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(e) = self.elements.get_mut(node) else {
            return;
        };
        // Assigning the id attribute must keep id lookup coherent.
        if name == "id" {
            e.id = Some(value.to_owned());
            return;
        }
        if let Some(pair) = e.attrs.iter_mut().find(|(n, _)| n == name) {
            pair.1 = value.to_owned();
        } else {
            e.attrs.push((name.to_owned(), value.to_owned()));
        }
    }

    fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(e) = self.elements.get_mut(node) {
            if name == "id" {
                e.id = None;
            } else {
                e.attrs.retain(|(n, _)| n != name);
            }
        }
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        let e = self.elements.get(node)?;
        if name == "id" {
            return e.id.clone();
        }
        e.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn scroll_to(&mut self, y: i64) {
        // Programmatic scrolling works even while user scrolling is locked,
        // and fires scroll events like the browser's animated scroll does.
        self.scroll_y = y;
        self.effects.push(PageEvent::Scroll);
    }

    fn lock_scroll(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }

    fn replace_fragment(&mut self, fragment: &str) {
        self.fragment = Some(fragment.to_owned());
    }

    fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
        self.frame_request_count += 1;
    }

    fn set_timer(&mut self, after_ms: u64) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.push((id, self.clock_ms + after_ms));
        id
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout() -> PageLayout {
        serde_json::from_str(
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

    #[test]
    fn layout_round_trips_into_lookup() {
        let page = SyntheticPage::from_layout(sample_layout());
        assert!(page.first_by_class("hamburger").is_some());
        assert!(page.nav_menu().is_some());
        assert_eq!(page.nav_menu_links().len(), 2);
        assert_eq!(page.element_by_id("about"), Some(5));
        assert_eq!(page.element_by_id("missing"), None);
    }

    #[test]
    fn fragment_hrefs_survive_json_loading_verbatim() {
        let page = SyntheticPage::from_json(
            r##"{
                "viewport_width": 400,
                "elements": [
                    {"nav_link": true, "href": "#top"},
                    {"nav_link": true, "href": "#"},
                    {"id": "top", "offset_top": 0, "height": 100}
                ]
            }"##,
        )
        .unwrap();
        assert_eq!(page.href(0).as_deref(), Some("#top"));
        assert_eq!(page.href(1).as_deref(), Some("#"));
    }

    #[test]
    fn anchor_links_follow_traversal_order() {
        let page = SyntheticPage::from_layout(sample_layout());
        let anchors = page.anchor_links();
        assert_eq!(anchors, vec![2, 3]);
        assert_eq!(page.href(2).as_deref(), Some("#home"));
    }

    #[test]
    fn set_attr_id_updates_lookup() {
        let mut page = SyntheticPage::from_layout(sample_layout());
        let menu = page.nav_menu().unwrap();
        page.set_attr(menu, "id", "mobile-menu");
        assert_eq!(page.element_by_id("mobile-menu"), Some(menu));
        assert_eq!(page.attr(menu, "id").as_deref(), Some("mobile-menu"));
    }

    #[test]
    fn classes_toggle_without_duplicates() {
        let mut page = SyntheticPage::from_layout(sample_layout());
        let trigger = page.first_by_class("hamburger").unwrap();
        page.add_class(trigger, "active");
        page.add_class(trigger, "active");
        assert!(page.has_class(trigger, "active"));
        page.remove_class(trigger, "active");
        assert!(!page.has_class(trigger, "active"));
    }

    #[test]
    fn scroll_gesture_blocked_while_locked() {
        let mut page = SyntheticPage::from_layout(sample_layout());
        page.lock_scroll(true);
        assert!(page.scroll(300).is_empty());
        assert_eq!(page.scroll_y(), 0);

        page.lock_scroll(false);
        assert_eq!(page.scroll(300), vec![PageEvent::Scroll]);
        assert_eq!(page.scroll_y(), 300);
    }

    #[test]
    fn programmatic_scroll_fires_scroll_event_even_when_locked() {
        let mut page = SyntheticPage::from_layout(sample_layout());
        page.lock_scroll(true);
        page.scroll_to(430);
        assert_eq!(page.scroll_y(), 430);
        assert_eq!(page.drain_events(), vec![PageEvent::Scroll]);
        assert!(page.drain_events().is_empty());
    }

    #[test]
    fn frame_requests_coalesce_to_one_tick() {
        let mut page = SyntheticPage::from_layout(sample_layout());
        assert!(page.tick_frame().is_empty());

        page.request_frame();
        page.request_frame();
        page.request_frame();
        assert_eq!(page.frame_request_count(), 3);

        assert_eq!(page.tick_frame(), vec![PageEvent::Frame]);
        assert!(page.tick_frame().is_empty());
    }

    #[test]
    fn timers_fire_once_in_schedule_order() {
        let mut page = SyntheticPage::from_layout(sample_layout());
        let early = page.set_timer(100);
        let late = page.set_timer(500);

        assert!(page.advance_time(50).is_empty());
        assert_eq!(page.advance_time(100), vec![PageEvent::Timer { id: early }]);
        assert_eq!(page.advance_time(400), vec![PageEvent::Timer { id: late }]);
        assert!(page.advance_time(1000).is_empty());
    }

    #[test]
    fn created_overlay_is_queryable() {
        let mut page = SyntheticPage::from_layout(sample_layout());
        let overlay = page.create_element("overlay");
        assert_eq!(page.first_by_class("overlay"), Some(overlay));
    }

    #[test]
    fn section_views_exclude_links() {
        let page = SyntheticPage::from_layout(sample_layout());
        let sections = page.section_views();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].id, "home");
        assert_eq!(sections[1].offset_top, 600);
    }
}

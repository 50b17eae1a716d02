//! Document abstraction and event model.
//!
//! The browser is replaced by the [`Document`] trait: element lookup, live
//! geometry queries, class/attribute mutation, and scheduling. Behaviors
//! (scroll spy, menu controller, smooth scroller) are written against this
//! trait so they can run headlessly against synthetic geometry.
//!
//! Events are delivered by a host loop, one at a time; every handler runs to
//! completion before the next event is processed. The only asynchronous
//! boundaries are the deferred animation-frame callback and one-shot timers,
//! both requested through the document.

/// Opaque handle to an element in a document.
pub type NodeId = usize;

/// Handle for a scheduled one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Key identity for keyboard events.
///
/// Only the cancel key matters to any behavior; everything else collapses
/// into [`Key::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// An event delivered to attached behaviors by the host loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The page's vertical scroll offset changed.
    Scroll,
    /// An element was activated (click or keyboard activation).
    Click { target: NodeId },
    /// A key was pressed.
    KeyDown { key: Key },
    /// The viewport was resized to the given width.
    Resize { width: u32 },
    /// A previously requested animation frame fired.
    Frame,
    /// A previously scheduled timer fired.
    Timer { id: TimerId },
}

/// The document surface behaviors are wired against.
///
/// Geometry accessors read live layout values at call time; callers must not
/// cache offsets or heights across events, since the page can reflow.
pub trait Document {
    // --- lookup ---

    /// Look up an element by its id attribute.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// First element carrying the given class, in document order.
    fn first_by_class(&self, class: &str) -> Option<NodeId>;

    /// The navigation menu container (the list inside the nav landmark).
    fn nav_menu(&self) -> Option<NodeId>;

    /// All links inside the navigation menu, in traversal order.
    fn nav_menu_links(&self) -> Vec<NodeId>;

    /// All anchor elements with an href, in traversal order.
    fn anchor_links(&self) -> Vec<NodeId>;

    /// The href attribute of a link, if present.
    fn href(&self, node: NodeId) -> Option<String>;

    /// Create a new element with the given class, appended to the body.
    fn create_element(&mut self, class: &str) -> NodeId;

    // --- geometry (live, never cached) ---

    /// Vertical offset of the element's top edge from the document top.
    fn offset_top(&self, node: NodeId) -> i64;

    /// Rendered height of the element.
    fn client_height(&self, node: NodeId) -> i64;

    /// Current vertical scroll offset of the page.
    fn scroll_y(&self) -> i64;

    /// Current viewport width.
    fn viewport_width(&self) -> u32;

    // --- class and attribute mutation ---

    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attr(&mut self, node: NodeId, name: &str);
    fn attr(&self, node: NodeId, name: &str) -> Option<String>;

    // --- page-level effects ---

    /// Scroll the page to the given vertical offset (animated in a real
    /// browser; instantaneous here, but scroll events still fire).
    fn scroll_to(&mut self, y: i64);

    /// Suppress or restore background scrolling (the `overflow: hidden`
    /// effect while the mobile menu is open).
    fn lock_scroll(&mut self, locked: bool);

    /// Update the visible URL fragment without causing a navigation jump.
    fn replace_fragment(&mut self, fragment: &str);

    /// Move keyboard focus to the element.
    fn focus(&mut self, node: NodeId);

    // --- scheduling ---

    /// Request an animation-frame callback. Requests are coalesced: at most
    /// one [`PageEvent::Frame`] is delivered per request, on the next tick.
    fn request_frame(&mut self);

    /// Schedule a one-shot timer; a [`PageEvent::Timer`] with the returned
    /// id fires once the delay elapses.
    fn set_timer(&mut self, after_ms: u64) -> TimerId;
}

/// Lifecycle of a page behavior.
///
/// `attach` wires the behavior to the document (resolving its element hooks
/// and setting initial state), `handle` reacts to one event, and `detach`
/// undoes any persistent markers so the behavior can be dropped cleanly.
pub trait Behavior<D: Document> {
    fn attach(&mut self, doc: &mut D);
    fn handle(&mut self, doc: &mut D, event: &PageEvent);
    fn detach(&mut self, doc: &mut D);
}

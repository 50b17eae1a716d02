//! Smooth scroller for in-page anchor links.
//!
//! Intercepts activation of anchors whose href references an in-page id,
//! scrolls to the target minus the fixed header clearance, updates the
//! visible fragment, and moves keyboard focus to the target. The target is
//! made temporarily focusable and a one-shot timer drops that focusability
//! again so the element does not linger in the tab order.

use crate::config::NavConfig;
use crate::dom::{Behavior, Document, NodeId, PageEvent, TimerId};

/// Scrolls to anchor targets and manages focus on arrival.
#[derive(Debug)]
pub struct SmoothScroller {
    header_offset: i64,
    focus_reset_ms: u64,
    /// Anchor link node and its target fragment, without the leading `#`.
    anchors: Vec<(NodeId, String)>,
    /// The pending focusability-reset timer and the element it was armed
    /// for. A timer only acts if it is still the one recorded here.
    focus_reset: Option<(TimerId, NodeId)>,
}

impl SmoothScroller {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            header_offset: config.header_offset,
            focus_reset_ms: config.focus_reset_ms,
            anchors: Vec::new(),
            focus_reset: None,
        }
    }

    /// Scroll destination for a target element under the configured header
    /// clearance.
    fn destination<D: Document>(&self, doc: &D, target: NodeId) -> i64 {
        doc.offset_top(target) - self.header_offset
    }

    fn activate<D: Document>(&mut self, doc: &mut D, fragment: &str) {
        // Unknown target id: the activation is a no-op, not an error.
        let Some(target) = doc.element_by_id(fragment) else {
            return;
        };

        doc.scroll_to(self.destination(doc, target));
        doc.replace_fragment(fragment);

        // A superseded reset would leave the previous target focusable
        // forever; drop its tabindex now and ignore its timer when it fires.
        if let Some((_, stale)) = self.focus_reset.take() {
            doc.remove_attr(stale, "tabindex");
        }

        doc.set_attr(target, "tabindex", "-1");
        doc.focus(target);
        let timer = doc.set_timer(self.focus_reset_ms);
        self.focus_reset = Some((timer, target));
    }
}

impl<D: Document> Behavior<D> for SmoothScroller {
    fn attach(&mut self, doc: &mut D) {
        self.anchors.clear();
        for link in doc.anchor_links() {
            let Some(href) = doc.href(link) else { continue };
            let Some(fragment) = href.strip_prefix('#') else { continue };
            if fragment.is_empty() {
                continue;
            }
            self.anchors.push((link, fragment.to_owned()));
        }
    }

    fn handle(&mut self, doc: &mut D, event: &PageEvent) {
        match *event {
            PageEvent::Click { target } => {
                let fragment = self
                    .anchors
                    .iter()
                    .find(|(node, _)| *node == target)
                    .map(|(_, f)| f.clone());
                if let Some(fragment) = fragment {
                    self.activate(doc, &fragment);
                }
            }
            PageEvent::Timer { id } => {
                if let Some((armed, target)) = self.focus_reset {
                    if armed == id {
                        self.focus_reset = None;
                        if doc.attr(target, "tabindex").as_deref() == Some("-1") {
                            doc.remove_attr(target, "tabindex");
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn detach(&mut self, doc: &mut D) {
        if let Some((_, target)) = self.focus_reset.take() {
            doc.remove_attr(target, "tabindex");
        }
        self.anchors.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

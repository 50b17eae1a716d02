//! Scroll spy: maps the current scroll offset to the active navigation link.
//!
//! Bindings from section ids to nav links are built once at attach time;
//! geometry is read live on every evaluation so reflows are picked up.
//! Scroll events are coalesced to at most one evaluation per animation
//! frame via a single in-flight token.

use crate::config::NavConfig;
use crate::dom::{Behavior, Document, NodeId, PageEvent};

/// Class marking the nav link of the currently visible section.
pub const ACTIVE_CLASS: &str = "active-nav";

/// Association of a section to the nav link whose fragment matches its id.
#[derive(Debug, Clone)]
struct SectionBinding {
    /// The href fragment, without the leading `#`.
    id: String,
    section: NodeId,
    link: NodeId,
}

/// Highlights the nav link for the section under the current scroll offset.
#[derive(Debug)]
pub struct ScrollSpy {
    offset: i64,
    bindings: Vec<SectionBinding>,
    links: Vec<NodeId>,
    /// Set while an evaluation is pending for the next frame; further
    /// scroll events are dropped, not queued.
    ticking: bool,
}

impl ScrollSpy {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            offset: config.spy_offset,
            bindings: Vec::new(),
            links: Vec::new(),
            ticking: false,
        }
    }

    /// Bindings currently held, as `(section id, link)` pairs. Used by the
    /// CLI inspector.
    pub fn bindings(&self) -> Vec<(String, NodeId)> {
        self.bindings
            .iter()
            .map(|b| (b.id.clone(), b.link))
            .collect()
    }

    /// Build the binding list from the nav links, in traversal order.
    ///
    /// Links whose href is missing, does not start with `#`, has an empty
    /// fragment, or points at a nonexistent id are skipped without error.
    fn collect_bindings<D: Document>(&mut self, doc: &D) {
        self.links = doc.nav_menu_links();
        self.bindings.clear();
        for &link in &self.links {
            let Some(href) = doc.href(link) else { continue };
            let Some(id) = href.strip_prefix('#') else { continue };
            if id.is_empty() {
                continue;
            }
            let Some(section) = doc.element_by_id(id) else { continue };
            self.bindings.push(SectionBinding {
                id: id.to_owned(),
                section,
                link,
            });
        }
    }

    /// Recompute the current section and move the active marker.
    ///
    /// Bindings are scanned in list order and the last one containing the
    /// scroll offset wins, so overlapping or abutting sections resolve
    /// deterministically. When nothing matches, every marker is cleared.
    fn evaluate<D: Document>(&self, doc: &mut D) {
        let y = doc.scroll_y();
        let mut current = "";
        for binding in &self.bindings {
            let top = doc.offset_top(binding.section) - self.offset;
            let height = doc.client_height(binding.section);
            if y >= top && y < top + height {
                current = &binding.id;
            }
        }

        let target = format!("#{current}");
        for &link in &self.links {
            doc.remove_class(link, ACTIVE_CLASS);
            if !current.is_empty() && doc.href(link).as_deref() == Some(target.as_str()) {
                doc.add_class(link, ACTIVE_CLASS);
            }
        }
    }
}

impl<D: Document> Behavior<D> for ScrollSpy {
    fn attach(&mut self, doc: &mut D) {
        self.collect_bindings(doc);
        // Initial evaluation so the correct link is highlighted on load.
        self.evaluate(doc);
    }

    fn handle(&mut self, doc: &mut D, event: &PageEvent) {
        match event {
            PageEvent::Scroll => {
                if !self.ticking {
                    self.ticking = true;
                    doc.request_frame();
                }
            }
            PageEvent::Frame => {
                if self.ticking {
                    self.ticking = false;
                    self.evaluate(doc);
                }
            }
            _ => {}
        }
    }

    fn detach(&mut self, doc: &mut D) {
        for &link in &self.links {
            doc.remove_class(link, ACTIVE_CLASS);
        }
        self.links.clear();
        self.bindings.clear();
        self.ticking = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Headless page-navigation behaviors.
//!
//! Implements the interactive layer of a static content site — collapsible
//! mobile menu, smooth in-page anchor scrolling, and scroll-spy highlighting
//! of the current section's nav link — against an injectable [`dom::Document`]
//! abstraction, so the logic runs and tests without a browser.

pub mod behavior;
pub mod config;
pub mod dom;
pub mod menu;
pub mod page;
pub mod scroll;
pub mod spy;

pub use behavior::Behaviors;
pub use config::NavConfig;
pub use dom::{Behavior, Document, Key, NodeId, PageEvent, TimerId};
pub use menu::{MenuController, MenuState};
pub use page::{PageLayout, SyntheticPage};
pub use scroll::SmoothScroller;
pub use spy::ScrollSpy;

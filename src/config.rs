//! Behavior tunables.
//!
//! The constants the page contract exposes (header clearance, scroll-spy
//! trigger offset, desktop breakpoint) live here instead of being scattered
//! through the components, and can be overridden from a JSON file.

use serde::Deserialize;

/// Tunable constants shared by the navigation behaviors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Clearance subtracted from a smooth-scroll target so the fixed header
    /// does not cover it.
    pub header_offset: i64,
    /// Offset subtracted from a section's top when deciding which section is
    /// current during scroll-spy evaluation.
    pub spy_offset: i64,
    /// Viewport widths at or above this are desktop layout; crossing this
    /// boundary while the mobile menu is open closes it.
    pub desktop_breakpoint: u32,
    /// Delay before a smooth-scroll target's temporary focusability is
    /// removed, so it does not pollute the tab order afterwards.
    pub focus_reset_ms: u64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            header_offset: 70,
            spy_offset: 100,
            desktop_breakpoint: 769,
            focus_reset_ms: 1000,
        }
    }
}

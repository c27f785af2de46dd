//! Active-section resolution for navigation highlighting.

use crate::page::{PageView, SectionBounds};

/// Scroll position tested against section spans.
#[must_use]
pub fn scroll_cursor(scroll_offset: f64, look_ahead_px: f64) -> f64 {
    scroll_offset + look_ahead_px
}

/// The last section, in document order, whose span contains `cursor`.
///
/// Overlapping and zero-height sections resolve purely by order: the later
/// match wins even when an earlier one is closer.
#[must_use]
pub fn resolve_active_section(cursor: f64, sections: &[SectionBounds]) -> Option<&SectionBounds> {
    sections.iter().rev().find(|s| s.contains(cursor))
}

/// Whether a navigation item linking to `href` belongs to `section_id`.
#[must_use]
pub fn nav_item_matches(href: Option<&str>, section_id: &str) -> bool {
    href.is_some_and(|h| h.contains(section_id))
}

/// Clear the marker on every navigation item, then set it on the items that
/// link to `active`. Returns how many items were marked.
pub fn apply_active_section<P: PageView + ?Sized>(page: &P, active: Option<&str>) -> usize {
    let mut marked = 0;
    for item in page.nav_items() {
        page.set_active(&item, false);
        if let Some(id) = active {
            if nav_item_matches(page.nav_href(&item).as_deref(), id) {
                page.set_active(&item, true);
                marked += 1;
            }
        }
    }
    marked
}

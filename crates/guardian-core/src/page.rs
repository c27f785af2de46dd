//! Document abstraction.
//!
//! [`PageView`] is the narrow slice of the DOM the runtime reads and writes.
//! The browser shell implements it over `web_sys`; [`MemoryPage`] is an
//! in-memory page for tests.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

/// Vertical span `[top, top + height)` of a page section with an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionBounds {
    /// Element id.
    pub id: String,
    /// Offset from the top of the document.
    pub top: f64,
    /// Rendered height.
    pub height: f64,
}

impl SectionBounds {
    /// Create section bounds.
    #[must_use]
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    /// Whether `y` falls inside the half-open span.
    #[must_use]
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

/// The parts of a document the runtime touches.
pub trait PageView {
    /// Handle to an element.
    type Node: Clone + 'static;

    /// Vertical scroll offset of the viewport.
    fn scroll_offset(&self) -> f64;

    /// Sections with an identifier, in document order.
    fn sections(&self) -> Vec<SectionBounds>;

    /// Navigation items, in document order.
    fn nav_items(&self) -> Vec<Self::Node>;

    /// Link target of a navigation item.
    fn nav_href(&self, item: &Self::Node) -> Option<String>;

    /// Add or remove the "active" marker on a navigation item.
    fn set_active(&self, item: &Self::Node, active: bool);

    /// Statistic value elements currently in the document.
    fn stat_values(&self) -> Vec<Self::Node>;

    /// Displayed text of an element.
    fn text(&self, node: &Self::Node) -> String;

    /// Replace the displayed text of an element.
    fn set_text(&self, node: &Self::Node, text: &str);

    /// Alert cards currently rendered.
    fn alert_cards(&self) -> Vec<Self::Node>;

    /// Apply or revert the pulse emphasis on an alert card.
    fn set_emphasis(&self, card: &Self::Node, emphasized: bool);
}

// =============================================================================
// MemoryPage
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Nav,
    Stat,
    AlertCard,
}

#[derive(Debug, Clone)]
struct MemoryNode {
    role: Role,
    href: Option<String>,
    text: String,
    active: bool,
    emphasized: bool,
    writes: Vec<String>,
    emphasis_changes: usize,
}

impl MemoryNode {
    fn new(role: Role) -> Self {
        Self {
            role,
            href: None,
            text: String::new(),
            active: false,
            emphasized: false,
            writes: Vec::new(),
            emphasis_changes: 0,
        }
    }
}

/// In-memory page. Nodes are indices returned by the `add_*` methods.
#[derive(Debug, Default)]
pub struct MemoryPage {
    scroll: Cell<f64>,
    sections: RefCell<Vec<SectionBounds>>,
    nodes: RefCell<Vec<MemoryNode>>,
}

impl MemoryPage {
    /// Create an empty page scrolled to the top.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section.
    pub fn add_section(&self, id: &str, top: f64, height: f64) {
        self.sections
            .borrow_mut()
            .push(SectionBounds::new(id, top, height));
    }

    /// Remove every section with `id`.
    pub fn remove_section(&self, id: &str) {
        self.sections.borrow_mut().retain(|s| s.id != id);
    }

    /// Append a navigation item linking to `href`.
    pub fn add_nav_item(&self, href: Option<&str>) -> usize {
        let mut node = MemoryNode::new(Role::Nav);
        node.href = href.map(str::to_string);
        self.push(node)
    }

    /// Append a statistic element showing `text`.
    pub fn add_stat(&self, text: &str) -> usize {
        let mut node = MemoryNode::new(Role::Stat);
        node.text = text.to_string();
        self.push(node)
    }

    /// Append an alert card.
    pub fn add_alert_card(&self) -> usize {
        self.push(MemoryNode::new(Role::AlertCard))
    }

    /// Scroll the viewport.
    pub fn scroll_to(&self, offset: f64) {
        self.scroll.set(offset);
    }

    /// Whether a node carries the "active" marker.
    #[must_use]
    pub fn is_active(&self, node: usize) -> bool {
        self.nodes.borrow().get(node).is_some_and(|n| n.active)
    }

    /// Navigation items carrying the "active" marker.
    #[must_use]
    pub fn active_items(&self) -> Vec<usize> {
        self.indices(Role::Nav, |n| n.active)
    }

    /// Current text of a node.
    #[must_use]
    pub fn text_of(&self, node: usize) -> String {
        self.nodes
            .borrow()
            .get(node)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    /// Every text written to a node, oldest first.
    #[must_use]
    pub fn writes(&self, node: usize) -> Vec<String> {
        self.nodes
            .borrow()
            .get(node)
            .map(|n| n.writes.clone())
            .unwrap_or_default()
    }

    /// Whether an alert card is currently emphasized.
    #[must_use]
    pub fn is_emphasized(&self, node: usize) -> bool {
        self.nodes.borrow().get(node).is_some_and(|n| n.emphasized)
    }

    /// Number of times a card's emphasis was set or reverted.
    #[must_use]
    pub fn emphasis_changes(&self, node: usize) -> usize {
        self.nodes
            .borrow()
            .get(node)
            .map_or(0, |n| n.emphasis_changes)
    }

    fn push(&self, node: MemoryNode) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(node);
        nodes.len() - 1
    }

    fn indices(&self, role: Role, pred: impl Fn(&MemoryNode) -> bool) -> Vec<usize> {
        self.nodes
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.role == role && pred(n))
            .map(|(i, _)| i)
            .collect()
    }
}

impl PageView for MemoryPage {
    type Node = usize;

    fn scroll_offset(&self) -> f64 {
        self.scroll.get()
    }

    fn sections(&self) -> Vec<SectionBounds> {
        self.sections
            .borrow()
            .iter()
            .filter(|s| !s.id.is_empty())
            .cloned()
            .collect()
    }

    fn nav_items(&self) -> Vec<usize> {
        self.indices(Role::Nav, |_| true)
    }

    fn nav_href(&self, item: &usize) -> Option<String> {
        self.nodes.borrow().get(*item).and_then(|n| n.href.clone())
    }

    fn set_active(&self, item: &usize, active: bool) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(*item) {
            node.active = active;
        }
    }

    fn stat_values(&self) -> Vec<usize> {
        self.indices(Role::Stat, |_| true)
    }

    fn text(&self, node: &usize) -> String {
        self.text_of(*node)
    }

    fn set_text(&self, node: &usize, text: &str) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(*node) {
            node.text = text.to_string();
            node.writes.push(text.to_string());
        }
    }

    fn alert_cards(&self) -> Vec<usize> {
        self.indices(Role::AlertCard, |_| true)
    }

    fn set_emphasis(&self, card: &usize, emphasized: bool) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(*card) {
            node.emphasized = emphasized;
            node.emphasis_changes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_contains_is_half_open() {
        let s = SectionBounds::new("a", 100.0, 50.0);
        assert!(!s.contains(99.9));
        assert!(s.contains(100.0));
        assert!(s.contains(149.9));
        assert!(!s.contains(150.0));
    }

    #[test]
    fn test_zero_height_section_contains_nothing() {
        let s = SectionBounds::new("empty", 10.0, 0.0);
        assert!(!s.contains(10.0));
    }

    #[test]
    fn test_memory_page_roles() {
        let page = MemoryPage::new();
        let nav = page.add_nav_item(Some("#home"));
        let stat = page.add_stat("1,000");
        let card = page.add_alert_card();

        assert_eq!(page.nav_items(), vec![nav]);
        assert_eq!(page.stat_values(), vec![stat]);
        assert_eq!(page.alert_cards(), vec![card]);
        assert_eq!(page.nav_href(&nav), Some("#home".to_string()));
        assert_eq!(page.text(&stat), "1,000");
    }

    #[test]
    fn test_memory_page_sections_skip_empty_ids() {
        let page = MemoryPage::new();
        page.add_section("", 0.0, 100.0);
        page.add_section("alerts", 100.0, 100.0);
        let sections = page.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, "alerts");
    }

    #[test]
    fn test_memory_page_records_writes() {
        let page = MemoryPage::new();
        let stat = page.add_stat("1");
        page.set_text(&stat, "2");
        page.set_text(&stat, "3");
        assert_eq!(page.writes(stat), vec!["2", "3"]);
        assert_eq!(page.text_of(stat), "3");
    }

    #[test]
    fn test_memory_page_unknown_node_is_inert() {
        let page = MemoryPage::new();
        page.set_text(&99, "x");
        page.set_active(&99, true);
        assert!(!page.is_active(99));
        assert_eq!(page.text_of(99), "");
    }
}

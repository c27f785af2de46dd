//! [`PageView`] over the live document.

use guardian_core::{AlertCardInfo, GuardianError, PageEvent, PageView, SectionBounds};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, NodeList, Window};

/// Selector of sections that take part in nav highlighting.
pub const SECTION_SELECTOR: &str = "section[id]";
/// Selector of navigation items.
pub const NAV_ITEM_SELECTOR: &str = ".nav-item";
/// Selector of live statistic values.
pub const STAT_SELECTOR: &str = ".stats-value";
/// Selector of alert cards.
pub const ALERT_CARD_SELECTOR: &str = ".alert-card";

/// Id of the collapsible navigation menu.
pub const NAV_MENU_ID: &str = "nav-menu";
/// Id of the button that opens the menu on small screens.
pub const MOBILE_TOGGLE_ID: &str = "mobile-toggle";

/// Transform applied to a pulsed alert card.
const PULSE_TRANSFORM: &str = "scale(1.02)";
const REST_TRANSFORM: &str = "scale(1)";

/// The document, seen through [`PageView`].
#[derive(Debug, Clone)]
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    /// Page over the window's document.
    pub fn new(window: Window) -> Result<Self, GuardianError> {
        let document = window
            .document()
            .ok_or_else(|| GuardianError::MissingElement("document".to_string()))?;
        Ok(Self { window, document })
    }

    /// The window.
    #[must_use]
    pub const fn window(&self) -> &Window {
        &self.window
    }

    /// The document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// All elements matching `selector`; an invalid selector matches nothing.
    #[must_use]
    pub fn query_all(&self, selector: &str) -> Vec<Element> {
        self.document
            .query_selector_all(selector)
            .map(|list| elements(&list))
            .unwrap_or_default()
    }

    /// First element matching `selector`.
    #[must_use]
    pub fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    /// Offset of the element matching `selector` from the top of the document.
    #[must_use]
    pub fn offset_top_of(&self, selector: &str) -> Option<f64> {
        self.query(selector).map(|el| offset_top(&el))
    }

    /// Offset of the element an in-page anchor points at.
    #[must_use]
    pub fn anchor_target_top(&self, anchor: &Element) -> Option<f64> {
        anchor
            .get_attribute("href")
            .and_then(|href| self.offset_top_of(&href))
    }
}

/// A rejected browser call as a [`GuardianError::Host`].
#[must_use]
pub fn host_error(err: &JsValue) -> GuardianError {
    let message = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"));
    GuardianError::Host(message)
}

/// Open, close or toggle the mobile menu, swapping the toggle icon to match.
///
/// `None` toggles; `Some(open)` forces the state. Returns the new state, or
/// `None` when the page has no menu.
pub fn set_mobile_menu(document: &Document, open: Option<bool>) -> Option<bool> {
    let menu = document.get_element_by_id(NAV_MENU_ID)?;
    let classes = menu.class_list();
    let open = match open {
        Some(open) => classes.toggle_with_force("mobile-open", open),
        None => classes.toggle("mobile-open"),
    }
    .unwrap_or(false);
    let icon = document
        .get_element_by_id(MOBILE_TOGGLE_ID)
        .and_then(|toggle| toggle.query_selector("i").ok().flatten());
    if let Some(icon) = icon {
        let icons = icon.class_list();
        icons.toggle_with_force("fa-bars", !open).ok();
        icons.toggle_with_force("fa-times", open).ok();
    }
    Some(open)
}

/// Event for an action button, read from its enclosing alert card.
#[must_use]
pub fn alert_action_event(button: &Element) -> Option<PageEvent> {
    let card = button.closest(ALERT_CARD_SELECTOR).ok().flatten()?;
    Some(PageEvent::AlertAction {
        label: button.text_content().unwrap_or_default(),
        card: alert_card_info(&card),
    })
}

/// Elements of a node list, skipping non-element nodes.
#[must_use]
pub fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn offset_top(element: &Element) -> f64 {
    element
        .dyn_ref::<HtmlElement>()
        .map_or(0.0, |el| f64::from(el.offset_top()))
}

fn trimmed_text(element: &Element) -> String {
    element.text_content().unwrap_or_default().trim().to_string()
}

/// Read title, location, timeframe and metric from an alert card.
#[must_use]
pub fn alert_card_info(card: &Element) -> AlertCardInfo {
    let title = card
        .query_selector(".alert-title")
        .ok()
        .flatten()
        .map(|el| trimmed_text(&el))
        .unwrap_or_default();
    let infos: Vec<String> = card
        .query_selector_all(".alert-info")
        .map(|list| elements(&list).iter().map(trimmed_text).collect())
        .unwrap_or_default();
    AlertCardInfo {
        title,
        location: infos.first().cloned().unwrap_or_default(),
        timeframe: infos.get(1).cloned().unwrap_or_default(),
        metric: infos.get(2).cloned(),
    }
}

impl PageView for DomPage {
    type Node = Element;

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn sections(&self) -> Vec<SectionBounds> {
        self.query_all(SECTION_SELECTOR)
            .iter()
            .filter(|section| !section.id().is_empty())
            .map(|section| {
                SectionBounds::new(
                    section.id(),
                    offset_top(section),
                    f64::from(section.client_height()),
                )
            })
            .collect()
    }

    fn nav_items(&self) -> Vec<Element> {
        self.query_all(NAV_ITEM_SELECTOR)
    }

    fn nav_href(&self, item: &Element) -> Option<String> {
        item.get_attribute("href")
    }

    fn set_active(&self, item: &Element, active: bool) {
        item.class_list().toggle_with_force("active", active).ok();
    }

    fn stat_values(&self) -> Vec<Element> {
        self.query_all(STAT_SELECTOR)
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn alert_cards(&self) -> Vec<Element> {
        self.query_all(ALERT_CARD_SELECTOR)
    }

    fn set_emphasis(&self, card: &Element, emphasized: bool) {
        if let Some(card) = card.dyn_ref::<HtmlElement>() {
            let transform = if emphasized {
                PULSE_TRANSFORM
            } else {
                REST_TRANSFORM
            };
            card.style().set_property("transform", transform).ok();
        }
    }
}

//! Page event handler table.
//!
//! Every DOM event the page reacts to is a [`PageEvent`]. Handlers are pure
//! functions from an event to the [`Effect`]s it requests; the browser shell
//! executes the effects. The [`HandlerTable`] is built once and can be
//! inspected and exercised without a document.
//!
//! ```
//! use guardian_core::{Effect, GuardianConfig, PageController, PageEvent};
//!
//! let controller = PageController::new(GuardianConfig::default());
//! let effects = controller.dispatch(&PageEvent::AnchorClick { target_top: Some(500.0) });
//! assert_eq!(effects, vec![Effect::ScrollTo { top: 420.0 }]);
//! ```

use crate::alerts::{action_message, AlertAction, AlertCardInfo};
use crate::config::GuardianConfig;
use crate::emergency::{EmergencyEvent, ModalAction, CALL_SERVICES_MESSAGE, SHELTERS_MESSAGE};
use std::collections::BTreeMap;
use tracing::info;

/// Kinds of page events, one handler each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Window scrolled.
    Scroll,
    /// Mobile menu button clicked.
    MobileToggle,
    /// Navigation item clicked.
    NavItemClick,
    /// In-page anchor clicked.
    AnchorClick,
    /// Emergency button clicked.
    EmergencyClick,
    /// Click on the modal backdrop.
    ModalBackdropClick,
    /// Button inside the emergency modal clicked.
    ModalAction,
    /// Button on an alert card clicked.
    AlertAction,
}

impl EventKind {
    /// Every kind, in binding order.
    pub const ALL: [Self; 8] = [
        Self::Scroll,
        Self::MobileToggle,
        Self::NavItemClick,
        Self::AnchorClick,
        Self::EmergencyClick,
        Self::ModalBackdropClick,
        Self::ModalAction,
        Self::AlertAction,
    ];

    /// Stable name, `event:target`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scroll => "scroll:window",
            Self::MobileToggle => "click:mobile-toggle",
            Self::NavItemClick => "click:nav-item",
            Self::AnchorClick => "click:anchor",
            Self::EmergencyClick => "click:emergency",
            Self::ModalBackdropClick => "click:modal-backdrop",
            Self::ModalAction => "click:modal-action",
            Self::AlertAction => "click:alert-action",
        }
    }

    /// DOM event type.
    #[must_use]
    pub const fn dom_event(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            _ => "click",
        }
    }

    /// Selector of the elements the shell binds; `None` for the window.
    #[must_use]
    pub const fn selector(self) -> Option<&'static str> {
        match self {
            Self::Scroll => None,
            Self::MobileToggle => Some("#mobile-toggle"),
            Self::NavItemClick => Some(".nav-item"),
            Self::AnchorClick => Some("a[href^=\"#\"]"),
            Self::EmergencyClick => Some(".btn-emergency"),
            Self::ModalBackdropClick => Some(".emergency-modal"),
            Self::ModalAction => Some(".emergency-modal [data-action]"),
            Self::AlertAction => Some(".alert-actions .btn"),
        }
    }
}

/// An event with the data its handler needs, read by the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Window scrolled.
    Scroll,
    /// Mobile menu button clicked.
    MobileToggle,
    /// Navigation item clicked.
    NavItemClick,
    /// In-page anchor clicked; `target_top` is `None` when the target is missing.
    AnchorClick { target_top: Option<f64> },
    /// Emergency button clicked.
    EmergencyClick {
        timestamp: String,
        user_agent: String,
    },
    /// Click on the modal backdrop itself.
    ModalBackdropClick,
    /// Modal button clicked.
    ModalAction(ModalAction),
    /// Alert card button clicked.
    AlertAction { label: String, card: AlertCardInfo },
}

impl PageEvent {
    /// Kind used to look up the handler.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Scroll => EventKind::Scroll,
            Self::MobileToggle => EventKind::MobileToggle,
            Self::NavItemClick => EventKind::NavItemClick,
            Self::AnchorClick { .. } => EventKind::AnchorClick,
            Self::EmergencyClick { .. } => EventKind::EmergencyClick,
            Self::ModalBackdropClick => EventKind::ModalBackdropClick,
            Self::ModalAction(_) => EventKind::ModalAction,
            Self::AlertAction { .. } => EventKind::AlertAction,
        }
    }
}

/// Side effect requested by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Feed the scheduler's throttled section recompute.
    SampleScroll,
    /// Toggle the mobile menu and swap its icon.
    ToggleMobileMenu,
    /// Close the mobile menu and restore its icon.
    CloseMobileMenu,
    /// Smooth-scroll the window.
    ScrollTo { top: f64 },
    /// Open the emergency modal.
    ShowEmergencyModal,
    /// Remove the emergency modal.
    CloseEmergencyModal,
    /// Show a blocking notice.
    Notify(String),
    /// Vibrate the device, if supported.
    Vibrate(Vec<u32>),
    /// Log an emergency click.
    RecordEmergency(EmergencyEvent),
}

/// Pure event handler.
pub type Handler = fn(&GuardianConfig, &PageEvent) -> Vec<Effect>;

/// Map from event kind to handler.
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    handlers: BTreeMap<EventKind, Handler>,
}

impl HandlerTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The page's handlers.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(EventKind::Scroll, on_scroll);
        table.register(EventKind::MobileToggle, on_mobile_toggle);
        table.register(EventKind::NavItemClick, on_nav_item_click);
        table.register(EventKind::AnchorClick, on_anchor_click);
        table.register(EventKind::EmergencyClick, on_emergency_click);
        table.register(EventKind::ModalBackdropClick, on_modal_backdrop_click);
        table.register(EventKind::ModalAction, on_modal_action);
        table.register(EventKind::AlertAction, on_alert_action);
        table
    }

    /// Install or replace the handler for `kind`.
    pub fn register(&mut self, kind: EventKind, handler: Handler) {
        self.handlers.insert(kind, handler);
    }

    /// Handler for `kind`, if registered.
    #[must_use]
    pub fn handler(&self, kind: EventKind) -> Option<Handler> {
        self.handlers.get(&kind).copied()
    }

    /// Registered kinds, in order.
    pub fn kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.handlers.keys().copied()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for `event`. Unregistered kinds produce nothing.
    #[must_use]
    pub fn dispatch(&self, config: &GuardianConfig, event: &PageEvent) -> Vec<Effect> {
        self.handler(event.kind())
            .map(|handler| handler(config, event))
            .unwrap_or_default()
    }
}

/// Configuration plus handler table.
#[derive(Debug, Clone)]
pub struct PageController {
    config: GuardianConfig,
    table: HandlerTable,
}

impl PageController {
    /// Controller with the standard handlers.
    #[must_use]
    pub fn new(config: GuardianConfig) -> Self {
        Self::with_table(config, HandlerTable::standard())
    }

    /// Controller with a custom table.
    #[must_use]
    pub const fn with_table(config: GuardianConfig, table: HandlerTable) -> Self {
        Self { config, table }
    }

    /// Effects requested by `event`.
    #[must_use]
    pub fn dispatch(&self, event: &PageEvent) -> Vec<Effect> {
        self.table.dispatch(&self.config, event)
    }

    /// The handler table.
    #[must_use]
    pub const fn table(&self) -> &HandlerTable {
        &self.table
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &GuardianConfig {
        &self.config
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn on_scroll(_: &GuardianConfig, _: &PageEvent) -> Vec<Effect> {
    vec![Effect::SampleScroll]
}

fn on_mobile_toggle(_: &GuardianConfig, _: &PageEvent) -> Vec<Effect> {
    vec![Effect::ToggleMobileMenu]
}

fn on_nav_item_click(_: &GuardianConfig, _: &PageEvent) -> Vec<Effect> {
    vec![Effect::CloseMobileMenu]
}

fn on_anchor_click(config: &GuardianConfig, event: &PageEvent) -> Vec<Effect> {
    match event {
        PageEvent::AnchorClick {
            target_top: Some(top),
        } => vec![Effect::ScrollTo {
            top: top - config.page.header_offset_px,
        }],
        _ => Vec::new(),
    }
}

fn on_emergency_click(config: &GuardianConfig, event: &PageEvent) -> Vec<Effect> {
    let PageEvent::EmergencyClick {
        timestamp,
        user_agent,
    } = event
    else {
        return Vec::new();
    };
    let mut effects = vec![
        Effect::ShowEmergencyModal,
        Effect::RecordEmergency(EmergencyEvent::button_click(
            timestamp.as_str(),
            user_agent.as_str(),
        )),
    ];
    if !config.page.vibrate_pattern.is_empty() {
        effects.push(Effect::Vibrate(config.page.vibrate_pattern.clone()));
    }
    effects
}

fn on_modal_backdrop_click(_: &GuardianConfig, _: &PageEvent) -> Vec<Effect> {
    vec![Effect::CloseEmergencyModal]
}

fn on_modal_action(_: &GuardianConfig, event: &PageEvent) -> Vec<Effect> {
    match event {
        PageEvent::ModalAction(ModalAction::CallServices) => {
            info!("emergency services contacted");
            vec![
                Effect::Notify(CALL_SERVICES_MESSAGE.to_string()),
                Effect::CloseEmergencyModal,
            ]
        }
        PageEvent::ModalAction(ModalAction::NearestShelters) => {
            info!("showing nearest shelters");
            vec![Effect::Notify(SHELTERS_MESSAGE.to_string())]
        }
        PageEvent::ModalAction(ModalAction::Close) => vec![Effect::CloseEmergencyModal],
        _ => Vec::new(),
    }
}

fn on_alert_action(_: &GuardianConfig, event: &PageEvent) -> Vec<Effect> {
    let PageEvent::AlertAction { label, card } = event else {
        return Vec::new();
    };
    AlertAction::from_label(label)
        .map(|action| vec![Effect::Notify(action_message(action, card))])
        .unwrap_or_default()
}

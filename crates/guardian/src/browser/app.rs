//! WASM application entry point.
//!
//! [`GuardianApp`] binds one DOM listener per element the handler table
//! names, turns DOM events into [`PageEvent`]s, and executes the returned
//! [`Effect`]s. Timed behavior belongs to the core scheduler.

use super::console;
use super::dom::{alert_action_event, host_error, set_mobile_menu, DomPage};
use super::modal::{modal_markup, MODAL_CLASS, MODAL_STYLES, STYLES_ID};
use super::timers::BrowserHost;
use gloo::events::{EventListener, EventListenerOptions};
use guardian_core::{
    shared, Effect, EntropyRandom, EventKind, GuardianConfig, GuardianError, ModalAction,
    PageController, PageEvent, ViewportActivityScheduler,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{error, info, warn, Level};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, ScrollBehavior, ScrollToOptions, Window,
};

/// Id of the optional inline JSON configuration block.
pub const CONFIG_ELEMENT_ID: &str = "guardian-config";

const REVEAL_SELECTOR: &str = ".stats-grid, .alerts-grid, .features-grid";

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn has_property(target: &JsValue, name: &str) -> bool {
    js_sys::Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

struct OpenModal {
    root: Element,
    _listeners: Vec<EventListener>,
}

struct Reveal {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

struct AppInner {
    window: Window,
    page: Rc<DomPage>,
    controller: PageController,
    scheduler: ViewportActivityScheduler<BrowserHost, DomPage>,
    listeners: RefCell<Vec<EventListener>>,
    modal: RefCell<Option<OpenModal>>,
    reveal: RefCell<Option<Reveal>>,
}

impl AppInner {
    fn document(&self) -> &Document {
        self.page.document()
    }

    // =========================================================================
    // Event binding
    // =========================================================================

    fn bind(self: &Rc<Self>, kind: EventKind) -> Vec<EventListener> {
        match kind.selector() {
            None => {
                let weak = Rc::downgrade(self);
                vec![EventListener::new(&self.window, kind.dom_event(), move |_| {
                    if let Some(app) = weak.upgrade() {
                        app.handle(&PageEvent::Scroll);
                    }
                })]
            }
            Some(selector) => self
                .page
                .query_all(selector)
                .into_iter()
                .map(|element| self.bind_element(kind, element))
                .collect(),
        }
    }

    fn bind_element(self: &Rc<Self>, kind: EventKind, element: Element) -> EventListener {
        let weak: Weak<Self> = Rc::downgrade(self);
        let target = element.clone();
        EventListener::new_with_options(
            &target,
            kind.dom_event(),
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(app) = weak.upgrade() else {
                    return;
                };
                if let Some(page_event) = app.read_event(kind, &element, event) {
                    app.handle(&page_event);
                }
            },
        )
    }

    /// Build the page event for a DOM event, or `None` to ignore it.
    fn read_event(&self, kind: EventKind, element: &Element, event: &Event) -> Option<PageEvent> {
        match kind {
            EventKind::Scroll => Some(PageEvent::Scroll),
            EventKind::MobileToggle => Some(PageEvent::MobileToggle),
            EventKind::NavItemClick => Some(PageEvent::NavItemClick),
            EventKind::AnchorClick => {
                event.prevent_default();
                Some(PageEvent::AnchorClick {
                    target_top: self.page.anchor_target_top(element),
                })
            }
            EventKind::EmergencyClick => {
                event.prevent_default();
                Some(PageEvent::EmergencyClick {
                    timestamp: String::from(js_sys::Date::new_0().to_iso_string()),
                    user_agent: self.window.navigator().user_agent().unwrap_or_default(),
                })
            }
            EventKind::ModalBackdropClick => {
                let on_root = event
                    .target()
                    .is_some_and(|target| js_sys::Object::is(&target, element));
                on_root.then_some(PageEvent::ModalBackdropClick)
            }
            EventKind::ModalAction => element
                .get_attribute("data-action")
                .and_then(|value| ModalAction::from_data_attribute(&value))
                .map(PageEvent::ModalAction),
            EventKind::AlertAction => {
                event.stop_propagation();
                alert_action_event(element)
            }
        }
    }

    // =========================================================================
    // Effects
    // =========================================================================

    fn handle(self: &Rc<Self>, event: &PageEvent) {
        for effect in self.controller.dispatch(event) {
            if let Err(err) = self.apply(effect) {
                warn!(%err, kind = event.kind().name(), "effect failed");
            }
        }
    }

    fn apply(self: &Rc<Self>, effect: Effect) -> Result<(), GuardianError> {
        match effect {
            Effect::SampleScroll => {
                self.scheduler.on_scroll();
            }
            Effect::ToggleMobileMenu => {
                set_mobile_menu(self.document(), None);
            }
            Effect::CloseMobileMenu => {
                set_mobile_menu(self.document(), Some(false));
            }
            Effect::ScrollTo { top } => {
                let options = ScrollToOptions::new();
                options.set_top(top);
                options.set_behavior(ScrollBehavior::Smooth);
                self.window.scroll_to_with_scroll_to_options(&options);
            }
            Effect::ShowEmergencyModal => self.open_modal()?,
            Effect::CloseEmergencyModal => self.close_modal(),
            Effect::Notify(message) => self
                .window
                .alert_with_message(&message)
                .map_err(|err| host_error(&err))?,
            Effect::Vibrate(pattern) => {
                let navigator = self.window.navigator();
                if has_property(&navigator, "vibrate") {
                    let pattern: js_sys::Array =
                        pattern.into_iter().map(JsValue::from).collect();
                    navigator.vibrate_with_pattern(&pattern);
                }
            }
            Effect::RecordEmergency(event) => match event.to_json() {
                Ok(json) => warn!(event = %json, "🚨 emergency event logged"),
                Err(err) => warn!(%err, "emergency event could not be serialized"),
            },
        }
        Ok(())
    }

    // =========================================================================
    // Emergency modal
    // =========================================================================

    fn open_modal(self: &Rc<Self>) -> Result<(), GuardianError> {
        self.close_modal();
        let document = self.document();
        if document.get_element_by_id(STYLES_ID).is_none() {
            let style = document
                .create_element("style")
                .map_err(|err| host_error(&err))?;
            style.set_id(STYLES_ID);
            style.set_text_content(Some(MODAL_STYLES));
            document
                .head()
                .ok_or_else(|| GuardianError::MissingElement("head".to_string()))?
                .append_child(&style)
                .map_err(|err| host_error(&err))?;
        }

        let root = document
            .create_element("div")
            .map_err(|err| host_error(&err))?;
        root.set_class_name(MODAL_CLASS);
        root.set_inner_html(&modal_markup());
        document
            .body()
            .ok_or_else(|| GuardianError::MissingElement("body".to_string()))?
            .append_child(&root)
            .map_err(|err| host_error(&err))?;

        let mut listeners = self.bind(EventKind::ModalBackdropClick);
        listeners.extend(self.bind(EventKind::ModalAction));
        *self.modal.borrow_mut() = Some(OpenModal {
            root,
            _listeners: listeners,
        });
        Ok(())
    }

    fn close_modal(&self) {
        let open = self.modal.borrow_mut().take();
        if let Some(open) = open {
            open.root.remove();
        }
    }

    // =========================================================================
    // Page extras
    // =========================================================================

    fn observe_reveal(&self) -> Result<(), GuardianError> {
        let config = &self.controller.config().page;
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            |entries: js_sys::Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let target = entry.target();
                    if let Some(el) = target.dyn_ref::<HtmlElement>() {
                        el.style()
                            .set_property("animation-play-state", "running")
                            .ok();
                    }
                    observer.unobserve(&target);
                }
            },
        );
        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(config.reveal_threshold));
        options.set_root_margin(&config.reveal_root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .map_err(|err| host_error(&err))?;
        for element in self.page.query_all(REVEAL_SELECTOR) {
            observer.observe(&element);
        }
        *self.reveal.borrow_mut() = Some(Reveal {
            observer,
            _callback: callback,
        });
        Ok(())
    }

    fn register_service_worker(&self) -> Option<EventListener> {
        let url = self.controller.config().page.service_worker.clone()?;
        let navigator = self.window.navigator();
        if !has_property(&navigator, "serviceWorker") {
            return None;
        }
        Some(EventListener::once(&self.window, "load", move |_| {
            let promise = navigator.service_worker().register(&url);
            wasm_bindgen_futures::spawn_local(async move {
                match JsFuture::from(promise).await {
                    Ok(registration) => info!(?registration, "SW registered"),
                    Err(err) => warn!(?err, "SW registration failed"),
                }
            });
        }))
    }

    fn shutdown(&self) {
        self.scheduler.shutdown();
        self.listeners.borrow_mut().clear();
        self.close_modal();
        if let Some(reveal) = self.reveal.borrow_mut().take() {
            reveal.observer.disconnect();
        }
    }
}

/// The page controller running in the browser.
#[wasm_bindgen]
pub struct GuardianApp {
    inner: Rc<AppInner>,
}

#[wasm_bindgen]
impl GuardianApp {
    /// Mount on the current document, reading `#guardian-config` if present.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<GuardianApp, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let config = match document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        {
            Some(json) => GuardianConfig::from_json_str(&json).map_err(js_error)?,
            None => GuardianConfig::default(),
        };
        Self::mount(window, config)
    }

    /// Mount with a JSON configuration.
    pub fn with_config(json: &str) -> Result<GuardianApp, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let config = GuardianConfig::from_json_str(json).map_err(js_error)?;
        Self::mount(window, config)
    }

    /// Id of the section currently highlighted.
    pub fn active_section(&self) -> Option<String> {
        self.inner.scheduler.active_section()
    }

    /// Recompute the highlighted section now.
    pub fn refresh_active_section(&self) -> Option<String> {
        self.inner.scheduler.recompute_active_section()
    }

    /// Run one statistic update now; returns how many values started moving.
    pub fn update_live_stats(&self) -> usize {
        self.inner.scheduler.update_live_stats().len()
    }

    /// Open the emergency modal.
    pub fn open_emergency_modal(&self) -> Result<(), JsValue> {
        self.inner.open_modal().map_err(js_error)
    }

    /// Close the emergency modal, if open.
    pub fn close_emergency_modal(&self) {
        self.inner.close_modal();
    }

    /// Whether the emergency modal is open.
    pub fn emergency_modal_open(&self) -> bool {
        self.inner.modal.borrow().is_some()
    }

    /// Names of the bound event kinds.
    pub fn handlers(&self) -> js_sys::Array {
        self.inner
            .controller
            .table()
            .kinds()
            .map(|kind| JsValue::from_str(kind.name()))
            .collect()
    }

    /// Stop timers, unbind listeners and close the modal.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}

impl GuardianApp {
    fn mount(window: Window, config: GuardianConfig) -> Result<GuardianApp, JsValue> {
        console_error_panic_hook::set_once();

        let host = Rc::new(BrowserHost::new());
        let page = Rc::new(DomPage::new(window.clone()).map_err(js_error)?);
        let scheduler = ViewportActivityScheduler::new(
            host,
            Rc::clone(&page),
            shared(EntropyRandom::new()),
            config.scheduler.clone(),
        );
        let inner = Rc::new(AppInner {
            window,
            page,
            controller: PageController::new(config),
            scheduler,
            listeners: RefCell::new(Vec::new()),
            modal: RefCell::new(None),
            reveal: RefCell::new(None),
        });

        let mut listeners = Vec::new();
        for kind in inner.controller.table().kinds() {
            listeners.extend(inner.bind(kind));
        }
        listeners.extend(inner.register_service_worker());
        *inner.listeners.borrow_mut() = listeners;

        if let Err(err) = inner.observe_reveal() {
            warn!(%err, "reveal-on-scroll unavailable");
        }
        inner.scheduler.start();
        info!("🚀 DisasterGuardian initialized");
        Ok(Self { inner })
    }
}

impl Drop for GuardianApp {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

thread_local! {
    static APP: RefCell<Option<GuardianApp>> = const { RefCell::new(None) };
}

fn boot() {
    match GuardianApp::new() {
        Ok(app) => APP.with(|slot| *slot.borrow_mut() = Some(app)),
        Err(err) => error!(?err, "DisasterGuardian failed to start"),
    }
}

/// Install logging and mount the page once the DOM is ready.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if let Err(err) = console::init(Level::INFO) {
        web_sys::console::warn_1(&err);
    }
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if document.ready_state() == "loading" {
        EventListener::once(&document, "DOMContentLoaded", |_| boot()).forget();
    } else {
        boot();
    }
}

/// Log to browser console.
#[wasm_bindgen]
pub fn log(msg: &str) {
    info!("{msg}");
}

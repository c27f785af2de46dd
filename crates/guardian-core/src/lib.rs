//! Host-agnostic runtime for the DisasterGuardian page.
//!
//! This crate holds every behavior of the page that does not need a browser:
//! - Scroll highlighting: [`ThrottleGate`], [`resolve_active_section`]
//! - Live statistics: [`plan_mutation`], [`NumberTween`], [`animate_number`]
//! - Alert pulses: [`pulse_alert_cards`]
//! - Event handling: [`HandlerTable`], [`PageController`], [`Effect`]
//!
//! Time, randomness and the document are injected through [`TimerHost`],
//! [`RandomSource`] and [`PageView`]. [`ManualHost`], [`ScriptedRandom`] and
//! [`MemoryPage`] drive the same code deterministically in tests.

mod alerts;
mod animation;
mod config;
mod controller;
mod emergency;
mod error;
pub mod host;
pub mod page;
mod pulse;
pub mod random;
mod scheduler;
mod section;
mod stats;
mod throttle;

pub use alerts::{
    action_message, details_message, evacuation_routes_message, recommendations_message,
    safety_recommendations, AlertAction, AlertCardInfo,
};
pub use animation::{
    animate_number, ease_out_quart, format_grouped, parse_grouped, AnimationHandle, NumberTween,
};
pub use config::{GuardianConfig, PageConfig, SchedulerConfig};
pub use controller::{Effect, EventKind, Handler, HandlerTable, PageController, PageEvent};
pub use emergency::{EmergencyEvent, ModalAction, CALL_SERVICES_MESSAGE, SHELTERS_MESSAGE};
pub use error::{ConfigError, GuardianError, Result};
pub use host::{ManualHost, TimerHost, TimerId};
pub use page::{MemoryPage, PageView, SectionBounds};
pub use pulse::{pulse_alert_cards, HeldPulses};
pub use random::{shared, EntropyRandom, RandomSource, ScriptedRandom, SharedRandom};
pub use scheduler::ViewportActivityScheduler;
pub use section::{apply_active_section, nav_item_matches, resolve_active_section, scroll_cursor};
pub use stats::{draw_delta, mutation_target, plan_mutation, read_statistic, StatMutation};
pub use throttle::{throttle, ThrottleGate, Throttled};

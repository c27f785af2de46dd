//! `tracing` layer that writes to the browser console.
//!
//! Events become one line, `[target] message key=value ...`, written through
//! a [`ConsoleSink`]. In the browser the sink is `console.error`/`warn`/
//! `info`/`debug` chosen by level.

use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Receives one formatted line per event.
pub type ConsoleSink = fn(&Level, &str);

/// Forwards events at or above `max_level` to a sink.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleLayer {
    max_level: Level,
    sink: ConsoleSink,
}

impl ConsoleLayer {
    /// Layer writing to `sink`.
    #[must_use]
    pub const fn new(max_level: Level, sink: ConsoleSink) -> Self {
        Self { max_level, sink }
    }

    /// Layer writing to the browser console.
    #[cfg(target_arch = "wasm32")]
    #[must_use]
    pub const fn browser(max_level: Level) -> Self {
        Self::new(max_level, write_console)
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }
        let mut line = LineVisitor::default();
        event.record(&mut line);
        (self.sink)(
            meta.level(),
            &format!("[{}] {}{}", meta.target(), line.message, line.fields),
        );
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: &Level, line: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let value = JsValue::from_str(line);
    match *level {
        Level::ERROR => console::error_1(&value),
        Level::WARN => console::warn_1(&value),
        Level::INFO => console::info_1(&value),
        _ => console::debug_1(&value),
    }
}

/// Install the console layer as the global subscriber.
#[cfg(target_arch = "wasm32")]
pub fn init(max_level: Level) -> Result<(), wasm_bindgen::JsValue> {
    use tracing_subscriber::layer::SubscriberExt;

    let subscriber = tracing_subscriber::registry().with(ConsoleLayer::browser(max_level));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tracing_subscriber::layer::SubscriberExt;

    thread_local! {
        static LINES: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    fn capture(level: &Level, line: &str) {
        LINES.with(|lines| lines.borrow_mut().push((*level, line.to_string())));
    }

    fn captured(max_level: Level, emit: impl FnOnce()) -> Vec<(Level, String)> {
        LINES.with(|lines| lines.borrow_mut().clear());
        let subscriber = tracing_subscriber::registry().with(ConsoleLayer::new(max_level, capture));
        tracing::subscriber::with_default(subscriber, emit);
        LINES.with(|lines| lines.borrow().clone())
    }

    #[test]
    fn test_filters_below_max_level() {
        let lines = captured(Level::INFO, || {
            tracing::debug!("hidden");
            tracing::info!("shown");
            tracing::warn!("also shown");
        });
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, Level::INFO);
        assert_eq!(lines[1].0, Level::WARN);
    }

    #[test]
    fn test_line_format() {
        let lines = captured(Level::TRACE, || {
            tracing::info!(stats = 3, section = "alertas", "scheduler started");
        });
        assert_eq!(
            lines[0].1,
            "[guardian::browser::console::tests] scheduler started stats=3 section=alertas"
        );
    }

    #[test]
    fn test_display_fields() {
        let lines = captured(Level::TRACE, || {
            let err = "boom";
            tracing::error!(%err, "registration failed");
        });
        assert_eq!(lines[0].0, Level::ERROR);
        assert!(lines[0].1.ends_with("registration failed err=boom"));
    }
}

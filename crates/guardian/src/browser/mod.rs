//! Browser runtime for the DisasterGuardian page.
//!
//! Bridges the core runtime to the DOM: a [`PageView`](guardian_core::PageView)
//! over the document, a [`TimerHost`](guardian_core::TimerHost) over browser
//! timers, and the `#[wasm_bindgen]` application that wires them together.

// WASM-only modules
#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod timers;

// Cross-platform modules
pub mod console;
pub mod modal;

#[cfg(target_arch = "wasm32")]
pub use app::GuardianApp;
#[cfg(target_arch = "wasm32")]
pub use dom::DomPage;
#[cfg(target_arch = "wasm32")]
pub use timers::BrowserHost;
pub use console::{ConsoleLayer, ConsoleSink};

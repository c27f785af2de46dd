//! DisasterGuardian: alert site page runtime, compiled to WASM.
//!
//! # Browser Usage (WASM)
//!
//! ```javascript
//! import init, { GuardianApp } from './guardian.js';
//!
//! async function main() {
//!     // mounts automatically once the DOM is ready
//!     await init();
//! }
//! ```
//!
//! An inline `<script type="application/json" id="guardian-config">` block
//! overrides the default timings.

#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::new_without_default,
    clippy::use_self
)]

pub use guardian_core::*;

pub mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserHost, DomPage, GuardianApp};

pub use browser::{ConsoleLayer, ConsoleSink};

//! Application module: exposes the UI-side model used by the TUI and runtime.
//!
//! `App` only tracks what the screen needs (selection, pane toggles, the
//! status message). Playback state is always read from the engine.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;

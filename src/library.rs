//! Music library: track/playlist model and the directory scanner.

mod model;
mod scan;

pub use model::*;
pub use scan::scan;

#[cfg(test)]
mod tests;

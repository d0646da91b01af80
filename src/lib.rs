//! Unified-diff application engine with an external `git apply` tier and a
//! line-based manual fallback.
pub mod cli;
pub mod config;
pub mod logging;
pub mod patch;

pub use config::ApplyOptions;
pub use patch::{ApplyResult, PatchOrchestrator, apply};

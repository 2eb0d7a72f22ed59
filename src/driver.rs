//! Compiler driver core.
//!
//! This module turns a parsed command line into an immutable configuration
//! (`Driver`) and plans the dependency-ordered job list that realizes the
//! requested build.

pub mod batch;
pub mod config;
pub mod mode;
pub mod module_output;
pub mod planner;
pub mod supplementary;

#[cfg(test)]
mod tests_planner;

// Re-export public API
pub use batch::{BatchModeInfo, BatchPartitions};
pub use config::Driver;
pub use mode::{CompilerMode, DebugInfoFormat, DebugInfoLevel, LinkOutputType, OutputInfo};
pub use module_output::ModuleOutput;

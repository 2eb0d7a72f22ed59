//! A Swift compiler driver implemented in Rust.
//!
//! The driver does not compile code itself: it resolves a command line into
//! an immutable configuration, plans a dependency-ordered graph of frontend,
//! linker, and auxiliary-tool invocations, and hands those jobs to an
//! executor.

/// Contains the diagnostic engine and error types.
pub mod diagnostic;
/// Contains the driver configuration and build planning.
pub mod driver;
/// Contains the sequential job executor.
pub mod exec;
pub mod file_type;
/// Contains the job model consumed by executors.
pub mod job;
/// Contains option parsing and the parsed-options collaborator.
pub mod options;
/// Contains toolchain selection and platform link behavior.
pub mod toolchain;
pub mod vpath;

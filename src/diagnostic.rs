//! Driver diagnostics.
//!
//! Configuration and input problems are accumulated in a `DiagnosticEngine`
//! rather than aborting: the driver keeps resolving with sanitized values so
//! one invocation reports as many problems as possible. The engine is the
//! sole user-visible failure channel; the binary maps accumulated errors to
//! a non-zero exit code.

use std::fmt;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Note,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => f.write_str("error"),
            DiagnosticLevel::Warning => f.write_str("warning"),
            DiagnosticLevel::Note => f.write_str("note"),
        }
    }
}

/// Individual diagnostic, already rendered to a message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

/// Recoverable configuration and input errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DriverError {
    #[error("invalid driver name: '{0}'")]
    InvalidDriverName(String),

    #[error("unknown argument: '{0}'")]
    UnknownOption(String),

    #[error("missing argument value for '{0}'")]
    MissingArgumentValue(String),

    #[error("invalid value '{value}' in '{option}'")]
    InvalidArgumentValue { option: String, value: String },

    #[error("invalid input path: '{0}'")]
    InvalidInput(String),

    #[error("-static may not be used with -emit-executable")]
    StaticExecutable,

    #[error("-debug-info-format={format} is not supported with {option}")]
    ConflictingDebugInfoFormat { format: String, option: String },

    #[error("option '-debug-info-format={0}' is missing a required argument (-g)")]
    DebugFormatWithoutDebugInfo(String),

    #[error("the flag '-i' is no longer required and has been removed; use 'swift input-filename'")]
    RemovedIMode,

    #[error("module name \"{0}\" is not a valid identifier")]
    InvalidModuleName(String),

    #[error("module name \"Swift\" is reserved for the standard library; use -parse-stdlib")]
    StdlibModuleName,

    #[error("this mode does not support emitting modules")]
    ModeCannotEmitModule,

    #[error("unexpected input file: {0}")]
    UnexpectedInput(String),

    #[error("using bridging headers with module interfaces is unsupported")]
    BridgingHeaderWithModuleInterface,
}

/// Environment and compatibility warnings. Execution proceeds.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DriverWarning {
    #[error("no such SDK: '{0}'")]
    NoSuchSdk(String),

    #[error("ignoring -num-threads argument; cannot multithread batch mode")]
    MultithreadedBatch,

    #[error("incremental compilation has been disabled: it is {0}")]
    IncrementalDisabled(&'static str),
}

/// Unrecoverable conditions: planning aborts instead of diagnosing.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("unknown target triple '{0}'")]
    UnknownTarget(String),

    #[error("no toolchain is available for target '{0}'")]
    UnsupportedToolchain(String),

    #[error("REPL mode is not yet implemented")]
    ReplNotImplemented,

    #[error("immediate mode is not yet implemented")]
    ImmediateNotImplemented,
}

/// Diagnostic engine for collecting driver errors and warnings
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticEngine {
    pub fn new() -> DiagnosticEngine {
        DiagnosticEngine {
            diagnostics: Vec::new(),
        }
    }

    pub fn report_error(&mut self, error: DriverError) {
        log::debug!("diagnosed error: {error}");
        self.diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Error,
            message: error.to_string(),
        });
    }

    pub fn report_warning(&mut self, warning: DriverWarning) {
        log::debug!("diagnosed warning: {warning}");
        self.diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Warning,
            message: warning.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Print all diagnostics to stderr
    pub fn print_to_stderr(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{diagnostic}");
        }
    }
}

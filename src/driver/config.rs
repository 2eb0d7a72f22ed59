//! The driver configuration aggregate.
//!
//! `Driver::new` runs every resolution step once (input classification, mode
//! and output derivation, module decisions, SDK and toolchain selection);
//! the resulting value is immutable. Planning reads it and produces a fresh
//! job list.

use std::path::{Path, PathBuf};

use target_lexicon::Triple;

use crate::diagnostic::{DiagnosticEngine, DriverError, DriverWarning, FatalError};
use crate::driver::mode::{
    self, CompilerMode, DebugInfoFormat, DebugInfoLevel, LinkOutputType,
};
use crate::driver::module_output::{self, ModuleOutput};
use crate::driver::planner;
use crate::driver::supplementary::{self, SupplementaryOutputPaths};
use crate::file_type::FileType;
use crate::job::Job;
use crate::options::{DriverKind, Opt, ParsedOptions};
use crate::toolchain::{self, Toolchain};
use crate::vpath::{TypedVirtualPath, VirtualPath};

/// The resolved driver configuration. Constructed once; immutable afterward.
pub struct Driver {
    pub kind: DriverKind,
    pub diagnostics: DiagnosticEngine,
    pub parsed_options: ParsedOptions,
    pub working_directory: Option<PathBuf>,
    pub inputs: Vec<TypedVirtualPath>,
    pub target: Triple,
    pub toolchain: Box<dyn Toolchain>,
    pub sdk_path: Option<PathBuf>,
    pub compiler_mode: CompilerMode,
    pub compiler_output_type: Option<FileType>,
    pub linker_output_type: Option<LinkOutputType>,
    pub debug_info_level: Option<DebugInfoLevel>,
    pub debug_info_format: DebugInfoFormat,
    pub num_threads: usize,
    pub is_incremental: bool,
    pub incremental_disabled_reason: Option<&'static str>,
    pub show_incremental_decisions: bool,
    pub module_output: Option<ModuleOutput>,
    pub module_name: String,
    pub supplementary_outputs: SupplementaryOutputPaths,
}

impl Driver {
    /// Builds the configuration from an argument vector (without argv[0]).
    ///
    /// Recoverable problems land in the diagnostic engine; only a missing
    /// toolchain or an unparseable target aborts construction.
    pub fn new(kind: DriverKind, arguments: Vec<String>) -> Result<Driver, FatalError> {
        let mut diagnostics = DiagnosticEngine::new();
        let parsed_options = ParsedOptions::parse(&arguments, &mut diagnostics);

        let working_directory = parsed_options
            .last_value(Opt::WorkingDirectory)
            .map(PathBuf::from);

        let inputs = classify_inputs(&parsed_options, working_directory.as_deref(), &mut diagnostics);

        let target = match parsed_options.last_value(Opt::Target) {
            Some(value) => value
                .parse::<Triple>()
                .map_err(|_| FatalError::UnknownTarget(value.to_string()))?,
            None => Triple::host(),
        };
        let toolchain = toolchain::toolchain_for_target(&target)?;
        log::debug!("selected {} toolchain for {target}", toolchain.name());

        let output_info =
            mode::resolve_output_info(kind, &parsed_options, !inputs.is_empty(), &mut diagnostics);

        if parsed_options.has(Opt::ImportObjcHeader)
            && (parsed_options.has(Opt::EmitModuleInterface)
                || parsed_options.has(Opt::EmitModuleInterfacePath))
        {
            diagnostics.report_error(DriverError::BridgingHeaderWithModuleInterface);
        }

        let module_info = module_output::resolve_module_output(
            &parsed_options,
            &output_info,
            &inputs,
            working_directory.as_deref(),
            &mut diagnostics,
        );

        let sdk_path = resolve_sdk_path(
            &parsed_options,
            &output_info.compiler_mode,
            &target,
            toolchain.as_ref(),
            working_directory.as_deref(),
            &mut diagnostics,
        );

        let supplementary_outputs = supplementary::resolve_supplementary_outputs(
            &parsed_options,
            output_info.compiler_output_type,
            &module_info.name,
            working_directory.as_deref(),
        );

        Ok(Driver {
            kind,
            diagnostics,
            parsed_options,
            working_directory,
            inputs,
            target,
            toolchain,
            sdk_path,
            compiler_mode: output_info.compiler_mode,
            compiler_output_type: output_info.compiler_output_type,
            linker_output_type: output_info.linker_output_type,
            debug_info_level: output_info.debug_info_level,
            debug_info_format: output_info.debug_info_format,
            num_threads: output_info.num_threads,
            is_incremental: output_info.is_incremental,
            incremental_disabled_reason: output_info.incremental_disabled_reason,
            show_incremental_decisions: output_info.show_incremental_decisions,
            module_output: module_info.output,
            module_name: module_info.name,
            supplementary_outputs,
        })
    }

    /// The inputs the frontend compiles (and batch mode partitions).
    pub fn swift_inputs(&self) -> Vec<TypedVirtualPath> {
        self.inputs
            .iter()
            .filter(|input| input.file_type.is_part_of_swift_compilation())
            .cloned()
            .collect()
    }

    /// Plans the build: the returned jobs can be executed in order,
    /// respecting input-to-output dependencies between them.
    pub fn plan_build(&mut self) -> Result<Vec<Job>, FatalError> {
        match self.compiler_mode {
            CompilerMode::Repl => return Err(FatalError::ReplNotImplemented),
            CompilerMode::Immediate => return Err(FatalError::ImmediateNotImplemented),
            _ => {}
        }
        // The engine moves out for the duration of planning so the planner
        // can report while reading the configuration.
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        let jobs = planner::plan_build(self, &mut diagnostics);
        self.diagnostics = diagnostics;
        Ok(jobs)
    }
}

/// Input classification: `-` is Swift on stdin, everything else is typed by
/// extension with the object-file fallback.
fn classify_inputs(
    parsed: &ParsedOptions,
    working_directory: Option<&Path>,
    diagnostics: &mut DiagnosticEngine,
) -> Vec<TypedVirtualPath> {
    let mut inputs = Vec::with_capacity(parsed.inputs().len());
    for raw in parsed.inputs() {
        if raw == "-" {
            inputs.push(TypedVirtualPath::new(VirtualPath::StandardInput, FileType::Swift));
            continue;
        }
        let Some(path) = VirtualPath::from_argument(raw, working_directory) else {
            diagnostics.report_error(DriverError::InvalidInput(raw.clone()));
            continue;
        };
        let file_type = Path::new(raw)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FileType::from_extension)
            .unwrap_or(FileType::Object);
        inputs.push(TypedVirtualPath::new(path, file_type));
    }
    inputs
}

/// SDK resolution: explicit `-sdk`, then `SDKROOT`, then the toolchain
/// default for interactive use on Apple platforms. Missing directories are
/// a warning, not an error.
fn resolve_sdk_path(
    parsed: &ParsedOptions,
    compiler_mode: &CompilerMode,
    target: &Triple,
    toolchain: &dyn Toolchain,
    working_directory: Option<&Path>,
    diagnostics: &mut DiagnosticEngine,
) -> Option<PathBuf> {
    let mut sdk = parsed
        .last_value(Opt::Sdk)
        .map(str::to_string)
        .or_else(|| std::env::var("SDKROOT").ok());

    if sdk.is_none()
        && matches!(compiler_mode, CompilerMode::Immediate | CompilerMode::Repl)
        && toolchain::is_darwin(target)
    {
        sdk = toolchain.default_sdk_path().map(|p| p.display().to_string());
    }

    let sdk = sdk?;
    let trimmed = sdk.trim_end_matches('/');
    let path = match VirtualPath::from_argument(trimmed, working_directory) {
        Some(VirtualPath::Absolute(p)) | Some(VirtualPath::Relative(p)) => p,
        _ => return None,
    };
    if !path.exists() {
        diagnostics.report_warning(DriverWarning::NoSuchSdk(path.display().to_string()));
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(arguments: &[&str]) -> Driver {
        let arguments: Vec<String> = arguments.iter().map(|s| s.to_string()).collect();
        Driver::new(DriverKind::Batch, arguments).expect("driver construction failed")
    }

    #[test]
    fn test_input_classification() {
        let driver = driver(&["a.swift", "b.o", "c.swiftmodule", "weird.xyz", "-"]);
        let types: Vec<FileType> = driver.inputs.iter().map(|i| i.file_type).collect();
        assert_eq!(
            types,
            [
                FileType::Swift,
                FileType::Object,
                FileType::SwiftModule,
                FileType::Object,
                FileType::Swift,
            ]
        );
        assert_eq!(driver.inputs[4].file, VirtualPath::StandardInput);
        assert_eq!(driver.swift_inputs().len(), 2);
    }

    #[test]
    fn test_unknown_target_is_fatal() {
        let arguments = vec!["a.swift".to_string(), "-target".to_string(), "not a triple".to_string()];
        assert!(matches!(
            Driver::new(DriverKind::Batch, arguments),
            Err(FatalError::UnknownTarget(_))
        ));
    }

    #[test]
    fn test_missing_sdk_is_a_warning() {
        let driver = driver(&["a.swift", "-sdk", "/definitely/not/an/sdk/"]);
        assert!(!driver.diagnostics.has_errors());
        assert!(
            driver
                .diagnostics
                .diagnostics()
                .iter()
                .any(|d| d.message.contains("no such SDK"))
        );
        // The trailing slash is trimmed.
        assert_eq!(driver.sdk_path.as_deref(), Some(Path::new("/definitely/not/an/sdk")));
    }

    #[test]
    fn test_bridging_header_with_interface_is_an_error() {
        let driver = driver(&[
            "a.swift",
            "-import-objc-header",
            "bridge.h",
            "-emit-module-interface",
        ]);
        assert!(driver.diagnostics.has_errors());
    }

    #[test]
    fn test_working_directory_resolves_inputs() {
        let driver = driver(&["-working-directory", "/work", "sub/a.swift"]);
        assert_eq!(
            driver.inputs[0].file,
            VirtualPath::Absolute(PathBuf::from("/work/sub/a.swift"))
        );
    }

    #[test]
    fn test_repl_configuration_invariants() {
        let mut driver =
            Driver::new(DriverKind::Interactive, Vec::new()).expect("driver construction failed");
        assert_eq!(driver.compiler_mode, CompilerMode::Repl);
        assert!(driver.module_output.is_none());
        assert!(driver.linker_output_type.is_none());
        assert_eq!(driver.module_name, "REPL");
        assert!(matches!(driver.plan_build(), Err(FatalError::ReplNotImplemented)));
    }

    #[test]
    fn test_immediate_mode_planning_is_fatal() {
        let arguments = vec!["a.swift".to_string()];
        let mut driver = Driver::new(DriverKind::Interactive, arguments).unwrap();
        assert_eq!(driver.compiler_mode, CompilerMode::Immediate);
        assert!(matches!(
            driver.plan_build(),
            Err(FatalError::ImmediateNotImplemented)
        ));
    }
}

//! Mode and primary-output resolution.
//!
//! Maps the loosely constrained option surface to a coherent configuration:
//! compilation mode, primary compiler output type, linker output type, debug
//! settings, thread count, and the incremental flags. Every rule here reads
//! the parsed options only; no I/O. Repeated flags resolve last-wins, and
//! conflicts emit errors but still settle on a documented default so
//! planning can proceed.

use crate::diagnostic::{DiagnosticEngine, DriverError, DriverWarning};
use crate::driver::batch::BatchModeInfo;
use crate::file_type::FileType;
use crate::options::{DriverKind, MODE_OPTIONS, Opt, ParsedOptions};

/// How the driver splits work across frontend invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerMode {
    /// One frontend invocation per primary input.
    StandardCompile,
    /// Multiple primaries per invocation, partitioned by the batch rules.
    BatchCompile(BatchModeInfo),
    /// One frontend invocation for the whole module.
    SingleCompile,
    /// Interpret the inputs directly.
    Immediate,
    /// Interactive read-eval-print loop.
    Repl,
}

impl CompilerMode {
    /// Whether the mode compiles everything in one frontend invocation.
    pub fn is_single_compilation(&self) -> bool {
        matches!(self, CompilerMode::SingleCompile)
    }
}

/// The kind of product a link job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutputType {
    Executable,
    DynamicLibrary,
    StaticLibrary,
}

/// How much debug information the frontend emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugInfoLevel {
    AstTypes,
    LineTables,
    DwarfTypes,
}

impl DebugInfoLevel {
    /// Levels that reference AST types need the module available to the
    /// debugger, which forces an auxiliary module artifact when linking.
    pub fn requires_module(self) -> bool {
        matches!(self, DebugInfoLevel::AstTypes | DebugInfoLevel::DwarfTypes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugInfoFormat {
    #[default]
    Dwarf,
    CodeView,
}

/// The resolved mode/output configuration.
#[derive(Debug)]
pub struct OutputInfo {
    pub compiler_mode: CompilerMode,
    pub compiler_output_type: Option<FileType>,
    pub linker_output_type: Option<LinkOutputType>,
    pub debug_info_level: Option<DebugInfoLevel>,
    pub debug_info_format: DebugInfoFormat,
    pub num_threads: usize,
    pub is_incremental: bool,
    pub incremental_disabled_reason: Option<&'static str>,
    pub show_incremental_decisions: bool,
}

const DEBUG_LEVEL_OPTIONS: &[Opt] = &[Opt::G, Opt::Gnone, Opt::GlineTablesOnly, Opt::GdwarfTypes];

pub fn resolve_output_info(
    kind: DriverKind,
    parsed: &ParsedOptions,
    has_inputs: bool,
    diagnostics: &mut DiagnosticEngine,
) -> OutputInfo {
    let mode_option = parsed.last_matching(MODE_OPTIONS);

    let compiler_mode = match mode_option.map(|o| o.opt) {
        Some(Opt::EmitPch | Opt::EmitImportedModules | Opt::IndexFile) => {
            CompilerMode::SingleCompile
        }
        Some(Opt::Repl | Opt::LldbRepl | Opt::DeprecatedIntegratedRepl) => CompilerMode::Repl,
        _ => {
            if kind.is_interactive() {
                if has_inputs {
                    CompilerMode::Immediate
                } else {
                    CompilerMode::Repl
                }
            } else if parsed.has(Opt::WholeModuleOptimization) {
                CompilerMode::SingleCompile
            } else if parsed.has(Opt::DisableBatchMode) {
                CompilerMode::StandardCompile
            } else if parsed.has(Opt::EnableBatchMode) {
                CompilerMode::BatchCompile(batch_mode_info(parsed, diagnostics))
            } else {
                CompilerMode::StandardCompile
            }
        }
    };

    // Primary outputs. The initial values are the pre-mode defaults; with no
    // mode option at all the batch personality compiles objects and links an
    // executable.
    let mut compiler_output_type = if kind.is_interactive() {
        None
    } else {
        Some(FileType::Object)
    };
    let mut linker_output_type = None;

    match mode_option {
        None => {
            if !kind.is_interactive() {
                linker_output_type = Some(LinkOutputType::Executable);
            }
        }
        Some(option) => match option.opt {
            Opt::EmitExecutable => {
                if parsed.has(Opt::Static) {
                    diagnostics.report_error(DriverError::StaticExecutable);
                }
                compiler_output_type = Some(FileType::Object);
                linker_output_type = Some(LinkOutputType::Executable);
            }
            Opt::EmitLibrary => {
                compiler_output_type = Some(FileType::Object);
                linker_output_type = Some(if parsed.has(Opt::Static) {
                    LinkOutputType::StaticLibrary
                } else {
                    LinkOutputType::DynamicLibrary
                });
            }
            Opt::EmitObject => compiler_output_type = Some(FileType::Object),
            Opt::EmitAssembly => compiler_output_type = Some(FileType::Assembly),
            Opt::EmitSil => compiler_output_type = Some(FileType::Sil),
            Opt::EmitSilgen => compiler_output_type = Some(FileType::RawSil),
            Opt::EmitSib => compiler_output_type = Some(FileType::Sib),
            Opt::EmitSibgen => compiler_output_type = Some(FileType::RawSib),
            Opt::EmitIr => compiler_output_type = Some(FileType::LlvmIr),
            Opt::EmitBc => compiler_output_type = Some(FileType::LlvmBitcode),
            Opt::DumpAst => compiler_output_type = Some(FileType::Ast),
            Opt::EmitPch => compiler_output_type = Some(FileType::Pch),
            Opt::EmitImportedModules => compiler_output_type = Some(FileType::ImportedModules),
            Opt::IndexFile => compiler_output_type = Some(FileType::IndexData),
            // -update-code produces remaps and suppresses linking.
            Opt::UpdateCode => compiler_output_type = Some(FileType::Remap),
            Opt::Parse
            | Opt::Typecheck
            | Opt::ResolveImports
            | Opt::DumpParse
            | Opt::EmitSyntax
            | Opt::PrintAst
            | Opt::DumpScopeMaps
            | Opt::DumpTypeRefinementContexts
            | Opt::DumpInterfaceHash => compiler_output_type = None,
            Opt::RemovedI => {
                diagnostics.report_error(DriverError::RemovedIMode);
                compiler_output_type = None;
            }
            Opt::Repl | Opt::LldbRepl | Opt::DeprecatedIntegratedRepl => {
                compiler_output_type = None;
            }
            _ => {}
        },
    }

    // Thread count: last value wins, invalid values diagnose and clamp to 0.
    let mut num_threads = 0;
    if let Some(value) = parsed.last_value(Opt::NumThreads) {
        match value.parse::<usize>() {
            Ok(count) => num_threads = count,
            Err(_) => diagnostics.report_error(DriverError::InvalidArgumentValue {
                option: "-num-threads".to_string(),
                value: value.to_string(),
            }),
        }
    }
    if num_threads > 0 && matches!(compiler_mode, CompilerMode::BatchCompile(_)) {
        diagnostics.report_warning(DriverWarning::MultithreadedBatch);
        num_threads = 0;
    }

    let (debug_info_level, debug_info_format) = resolve_debug_info(parsed, diagnostics);

    let show_incremental_decisions = parsed.has(Opt::DriverShowIncremental);
    let mut incremental_disabled_reason = None;
    let is_incremental = if parsed.has(Opt::Incremental) {
        if parsed.has(Opt::WholeModuleOptimization) {
            incremental_disabled_reason = Some("not compatible with whole module optimization");
            false
        } else if parsed.has(Opt::EmbedBitcode) {
            incremental_disabled_reason =
                Some("not currently compatible with embedding LLVM IR bitcode");
            false
        } else {
            true
        }
    } else {
        false
    };
    if let Some(reason) = incremental_disabled_reason
        && show_incremental_decisions
    {
        diagnostics.report_warning(DriverWarning::IncrementalDisabled(reason));
    }

    OutputInfo {
        compiler_mode,
        compiler_output_type,
        linker_output_type,
        debug_info_level,
        debug_info_format,
        num_threads,
        is_incremental,
        incremental_disabled_reason,
        show_incremental_decisions,
    }
}

fn resolve_debug_info(
    parsed: &ParsedOptions,
    diagnostics: &mut DiagnosticEngine,
) -> (Option<DebugInfoLevel>, DebugInfoFormat) {
    let level_option = parsed.last_matching(DEBUG_LEVEL_OPTIONS);
    let level = match level_option.map(|o| o.opt) {
        Some(Opt::G) => Some(DebugInfoLevel::AstTypes),
        Some(Opt::GlineTablesOnly) => Some(DebugInfoLevel::LineTables),
        Some(Opt::GdwarfTypes) => Some(DebugInfoLevel::DwarfTypes),
        _ => None,
    };

    let mut format = DebugInfoFormat::Dwarf;
    if let Some(value) = parsed.last_value(Opt::DebugInfoFormat) {
        match value {
            "dwarf" => format = DebugInfoFormat::Dwarf,
            "codeview" => format = DebugInfoFormat::CodeView,
            other => diagnostics.report_error(DriverError::InvalidArgumentValue {
                option: "-debug-info-format=".to_string(),
                value: other.to_string(),
            }),
        }

        if level.is_none() {
            diagnostics.report_error(DriverError::DebugFormatWithoutDebugInfo(value.to_string()));
        }
    }

    if format == DebugInfoFormat::CodeView
        && matches!(
            level,
            Some(DebugInfoLevel::LineTables) | Some(DebugInfoLevel::DwarfTypes)
        )
    {
        // level_option is necessarily present here.
        let spelling = level_option.map(|o| o.spelling).unwrap_or("-g");
        diagnostics.report_error(DriverError::ConflictingDebugInfoFormat {
            format: "codeview".to_string(),
            option: spelling.to_string(),
        });
    }

    (level, format)
}

fn batch_mode_info(parsed: &ParsedOptions, diagnostics: &mut DiagnosticEngine) -> BatchModeInfo {
    BatchModeInfo {
        count: parse_count(parsed, Opt::DriverBatchCount, "-driver-batch-count", diagnostics),
        size_limit: parse_count(
            parsed,
            Opt::DriverBatchSizeLimit,
            "-driver-batch-size-limit",
            diagnostics,
        ),
        seed: parse_count(parsed, Opt::DriverBatchSeed, "-driver-batch-seed", diagnostics),
    }
}

fn parse_count(
    parsed: &ParsedOptions,
    opt: Opt,
    spelling: &str,
    diagnostics: &mut DiagnosticEngine,
) -> Option<usize> {
    let value = parsed.last_value(opt)?;
    match value.parse::<usize>() {
        Ok(count) => Some(count),
        Err(_) => {
            diagnostics.report_error(DriverError::InvalidArgumentValue {
                option: spelling.to_string(),
                value: value.to_string(),
            });
            None
        }
    }
}

//! Command-line option parsing and configuration input.
//!
//! The driver's option surface is Swift-style: single-dash long options,
//! repeated flags with last-wins semantics, and mutually exclusive groups
//! resolved by position. Parsing goes through a compact spelling table and
//! produces a `ParsedOptions` value; everything downstream consumes that
//! value and never looks at raw argv again.

use std::path::Path;

use crate::diagnostic::{DiagnosticEngine, DriverError};

/// The personalities a single driver binary answers to, selected by the
/// invocation name (or an explicit `--driver-mode=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// `swift`: immediate execution and the REPL.
    Interactive,
    /// `swiftc`: batch compilation.
    Batch,
    /// `swift-autolink-extract`: pass-through subcommand.
    AutolinkExtract,
    /// `swift-indent`: pass-through subcommand.
    Indent,
}

impl DriverKind {
    pub fn from_name(name: &str) -> Option<DriverKind> {
        match name {
            "swift" => Some(DriverKind::Interactive),
            "swiftc" => Some(DriverKind::Batch),
            "swift-autolink-extract" => Some(DriverKind::AutolinkExtract),
            "swift-indent" => Some(DriverKind::Indent),
            _ => None,
        }
    }

    pub fn is_interactive(self) -> bool {
        self == DriverKind::Interactive
    }

    /// Subcommand personalities re-exec a dedicated tool instead of driving
    /// a build.
    pub fn subcommand_tool(self) -> Option<&'static str> {
        match self {
            DriverKind::AutolinkExtract => Some("swift-autolink-extract"),
            DriverKind::Indent => Some("swift-indent"),
            _ => None,
        }
    }
}

/// Every option the driver recognizes. Aliases share a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opt {
    // Outputs and identity.
    Output,
    ModuleName,
    Target,
    Sdk,
    WorkingDirectory,
    ImportObjcHeader,

    // Mode options (mutually exclusive group, last one wins).
    EmitExecutable,
    EmitLibrary,
    EmitObject,
    EmitAssembly,
    EmitSil,
    EmitSilgen,
    EmitSib,
    EmitSibgen,
    EmitIr,
    EmitBc,
    DumpAst,
    EmitPch,
    EmitImportedModules,
    IndexFile,
    UpdateCode,
    Parse,
    Typecheck,
    ResolveImports,
    DumpParse,
    EmitSyntax,
    PrintAst,
    DumpScopeMaps,
    DumpTypeRefinementContexts,
    DumpInterfaceHash,
    RemovedI,
    Repl,
    LldbRepl,
    DeprecatedIntegratedRepl,

    Static,

    // Module emission.
    EmitModule,
    EmitModulePath,
    EmitModuleDoc,
    EmitModuleDocPath,
    EmitModuleInterface,
    EmitModuleInterfacePath,
    EmitObjcHeader,
    EmitObjcHeaderPath,

    // Supplementary outputs.
    EmitDependencies,
    EmitDependenciesPath,
    EmitReferenceDependencies,
    EmitReferenceDependenciesPath,
    SerializeDiagnostics,
    SerializeDiagnosticsPath,
    EmitLoadedModuleTrace,
    EmitLoadedModuleTracePath,
    EmitTbd,
    EmitTbdPath,
    SaveOptimizationRecord,
    SaveOptimizationRecordPath,

    // Parallelism and batching.
    NumThreads,
    EnableBatchMode,
    DisableBatchMode,
    DriverBatchCount,
    DriverBatchSizeLimit,
    DriverBatchSeed,
    WholeModuleOptimization,

    // Debug info.
    G,
    Gnone,
    GlineTablesOnly,
    GdwarfTypes,
    DebugInfoFormat,

    // Incremental builds.
    Incremental,
    DriverShowIncremental,
    EmbedBitcode,

    // Parsing behavior.
    ParseAsLibrary,
    ParseStdlib,

    // Driver behavior.
    DriverPrintJobs,
    DriverMode,
    Verbose,

    // Linker pass-through.
    LibrarySearchPath,
    LinkLibrary,
    FrameworkSearchPath,
    Framework,
    Xlinker,
}

/// How an option consumes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptKind {
    /// No value.
    Flag,
    /// Value is the next argument.
    Separate,
    /// Value is glued to the spelling (`-debug-info-format=dwarf`, `-lfoo`).
    Joined,
    /// Either glued or the next argument (`-L/opt/lib`, `-L /opt/lib`).
    JoinedOrSeparate,
}

struct OptionSpec {
    spelling: &'static str,
    opt: Opt,
    kind: OptKind,
}

const fn spec(spelling: &'static str, opt: Opt, kind: OptKind) -> OptionSpec {
    OptionSpec { spelling, opt, kind }
}

/// The spelling table. Aliases are separate rows mapping to the same `Opt`.
const OPTION_TABLE: &[OptionSpec] = &[
    spec("-o", Opt::Output, OptKind::Separate),
    spec("-module-name", Opt::ModuleName, OptKind::Separate),
    spec("-target", Opt::Target, OptKind::Separate),
    spec("-sdk", Opt::Sdk, OptKind::Separate),
    spec("-working-directory", Opt::WorkingDirectory, OptKind::Separate),
    spec("-import-objc-header", Opt::ImportObjcHeader, OptKind::Separate),
    spec("-emit-executable", Opt::EmitExecutable, OptKind::Flag),
    spec("-emit-library", Opt::EmitLibrary, OptKind::Flag),
    spec("-emit-object", Opt::EmitObject, OptKind::Flag),
    spec("-c", Opt::EmitObject, OptKind::Flag),
    spec("-emit-assembly", Opt::EmitAssembly, OptKind::Flag),
    spec("-S", Opt::EmitAssembly, OptKind::Flag),
    spec("-emit-sil", Opt::EmitSil, OptKind::Flag),
    spec("-emit-silgen", Opt::EmitSilgen, OptKind::Flag),
    spec("-emit-sib", Opt::EmitSib, OptKind::Flag),
    spec("-emit-sibgen", Opt::EmitSibgen, OptKind::Flag),
    spec("-emit-ir", Opt::EmitIr, OptKind::Flag),
    spec("-emit-bc", Opt::EmitBc, OptKind::Flag),
    spec("-dump-ast", Opt::DumpAst, OptKind::Flag),
    spec("-emit-pch", Opt::EmitPch, OptKind::Flag),
    spec("-emit-imported-modules", Opt::EmitImportedModules, OptKind::Flag),
    spec("-index-file", Opt::IndexFile, OptKind::Flag),
    spec("-update-code", Opt::UpdateCode, OptKind::Flag),
    spec("-parse", Opt::Parse, OptKind::Flag),
    spec("-typecheck", Opt::Typecheck, OptKind::Flag),
    spec("-resolve-imports", Opt::ResolveImports, OptKind::Flag),
    spec("-dump-parse", Opt::DumpParse, OptKind::Flag),
    spec("-emit-syntax", Opt::EmitSyntax, OptKind::Flag),
    spec("-print-ast", Opt::PrintAst, OptKind::Flag),
    spec("-dump-scope-maps", Opt::DumpScopeMaps, OptKind::Flag),
    spec(
        "-dump-type-refinement-contexts",
        Opt::DumpTypeRefinementContexts,
        OptKind::Flag,
    ),
    spec("-dump-interface-hash", Opt::DumpInterfaceHash, OptKind::Flag),
    spec("-i", Opt::RemovedI, OptKind::Flag),
    spec("-repl", Opt::Repl, OptKind::Flag),
    spec("-lldb-repl", Opt::LldbRepl, OptKind::Flag),
    spec(
        "-deprecated-integrated-repl",
        Opt::DeprecatedIntegratedRepl,
        OptKind::Flag,
    ),
    spec("-static", Opt::Static, OptKind::Flag),
    spec("-emit-module", Opt::EmitModule, OptKind::Flag),
    spec("-emit-module-path", Opt::EmitModulePath, OptKind::Separate),
    spec("-emit-module-doc", Opt::EmitModuleDoc, OptKind::Flag),
    spec("-emit-module-doc-path", Opt::EmitModuleDocPath, OptKind::Separate),
    spec("-emit-module-interface", Opt::EmitModuleInterface, OptKind::Flag),
    spec(
        "-emit-module-interface-path",
        Opt::EmitModuleInterfacePath,
        OptKind::Separate,
    ),
    spec("-emit-objc-header", Opt::EmitObjcHeader, OptKind::Flag),
    spec("-emit-objc-header-path", Opt::EmitObjcHeaderPath, OptKind::Separate),
    spec("-emit-dependencies", Opt::EmitDependencies, OptKind::Flag),
    spec("-emit-dependencies-path", Opt::EmitDependenciesPath, OptKind::Separate),
    spec(
        "-emit-reference-dependencies",
        Opt::EmitReferenceDependencies,
        OptKind::Flag,
    ),
    spec(
        "-emit-reference-dependencies-path",
        Opt::EmitReferenceDependenciesPath,
        OptKind::Separate,
    ),
    spec("-serialize-diagnostics", Opt::SerializeDiagnostics, OptKind::Flag),
    spec(
        "-serialize-diagnostics-path",
        Opt::SerializeDiagnosticsPath,
        OptKind::Separate,
    ),
    spec("-emit-loaded-module-trace", Opt::EmitLoadedModuleTrace, OptKind::Flag),
    spec(
        "-emit-loaded-module-trace-path",
        Opt::EmitLoadedModuleTracePath,
        OptKind::Separate,
    ),
    spec("-emit-tbd", Opt::EmitTbd, OptKind::Flag),
    spec("-emit-tbd-path", Opt::EmitTbdPath, OptKind::Separate),
    spec("-save-optimization-record", Opt::SaveOptimizationRecord, OptKind::Flag),
    spec(
        "-save-optimization-record-path",
        Opt::SaveOptimizationRecordPath,
        OptKind::Separate,
    ),
    spec("-num-threads", Opt::NumThreads, OptKind::Separate),
    spec("-enable-batch-mode", Opt::EnableBatchMode, OptKind::Flag),
    spec("-disable-batch-mode", Opt::DisableBatchMode, OptKind::Flag),
    spec("-driver-batch-count", Opt::DriverBatchCount, OptKind::Separate),
    spec("-driver-batch-size-limit", Opt::DriverBatchSizeLimit, OptKind::Separate),
    spec("-driver-batch-seed", Opt::DriverBatchSeed, OptKind::Separate),
    spec(
        "-whole-module-optimization",
        Opt::WholeModuleOptimization,
        OptKind::Flag,
    ),
    spec("-wmo", Opt::WholeModuleOptimization, OptKind::Flag),
    spec(
        "-force-single-frontend-invocation",
        Opt::WholeModuleOptimization,
        OptKind::Flag,
    ),
    spec("-g", Opt::G, OptKind::Flag),
    spec("-gnone", Opt::Gnone, OptKind::Flag),
    spec("-gline-tables-only", Opt::GlineTablesOnly, OptKind::Flag),
    spec("-gdwarf-types", Opt::GdwarfTypes, OptKind::Flag),
    spec("-debug-info-format=", Opt::DebugInfoFormat, OptKind::Joined),
    spec("-incremental", Opt::Incremental, OptKind::Flag),
    spec("-driver-show-incremental", Opt::DriverShowIncremental, OptKind::Flag),
    spec("-embed-bitcode", Opt::EmbedBitcode, OptKind::Flag),
    spec("-parse-as-library", Opt::ParseAsLibrary, OptKind::Flag),
    spec("-parse-stdlib", Opt::ParseStdlib, OptKind::Flag),
    spec("-driver-print-jobs", Opt::DriverPrintJobs, OptKind::Flag),
    spec("-###", Opt::DriverPrintJobs, OptKind::Flag),
    spec("--driver-mode=", Opt::DriverMode, OptKind::Joined),
    spec("-v", Opt::Verbose, OptKind::Flag),
    spec("-L", Opt::LibrarySearchPath, OptKind::JoinedOrSeparate),
    spec("-l", Opt::LinkLibrary, OptKind::Joined),
    spec("-F", Opt::FrameworkSearchPath, OptKind::JoinedOrSeparate),
    spec("-framework", Opt::Framework, OptKind::Separate),
    spec("-Xlinker", Opt::Xlinker, OptKind::Separate),
];

/// The mutually exclusive output-mode group, in table order.
pub const MODE_OPTIONS: &[Opt] = &[
    Opt::EmitExecutable,
    Opt::EmitLibrary,
    Opt::EmitObject,
    Opt::EmitAssembly,
    Opt::EmitSil,
    Opt::EmitSilgen,
    Opt::EmitSib,
    Opt::EmitSibgen,
    Opt::EmitIr,
    Opt::EmitBc,
    Opt::DumpAst,
    Opt::EmitPch,
    Opt::EmitImportedModules,
    Opt::IndexFile,
    Opt::UpdateCode,
    Opt::Parse,
    Opt::Typecheck,
    Opt::ResolveImports,
    Opt::DumpParse,
    Opt::EmitSyntax,
    Opt::PrintAst,
    Opt::DumpScopeMaps,
    Opt::DumpTypeRefinementContexts,
    Opt::DumpInterfaceHash,
    Opt::RemovedI,
    Opt::Repl,
    Opt::LldbRepl,
    Opt::DeprecatedIntegratedRepl,
];

fn lookup_exact(argument: &str) -> Option<&'static OptionSpec> {
    OPTION_TABLE.iter().find(|s| s.spelling == argument)
}

/// Longest-prefix match over joined spellings; returns the spec and the
/// glued value.
fn lookup_joined(argument: &str) -> Option<(&'static OptionSpec, &str)> {
    OPTION_TABLE
        .iter()
        .filter(|s| matches!(s.kind, OptKind::Joined | OptKind::JoinedOrSeparate))
        .filter(|s| argument.len() > s.spelling.len() && argument.starts_with(s.spelling))
        .max_by_key(|s| s.spelling.len())
        .map(|s| (s, &argument[s.spelling.len()..]))
}

/// One parsed occurrence of an option.
#[derive(Debug, Clone)]
pub struct ParsedOption {
    pub opt: Opt,
    /// The spelling that appeared on the command line (alias-accurate, for
    /// diagnostics).
    pub spelling: &'static str,
    pub value: Option<String>,
}

/// The parsed command line: recognized options in order, plus bare inputs.
#[derive(Debug, Default)]
pub struct ParsedOptions {
    options: Vec<ParsedOption>,
    inputs: Vec<String>,
}

impl ParsedOptions {
    /// Parses an argument vector (without argv[0]). Unknown options and
    /// missing values are diagnosed and skipped; parsing never aborts.
    pub fn parse(arguments: &[String], diagnostics: &mut DiagnosticEngine) -> ParsedOptions {
        let mut parsed = ParsedOptions::default();
        let mut index = 0;
        while index < arguments.len() {
            let argument = &arguments[index];
            index += 1;

            if argument == "-" || !argument.starts_with('-') {
                parsed.inputs.push(argument.clone());
                continue;
            }

            if let Some(spec) = lookup_exact(argument) {
                match spec.kind {
                    OptKind::Flag => parsed.push(spec, None),
                    OptKind::Separate | OptKind::JoinedOrSeparate => {
                        if index < arguments.len() {
                            parsed.push(spec, Some(arguments[index].clone()));
                            index += 1;
                        } else {
                            diagnostics
                                .report_error(DriverError::MissingArgumentValue(argument.clone()));
                        }
                    }
                    OptKind::Joined => parsed.push(spec, Some(String::new())),
                }
            } else if let Some((spec, value)) = lookup_joined(argument) {
                parsed.push(spec, Some(value.to_string()));
            } else {
                diagnostics.report_error(DriverError::UnknownOption(argument.clone()));
            }
        }
        parsed
    }

    fn push(&mut self, spec: &'static OptionSpec, value: Option<String>) {
        log::trace!("parsed option {} (value: {value:?})", spec.spelling);
        self.options.push(ParsedOption {
            opt: spec.opt,
            spelling: spec.spelling,
            value,
        });
    }

    pub fn has(&self, opt: Opt) -> bool {
        self.options.iter().any(|o| o.opt == opt)
    }

    /// The value of the last occurrence of `opt`, if any.
    pub fn last_value(&self, opt: Opt) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|o| o.opt == opt)
            .and_then(|o| o.value.as_deref())
    }

    /// The last occurrence of any option in `group`; this is the last-wins
    /// resolution used for mode and debug-level groups.
    pub fn last_matching(&self, group: &[Opt]) -> Option<&ParsedOption> {
        self.options.iter().rev().find(|o| group.contains(&o.opt))
    }

    /// All occurrences of options in `group`, in command-line order.
    pub fn all_matching<'a>(&'a self, group: &'a [Opt]) -> impl Iterator<Item = &'a ParsedOption> {
        self.options.iter().filter(move |o| group.contains(&o.opt))
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }
}

/// Replaces `@path` tokens naming readable absolute files with the file's
/// lines (empties discarded). Anything else passes through unchanged.
pub fn expand_response_files(arguments: Vec<String>) -> Vec<String> {
    let mut expanded = Vec::with_capacity(arguments.len());
    for argument in arguments {
        if let Some(rest) = argument.strip_prefix('@') {
            let path = Path::new(rest);
            if path.is_absolute()
                && let Ok(contents) = std::fs::read_to_string(path)
            {
                log::debug!("expanded response file {rest}");
                expanded.extend(
                    contents
                        .lines()
                        .filter(|line| !line.is_empty())
                        .map(str::to_string),
                );
                continue;
            }
        }
        expanded.push(argument);
    }
    expanded
}

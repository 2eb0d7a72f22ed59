//! Module emission decisions: whether a module artifact is produced, what
//! kind it is, what the module is called, and where the file goes.

use std::path::Path;

use crate::diagnostic::{DiagnosticEngine, DriverError};
use crate::driver::mode::{CompilerMode, LinkOutputType, OutputInfo};
use crate::options::{Opt, ParsedOptions};
use crate::file_type::FileType;
use crate::vpath::{TypedVirtualPath, VirtualPath};

/// Whether the module file is a terminal build product or an intermediate
/// consumed by later jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutput {
    TopLevel(VirtualPath),
    Auxiliary(VirtualPath),
}

impl ModuleOutput {
    pub fn path(&self) -> &VirtualPath {
        match self {
            ModuleOutput::TopLevel(path) | ModuleOutput::Auxiliary(path) => path,
        }
    }

    pub fn is_top_level(&self) -> bool {
        matches!(self, ModuleOutput::TopLevel(_))
    }
}

/// The resolved module configuration.
#[derive(Debug)]
pub struct ModuleOutputInfo {
    pub output: Option<ModuleOutput>,
    pub name: String,
}

#[derive(Clone, Copy, PartialEq)]
enum ModuleOutputKind {
    TopLevel,
    Auxiliary,
}

pub fn resolve_module_output(
    parsed: &ParsedOptions,
    output_info: &OutputInfo,
    inputs: &[TypedVirtualPath],
    working_directory: Option<&Path>,
    diagnostics: &mut DiagnosticEngine,
) -> ModuleOutputInfo {
    let mut kind = decide_kind(parsed, output_info);

    // The REPL and immediate execution never write a module.
    if matches!(
        output_info.compiler_mode,
        CompilerMode::Repl | CompilerMode::Immediate
    ) && kind.is_some()
    {
        diagnostics.report_error(DriverError::ModeCannotEmitModule);
        kind = None;
    }

    let mut name = select_name(parsed, output_info, inputs);

    if name == "Swift" && !parsed.has(Opt::ParseStdlib) {
        diagnostics.report_error(DriverError::StdlibModuleName);
        name = "__bad__".to_string();
    } else if !name.is_empty() && !is_valid_module_name(&name) {
        diagnostics.report_error(DriverError::InvalidModuleName(name.clone()));
        name = "__bad__".to_string();
    }

    let output = kind.map(|kind| {
        let path = match parsed.last_value(Opt::EmitModulePath) {
            Some(value) => VirtualPath::from_argument(value, working_directory)
                .unwrap_or_else(|| VirtualPath::Temporary(module_filename(&name))),
            None => match kind {
                ModuleOutputKind::TopLevel => {
                    VirtualPath::from_argument(&module_filename(&name), working_directory)
                        .unwrap_or(VirtualPath::Relative(module_filename(&name).into()))
                }
                ModuleOutputKind::Auxiliary => VirtualPath::Temporary(module_filename(&name)),
            },
        };
        match kind {
            ModuleOutputKind::TopLevel => ModuleOutput::TopLevel(path),
            ModuleOutputKind::Auxiliary => ModuleOutput::Auxiliary(path),
        }
    });

    ModuleOutputInfo { output, name }
}

fn decide_kind(parsed: &ParsedOptions, output_info: &OutputInfo) -> Option<ModuleOutputKind> {
    if parsed.has(Opt::EmitModule) || parsed.has(Opt::EmitModulePath) {
        return Some(ModuleOutputKind::TopLevel);
    }
    if let Some(level) = output_info.debug_info_level
        && level.requires_module()
        && output_info.linker_output_type.is_some()
    {
        return Some(ModuleOutputKind::Auxiliary);
    }
    let implies_module = parsed.has(Opt::EmitObjcHeader)
        || parsed.has(Opt::EmitObjcHeaderPath)
        || parsed.has(Opt::EmitModuleInterface)
        || parsed.has(Opt::EmitModuleInterfacePath);
    if !output_info.compiler_mode.is_single_compilation() && implies_module {
        return Some(ModuleOutputKind::Auxiliary);
    }
    None
}

fn module_filename(name: &str) -> String {
    format!("{}.{}", name, FileType::SwiftModule.extension())
}

fn select_name(parsed: &ParsedOptions, output_info: &OutputInfo, inputs: &[TypedVirtualPath]) -> String {
    if let Some(name) = parsed.last_value(Opt::ModuleName) {
        return name.to_string();
    }
    if output_info.compiler_mode == CompilerMode::Repl {
        return "REPL".to_string();
    }
    if let Some(output) = parsed.last_value(Opt::Output) {
        let stem = Path::new(output)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let had_extension = Path::new(output).extension().is_some();
        let building_library = matches!(
            output_info.linker_output_type,
            Some(LinkOutputType::DynamicLibrary) | Some(LinkOutputType::StaticLibrary)
        );
        // `liblib.dylib` names the module `lib`; a bare `lib.dylib` keeps
        // its stem rather than degrading to the empty name.
        if building_library && had_extension && stem.len() > 3 && stem.starts_with("lib") {
            return stem["lib".len()..].to_string();
        }
        return stem;
    }
    if inputs.len() == 1 {
        return inputs[0].file.basename_without_extension();
    }
    if output_info.compiler_output_type.is_none() || maybe_building_executable(output_info, parsed, inputs) {
        return "main".to_string();
    }
    String::new()
}

/// Heuristic, by design: with no linker output settled yet, a single input
/// without library-parsing flags is probably on its way to an executable.
fn maybe_building_executable(
    output_info: &OutputInfo,
    parsed: &ParsedOptions,
    inputs: &[TypedVirtualPath],
) -> bool {
    match output_info.linker_output_type {
        Some(LinkOutputType::Executable) => true,
        Some(LinkOutputType::DynamicLibrary) | Some(LinkOutputType::StaticLibrary) => false,
        None => {
            !parsed.has(Opt::ParseAsLibrary) && !parsed.has(Opt::ParseStdlib) && inputs.len() == 1
        }
    }
}

/// Reserved words that cannot name a module.
const RESERVED_WORDS: &[&str] = &[
    "associatedtype",
    "class",
    "deinit",
    "enum",
    "extension",
    "fileprivate",
    "func",
    "import",
    "init",
    "inout",
    "internal",
    "let",
    "open",
    "operator",
    "private",
    "protocol",
    "public",
    "rethrows",
    "static",
    "struct",
    "subscript",
    "typealias",
    "var",
    "break",
    "case",
    "catch",
    "continue",
    "default",
    "defer",
    "do",
    "else",
    "fallthrough",
    "for",
    "guard",
    "if",
    "in",
    "repeat",
    "return",
    "switch",
    "throw",
    "throws",
    "where",
    "while",
    "as",
    "is",
    "nil",
    "self",
    "Self",
    "super",
    "true",
    "false",
    "try",
];

fn is_valid_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return false;
    }
    !RESERVED_WORDS.contains(&name)
}

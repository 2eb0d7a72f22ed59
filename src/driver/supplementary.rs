//! Supplementary output path resolution.
//!
//! Every auxiliary artifact follows the same precedence: an explicit
//! `-*-path` value wins verbatim; otherwise the artifact must have been
//! requested by its flag at all; then `-o` is reused or re-extensioned; and
//! finally the module name supplies a default.

use std::path::Path;

use crate::file_type::FileType;
use crate::options::{Opt, ParsedOptions};
use crate::vpath::VirtualPath;

/// Resolved paths for each requested auxiliary artifact. `None` means the
/// artifact was not requested.
#[derive(Debug, Default, Clone)]
pub struct SupplementaryOutputPaths {
    pub dependencies: Option<VirtualPath>,
    pub reference_dependencies: Option<VirtualPath>,
    pub serialized_diagnostics: Option<VirtualPath>,
    pub objc_header: Option<VirtualPath>,
    pub loaded_module_trace: Option<VirtualPath>,
    pub tbd: Option<VirtualPath>,
    pub module_doc: Option<VirtualPath>,
    pub module_interface: Option<VirtualPath>,
    pub optimization_record: Option<VirtualPath>,
}

pub fn resolve_supplementary_outputs(
    parsed: &ParsedOptions,
    compiler_output_type: Option<FileType>,
    module_name: &str,
    working_directory: Option<&Path>,
) -> SupplementaryOutputPaths {
    let resolve = |is_output: Opt, output_path: Opt, file_type: FileType| {
        supplementary_path(
            parsed,
            is_output,
            output_path,
            file_type,
            compiler_output_type,
            module_name,
            working_directory,
        )
    };

    SupplementaryOutputPaths {
        dependencies: resolve(
            Opt::EmitDependencies,
            Opt::EmitDependenciesPath,
            FileType::Dependencies,
        ),
        reference_dependencies: resolve(
            Opt::EmitReferenceDependencies,
            Opt::EmitReferenceDependenciesPath,
            FileType::SwiftDeps,
        ),
        serialized_diagnostics: resolve(
            Opt::SerializeDiagnostics,
            Opt::SerializeDiagnosticsPath,
            FileType::Diagnostics,
        ),
        objc_header: resolve(
            Opt::EmitObjcHeader,
            Opt::EmitObjcHeaderPath,
            FileType::ObjcHeader,
        ),
        loaded_module_trace: resolve(
            Opt::EmitLoadedModuleTrace,
            Opt::EmitLoadedModuleTracePath,
            FileType::ModuleTrace,
        ),
        tbd: resolve(Opt::EmitTbd, Opt::EmitTbdPath, FileType::Tbd),
        module_doc: resolve(
            Opt::EmitModuleDoc,
            Opt::EmitModuleDocPath,
            FileType::SwiftDocumentation,
        ),
        module_interface: resolve(
            Opt::EmitModuleInterface,
            Opt::EmitModuleInterfacePath,
            FileType::SwiftInterface,
        ),
        optimization_record: resolve(
            Opt::SaveOptimizationRecord,
            Opt::SaveOptimizationRecordPath,
            FileType::OptimizationRecord,
        ),
    }
}

/// The precedence chain for one artifact.
fn supplementary_path(
    parsed: &ParsedOptions,
    is_output: Opt,
    output_path: Opt,
    file_type: FileType,
    compiler_output_type: Option<FileType>,
    module_name: &str,
    working_directory: Option<&Path>,
) -> Option<VirtualPath> {
    // An explicit path is taken verbatim and also satisfies the flag form.
    if let Some(value) = parsed.last_value(output_path) {
        return VirtualPath::from_argument(value, working_directory);
    }
    if !parsed.has(is_output) {
        return None;
    }
    if let Some(output) = parsed.last_value(Opt::Output) {
        let base = VirtualPath::from_argument(output, working_directory)?;
        if compiler_output_type == Some(file_type) {
            return Some(base);
        }
        return Some(base.replacing_extension(file_type.extension()));
    }
    let filename = format!("{}.{}", module_name, file_type.extension());
    VirtualPath::from_argument(&filename, working_directory)
}

//! Artifact kinds the driver reasons about.
//!
//! Every file the driver touches, whether handed to it on the command line or
//! produced by a planned job, is tagged with one of these types. The mapping
//! from extensions is deliberately partial: an input with an unrecognized
//! extension is treated as an object file and handed to the linker, which is
//! where such files almost always belong.

use std::fmt;

/// Closed enumeration of the file types known to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Swift source code.
    Swift,
    /// Lowered SIL, after guaranteed optimization passes.
    Sil,
    /// Raw SIL, straight out of SILGen.
    RawSil,
    /// Serialized SIL.
    Sib,
    /// Raw serialized SIL.
    RawSib,
    /// A compiled object file.
    Object,
    /// Extracted autolink directives.
    Autolink,
    /// A serialized module.
    SwiftModule,
    /// Serialized module documentation.
    SwiftDocumentation,
    /// A textual module interface.
    SwiftInterface,
    /// Per-file reference dependencies used by incremental builds.
    SwiftDeps,
    /// Textual assembly.
    Assembly,
    /// Textual LLVM IR.
    LlvmIr,
    /// LLVM bitcode.
    LlvmBitcode,
    /// A dumped AST.
    Ast,
    /// A precompiled bridging header.
    Pch,
    /// The list of imported modules.
    ImportedModules,
    /// Index store data.
    IndexData,
    /// A migrator remap file.
    Remap,
    /// Serialized diagnostics.
    Diagnostics,
    /// Make-style dependencies.
    Dependencies,
    /// A generated Objective-C compatibility header.
    ObjcHeader,
    /// The loaded module trace.
    ModuleTrace,
    /// A text-based dynamic library stub.
    Tbd,
    /// An optimization record.
    OptimizationRecord,
    /// A linked image (executable or library).
    Image,
    /// A dSYM debug-symbol bundle.
    DSym,
}

impl FileType {
    /// Every member, for exhaustive iteration in tests and tables.
    pub const ALL: &'static [FileType] = &[
        FileType::Swift,
        FileType::Sil,
        FileType::RawSil,
        FileType::Sib,
        FileType::RawSib,
        FileType::Object,
        FileType::Autolink,
        FileType::SwiftModule,
        FileType::SwiftDocumentation,
        FileType::SwiftInterface,
        FileType::SwiftDeps,
        FileType::Assembly,
        FileType::LlvmIr,
        FileType::LlvmBitcode,
        FileType::Ast,
        FileType::Pch,
        FileType::ImportedModules,
        FileType::IndexData,
        FileType::Remap,
        FileType::Diagnostics,
        FileType::Dependencies,
        FileType::ObjcHeader,
        FileType::ModuleTrace,
        FileType::Tbd,
        FileType::OptimizationRecord,
        FileType::Image,
        FileType::DSym,
    ];

    /// The canonical file extension for this type.
    ///
    /// Raw SIL/SIB share the extension of their cooked counterparts, exactly
    /// as the frontend writes them.
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Swift => "swift",
            FileType::Sil | FileType::RawSil => "sil",
            FileType::Sib | FileType::RawSib => "sib",
            FileType::Object => "o",
            FileType::Autolink => "autolink",
            FileType::SwiftModule => "swiftmodule",
            FileType::SwiftDocumentation => "swiftdoc",
            FileType::SwiftInterface => "swiftinterface",
            FileType::SwiftDeps => "swiftdeps",
            FileType::Assembly => "s",
            FileType::LlvmIr => "ll",
            FileType::LlvmBitcode => "bc",
            FileType::Ast => "ast",
            FileType::Pch => "pch",
            FileType::ImportedModules => "importedmodules",
            FileType::IndexData => "indexdata",
            FileType::Remap => "remap",
            FileType::Diagnostics => "dia",
            FileType::Dependencies => "d",
            FileType::ObjcHeader => "h",
            FileType::ModuleTrace => "trace.json",
            FileType::Tbd => "tbd",
            FileType::OptimizationRecord => "opt.yaml",
            FileType::Image => "out",
            FileType::DSym => "dsym",
        }
    }

    /// Maps a file extension back to a type. Partial; callers pick the
    /// fallback (the input classifier uses `Object`).
    pub fn from_extension(extension: &str) -> Option<FileType> {
        let ty = match extension {
            "swift" => FileType::Swift,
            "sil" => FileType::Sil,
            "sib" => FileType::Sib,
            "o" => FileType::Object,
            "autolink" => FileType::Autolink,
            "swiftmodule" => FileType::SwiftModule,
            "swiftdoc" => FileType::SwiftDocumentation,
            "swiftinterface" => FileType::SwiftInterface,
            "swiftdeps" => FileType::SwiftDeps,
            "s" => FileType::Assembly,
            "ll" => FileType::LlvmIr,
            "bc" => FileType::LlvmBitcode,
            "ast" => FileType::Ast,
            "pch" => FileType::Pch,
            "importedmodules" => FileType::ImportedModules,
            "indexdata" => FileType::IndexData,
            "remap" => FileType::Remap,
            "dia" => FileType::Diagnostics,
            "d" => FileType::Dependencies,
            "h" => FileType::ObjcHeader,
            "trace.json" => FileType::ModuleTrace,
            "tbd" => FileType::Tbd,
            "opt.yaml" => FileType::OptimizationRecord,
            "out" => FileType::Image,
            "dsym" => FileType::DSym,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether files of this type are fed to the frontend as compilation
    /// inputs (and therefore participate in batch partitioning).
    pub fn is_part_of_swift_compilation(self) -> bool {
        matches!(self, FileType::Swift | FileType::Sil | FileType::Sib)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::Swift => "swift source",
            FileType::Sil => "SIL",
            FileType::RawSil => "raw SIL",
            FileType::Sib => "SIB",
            FileType::RawSib => "raw SIB",
            FileType::Object => "object file",
            FileType::Autolink => "autolink file",
            FileType::SwiftModule => "swift module",
            FileType::SwiftDocumentation => "swift module documentation",
            FileType::SwiftInterface => "swift module interface",
            FileType::SwiftDeps => "reference dependencies",
            FileType::Assembly => "assembly",
            FileType::LlvmIr => "LLVM IR",
            FileType::LlvmBitcode => "LLVM bitcode",
            FileType::Ast => "AST dump",
            FileType::Pch => "precompiled header",
            FileType::ImportedModules => "imported modules list",
            FileType::IndexData => "index data",
            FileType::Remap => "remap file",
            FileType::Diagnostics => "serialized diagnostics",
            FileType::Dependencies => "dependencies file",
            FileType::ObjcHeader => "Objective-C header",
            FileType::ModuleTrace => "loaded module trace",
            FileType::Tbd => "TBD stub",
            FileType::OptimizationRecord => "optimization record",
            FileType::Image => "linked image",
            FileType::DSym => "debug symbols",
        };
        f.write_str(name)
    }
}

//! Virtual paths for driver inputs and outputs.
//!
//! Planned jobs routinely reference files that do not exist yet: outputs of
//! earlier jobs, temporaries that only materialize at execution time, and
//! spilled file lists. Paths are therefore a tagged union rather than raw
//! `PathBuf`s; resolution against the filesystem happens in the executor.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::file_type::FileType;

/// A path as the driver sees it.
///
/// Paths are lexically normalized (`.` components removed) at construction,
/// so the derived equality compares canonical forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VirtualPath {
    /// An absolute path on disk.
    Absolute(PathBuf),
    /// A path relative to the working directory.
    Relative(PathBuf),
    /// Standard input, spelled `-` on the command line.
    StandardInput,
    /// A temporary file. The name is unique within one driver invocation;
    /// the executor places it in a per-invocation temporary directory.
    Temporary(String),
    /// A file list: a named temporary whose contents are the given paths,
    /// one per line, spilled at execution time.
    FileList(String, Vec<VirtualPath>),
}

impl VirtualPath {
    /// Builds a path from a command-line argument.
    ///
    /// `-` means standard input and is preserved verbatim. Relative paths
    /// are resolved against the working directory when one is set. Returns
    /// `None` for the empty string, which no filesystem accepts.
    pub fn from_argument(argument: &str, working_directory: Option<&Path>) -> Option<VirtualPath> {
        if argument == "-" {
            return Some(VirtualPath::StandardInput);
        }
        if argument.is_empty() {
            return None;
        }
        let path = normalize(Path::new(argument));
        if path.is_absolute() {
            Some(VirtualPath::Absolute(path))
        } else if let Some(dir) = working_directory {
            Some(VirtualPath::Absolute(normalize(&dir.join(path))))
        } else {
            Some(VirtualPath::Relative(path))
        }
    }

    /// The display name of the path: what an argument vector would show.
    pub fn name(&self) -> String {
        match self {
            VirtualPath::Absolute(p) | VirtualPath::Relative(p) => p.display().to_string(),
            VirtualPath::StandardInput => "-".to_string(),
            VirtualPath::Temporary(name) | VirtualPath::FileList(name, _) => name.clone(),
        }
    }

    /// The file name without its final extension.
    pub fn basename_without_extension(&self) -> String {
        let name = self.name();
        Path::new(&name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Replaces the path's extension (or appends one if it has none),
    /// preserving the variant.
    pub fn replacing_extension(&self, extension: &str) -> VirtualPath {
        match self {
            VirtualPath::Absolute(p) => {
                let mut p = p.clone();
                p.set_extension(extension);
                VirtualPath::Absolute(p)
            }
            VirtualPath::Relative(p) => {
                let mut p = p.clone();
                p.set_extension(extension);
                VirtualPath::Relative(p)
            }
            VirtualPath::Temporary(name) => {
                let mut p = PathBuf::from(name);
                p.set_extension(extension);
                VirtualPath::Temporary(p.display().to_string())
            }
            other => other.clone(),
        }
    }

    /// Appends `.extension` to the full name, keeping the existing one.
    /// `a.out` + `dSYM` becomes `a.out.dSYM`.
    pub fn appending_extension(&self, extension: &str) -> VirtualPath {
        match self {
            VirtualPath::Absolute(p) => {
                VirtualPath::Absolute(PathBuf::from(format!("{}.{}", p.display(), extension)))
            }
            VirtualPath::Relative(p) => {
                VirtualPath::Relative(PathBuf::from(format!("{}.{}", p.display(), extension)))
            }
            VirtualPath::Temporary(name) => {
                VirtualPath::Temporary(format!("{}.{}", name, extension))
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Removes `.` components. `..` is left alone: collapsing it lexically is
/// wrong in the presence of symlinks.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// A virtual path paired with the file type the driver assigned to it.
/// The primary currency of job inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedVirtualPath {
    pub file: VirtualPath,
    pub file_type: FileType,
}

impl TypedVirtualPath {
    pub fn new(file: VirtualPath, file_type: FileType) -> TypedVirtualPath {
        TypedVirtualPath { file, file_type }
    }
}

impl fmt::Display for TypedVirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)
    }
}

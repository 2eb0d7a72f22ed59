//! The job model: immutable descriptions of planned sub-process invocations.
//!
//! A job carries everything the executor needs and nothing it does not: the
//! tool to run, typed inputs and outputs for dependency ordering, and
//! argument templates. Templates decouple argument construction from path
//! resolution, which happens at execution time.

use std::fmt;
use std::path::PathBuf;

use crate::vpath::{TypedVirtualPath, VirtualPath};

/// What a job does, for display and tests. The planner otherwise treats
/// jobs as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Compile,
    EmitModule,
    MergeModule,
    AutolinkExtract,
    Link,
    GenerateDsym,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobKind::Compile => "compile",
            JobKind::EmitModule => "emit-module",
            JobKind::MergeModule => "merge-module",
            JobKind::AutolinkExtract => "autolink-extract",
            JobKind::Link => "link",
            JobKind::GenerateDsym => "generate-dsym",
        };
        f.write_str(name)
    }
}

/// One argument of a job's command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgTemplate {
    /// A verbatim token.
    Flag(String),
    /// A path, resolved against the working directory at execution time.
    Path(VirtualPath),
    /// A file list: the contents are spilled to a temporary file at
    /// execution time and the file's path is substituted.
    FileList(String, Vec<VirtualPath>),
}

impl ArgTemplate {
    pub fn flag(token: impl Into<String>) -> ArgTemplate {
        ArgTemplate::Flag(token.into())
    }

    pub fn path(path: VirtualPath) -> ArgTemplate {
        ArgTemplate::Path(path)
    }
}

impl fmt::Display for ArgTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgTemplate::Flag(token) => f.write_str(token),
            ArgTemplate::Path(path) => write!(f, "{path}"),
            ArgTemplate::FileList(name, _) => write!(f, "@{name}"),
        }
    }
}

/// An immutable sub-process invocation. The planner appends jobs in
/// dependency order and never touches them again.
#[derive(Debug, Clone)]
pub struct Job {
    pub kind: JobKind,
    pub tool: PathBuf,
    pub inputs: Vec<TypedVirtualPath>,
    pub outputs: Vec<TypedVirtualPath>,
    pub args: Vec<ArgTemplate>,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

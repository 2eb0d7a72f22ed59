//! Toolchain selection and platform-specific link behavior.
//!
//! The planner stays platform-agnostic; everything that differs between
//! platforms (which tools exist, how a link line is assembled, whether
//! autolink directives need extracting) lives behind the `Toolchain` trait.

pub mod darwin;
pub mod unix;

use std::path::PathBuf;

use target_lexicon::{OperatingSystem, Triple};

use crate::diagnostic::FatalError;
use crate::driver::mode::LinkOutputType;
use crate::job::{ArgTemplate, Job};
use crate::options::{Opt, ParsedOptions};
use crate::vpath::{TypedVirtualPath, VirtualPath};

pub use darwin::DarwinToolchain;
pub use unix::GenericUnixToolchain;

/// The external tools a plan can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverTool {
    Frontend,
    Linker,
    StaticLinker,
    AutolinkExtract,
    Dsymutil,
}

/// Everything a toolchain needs to assemble a link job.
pub struct LinkContext<'a> {
    pub inputs: &'a [TypedVirtualPath],
    pub output: VirtualPath,
    pub output_type: LinkOutputType,
    pub target: &'a Triple,
    pub sdk_path: Option<&'a std::path::Path>,
    pub parsed_options: &'a ParsedOptions,
}

pub trait Toolchain {
    fn name(&self) -> &'static str;

    /// The program name for a tool on this platform.
    fn tool_program(&self, tool: DriverTool) -> &'static str;

    /// Locates a tool in `PATH`, falling back to the bare program name so
    /// plans can still be printed on machines without the tool installed.
    fn find_tool(&self, tool: DriverTool) -> PathBuf {
        let program = self.tool_program(tool);
        find_in_path(program).unwrap_or_else(|| PathBuf::from(program))
    }

    /// Whether objects on this platform embed autolink directives that a
    /// separate extraction step must collect before linking.
    fn requires_autolink_extract(&self) -> bool;

    /// The platform's default SDK, when one can be discovered.
    fn default_sdk_path(&self) -> Option<PathBuf> {
        None
    }

    /// Directory holding the platform's runtime libraries.
    fn platform_library_path(&self) -> Option<PathBuf> {
        None
    }

    /// The output name used when `-o` is absent.
    fn default_linker_output_name(&self, output_type: LinkOutputType, module_name: &str) -> String;

    /// Assembles the link job for this platform.
    fn link_job(&self, context: &LinkContext<'_>) -> Job;
}

/// Picks the toolchain for a target triple.
pub fn toolchain_for_target(triple: &Triple) -> Result<Box<dyn Toolchain>, FatalError> {
    match triple.operating_system {
        OperatingSystem::Darwin
        | OperatingSystem::MacOSX { .. }
        | OperatingSystem::Ios
        | OperatingSystem::Tvos
        | OperatingSystem::Watchos => Ok(Box::new(DarwinToolchain)),
        OperatingSystem::Linux | OperatingSystem::Freebsd | OperatingSystem::Haiku => {
            Ok(Box::new(GenericUnixToolchain))
        }
        _ => Err(FatalError::UnsupportedToolchain(triple.to_string())),
    }
}

/// Whether the target is an Apple platform.
pub fn is_darwin(triple: &Triple) -> bool {
    matches!(
        triple.operating_system,
        OperatingSystem::Darwin
            | OperatingSystem::MacOSX { .. }
            | OperatingSystem::Ios
            | OperatingSystem::Tvos
            | OperatingSystem::Watchos
    )
}

/// Searches `PATH` for a program.
fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Expands the user's linker pass-through options in command-line order.
pub(crate) fn passthrough_linker_args(parsed: &ParsedOptions) -> Vec<ArgTemplate> {
    const PASSTHROUGH: &[Opt] = &[
        Opt::LibrarySearchPath,
        Opt::LinkLibrary,
        Opt::FrameworkSearchPath,
        Opt::Framework,
        Opt::Xlinker,
    ];

    let mut args = Vec::new();
    for option in parsed.all_matching(PASSTHROUGH) {
        let value = option.value.as_deref().unwrap_or_default();
        match option.opt {
            Opt::LibrarySearchPath => args.push(ArgTemplate::flag(format!("-L{value}"))),
            Opt::LinkLibrary => args.push(ArgTemplate::flag(format!("-l{value}"))),
            Opt::FrameworkSearchPath => args.push(ArgTemplate::flag(format!("-F{value}"))),
            Opt::Framework => {
                args.push(ArgTemplate::flag("-framework"));
                args.push(ArgTemplate::flag(value));
            }
            Opt::Xlinker => {
                args.push(ArgTemplate::flag("-Xlinker"));
                args.push(ArgTemplate::flag(value));
            }
            _ => {}
        }
    }
    args
}

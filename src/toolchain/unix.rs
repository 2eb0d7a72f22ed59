//! The generic Unix toolchain (Linux, FreeBSD, Haiku).
//!
//! Links through `clang`, archives through `ar`. Objects on these platforms
//! embed autolink directives, so a `swift-autolink-extract` step runs before
//! the link and its output file joins the linker inputs.

use std::path::PathBuf;

use crate::driver::mode::LinkOutputType;
use crate::file_type::FileType;
use crate::job::{ArgTemplate, Job, JobKind};
use crate::toolchain::{DriverTool, LinkContext, Toolchain, passthrough_linker_args};
use crate::vpath::TypedVirtualPath;

pub struct GenericUnixToolchain;

impl Toolchain for GenericUnixToolchain {
    fn name(&self) -> &'static str {
        "generic-unix"
    }

    fn tool_program(&self, tool: DriverTool) -> &'static str {
        match tool {
            DriverTool::Frontend => "swift-frontend",
            DriverTool::Linker => "clang",
            DriverTool::StaticLinker => "ar",
            DriverTool::AutolinkExtract => "swift-autolink-extract",
            DriverTool::Dsymutil => "dsymutil",
        }
    }

    fn requires_autolink_extract(&self) -> bool {
        true
    }

    fn platform_library_path(&self) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/lib/swift/linux"))
    }

    fn default_linker_output_name(&self, output_type: LinkOutputType, module_name: &str) -> String {
        match output_type {
            LinkOutputType::Executable => module_name.to_string(),
            LinkOutputType::DynamicLibrary => format!("lib{module_name}.so"),
            LinkOutputType::StaticLibrary => format!("lib{module_name}.a"),
        }
    }

    fn link_job(&self, context: &LinkContext<'_>) -> Job {
        if context.output_type == LinkOutputType::StaticLibrary {
            return self.archive_job(context);
        }

        let mut args = vec![ArgTemplate::flag("-fuse-ld=gold")];
        for input in context.inputs {
            match input.file_type {
                // Serialized modules and their documentation only matter for
                // dependency ordering here; the debugger finds them on disk.
                FileType::SwiftModule | FileType::SwiftDocumentation => {}
                _ => args.push(ArgTemplate::path(input.file.clone())),
            }
        }

        if context.output_type == LinkOutputType::DynamicLibrary {
            args.push(ArgTemplate::flag("-shared"));
        }
        args.push(ArgTemplate::flag("-target"));
        args.push(ArgTemplate::flag(context.target.to_string()));
        if let Some(dir) = self.platform_library_path() {
            args.push(ArgTemplate::flag(format!("-L{}", dir.display())));
        }
        args.extend(passthrough_linker_args(context.parsed_options));
        args.push(ArgTemplate::flag("-o"));
        args.push(ArgTemplate::path(context.output.clone()));

        Job {
            kind: JobKind::Link,
            tool: self.find_tool(DriverTool::Linker),
            inputs: context.inputs.to_vec(),
            outputs: vec![TypedVirtualPath::new(context.output.clone(), FileType::Image)],
            args,
        }
    }
}

impl GenericUnixToolchain {
    fn archive_job(&self, context: &LinkContext<'_>) -> Job {
        let mut args = vec![
            ArgTemplate::flag("crs"),
            ArgTemplate::path(context.output.clone()),
        ];
        for input in context.inputs {
            if input.file_type == FileType::Object {
                args.push(ArgTemplate::path(input.file.clone()));
            }
        }
        Job {
            kind: JobKind::Link,
            tool: self.find_tool(DriverTool::StaticLinker),
            inputs: context.inputs.to_vec(),
            outputs: vec![TypedVirtualPath::new(context.output.clone(), FileType::Image)],
            args,
        }
    }
}

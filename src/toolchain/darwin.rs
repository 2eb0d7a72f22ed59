//! The Apple-platform toolchain.
//!
//! Links through `clang`, archives through `libtool`, and hands serialized
//! modules to the linker with `-add_ast_path` so the debugger can find them.

use std::path::PathBuf;
use std::process::Command;

use crate::driver::mode::LinkOutputType;
use crate::file_type::FileType;
use crate::job::{ArgTemplate, Job, JobKind};
use crate::toolchain::{DriverTool, LinkContext, Toolchain, passthrough_linker_args};
use crate::vpath::{TypedVirtualPath, VirtualPath};

pub struct DarwinToolchain;

impl Toolchain for DarwinToolchain {
    fn name(&self) -> &'static str {
        "darwin"
    }

    fn tool_program(&self, tool: DriverTool) -> &'static str {
        match tool {
            DriverTool::Frontend => "swift-frontend",
            DriverTool::Linker => "clang",
            DriverTool::StaticLinker => "libtool",
            DriverTool::AutolinkExtract => "swift-autolink-extract",
            DriverTool::Dsymutil => "dsymutil",
        }
    }

    fn requires_autolink_extract(&self) -> bool {
        false
    }

    /// Asks `xcrun` for the active SDK. Failures just mean "no default".
    fn default_sdk_path(&self) -> Option<PathBuf> {
        let output = Command::new("xcrun")
            .args(["--sdk", "macosx", "--show-sdk-path"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let path = String::from_utf8(output.stdout).ok()?;
        let path = path.trim();
        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    fn platform_library_path(&self) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/lib/swift"))
    }

    fn default_linker_output_name(&self, output_type: LinkOutputType, module_name: &str) -> String {
        match output_type {
            LinkOutputType::Executable => module_name.to_string(),
            LinkOutputType::DynamicLibrary => format!("lib{module_name}.dylib"),
            LinkOutputType::StaticLibrary => format!("lib{module_name}.a"),
        }
    }

    fn link_job(&self, context: &LinkContext<'_>) -> Job {
        if context.output_type == LinkOutputType::StaticLibrary {
            return self.static_link_job(context);
        }

        let mut args = Vec::new();
        for input in context.inputs {
            match input.file_type {
                FileType::SwiftModule => {
                    args.push(ArgTemplate::flag("-Xlinker"));
                    args.push(ArgTemplate::flag("-add_ast_path"));
                    args.push(ArgTemplate::flag("-Xlinker"));
                    args.push(ArgTemplate::path(input.file.clone()));
                }
                // Documentation rides along for dependency ordering only.
                FileType::SwiftDocumentation => {}
                _ => args.push(ArgTemplate::path(input.file.clone())),
            }
        }

        if context.output_type == LinkOutputType::DynamicLibrary {
            args.push(ArgTemplate::flag("-dynamiclib"));
        }
        args.push(ArgTemplate::flag("-target"));
        args.push(ArgTemplate::flag(context.target.to_string()));
        if let Some(sdk) = context.sdk_path {
            args.push(ArgTemplate::flag("-isysroot"));
            args.push(ArgTemplate::path(VirtualPath::Absolute(sdk.to_path_buf())));
        }
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

impl DarwinToolchain {
    fn static_link_job(&self, context: &LinkContext<'_>) -> Job {
        let mut args = vec![
            ArgTemplate::flag("-static"),
            ArgTemplate::flag("-o"),
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

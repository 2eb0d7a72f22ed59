//! Build planning.
//!
//! Consumes the resolved configuration and emits the job list in dependency
//! order: an optional emit-module job, the compile jobs, an optional
//! merge-module job for raw module inputs, autolink extraction where the
//! toolchain needs it, the link job, and debug-symbol generation. Jobs are
//! never modified after they are appended; the only mutation here is
//! accumulation into the planner's local collections.

use crate::diagnostic::{DiagnosticEngine, DriverError};
use crate::driver::batch;
use crate::driver::config::Driver;
use crate::driver::mode::{CompilerMode, LinkOutputType};
use crate::file_type::FileType;
use crate::job::{ArgTemplate, Job, JobKind};
use crate::toolchain::{self, DriverTool, LinkContext};
use crate::vpath::{TypedVirtualPath, VirtualPath};

/// Above this many inputs the command line spills them to a file list.
const FILELIST_THRESHOLD: usize = 128;

pub(crate) fn plan_build(driver: &Driver, diagnostics: &mut DiagnosticEngine) -> Vec<Job> {
    Planner {
        driver,
        diagnostics,
        jobs: Vec::new(),
        linker_inputs: Vec::new(),
        module_inputs: Vec::new(),
        module_produced: false,
        planned_first_compile: false,
        temp_counter: 0,
    }
    .plan()
}

struct Planner<'a> {
    driver: &'a Driver,
    diagnostics: &'a mut DiagnosticEngine,
    jobs: Vec<Job>,
    /// Objects, autolink files, and debug modules headed for the link job.
    linker_inputs: Vec<TypedVirtualPath>,
    /// Raw serialized modules headed for a merge-module job.
    module_inputs: Vec<TypedVirtualPath>,
    module_produced: bool,
    planned_first_compile: bool,
    temp_counter: usize,
}

impl Planner<'_> {
    fn plan(mut self) -> Vec<Job> {
        let driver = self.driver;
        let swift_inputs = driver.swift_inputs();

        let separate_module_job = driver.module_output.is_some()
            && !driver.compiler_mode.is_single_compilation()
            && !swift_inputs.is_empty();
        if separate_module_job {
            self.add_emit_module_job(&swift_inputs);
        }

        if !swift_inputs.is_empty() {
            if driver.compiler_mode.is_single_compilation() {
                self.add_single_compile_job(&swift_inputs);
            } else {
                self.add_standard_compile_jobs(&swift_inputs);
            }
        }

        self.classify_other_inputs(separate_module_job);

        if driver.module_output.is_some() && !self.module_inputs.is_empty() {
            self.add_merge_module_job();
        }

        if driver.toolchain.requires_autolink_extract()
            && self
                .linker_inputs
                .iter()
                .any(|input| input.file_type == FileType::Object)
        {
            self.add_autolink_extract_job();
        }

        // Debug levels that reference AST types hand the module to the
        // linker alongside the objects.
        if let (Some(module_output), Some(level)) = (&driver.module_output, driver.debug_info_level)
            && level.requires_module()
            && driver.linker_output_type.is_some()
            && self.module_produced
        {
            self.linker_inputs.push(TypedVirtualPath::new(
                module_output.path().clone(),
                FileType::SwiftModule,
            ));
        }

        let link_output = match driver.linker_output_type {
            Some(output_type) if !self.linker_inputs.is_empty() => {
                Some(self.add_link_job(output_type))
            }
            _ => None,
        };

        if let Some(image) = link_output
            && toolchain::is_darwin(&driver.target)
            && driver.debug_info_level.is_some()
        {
            self.add_dsym_job(image);
        }

        log::debug!("planned {} jobs", self.jobs.len());
        self.jobs
    }

    /// One job per Swift input, or one per batch partition when batch mode
    /// actually partitions. Each partition's job sits at the position of its
    /// first file.
    fn add_standard_compile_jobs(&mut self, swift_inputs: &[TypedVirtualPath]) {
        let partitions = match &self.driver.compiler_mode {
            CompilerMode::BatchCompile(info) => {
                batch::partition_inputs(swift_inputs, info, self.driver.num_threads)
            }
            _ => None,
        };

        match partitions {
            Some(parts) => {
                for input in swift_inputs {
                    let index = parts.assignment[input];
                    if parts.partitions[index].first() == Some(input) {
                        self.add_compile_job(&parts.partitions[index], swift_inputs);
                    }
                }
            }
            None => {
                for input in swift_inputs {
                    self.add_compile_job(std::slice::from_ref(input), swift_inputs);
                }
            }
        }
    }

    fn add_compile_job(&mut self, primaries: &[TypedVirtualPath], swift_inputs: &[TypedVirtualPath]) {
        let driver = self.driver;
        let mut args = vec![
            ArgTemplate::flag("-frontend"),
            ArgTemplate::flag(frontend_mode_flag(driver.compiler_output_type)),
        ];
        self.push_input_args(&mut args, swift_inputs, primaries);
        self.push_common_args(&mut args);

        let single_swift_input = swift_inputs.len() == 1;
        let mut outputs = Vec::new();
        for primary in primaries {
            if let Some(output_type) = driver.compiler_output_type {
                let path = self.primary_output_path(primary, output_type, single_swift_input);
                args.push(ArgTemplate::flag("-o"));
                args.push(ArgTemplate::path(path.clone()));
                outputs.push(TypedVirtualPath::new(path, output_type));
            }
            self.push_per_primary_supplementary(&mut args, &mut outputs, primary, single_swift_input);
        }

        // The loaded module trace and the TBD stub are whole-module
        // artifacts written by a single frontend; the first compile job
        // carries them.
        if !self.planned_first_compile {
            self.planned_first_compile = true;
            let supplementary = &driver.supplementary_outputs;
            for (flag, configured, file_type) in [
                (
                    "-emit-loaded-module-trace-path",
                    &supplementary.loaded_module_trace,
                    FileType::ModuleTrace,
                ),
                ("-emit-tbd-path", &supplementary.tbd, FileType::Tbd),
            ] {
                if let Some(path) = configured {
                    args.push(ArgTemplate::flag(flag));
                    args.push(ArgTemplate::path(path.clone()));
                    outputs.push(TypedVirtualPath::new(path.clone(), file_type));
                }
            }
        }

        if driver.linker_output_type.is_some() {
            for output in &outputs {
                if output.file_type == FileType::Object {
                    self.linker_inputs.push(output.clone());
                }
            }
        }

        self.jobs.push(Job {
            kind: JobKind::Compile,
            tool: driver.toolchain.find_tool(DriverTool::Frontend),
            inputs: swift_inputs.to_vec(),
            outputs,
            args,
        });
    }

    /// The whole-module frontend invocation of single-compile mode.
    fn add_single_compile_job(&mut self, swift_inputs: &[TypedVirtualPath]) {
        let driver = self.driver;
        let mut args = vec![
            ArgTemplate::flag("-frontend"),
            ArgTemplate::flag(frontend_mode_flag(driver.compiler_output_type)),
        ];
        self.push_input_args(&mut args, swift_inputs, &[]);
        self.push_common_args(&mut args);
        if driver.num_threads > 0 {
            args.push(ArgTemplate::flag("-num-threads"));
            args.push(ArgTemplate::flag(driver.num_threads.to_string()));
        }

        let mut outputs = Vec::new();
        if let Some(output_type) = driver.compiler_output_type {
            let module_stem = if driver.module_name.is_empty() {
                "main"
            } else {
                driver.module_name.as_str()
            };
            let filename = format!("{}.{}", module_stem, output_type.extension());
            let path = if driver.linker_output_type.is_some() {
                VirtualPath::Temporary(filename)
            } else if let Some(output) = driver.parsed_options.last_value(crate::options::Opt::Output)
            {
                VirtualPath::from_argument(output, driver.working_directory.as_deref())
                    .unwrap_or(VirtualPath::Relative(filename.into()))
            } else {
                VirtualPath::Relative(filename.into())
            };
            args.push(ArgTemplate::flag("-o"));
            args.push(ArgTemplate::path(path.clone()));
            if driver.linker_output_type.is_some() && output_type == FileType::Object {
                self.linker_inputs
                    .push(TypedVirtualPath::new(path.clone(), output_type));
            }
            outputs.push(TypedVirtualPath::new(path, output_type));
        }

        // Single compile emits the module itself; no separate job exists.
        if let Some(module_output) = &driver.module_output {
            args.push(ArgTemplate::flag("-emit-module-path"));
            args.push(ArgTemplate::path(module_output.path().clone()));
            outputs.push(TypedVirtualPath::new(
                module_output.path().clone(),
                FileType::SwiftModule,
            ));
            self.push_module_level_supplementary(&mut args, &mut outputs);
            self.module_produced = true;
        }

        let supplementary = &driver.supplementary_outputs;
        for (flag, configured, file_type) in [
            (
                "-emit-dependencies-path",
                &supplementary.dependencies,
                FileType::Dependencies,
            ),
            (
                "-emit-reference-dependencies-path",
                &supplementary.reference_dependencies,
                FileType::SwiftDeps,
            ),
            (
                "-serialize-diagnostics-path",
                &supplementary.serialized_diagnostics,
                FileType::Diagnostics,
            ),
            (
                "-save-optimization-record-path",
                &supplementary.optimization_record,
                FileType::OptimizationRecord,
            ),
            (
                "-emit-loaded-module-trace-path",
                &supplementary.loaded_module_trace,
                FileType::ModuleTrace,
            ),
            ("-emit-tbd-path", &supplementary.tbd, FileType::Tbd),
        ] {
            if let Some(path) = configured {
                args.push(ArgTemplate::flag(flag));
                args.push(ArgTemplate::path(path.clone()));
                outputs.push(TypedVirtualPath::new(path.clone(), file_type));
            }
        }

        self.jobs.push(Job {
            kind: JobKind::Compile,
            tool: driver.toolchain.find_tool(DriverTool::Frontend),
            inputs: swift_inputs.to_vec(),
            outputs,
            args,
        });
    }

    fn add_emit_module_job(&mut self, swift_inputs: &[TypedVirtualPath]) {
        let driver = self.driver;
        let Some(module_output) = &driver.module_output else {
            return;
        };
        let module_path = module_output.path().clone();

        let mut args = vec![ArgTemplate::flag("-frontend"), ArgTemplate::flag("-emit-module")];
        self.push_input_args(&mut args, swift_inputs, &[]);
        self.push_common_args(&mut args);
        args.push(ArgTemplate::flag("-o"));
        args.push(ArgTemplate::path(module_path.clone()));

        let mut outputs = vec![TypedVirtualPath::new(module_path, FileType::SwiftModule)];
        self.push_module_level_supplementary(&mut args, &mut outputs);

        self.module_produced = true;
        self.jobs.push(Job {
            kind: JobKind::EmitModule,
            tool: driver.toolchain.find_tool(DriverTool::Frontend),
            inputs: swift_inputs.to_vec(),
            outputs,
            args,
        });
    }

    /// Folds raw serialized-module inputs into the module output.
    fn add_merge_module_job(&mut self) {
        let driver = self.driver;
        let Some(module_output) = &driver.module_output else {
            return;
        };
        let module_path = module_output.path().clone();

        let mut args = vec![
            ArgTemplate::flag("-frontend"),
            ArgTemplate::flag("-merge-modules"),
            ArgTemplate::flag("-emit-module"),
        ];
        for input in &self.module_inputs {
            if input.file_type == FileType::SwiftModule {
                args.push(ArgTemplate::path(input.file.clone()));
            }
        }
        self.push_common_args(&mut args);
        args.push(ArgTemplate::flag("-o"));
        args.push(ArgTemplate::path(module_path.clone()));

        let mut outputs = vec![TypedVirtualPath::new(module_path, FileType::SwiftModule)];
        self.push_module_level_supplementary(&mut args, &mut outputs);

        self.module_produced = true;
        self.jobs.push(Job {
            kind: JobKind::MergeModule,
            tool: driver.toolchain.find_tool(DriverTool::Frontend),
            inputs: self.module_inputs.clone(),
            outputs,
            args,
        });
    }

    /// Routes non-Swift inputs, diagnosing the ones that make no sense in
    /// this configuration. Other inputs are still processed.
    fn classify_other_inputs(&mut self, separate_module_job: bool) {
        let driver = self.driver;
        for input in &driver.inputs {
            if input.file_type.is_part_of_swift_compilation() {
                continue;
            }
            match input.file_type {
                FileType::Object | FileType::Autolink => {
                    if driver.linker_output_type.is_some() {
                        self.linker_inputs.push(input.clone());
                    } else {
                        self.diagnostics
                            .report_error(DriverError::UnexpectedInput(input.file.name()));
                    }
                }
                FileType::SwiftModule | FileType::SwiftDocumentation => {
                    if driver.module_output.is_some()
                        && driver.linker_output_type.is_none()
                        && !separate_module_job
                    {
                        self.module_inputs.push(input.clone());
                    } else if driver.linker_output_type.is_some() {
                        // Kept for the debugger.
                        self.linker_inputs.push(input.clone());
                    } else {
                        self.diagnostics
                            .report_error(DriverError::UnexpectedInput(input.file.name()));
                    }
                }
                _ => {
                    self.diagnostics
                        .report_error(DriverError::UnexpectedInput(input.file.name()));
                }
            }
        }
    }

    fn add_autolink_extract_job(&mut self) {
        let driver = self.driver;
        let objects: Vec<TypedVirtualPath> = self
            .linker_inputs
            .iter()
            .filter(|input| input.file_type == FileType::Object)
            .cloned()
            .collect();

        let module_stem = if driver.module_name.is_empty() {
            "main"
        } else {
            driver.module_name.as_str()
        };
        let output = TypedVirtualPath::new(
            VirtualPath::Temporary(self.temp_name(&format!("{module_stem}.autolink"))),
            FileType::Autolink,
        );

        let mut args: Vec<ArgTemplate> = objects
            .iter()
            .map(|object| ArgTemplate::path(object.file.clone()))
            .collect();
        args.push(ArgTemplate::flag("-o"));
        args.push(ArgTemplate::path(output.file.clone()));

        self.jobs.push(Job {
            kind: JobKind::AutolinkExtract,
            tool: driver.toolchain.find_tool(DriverTool::AutolinkExtract),
            inputs: objects,
            outputs: vec![output.clone()],
            args,
        });
        self.linker_inputs.push(output);
    }

    fn add_link_job(&mut self, output_type: LinkOutputType) -> TypedVirtualPath {
        let driver = self.driver;
        let working_directory = driver.working_directory.as_deref();
        let output = match driver.parsed_options.last_value(crate::options::Opt::Output) {
            Some(value) => VirtualPath::from_argument(value, working_directory),
            None => {
                let name = driver
                    .toolchain
                    .default_linker_output_name(output_type, &driver.module_name);
                VirtualPath::from_argument(&name, working_directory)
            }
        }
        .unwrap_or(VirtualPath::Relative("a.out".into()));

        let job = driver.toolchain.link_job(&LinkContext {
            inputs: &self.linker_inputs,
            output: output.clone(),
            output_type,
            target: &driver.target,
            sdk_path: driver.sdk_path.as_deref(),
            parsed_options: &driver.parsed_options,
        });
        self.jobs.push(job);
        TypedVirtualPath::new(output, FileType::Image)
    }

    fn add_dsym_job(&mut self, image: TypedVirtualPath) {
        let driver = self.driver;
        let output = TypedVirtualPath::new(image.file.appending_extension("dSYM"), FileType::DSym);
        let args = vec![
            ArgTemplate::path(image.file.clone()),
            ArgTemplate::flag("-o"),
            ArgTemplate::path(output.file.clone()),
        ];
        self.jobs.push(Job {
            kind: JobKind::GenerateDsym,
            tool: driver.toolchain.find_tool(DriverTool::Dsymutil),
            inputs: vec![image],
            outputs: vec![output],
            args,
        });
    }

    /// Lists the frontend inputs, marking primaries. Large primary-less
    /// input sets spill to a file list.
    fn push_input_args(
        &mut self,
        args: &mut Vec<ArgTemplate>,
        swift_inputs: &[TypedVirtualPath],
        primaries: &[TypedVirtualPath],
    ) {
        if primaries.is_empty() && swift_inputs.len() > FILELIST_THRESHOLD {
            let name = self.temp_name("inputs");
            args.push(ArgTemplate::flag("-filelist"));
            args.push(ArgTemplate::FileList(
                name,
                swift_inputs.iter().map(|input| input.file.clone()).collect(),
            ));
            return;
        }
        for input in swift_inputs {
            if primaries.contains(input) {
                args.push(ArgTemplate::flag("-primary-file"));
            }
            args.push(ArgTemplate::path(input.file.clone()));
        }
    }

    fn push_common_args(&self, args: &mut Vec<ArgTemplate>) {
        let driver = self.driver;
        args.push(ArgTemplate::flag("-module-name"));
        args.push(ArgTemplate::flag(driver.module_name.clone()));
        args.push(ArgTemplate::flag("-target"));
        args.push(ArgTemplate::flag(driver.target.to_string()));
        if let Some(sdk) = &driver.sdk_path {
            args.push(ArgTemplate::flag("-sdk"));
            args.push(ArgTemplate::path(VirtualPath::Absolute(sdk.clone())));
        }
    }

    /// Dependencies, reference dependencies, serialized diagnostics, and
    /// optimization records are per-primary: with a single Swift input they
    /// use the resolved paths verbatim, otherwise each primary derives its
    /// own name.
    fn push_per_primary_supplementary(
        &self,
        args: &mut Vec<ArgTemplate>,
        outputs: &mut Vec<TypedVirtualPath>,
        primary: &TypedVirtualPath,
        single_swift_input: bool,
    ) {
        let supplementary = &self.driver.supplementary_outputs;
        for (flag, configured, file_type) in [
            (
                "-emit-dependencies-path",
                &supplementary.dependencies,
                FileType::Dependencies,
            ),
            (
                "-emit-reference-dependencies-path",
                &supplementary.reference_dependencies,
                FileType::SwiftDeps,
            ),
            (
                "-serialize-diagnostics-path",
                &supplementary.serialized_diagnostics,
                FileType::Diagnostics,
            ),
            (
                "-save-optimization-record-path",
                &supplementary.optimization_record,
                FileType::OptimizationRecord,
            ),
        ] {
            let Some(configured_path) = configured else {
                continue;
            };
            let path = if single_swift_input {
                configured_path.clone()
            } else {
                VirtualPath::Relative(
                    format!(
                        "{}.{}",
                        primary.file.basename_without_extension(),
                        file_type.extension()
                    )
                    .into(),
                )
            };
            args.push(ArgTemplate::flag(flag));
            args.push(ArgTemplate::path(path.clone()));
            outputs.push(TypedVirtualPath::new(path, file_type));
        }
    }

    /// The Objective-C header, module documentation, and module interface
    /// ride whichever job writes the module.
    fn push_module_level_supplementary(
        &self,
        args: &mut Vec<ArgTemplate>,
        outputs: &mut Vec<TypedVirtualPath>,
    ) {
        let supplementary = &self.driver.supplementary_outputs;
        for (flag, configured, file_type) in [
            (
                "-emit-module-doc-path",
                &supplementary.module_doc,
                FileType::SwiftDocumentation,
            ),
            (
                "-emit-module-interface-path",
                &supplementary.module_interface,
                FileType::SwiftInterface,
            ),
            (
                "-emit-objc-header-path",
                &supplementary.objc_header,
                FileType::ObjcHeader,
            ),
        ] {
            if let Some(path) = configured {
                args.push(ArgTemplate::flag(flag));
                args.push(ArgTemplate::path(path.clone()));
                outputs.push(TypedVirtualPath::new(path.clone(), file_type));
            }
        }
    }

    /// The per-primary output for standard and batch compile jobs.
    ///
    /// When there is no link step and exactly one Swift input, `-o` names
    /// the output directly; otherwise every primary writes next to itself.
    fn primary_output_path(
        &self,
        primary: &TypedVirtualPath,
        output_type: FileType,
        single_swift_input: bool,
    ) -> VirtualPath {
        let driver = self.driver;
        if driver.linker_output_type.is_none()
            && single_swift_input
            && let Some(output) = driver.parsed_options.last_value(crate::options::Opt::Output)
            && let Some(path) =
                VirtualPath::from_argument(output, driver.working_directory.as_deref())
        {
            return path;
        }
        let stem = primary.file.basename_without_extension();
        VirtualPath::Relative(format!("{}.{}", stem, output_type.extension()).into())
    }

    /// Temporary names are unique within one driver invocation.
    fn temp_name(&mut self, base: &str) -> String {
        self.temp_counter += 1;
        if self.temp_counter == 1 {
            base.to_string()
        } else {
            format!("{}-{}", self.temp_counter, base)
        }
    }
}

/// The frontend flag that selects the primary output type.
fn frontend_mode_flag(output_type: Option<FileType>) -> &'static str {
    match output_type {
        None => "-typecheck",
        Some(FileType::Object) => "-c",
        Some(FileType::Assembly) => "-S",
        Some(FileType::Sil) => "-emit-sil",
        Some(FileType::RawSil) => "-emit-silgen",
        Some(FileType::Sib) => "-emit-sib",
        Some(FileType::RawSib) => "-emit-sibgen",
        Some(FileType::LlvmIr) => "-emit-ir",
        Some(FileType::LlvmBitcode) => "-emit-bc",
        Some(FileType::Ast) => "-dump-ast",
        Some(FileType::Pch) => "-emit-pch",
        Some(FileType::ImportedModules) => "-emit-imported-modules",
        Some(FileType::IndexData) => "-index-file",
        Some(FileType::Remap) => "-update-code",
        Some(_) => "-c",
    }
}

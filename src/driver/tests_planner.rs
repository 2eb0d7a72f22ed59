//! Planner scenario tests: whole command lines in, job sequences out.

use super::config::Driver;
use crate::file_type::FileType;
use crate::job::{ArgTemplate, Job, JobKind};
use crate::options::DriverKind;
use crate::vpath::VirtualPath;

const DARWIN: &str = "x86_64-apple-darwin";
const LINUX: &str = "x86_64-unknown-linux-gnu";

fn plan(arguments: &[&str]) -> (Driver, Vec<Job>) {
    let arguments: Vec<String> = arguments.iter().map(|s| s.to_string()).collect();
    let mut driver = Driver::new(DriverKind::Batch, arguments).expect("driver construction failed");
    let jobs = driver.plan_build().expect("planning failed");
    (driver, jobs)
}

fn kinds(jobs: &[Job]) -> Vec<JobKind> {
    jobs.iter().map(|j| j.kind).collect()
}

fn output_names(job: &Job) -> Vec<String> {
    job.outputs.iter().map(|o| o.file.name()).collect()
}

/// Every job's inputs are external files or outputs of an earlier job.
fn assert_topological(driver: &Driver, jobs: &[Job]) {
    for (index, job) in jobs.iter().enumerate() {
        for input in &job.inputs {
            let produced_by = jobs
                .iter()
                .position(|other| other.outputs.contains(input));
            match produced_by {
                Some(producer) => assert!(
                    producer < index,
                    "job {index} ({}) consumes an output of job {producer} that runs later",
                    job.kind
                ),
                None => assert!(
                    driver.inputs.contains(input),
                    "job {index} ({}) consumes '{}', which nothing provides",
                    job.kind,
                    input.file
                ),
            }
        }
    }
}

#[test]
fn test_compile_and_link_executable() {
    let (driver, jobs) = plan(&["a.swift", "-o", "a.out", "-target", DARWIN]);
    assert_eq!(kinds(&jobs), [JobKind::Compile, JobKind::Link]);
    assert_eq!(output_names(&jobs[0]), ["a.o"]);
    assert_eq!(output_names(&jobs[1]), ["a.out"]);
    assert_topological(&driver, &jobs);
}

#[test]
fn test_emit_module_library_build() {
    let (driver, jobs) = plan(&[
        "a.swift", "b.swift", "c.swift", "-emit-module", "-o", "lib.dylib", "-emit-library",
        "-target", DARWIN,
    ]);
    assert_eq!(
        kinds(&jobs),
        [
            JobKind::EmitModule,
            JobKind::Compile,
            JobKind::Compile,
            JobKind::Compile,
            JobKind::Link,
        ]
    );
    assert_eq!(driver.module_name, "lib");
    assert_eq!(output_names(&jobs[0]), ["lib.swiftmodule"]);
    assert_eq!(output_names(&jobs[4]), ["lib.dylib"]);

    let link = &jobs[4];
    let objects: Vec<String> = link
        .inputs
        .iter()
        .filter(|i| i.file_type == FileType::Object)
        .map(|i| i.file.name())
        .collect();
    assert_eq!(objects, ["a.o", "b.o", "c.o"]);
    assert_topological(&driver, &jobs);
}

#[test]
fn test_batch_partitioned_compiles() {
    let mut arguments: Vec<String> = (1..=100).map(|i| format!("f{i}.swift")).collect();
    arguments.push("-enable-batch-mode".to_string());
    arguments.push("-driver-batch-count".to_string());
    arguments.push("4".to_string());
    arguments.push("-target".to_string());
    arguments.push(DARWIN.to_string());

    let mut driver = Driver::new(DriverKind::Batch, arguments).unwrap();
    let jobs = driver.plan_build().unwrap();

    let compile_jobs: Vec<&Job> = jobs.iter().filter(|j| j.kind == JobKind::Compile).collect();
    assert_eq!(compile_jobs.len(), 4);
    for job in &compile_jobs {
        // One object per primary, 25 primaries per partition.
        assert_eq!(job.outputs.len(), 25);
        let primary_markers = job
            .args
            .iter()
            .filter(|a| matches!(a, ArgTemplate::Flag(f) if f == "-primary-file"))
            .count();
        assert_eq!(primary_markers, 25);
    }
    assert_eq!(jobs.last().map(|j| j.kind), Some(JobKind::Link));
    assert_topological(&driver, &jobs);
}

#[test]
fn test_emit_ir_has_no_link_step() {
    let (driver, jobs) = plan(&["a.swift", "-emit-ir", "-target", DARWIN]);
    assert_eq!(kinds(&jobs), [JobKind::Compile]);
    assert_eq!(output_names(&jobs[0]), ["a.ll"]);
    assert_eq!(jobs[0].outputs[0].file_type, FileType::LlvmIr);
    assert!(!driver.diagnostics.has_errors());
}

#[test]
fn test_prebuilt_inputs_feed_the_linker() {
    let (driver, jobs) = plan(&["a.o", "b.swiftmodule", "-o", "out", "-target", DARWIN]);
    assert_eq!(kinds(&jobs), [JobKind::Link]);

    let link = &jobs[0];
    assert!(link.inputs.iter().any(|i| i.file_type == FileType::Object));
    assert!(link.inputs.iter().any(|i| i.file_type == FileType::SwiftModule));
    // Serialized modules reach a Darwin linker through -add_ast_path.
    assert!(
        link.args
            .iter()
            .any(|a| matches!(a, ArgTemplate::Flag(f) if f == "-add_ast_path"))
    );
    assert_topological(&driver, &jobs);
}

#[test]
fn test_conflicting_debug_flags_are_diagnosed() {
    let arguments: Vec<String> =
        ["a.swift", "-g", "-debug-info-format=codeview", "-gline-tables-only"]
            .iter()
            .map(|s| s.to_string())
            .collect();
    let driver = Driver::new(DriverKind::Batch, arguments).unwrap();
    assert!(driver.diagnostics.has_errors());
}

#[test]
fn test_autolink_extract_on_linux() {
    let (driver, jobs) = plan(&["a.swift", "-target", LINUX]);
    assert_eq!(
        kinds(&jobs),
        [JobKind::Compile, JobKind::AutolinkExtract, JobKind::Link]
    );
    // The extracted autolink file joins the linker inputs.
    let autolink = &jobs[1].outputs[0];
    assert_eq!(autolink.file_type, FileType::Autolink);
    assert!(jobs[2].inputs.contains(autolink));
    assert_topological(&driver, &jobs);
}

#[test]
fn test_debug_build_on_darwin_adds_module_and_dsym() {
    let (driver, jobs) = plan(&["a.swift", "-g", "-target", DARWIN]);
    assert_eq!(
        kinds(&jobs),
        [
            JobKind::EmitModule,
            JobKind::Compile,
            JobKind::Link,
            JobKind::GenerateDsym,
        ]
    );

    // The auxiliary module is temporary and reaches the linker.
    let module = &jobs[0].outputs[0];
    assert!(matches!(module.file, VirtualPath::Temporary(_)));
    assert!(jobs[2].inputs.contains(module));

    // dsymutil consumes the linked image.
    assert_eq!(jobs[3].inputs[0].file_type, FileType::Image);
    assert_eq!(jobs[3].outputs[0].file_type, FileType::DSym);
    assert_eq!(jobs[3].outputs[0].file.name(), "a.dSYM");
    assert_topological(&driver, &jobs);
}

#[test]
fn test_no_dsym_on_linux() {
    let (_, jobs) = plan(&["a.swift", "-g", "-target", LINUX]);
    assert!(jobs.iter().all(|j| j.kind != JobKind::GenerateDsym));
}

#[test]
fn test_single_compile_emits_module_inline() {
    let (driver, jobs) = plan(&[
        "a.swift", "b.swift", "-wmo", "-emit-module", "-emit-object", "-module-name", "Kit",
        "-target", DARWIN,
    ]);
    assert_eq!(kinds(&jobs), [JobKind::Compile]);
    let compile = &jobs[0];
    assert!(
        compile
            .outputs
            .iter()
            .any(|o| o.file_type == FileType::SwiftModule)
    );
    assert!(
        compile
            .args
            .iter()
            .any(|a| matches!(a, ArgTemplate::Flag(f) if f == "-emit-module-path"))
    );
    assert!(!driver.diagnostics.has_errors());
}

#[test]
fn test_merge_module_from_raw_modules() {
    let (driver, jobs) = plan(&[
        "x.swiftmodule",
        "y.swiftmodule",
        "-emit-object",
        "-emit-module",
        "-emit-module-path",
        "Merged.swiftmodule",
        "-target",
        DARWIN,
    ]);
    assert_eq!(kinds(&jobs), [JobKind::MergeModule]);
    assert_eq!(output_names(&jobs[0]), ["Merged.swiftmodule"]);
    assert_topological(&driver, &jobs);
}

#[test]
fn test_object_without_link_step_is_diagnosed() {
    let arguments: Vec<String> = ["a.o", "-emit-ir"].iter().map(|s| s.to_string()).collect();
    let mut driver = Driver::new(DriverKind::Batch, arguments).unwrap();
    let jobs = driver.plan_build().unwrap();
    assert!(jobs.is_empty());
    assert!(driver.diagnostics.has_errors());
    assert!(
        driver
            .diagnostics
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("unexpected input file"))
    );
}

#[test]
fn test_update_code_suppresses_the_link_job() {
    let (_, jobs) = plan(&["a.swift", "-update-code", "-target", DARWIN]);
    assert_eq!(kinds(&jobs), [JobKind::Compile]);
    assert_eq!(jobs[0].outputs[0].file_type, FileType::Remap);
}

#[test]
fn test_per_primary_supplementary_outputs() {
    let (_, jobs) = plan(&[
        "a.swift",
        "b.swift",
        "-emit-object",
        "-emit-dependencies",
        "-target",
        DARWIN,
    ]);
    let compile_jobs: Vec<&Job> = jobs.iter().filter(|j| j.kind == JobKind::Compile).collect();
    assert_eq!(compile_jobs.len(), 2);
    // Each primary derives its own dependencies file.
    let deps: Vec<String> = compile_jobs
        .iter()
        .flat_map(|j| j.outputs.iter())
        .filter(|o| o.file_type == FileType::Dependencies)
        .map(|o| o.file.name())
        .collect();
    assert_eq!(deps, ["a.d", "b.d"]);
}

#[test]
fn test_filelist_spill_for_large_module_jobs() {
    let mut arguments: Vec<String> = (0..200).map(|i| format!("f{i}.swift")).collect();
    arguments.extend(
        ["-emit-module", "-emit-module-path", "M.swiftmodule", "-module-name", "M", "-target", DARWIN]
            .iter()
            .map(|s| s.to_string()),
    );
    let mut driver = Driver::new(DriverKind::Batch, arguments).unwrap();
    let jobs = driver.plan_build().unwrap();
    let emit_module = jobs.iter().find(|j| j.kind == JobKind::EmitModule).unwrap();
    assert!(
        emit_module
            .args
            .iter()
            .any(|a| matches!(a, ArgTemplate::FileList(_, paths) if paths.len() == 200))
    );
}

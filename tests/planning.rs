//! End-to-end planning scenarios: command lines in, job sequences out.

use swiftdriver::diagnostic::FatalError;
use swiftdriver::driver::Driver;
use swiftdriver::file_type::FileType;
use swiftdriver::job::{Job, JobKind};
use swiftdriver::options::DriverKind;

const DARWIN: &str = "x86_64-apple-darwin";

fn plan(kind: DriverKind, arguments: &[&str]) -> (Driver, Vec<Job>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let arguments: Vec<String> = arguments.iter().map(|s| s.to_string()).collect();
    let mut driver = Driver::new(kind, arguments).expect("driver construction failed");
    let jobs = driver.plan_build().expect("planning failed");
    (driver, jobs)
}

fn kinds(jobs: &[Job]) -> Vec<JobKind> {
    jobs.iter().map(|j| j.kind).collect()
}

#[test]
fn test_simple_executable() {
    let (driver, jobs) = plan(DriverKind::Batch, &["a.swift", "-o", "a.out", "-target", DARWIN]);
    assert!(!driver.diagnostics.has_errors());
    assert_eq!(kinds(&jobs), [JobKind::Compile, JobKind::Link]);
    assert_eq!(jobs[0].outputs[0].file.name(), "a.o");
    assert_eq!(jobs[1].outputs[0].file.name(), "a.out");
}

#[test]
fn test_library_with_module() {
    let (_, jobs) = plan(
        DriverKind::Batch,
        &[
            "a.swift", "b.swift", "c.swift", "-emit-module", "-o", "lib.dylib", "-emit-library",
            "-target", DARWIN,
        ],
    );
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
    assert_eq!(jobs[0].outputs[0].file.name(), "lib.swiftmodule");
    assert_eq!(jobs[4].outputs[0].file.name(), "lib.dylib");
}

#[test]
fn test_batch_mode_partition_counts() {
    // 100 inputs, default size limit 25: four batches of 25 primaries each.
    let mut arguments: Vec<String> = (1..=100).map(|i| format!("f{i}.swift")).collect();
    for extra in ["-enable-batch-mode", "-target", DARWIN] {
        arguments.push(extra.to_string());
    }
    let mut driver = Driver::new(DriverKind::Batch, arguments).unwrap();
    let jobs = driver.plan_build().unwrap();

    let compile_jobs: Vec<&Job> = jobs.iter().filter(|j| j.kind == JobKind::Compile).collect();
    assert_eq!(compile_jobs.len(), 4);
    for job in compile_jobs {
        assert_eq!(
            job.outputs
                .iter()
                .filter(|o| o.file_type == FileType::Object)
                .count(),
            25
        );
    }
    assert_eq!(jobs.last().unwrap().kind, JobKind::Link);
}

#[test]
fn test_emit_ir_is_compile_only() {
    let (_, jobs) = plan(DriverKind::Batch, &["a.swift", "-emit-ir", "-target", DARWIN]);
    assert_eq!(kinds(&jobs), [JobKind::Compile]);
    assert_eq!(jobs[0].outputs[0].file_type, FileType::LlvmIr);
}

#[test]
fn test_linking_prebuilt_artifacts() {
    let (_, jobs) = plan(
        DriverKind::Batch,
        &["a.o", "b.swiftmodule", "-o", "out", "-target", DARWIN],
    );
    assert_eq!(kinds(&jobs), [JobKind::Link]);
    let link = &jobs[0];
    assert_eq!(link.outputs[0].file.name(), "out");
    assert!(link.inputs.iter().any(|i| i.file_type == FileType::Object));
    assert!(
        link.inputs
            .iter()
            .any(|i| i.file_type == FileType::SwiftModule)
    );
}

#[test]
fn test_codeview_line_tables_conflict_blocks_the_build() {
    let arguments: Vec<String> =
        ["a.swift", "-g", "-debug-info-format=codeview", "-gline-tables-only"]
            .iter()
            .map(|s| s.to_string())
            .collect();
    let driver = Driver::new(DriverKind::Batch, arguments).unwrap();
    assert!(driver.diagnostics.has_errors());
}

#[test]
fn test_interactive_personality_never_plans() {
    let mut repl = Driver::new(DriverKind::Interactive, Vec::new()).unwrap();
    assert!(matches!(repl.plan_build(), Err(FatalError::ReplNotImplemented)));
    assert!(repl.module_output.is_none());
    assert!(repl.linker_output_type.is_none());

    let arguments = vec!["a.swift".to_string()];
    let mut immediate = Driver::new(DriverKind::Interactive, arguments).unwrap();
    assert!(matches!(
        immediate.plan_build(),
        Err(FatalError::ImmediateNotImplemented)
    ));
}

#[test]
fn test_plans_are_reproducible() {
    let build = || {
        let arguments: Vec<String> = ["a.swift", "b.swift", "-emit-module", "-target", DARWIN]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut driver = Driver::new(DriverKind::Batch, arguments).unwrap();
        driver
            .plan_build()
            .unwrap()
            .iter()
            .map(|j| j.to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(build(), build());
}

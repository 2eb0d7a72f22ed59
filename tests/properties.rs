//! Property-based tests for the driver invariants.
//!
//! These use `proptest` to verify planner and partitioner guarantees over
//! generated inputs:
//!
//! 1. Partitioning is complete, disjoint, and balanced
//! 2. The partition-count formula holds whenever partitioning happens
//! 3. Planned job lists are topologically ordered
//! 4. Resolution is deterministic for equal inputs
//! 5. Supplementary path precedence is respected
//! 6. Module names always land in the sanctioned set

use proptest::prelude::*;

use swiftdriver::driver::batch::{self, BatchModeInfo, DEFAULT_SIZE_LIMIT};
use swiftdriver::driver::Driver;
use swiftdriver::file_type::FileType;
use swiftdriver::job::Job;
use swiftdriver::options::DriverKind;
use swiftdriver::vpath::{TypedVirtualPath, VirtualPath};

const DARWIN: &str = "x86_64-apple-darwin";

fn swift_inputs(count: usize) -> Vec<TypedVirtualPath> {
    (0..count)
        .map(|i| {
            TypedVirtualPath::new(
                VirtualPath::Relative(format!("f{i}.swift").into()),
                FileType::Swift,
            )
        })
        .collect()
}

/// Candidate input files, mixing compilable and prebuilt artifacts.
const INPUT_POOL: &[&str] = &["a.swift", "b.swift", "c.swift", "d.o", "e.swiftmodule", "f.autolink"];

/// Candidate option fragments that are safe to combine arbitrarily.
const OPTION_POOL: &[&[&str]] = &[
    &["-emit-library"],
    &["-emit-object"],
    &["-emit-ir"],
    &["-emit-module"],
    &["-emit-dependencies"],
    &["-emit-objc-header"],
    &["-g"],
    &["-gline-tables-only"],
    &["-enable-batch-mode"],
    &["-whole-module-optimization"],
    &["-parse-as-library"],
    &["-incremental"],
    &["-static"],
    &["-o", "product"],
    &["-module-name", "Product"],
    &["-num-threads", "2"],
];

fn arbitrary_arguments() -> impl Strategy<Value = Vec<String>> {
    let inputs = proptest::sample::subsequence(INPUT_POOL.to_vec(), 0..INPUT_POOL.len());
    let options = proptest::sample::subsequence(OPTION_POOL.to_vec(), 0..OPTION_POOL.len());
    (inputs, options).prop_map(|(inputs, options)| {
        let mut arguments: Vec<String> = inputs.iter().map(|s| s.to_string()).collect();
        for fragment in options {
            arguments.extend(fragment.iter().map(|s| s.to_string()));
        }
        arguments.push("-target".to_string());
        arguments.push(DARWIN.to_string());
        arguments
    })
}

/// Every job input is an external file or the output of an earlier job.
fn assert_topological(driver: &Driver, jobs: &[Job]) {
    for (index, job) in jobs.iter().enumerate() {
        for input in &job.inputs {
            match jobs.iter().position(|other| other.outputs.contains(input)) {
                Some(producer) => assert!(producer < index),
                None => assert!(driver.inputs.contains(input)),
            }
        }
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

proptest! {
    // Partitioning completeness: the concatenated partitions are exactly
    // the inputs in order, sizes differ by at most one, and the assignment
    // agrees with the partitions.
    #[test]
    fn prop_partitioning_is_complete_and_balanced(
        input_count in 0usize..300,
        num_threads in 0usize..9,
        size_limit in proptest::option::of(1usize..40),
        count in proptest::option::of(1usize..20),
    ) {
        let info = BatchModeInfo { count, size_limit, seed: None };
        let inputs = swift_inputs(input_count);
        if let Some(parts) = batch::partition_inputs(&inputs, &info, num_threads) {
            let flattened: Vec<TypedVirtualPath> =
                parts.partitions.iter().flatten().cloned().collect();
            prop_assert_eq!(&flattened, &inputs);

            let min = parts.partitions.iter().map(Vec::len).min().unwrap();
            let max = parts.partitions.iter().map(Vec::len).max().unwrap();
            prop_assert!(min >= 1);
            prop_assert!(max - min <= 1);

            for (file, &index) in &parts.assignment {
                prop_assert!(parts.partitions[index].contains(file));
            }

            // The count formula, clamped to the input count.
            let expected = batch::number_of_partitions(&info, num_threads, input_count)
                .min(input_count);
            prop_assert_eq!(parts.partitions.len(), expected);
        }
    }

    // The default-formula partition count is max(T, N / 25).
    #[test]
    fn prop_partition_count_formula(input_count in 0usize..2000, num_threads in 0usize..17) {
        let info = BatchModeInfo::default();
        let expected = num_threads.max(1).max(input_count / DEFAULT_SIZE_LIMIT);
        prop_assert_eq!(
            batch::number_of_partitions(&info, num_threads, input_count),
            expected
        );
    }

    // Any plannable command line yields a topologically ordered job list.
    #[test]
    fn prop_plans_are_topologically_ordered(arguments in arbitrary_arguments()) {
        let mut driver = Driver::new(DriverKind::Batch, arguments).unwrap();
        let jobs = driver.plan_build().unwrap();
        assert_topological(&driver, &jobs);
    }

    // Equal inputs resolve to equal configurations and equal plans.
    #[test]
    fn prop_resolution_is_deterministic(arguments in arbitrary_arguments()) {
        let render = |arguments: Vec<String>| {
            let mut driver = Driver::new(DriverKind::Batch, arguments).unwrap();
            let jobs = driver.plan_build().unwrap();
            let plan: Vec<String> = jobs.iter().map(|j| j.to_string()).collect();
            (driver.module_name.clone(), format!("{:?}", driver.module_output), plan)
        };
        prop_assert_eq!(render(arguments.clone()), render(arguments));
    }

    // Supplementary path precedence: explicit path > -o derived >
    // module-name derived; no flag, no path.
    #[test]
    fn prop_supplementary_precedence(
        explicit_path in proptest::option::of("[a-z]{1,8}\\.d"),
        has_flag in any::<bool>(),
        output in proptest::option::of("[a-z]{1,8}\\.o"),
    ) {
        let mut arguments: Vec<String> = vec!["a.swift".to_string(), "-emit-object".to_string()];
        if has_flag {
            arguments.push("-emit-dependencies".to_string());
        }
        if let Some(path) = &explicit_path {
            arguments.push("-emit-dependencies-path".to_string());
            arguments.push(path.clone());
        }
        if let Some(output) = &output {
            arguments.push("-o".to_string());
            arguments.push(output.clone());
        }
        arguments.push("-target".to_string());
        arguments.push(DARWIN.to_string());

        let driver = Driver::new(DriverKind::Batch, arguments).unwrap();
        let resolved = driver.supplementary_outputs.dependencies.clone();
        match (explicit_path, has_flag, output) {
            (Some(path), _, _) => prop_assert_eq!(resolved.unwrap().name(), path),
            (None, false, _) => prop_assert!(resolved.is_none()),
            (None, true, Some(output)) => {
                let expected = format!("{}.d", output.trim_end_matches(".o"));
                prop_assert_eq!(resolved.unwrap().name(), expected);
            }
            (None, true, None) => {
                // Falls back to the module name (single input: "a").
                prop_assert_eq!(resolved.unwrap().name(), "a.d");
            }
        }
    }

    // Post-resolution module names are always in the sanctioned set.
    #[test]
    fn prop_module_names_land_in_sanctioned_set(
        arguments in arbitrary_arguments(),
        name in proptest::option::of("[a-zA-Z0-9_ ]{0,10}"),
    ) {
        let mut arguments = arguments;
        if let Some(name) = name {
            arguments.push("-module-name".to_string());
            arguments.push(name);
        }
        let driver = Driver::new(DriverKind::Batch, arguments).unwrap();
        let name = &driver.module_name;
        prop_assert!(
            name.is_empty()
                || name == "__bad__"
                || name == "REPL"
                || name == "main"
                || is_valid_identifier(name),
            "unexpected module name: {:?}",
            name
        );
    }
}

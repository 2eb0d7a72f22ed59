use std::path::Path;
use std::process::{Command, exit};

use swiftdriver::diagnostic::FatalError;
use swiftdriver::driver::Driver;
use swiftdriver::exec::JobExecutor;
use swiftdriver::options::{self, DriverKind, Opt};

/// The main entry point for the driver.
///
/// Resolves the personality, expands response files, builds the
/// configuration, and either prints or executes the planned jobs. Errors
/// reported through the diagnostic engine map to a non-zero exit.
fn main() {
    env_logger::init();
    let arguments: Vec<String> = std::env::args().collect();
    match run(arguments) {
        Ok(code) => exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            exit(2);
        }
    }
}

fn run(arguments: Vec<String>) -> Result<i32, FatalError> {
    let program = arguments.first().map(String::as_str).unwrap_or("swift");
    let basename = Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "swift".to_string());
    // Unrecognized invocation names drive a batch build; only an explicit
    // --driver-mode can be wrong enough to reject.
    let mut kind = DriverKind::from_name(&basename).unwrap_or(DriverKind::Batch);

    // -frontend and -modulewrap in first position bypass the driver.
    if let Some(first) = arguments.get(1)
        && (first == "-frontend" || first == "-modulewrap")
    {
        return exec_passthrough("swift-frontend", &arguments[1..]);
    }

    let mut rest: Vec<String> = Vec::with_capacity(arguments.len());
    for argument in arguments.into_iter().skip(1) {
        if let Some(name) = argument.strip_prefix("--driver-mode=") {
            match DriverKind::from_name(name) {
                Some(explicit) => kind = explicit,
                None => {
                    eprintln!("error: invalid driver name: '{name}'");
                    return Ok(1);
                }
            }
        } else {
            rest.push(argument);
        }
    }

    if let Some(tool) = kind.subcommand_tool() {
        return exec_passthrough(tool, &rest);
    }

    let rest = options::expand_response_files(rest);
    let mut driver = Driver::new(kind, rest)?;
    if driver.diagnostics.has_errors() {
        driver.diagnostics.print_to_stderr();
        return Ok(1);
    }

    let jobs = match driver.plan_build() {
        Ok(jobs) => jobs,
        Err(fatal) => {
            driver.diagnostics.print_to_stderr();
            eprintln!("error: {fatal}");
            return Ok(1);
        }
    };
    driver.diagnostics.print_to_stderr();
    if driver.diagnostics.has_errors() {
        return Ok(1);
    }

    if driver.parsed_options.has(Opt::DriverPrintJobs) {
        for job in &jobs {
            println!("{job}");
        }
        return Ok(0);
    }

    let executor = JobExecutor::new(
        &jobs,
        driver.working_directory.clone(),
        driver.parsed_options.has(Opt::Verbose),
    );
    if let Err(err) = executor.execute_all() {
        eprintln!("error: {err}");
        return Ok(1);
    }
    Ok(0)
}

/// Re-executes a pass-through tool with the given arguments, mapping its
/// exit status onto ours.
fn exec_passthrough(tool: &str, arguments: &[String]) -> Result<i32, FatalError> {
    match Command::new(tool).args(arguments).status() {
        Ok(status) => Ok(status.code().unwrap_or(1)),
        Err(err) => {
            eprintln!("error: failed to run '{tool}': {err}");
            Ok(1)
        }
    }
}

//! Sequential job execution.
//!
//! The executor resolves argument templates against the filesystem (working
//! directory for relative paths, a per-invocation temporary directory for
//! temporaries and spilled file lists) and runs each job in plan order,
//! stopping at the first failure. Jobs arrive dependency-ordered, so no
//! scheduling is needed here.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use crate::job::{ArgTemplate, Job};
use crate::vpath::VirtualPath;

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("failed to write file list '{name}': {source}")]
    FileList {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{tool}' exited with {status}")]
    CommandFailed { tool: String, status: std::process::ExitStatus },
}

/// Runs planned jobs in order.
pub struct JobExecutor<'a> {
    jobs: &'a [Job],
    working_directory: Option<PathBuf>,
    verbose: bool,
}

impl<'a> JobExecutor<'a> {
    pub fn new(jobs: &'a [Job], working_directory: Option<PathBuf>, verbose: bool) -> JobExecutor<'a> {
        JobExecutor {
            jobs,
            working_directory,
            verbose,
        }
    }

    pub fn execute_all(&self) -> Result<(), ExecutionError> {
        // Temporaries live until every job has run; the link step reads
        // objects its compile jobs wrote here.
        let temp_dir = TempDir::new().map_err(ExecutionError::TempDir)?;

        for job in self.jobs {
            let mut command = Command::new(&job.tool);
            for arg in &job.args {
                command.arg(self.resolve_arg(arg, temp_dir.path())?);
            }
            if let Some(dir) = &self.working_directory {
                command.current_dir(dir);
            }

            if self.verbose {
                eprintln!("{job}");
            }
            log::debug!("running {} job: {job}", job.kind);

            let status = command.status().map_err(|source| ExecutionError::Spawn {
                tool: job.tool.display().to_string(),
                source,
            })?;
            if !status.success() {
                return Err(ExecutionError::CommandFailed {
                    tool: job.tool.display().to_string(),
                    status,
                });
            }
        }
        Ok(())
    }

    fn resolve_arg(&self, arg: &ArgTemplate, temp_dir: &Path) -> Result<OsString, ExecutionError> {
        match arg {
            ArgTemplate::Flag(token) => Ok(OsString::from(token)),
            ArgTemplate::Path(path) => self.resolve_path(path, temp_dir),
            ArgTemplate::FileList(name, paths) => {
                let list_path = temp_dir.join(name);
                let mut contents = String::new();
                for path in paths {
                    let resolved = self.resolve_path(path, temp_dir)?;
                    contents.push_str(&resolved.to_string_lossy());
                    contents.push('\n');
                }
                write_file_list(&list_path, &contents).map_err(|source| {
                    ExecutionError::FileList {
                        name: name.clone(),
                        source,
                    }
                })?;
                Ok(list_path.into_os_string())
            }
        }
    }

    fn resolve_path(&self, path: &VirtualPath, temp_dir: &Path) -> Result<OsString, ExecutionError> {
        let resolved = match path {
            VirtualPath::Absolute(p) => p.clone().into_os_string(),
            VirtualPath::Relative(p) => match &self.working_directory {
                Some(dir) => dir.join(p).into_os_string(),
                None => p.clone().into_os_string(),
            },
            VirtualPath::StandardInput => OsString::from("-"),
            VirtualPath::Temporary(name) => temp_dir.join(name).into_os_string(),
            VirtualPath::FileList(name, paths) => {
                return self.resolve_arg(&ArgTemplate::FileList(name.clone(), paths.clone()), temp_dir);
            }
        };
        Ok(resolved)
    }
}

fn write_file_list(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(contents.as_bytes())
}

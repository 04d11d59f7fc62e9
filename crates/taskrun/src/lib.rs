//! Task runner for the project's two entry points.
//!
//! Each task resolves to exactly one command line and launches it
//! synchronously; the child's exit code is handed back unchanged.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;
use tracing::info;

pub const ENV_MASTER_KEY: &str = "MS_MASTER_KEY";
pub const ENV_APP: &str = "TASKRUN_APP";
pub const ENV_MEILISEARCH_BIN: &str = "TASKRUN_MEILISEARCH_BIN";

pub const MEILISEARCH_BIN: &str = "./meilisearch";
pub const MEILISEARCH_CONFIG: &str = "./ms-config.toml";
const APP_BIN: &str = "toolbox";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Start the application (the toolbox server).
    Run,
    /// Start the Meilisearch server with the master key and config file.
    StartMeilisearch,
}

impl Task {
    pub fn name(self) -> &'static str {
        match self {
            Task::Run => "run",
            Task::StartMeilisearch => "start-meilisearch",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("environment variable {name} is not set")]
    MissingEnv { name: &'static str },

    #[error("program not found: {}", program.display())]
    NotFound { program: PathBuf },

    #[error("failed to launch {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} was terminated by a signal", program.display())]
    Signalled { program: PathBuf },
}

/// A fully resolved command line.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

// Arguments may carry the master key.
impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &self.args.len())
            .finish()
    }
}

/// The toolbox binary built alongside this one.
fn default_app() -> PathBuf {
    let name = format!("{APP_BIN}{}", env::consts::EXE_SUFFIX);
    env::current_exe()
        .map(|exe| exe.with_file_name(&name))
        .unwrap_or_else(|_| PathBuf::from(name))
}

/// Resolve `task` into a command line. `env` looks up environment variables;
/// values are used verbatim, whether or not they are valid unicode.
pub fn plan(
    task: Task,
    env: impl Fn(&str) -> Option<OsString>,
) -> Result<Invocation, LaunchError> {
    match task {
        Task::Run => Ok(Invocation {
            program: env(ENV_APP).map(PathBuf::from).unwrap_or_else(default_app),
            args: Vec::new(),
        }),
        Task::StartMeilisearch => {
            let master_key = env(ENV_MASTER_KEY).ok_or(LaunchError::MissingEnv {
                name: ENV_MASTER_KEY,
            })?;
            let program = env(ENV_MEILISEARCH_BIN)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(MEILISEARCH_BIN));

            Ok(Invocation {
                program,
                args: vec![
                    OsString::from("--master-key"),
                    master_key,
                    OsString::from("--config-file-path"),
                    OsString::from(MEILISEARCH_CONFIG),
                ],
            })
        }
    }
}

/// Run the invocation to completion and return the child's exit code.
pub fn launch(invocation: &Invocation) -> Result<i32, LaunchError> {
    let program = &invocation.program;
    info!(program = %program.display(), "launching");

    let status = Command::new(program)
        .args(&invocation.args)
        .status()
        .map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LaunchError::NotFound {
                program: program.clone(),
            },
            _ => LaunchError::Spawn {
                program: program.clone(),
                source,
            },
        })?;

    let code = status.code().ok_or_else(|| LaunchError::Signalled {
        program: program.clone(),
    })?;
    info!(program = %program.display(), code, "process exited");
    Ok(code)
}

/// Plan and launch `task` using the process environment.
pub fn run_task(task: Task) -> Result<i32, LaunchError> {
    let invocation = plan(task, |name| env::var_os(name))?;
    launch(&invocation)
}

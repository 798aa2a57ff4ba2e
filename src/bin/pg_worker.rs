//! Runs one embedded `PostgreSQL` lifecycle step on behalf of the repository
//! tests when they run as root.
//!
//! ```text
//! pg_worker <setup|start|stop> <config-path>
//! ```
//!
//! `config-path` names a JSON `WorkerPayload` holding the cluster settings
//! and environment overrides. A root caller is switched to `nobody` before
//! the cluster is touched; `PostgreSQL` refuses to run as the superuser.

#[cfg(unix)]
mod unix {
    use camino::{Utf8Path, Utf8PathBuf};
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::ambient_dir_and_path;
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use std::ffi::{CString, OsString};
    use std::io::Read;
    use std::mem::ManuallyDrop;
    use thiserror::Error;

    /// Account the cluster runs under when the worker starts as root.
    const UNPRIVILEGED_USER: &str = "nobody";

    /// Failures of a worker invocation.
    #[derive(Debug, Error)]
    pub enum WorkerError {
        /// The command line is malformed.
        #[error("usage: pg_worker <setup|start|stop> <config-path>: {0}")]
        Usage(String),

        /// The payload could not be read or decoded.
        #[error("invalid worker config {path}: {reason}")]
        Config {
            /// Payload path.
            path: Utf8PathBuf,
            /// Failure description.
            reason: String,
        },

        /// Switching to the unprivileged account failed.
        #[error("failed to switch to the unprivileged user: {0}")]
        PrivilegeDrop(String),

        /// The async runtime could not be built.
        #[error("failed to build runtime: {0}")]
        Runtime(#[source] std::io::Error),

        /// The lifecycle step itself failed.
        #[error("postgres {operation} failed: {reason}")]
        Postgres {
            /// Step that failed.
            operation: &'static str,
            /// Failure description.
            reason: String,
        },
    }

    /// Lifecycle step requested on the command line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Operation {
        /// Install and initialise the cluster.
        Setup,
        /// Start the cluster and leave it running.
        Start,
        /// Stop a running cluster.
        Stop,
    }

    impl Operation {
        fn parse(arg: &str) -> Result<Self, WorkerError> {
            match arg {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::Usage(format!("unknown operation '{other}'"))),
            }
        }

        const fn name(self) -> &'static str {
            match self {
                Self::Setup => "setup",
                Self::Start => "start",
                Self::Stop => "stop",
            }
        }
    }

    /// Splits `program operation config-path` into its parts.
    pub fn parse_args(args: &[String]) -> Result<(Operation, Utf8PathBuf), WorkerError> {
        match args {
            [_program, operation, config_path] => {
                Ok((Operation::parse(operation)?, Utf8PathBuf::from(config_path)))
            }
            _ => Err(WorkerError::Usage(format!(
                "expected 2 arguments, got {}",
                args.len().saturating_sub(1)
            ))),
        }
    }

    /// Decodes the process arguments, rejecting non UTF-8 values.
    pub fn utf8_args(args: impl Iterator<Item = OsString>) -> Result<Vec<String>, WorkerError> {
        args.map(|arg| {
            arg.into_string()
                .map_err(|_| WorkerError::Usage("arguments must be valid UTF-8".to_owned()))
        })
        .collect()
    }

    /// Runs the step named by `args`.
    pub fn run(args: &[String]) -> Result<(), WorkerError> {
        let (operation, config_path) = parse_args(args)?;
        let payload = load_payload(&config_path)?;
        drop_privileges_if_root()?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| WorkerError::Config {
                path: config_path.clone(),
                reason: err.to_string(),
            })?;
        apply_environment(&payload.environment);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WorkerError::Runtime)?;
        let mut postgres = PostgreSQL::new(settings);
        runtime.block_on(perform(&mut postgres, operation))?;
        if operation == Operation::Start {
            // The cluster outlives the worker process.
            let _running = ManuallyDrop::new(postgres);
        }
        Ok(())
    }

    async fn perform(postgres: &mut PostgreSQL, operation: Operation) -> Result<(), WorkerError> {
        let outcome = match operation {
            Operation::Setup => postgres.setup().await,
            Operation::Start if matches!(postgres.status(), Status::Started) => Ok(()),
            Operation::Start => postgres.start().await,
            Operation::Stop => postgres.stop().await,
        };
        outcome.map_err(|err| WorkerError::Postgres {
            operation: operation.name(),
            reason: err.to_string(),
        })
    }

    fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
        let config_error = |reason: String| WorkerError::Config {
            path: path.to_owned(),
            reason,
        };
        let (dir, relative) =
            ambient_dir_and_path(path).map_err(|err| config_error(err.to_string()))?;
        let mut file = dir
            .open(relative.as_std_path())
            .map_err(|err| config_error(err.to_string()))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|err| config_error(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| config_error(err.to_string()))
    }

    fn drop_privileges_if_root() -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }
        let privilege_error = |err: nix::Error| WorkerError::PrivilegeDrop(err.to_string());

        let user = User::from_name(UNPRIVILEGED_USER)
            .map_err(privilege_error)?
            .ok_or_else(|| WorkerError::PrivilegeDrop("no such user".to_owned()))?;
        let user_name = CString::new(user.name.as_str())
            .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
        initgroups(&user_name, user.gid).map_err(privilege_error)?;
        setgid(user.gid).map_err(privilege_error)?;
        setuid(user.uid).map_err(privilege_error)?;

        // SAFETY: no other threads exist yet.
        unsafe {
            std::env::set_var("HOME", &user.dir);
            std::env::set_var("USER", &user.name);
            std::env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: no other threads exist yet.
            unsafe {
                match value {
                    Some(secret) => std::env::set_var(key, secret.expose()),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

}

#[cfg(unix)]
fn main() -> Result<(), unix::WorkerError> {
    let args = unix::utf8_args(std::env::args_os())?;
    unix::run(&args)
}

#[cfg(not(unix))]
fn main() -> Result<(), &'static str> {
    Err("pg_worker requires a Unix host")
}

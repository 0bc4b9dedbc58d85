//! Python interpreter bridge
//!
//! Every call spawns a fresh interpreter, so each evaluation and each graded
//! function gets its own namespace. There is no isolation from the host.

use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::instrument;

use crate::error::{HarnessError, HarnessResult};

/// Interpreter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PythonConfig {
    /// Interpreter executable
    #[serde(default = "default_program")]
    pub program: String,

    /// Optional wall-clock limit for a single interpreter run
    #[serde(default, with = "humantime_serde")]
    pub eval_timeout: Option<Duration>,
}

fn default_program() -> String {
    "python3".to_string()
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            eval_timeout: None,
        }
    }
}

/// Spawns interpreter processes running a driver script
#[derive(Debug, Clone)]
pub struct PythonInterpreter {
    program: String,
    timeout: Option<Duration>,
}

impl PythonInterpreter {
    /// Create an interpreter for the given executable
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Create an interpreter from configuration
    pub fn from_config(config: &PythonConfig) -> Self {
        Self {
            program: config.program.clone(),
            timeout: config.eval_timeout,
        }
    }

    /// Set a wall-clock limit per run
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Interpreter executable
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether the interpreter can be spawned at all
    pub async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Run `driver` with `-c`, feeding `stdin` and returning stdout.
    ///
    /// A non-zero exit, a spawn failure or a timeout is a runtime error.
    #[instrument(skip(self, driver, stdin), fields(program = %self.program, input_len = stdin.len()), level = "debug")]
    pub async fn run_driver(&self, driver: &str, stdin: &str) -> HarnessResult<String> {
        let mut child = Command::new(&self.program)
            .arg("-c")
            .arg(driver)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                HarnessError::runtime_with_program(
                    format!("failed to start interpreter: {}", e),
                    &self.program,
                )
            })?;

        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(stdin.as_bytes()).await?;
            pipe.shutdown().await?;
        }

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    HarnessError::runtime_with_program(
                        format!("interpreter timed out after {:?}", limit),
                        &self.program,
                    )
                })??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim().lines().last().unwrap_or("no output").to_string();
            return Err(HarnessError::runtime_with_program(
                format!("interpreter exited with {}: {}", output.status, detail),
                &self.program,
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for PythonInterpreter {
    fn default() -> Self {
        Self::from_config(&PythonConfig::default())
    }
}

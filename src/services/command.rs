//! External command execution for the custom validator.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Placeholder replaced by the validated file's name.
pub const FILENAME_PLACEHOLDER: &str = "${filename}";

/// Outcome of a finished command.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a command line in a working directory.
pub trait CommandRunner {
    /// Run `command` in `work_dir`, killing it once `timeout` elapses.
    fn execute(&self, command: &str, work_dir: &Path, timeout: Duration) -> Result<ExecutionResult>;
}

/// Runs commands as child processes.
///
/// Owns a current-thread runtime so the rest of the program stays synchronous.
pub struct ProcessRunner {
    runtime: tokio::runtime::Runtime,
}

impl ProcessRunner {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }
}

impl CommandRunner for ProcessRunner {
    fn execute(&self, command: &str, work_dir: &Path, timeout: Duration) -> Result<ExecutionResult> {
        let mut args = command.split_whitespace();
        let program = args
            .next()
            .ok_or_else(|| Error::CommandFailed("empty command".to_string()))?;

        tracing::debug!("Execute command '{}' in {}", command, work_dir.display());

        let output = self.runtime.block_on(async {
            let child = Command::new(program)
                .args(args)
                .current_dir(work_dir)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| Error::CommandFailed(format!("{}: {}", program, e)))?;

            // Dropping the child on timeout kills it.
            match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(output) => Ok(output?),
                Err(_) => Err(Error::CommandFailed(format!(
                    "'{}' timed out after {:?}",
                    command, timeout
                ))),
            }
        })?;

        let result = ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        };

        tracing::debug!("stdout: {}", result.stdout.trim_end());
        tracing::debug!("stderr: {}", result.stderr.trim_end());
        tracing::debug!("exit code: {:?}", result.exit_code);

        Ok(result)
    }
}

/// Substitute the file name into a validator command.
pub fn render_command(template: &str, file_name: &str) -> String {
    template.replace(FILENAME_PLACEHOLDER, file_name)
}

/// Check whether the program of a command line can be found.
pub fn is_resolvable(command: &str) -> bool {
    let Some(program) = command.split_whitespace().next() else {
        return false;
    };

    let program_path = PathBuf::from(program);
    if program_path.components().count() > 1 {
        return program_path.is_file();
    }

    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_command() {
        assert_eq!(
            render_command("zip -T ${filename}", "2024-01-01.zip"),
            "zip -T 2024-01-01.zip"
        );
        assert_eq!(render_command("true", "x"), "true");
    }

    #[test]
    fn test_empty_command_fails() {
        let runner = ProcessRunner::new().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let result = runner.execute("   ", temp_dir.path(), Duration::from_secs(5));
        assert!(matches!(result, Err(Error::CommandFailed(_))));
    }

    #[test]
    fn test_unknown_program_fails() {
        let runner = ProcessRunner::new().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let result = runner.execute(
            "definitely-not-a-real-program-4242",
            temp_dir.path(),
            Duration::from_secs(5),
        );
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_codes() {
        let runner = ProcessRunner::new().unwrap();
        let temp_dir = TempDir::new().unwrap();

        let ok = runner.execute("true", temp_dir.path(), Duration::from_secs(5)).unwrap();
        assert!(ok.is_success());

        let failed = runner.execute("false", temp_dir.path(), Duration::from_secs(5)).unwrap();
        assert!(!failed.is_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_work_dir() {
        let runner = ProcessRunner::new().unwrap();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("marker.txt"), "x").unwrap();

        let result = runner
            .execute("ls marker.txt", temp_dir.path(), Duration::from_secs(5))
            .unwrap();
        assert!(result.is_success());
        assert!(result.stdout.contains("marker.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_process() {
        let runner = ProcessRunner::new().unwrap();
        let temp_dir = TempDir::new().unwrap();

        let started = std::time::Instant::now();
        let result = runner.execute("sleep 30", temp_dir.path(), Duration::from_millis(200));

        assert!(matches!(result, Err(Error::CommandFailed(_))));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_is_resolvable() {
        assert!(is_resolvable("sh -c true"));
        assert!(!is_resolvable("definitely-not-a-real-program-4242 --flag"));
        assert!(!is_resolvable(""));
    }
}

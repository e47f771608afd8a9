//! Batch script submission.
//!
//! [`BatchSubmitter`] is the seam between the orchestrator and the scheduler.
//! Production code uses [`SbatchSubmitter`]; tests point it at a stub program.

use crate::error::SubmitError;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Hands a rendered batch script to the scheduler and returns its job id.
pub trait BatchSubmitter {
    /// Submit `script` and return the scheduler's job id exactly as printed.
    fn submit(&self, script: &Path) -> Result<String, SubmitError>;
}

/// Runs `<program> --parsable <script>` and captures stdout as the job id.
///
/// The call blocks until `sbatch` itself returns, which happens once the job is
/// queued, not when it finishes. There is no timeout.
#[derive(Debug, Clone)]
pub struct SbatchSubmitter {
    program: OsString,
}

impl SbatchSubmitter {
    /// Submitter using `sbatch` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("sbatch")
    }

    /// Submitter using a specific program in place of `sbatch`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        SbatchSubmitter {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }
}

impl Default for SbatchSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchSubmitter for SbatchSubmitter {
    fn submit(&self, script: &Path) -> Result<String, SubmitError> {
        let cmd = format!(
            "{} --parsable {}",
            self.program.to_string_lossy(),
            script.display()
        );
        log::info!("[Submit] Running: {}", cmd);

        let output = Command::new(&self.program)
            .arg("--parsable")
            .arg(script)
            .output()
            .map_err(|e| SubmitError::OsCommand {
                cmd: cmd.clone(),
                reason: format!("failed to spawn: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!("[Submit] {} exited with {}: {}", cmd, output.status, stderr.trim());
            return Err(SubmitError::OsCommand {
                cmd,
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| SubmitError::InvalidOutput {
            cmd,
            reason: e.to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn stub(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("sbatch");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_default_program_is_sbatch() {
        assert_eq!(SbatchSubmitter::default().program(), &OsString::from("sbatch"));
    }

    #[test]
    fn test_stdout_returned_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let program = stub(temp_dir.path(), "echo 4242");
        let submitter = SbatchSubmitter::with_program(program);

        let job_id = submitter.submit(&temp_dir.path().join("script.sh")).unwrap();
        assert_eq!(job_id, "4242\n");
    }

    #[test]
    fn test_arguments_passed_to_program() {
        let temp_dir = TempDir::new().unwrap();
        let program = stub(temp_dir.path(), "printf '%s|%s' \"$1\" \"$2\"");
        let script = temp_dir.path().join("convert_script.sh");

        let out = SbatchSubmitter::with_program(program).submit(&script).unwrap();
        assert_eq!(out, format!("--parsable|{}", script.display()));
    }

    #[test]
    fn test_non_zero_exit_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let program = stub(temp_dir.path(), "echo 'sbatch: error: invalid partition' >&2\nexit 1");

        let err = SbatchSubmitter::with_program(program)
            .submit(Path::new("/tmp/script.sh"))
            .unwrap_err();
        match err {
            SubmitError::OsCommand { reason, .. } => {
                assert!(reason.contains("invalid partition"), "reason: {}", reason)
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_os_command_error() {
        let submitter = SbatchSubmitter::with_program("/nonexistent/bin/sbatch");
        assert!(matches!(
            submitter.submit(Path::new("/tmp/script.sh")),
            Err(SubmitError::OsCommand { .. })
        ));
    }

    #[test]
    fn test_non_utf8_output_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let program = stub(temp_dir.path(), "printf '\\377\\376'");
        assert!(matches!(
            SbatchSubmitter::with_program(program).submit(Path::new("/tmp/s.sh")),
            Err(SubmitError::InvalidOutput { .. })
        ));
    }
}

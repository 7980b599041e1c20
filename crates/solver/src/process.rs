//! Subprocess-based solver backend.
//!
//! Spawns the configured solver executable once per model run, pipes the
//! JSON parameter document to stdin, captures stdout/stderr, and enforces
//! a timeout. The executable is expected to print a JSON [`ModelFit`]
//! document (`{"outfile": ..., "output": {...}}`) to stdout.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::executor::{ModelFit, ModelRun, SolverBackend, SolverError};

/// Maximum stdout or stderr size captured per stream (10 MiB).
///
/// Output beyond this limit is truncated; solver transcripts are normally
/// a few kilobytes.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Default per-model run timeout. Individual solver runs take seconds to
/// minutes; anything past this is treated as a hang.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Production [`SolverBackend`]: one subprocess per model run.
#[derive(Debug, Clone)]
pub struct ExecutableSolver {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ExecutableSolver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_RUN_TIMEOUT,
        }
    }

    /// Fixed arguments passed to the executable before the stdin document.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl SolverBackend for ExecutableSolver {
    async fn run_model(&self, run: &ModelRun) -> Result<ModelFit, SolverError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Kill the child if we drop it on timeout.
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn()?;

        // Write the parameter document to stdin, then close it.
        if let Some(mut stdin) = child.stdin.take() {
            let payload = serde_json::to_vec(run)
                .map_err(|e| SolverError::UnparseableOutput(e.to_string()))?;
            // Best-effort write; a solver that closes stdin early will
            // surface its failure through the exit status instead.
            let _ = stdin.write_all(&payload).await;
            drop(stdin);
        }

        // Read stdout/stderr in spawned tasks so `child.wait()` can borrow
        // the child mutably.
        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
        let stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });

        let wait_result = tokio::time::timeout(self.timeout, child.wait()).await;

        let status = match wait_result {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(SolverError::Io(e)),
            Err(_elapsed) => {
                // `child` is dropped here, which kills the process.
                return Err(SolverError::Timeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
            }
        };

        let stdout_bytes = stdout_task.await.unwrap_or_default();
        let stderr_bytes = stderr_task.await.unwrap_or_default();
        let stdout = String::from_utf8_lossy(&stdout_bytes).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_bytes).into_owned();

        if !status.success() {
            return Err(SolverError::Crashed {
                exit_code: status.code().unwrap_or(-1),
                stderr,
            });
        }

        tracing::debug!(
            model = %run.model_name,
            duration_ms = start.elapsed().as_millis() as u64,
            "Solver run completed",
        );

        serde_json::from_str(stdout.trim())
            .map_err(|e| SolverError::UnparseableOutput(format!("{e}: {}", truncate(&stdout, 200))))
    }
}

/// Read an entire output stream into a byte buffer, capped at [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use bmds_core::request::{Dataset, DatasetId, DatasetType, DichotomousDataset};

    fn sample_run() -> ModelRun {
        ModelRun {
            dataset_type: DatasetType::Dichotomous,
            dataset: Dataset::Dichotomous(DichotomousDataset {
                id: DatasetId::Absent,
                doses: vec![0.0, 1.96, 5.69, 29.75],
                ns: vec![75, 49, 50, 49],
                incidences: vec![5, 0, 3, 14],
            }),
            model_name: "Logistic".into(),
            bmr: None,
        }
    }

    /// A solver stand-in: a shell script reading stdin and printing JSON.
    fn shell_solver(script: &str) -> ExecutableSolver {
        ExecutableSolver::new("sh")
            .with_args(vec!["-c".into(), script.into()])
            .with_timeout(Duration::from_secs(10))
    }

    #[tokio::test]
    async fn parses_the_fit_from_stdout() {
        let solver = shell_solver(
            r#"cat > /dev/null; echo '{"outfile": "transcript", "output": {"BMD": 29.5318}}'"#,
        );
        let fit = solver.run_model(&sample_run()).await.unwrap();
        assert_eq!(fit.outfile, "transcript");
        assert_eq!(fit.output["BMD"], 29.5318);
    }

    #[tokio::test]
    async fn receives_the_parameter_document_on_stdin() {
        // Fail unless a non-empty document arrived on stdin.
        let solver = shell_solver(
            r#"doc=$(cat); if [ -n "$doc" ]; then echo '{"outfile": "received", "output": {}}'; else exit 1; fi"#,
        );
        let fit = solver.run_model(&sample_run()).await.unwrap();
        assert_eq!(fit.outfile, "received");
    }

    #[tokio::test]
    async fn nonzero_exit_is_a_crash() {
        let solver = shell_solver("cat > /dev/null; echo boom >&2; exit 3");
        let err = solver.run_model(&sample_run()).await.unwrap_err();
        assert_matches!(err, SolverError::Crashed { exit_code: 3, ref stderr } if stderr.contains("boom"));
    }

    #[tokio::test]
    async fn garbage_stdout_is_unparseable() {
        let solver = shell_solver("cat > /dev/null; echo 'not json'");
        let err = solver.run_model(&sample_run()).await.unwrap_err();
        assert_matches!(err, SolverError::UnparseableOutput(_));
    }

    #[tokio::test]
    async fn hung_solver_times_out() {
        let solver = shell_solver("sleep 30").with_timeout(Duration::from_millis(100));
        let err = solver.run_model(&sample_run()).await.unwrap_err();
        assert_matches!(err, SolverError::Timeout { .. });
    }

    #[tokio::test]
    async fn missing_executable_is_an_io_error() {
        let solver = ExecutableSolver::new("/nonexistent/bmds-solver-binary");
        let err = solver.run_model(&sample_run()).await.unwrap_err();
        assert_matches!(err, SolverError::Io(_));
    }
}

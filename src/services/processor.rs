//! The external document-processing collaborator.
//!
//! The core only depends on the `DocumentProcessor` contract: given the
//! original file and an output directory, populate the directory with a
//! browsable rendering rooted at `index.html` (and optionally an
//! `assets/<category>/<filename>` tree), or fail. One attempt per upload,
//! no retries; verification of the output happens in the pipeline.

use async_trait::async_trait;
use std::{io, path::Path, process::ExitStatus, time::Duration};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("failed to launch document processor: {0}")]
    Spawn(#[source] io::Error),
    #[error("document processor exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("document processor timed out after {0:?}")]
    TimedOut(Duration),
}

/// Contract with the external rendering engine.
#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    /// Render `input` into `output_dir`. On success `output_dir` contains
    /// at least the `index.html` entry point.
    async fn process(&self, input: &Path, output_dir: &Path) -> Result<(), ProcessorError>;
}

/// Production processor: spawns a configured command with the original
/// file path and the output directory as its two arguments.
pub struct CommandProcessor {
    command: String,
    timeout: Duration,
}

impl CommandProcessor {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DocumentProcessor for CommandProcessor {
    async fn process(&self, input: &Path, output_dir: &Path) -> Result<(), ProcessorError> {
        debug!(
            command = %self.command,
            input = %input.display(),
            output = %output_dir.display(),
            "invoking document processor"
        );

        let run = Command::new(&self.command)
            .arg(input)
            .arg(output_dir)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| ProcessorError::TimedOut(self.timeout))?
            .map_err(ProcessorError::Spawn)?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim().chars().take(512).collect();
            Err(ProcessorError::Failed {
                status: output.status,
                stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn missing_binary_reports_spawn_error() {
        let processor = CommandProcessor::new(
            "ragview-test-no-such-binary",
            Duration::from_secs(5),
        );
        let err = processor
            .process(&PathBuf::from("in.pdf"), &PathBuf::from("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessorError::Spawn(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_processor_times_out() {
        // `sleep` happily takes both path arguments as durations.
        let processor = CommandProcessor::new("sleep", Duration::from_millis(100));
        let err = processor
            .process(&PathBuf::from("5"), &PathBuf::from("0"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessorError::TimedOut(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_reports_failure() {
        let processor = CommandProcessor::new("false", Duration::from_secs(5));
        let err = processor
            .process(&PathBuf::from("in.pdf"), &PathBuf::from("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessorError::Failed { .. }));
    }
}

//! Ingestion pipeline — exactly-once orchestration of one upload.
//!
//! Validate, persist the original bytes, invoke the external processor a
//! single time, verify the entry point exists, and hand the verified
//! artifact back for session binding. Any failure after persistence
//! triggers compensating cleanup so no partial artifact is ever bound.

use crate::errors::AppError;
use crate::models::artifact::ArtifactPaths;
use crate::services::{
    layout::ArtifactLayout, processor::DocumentProcessor, validation::validate_upload,
};
use bytes::Bytes;
use std::{io, sync::Arc};
use tokio::{fs, fs::File, io::AsyncWriteExt};
use tracing::{info, warn};

/// Outcome of a fully verified upload, ready to bind into a session.
#[derive(Clone, Debug)]
pub struct IngestedArtifact {
    pub unique_filename: String,
    pub original_filename: String,
}

/// Orchestrates the upload-to-view pipeline over a storage layout and an
/// external processor.
#[derive(Clone)]
pub struct IngestService {
    layout: ArtifactLayout,
    processor: Arc<dyn DocumentProcessor>,
}

impl IngestService {
    pub fn new(layout: ArtifactLayout, processor: Arc<dyn DocumentProcessor>) -> Self {
        Self { layout, processor }
    }

    /// Run the full pipeline for one upload.
    ///
    /// Validation failures reject before anything touches disk. After the
    /// original file is persisted, a processing failure or missing entry
    /// point removes the file and, if then empty, its directory; cleanup
    /// is best-effort and never changes the reported outcome.
    pub async fn ingest(
        &self,
        declared_filename: Option<&str>,
        data: Bytes,
    ) -> Result<IngestedArtifact, AppError> {
        let sanitized = validate_upload(declared_filename, data.len() as u64)?;
        let paths = self.layout.new_artifact(&sanitized)?;

        self.persist(&paths, &data).await?;

        if let Err(err) = self
            .processor
            .process(&paths.original_file, &paths.processed_dir)
            .await
        {
            self.discard(&paths).await;
            return Err(AppError::Processing(err));
        }

        // The processor claimed success; trust only a navigable output.
        match fs::try_exists(&paths.entry_point).await {
            Ok(true) => {}
            _ => {
                warn!(
                    artifact = %paths.unique_filename,
                    "processor reported success but produced no entry point"
                );
                self.discard(&paths).await;
                return Err(AppError::IncompleteOutput);
            }
        }

        info!(
            artifact = %paths.unique_filename,
            size_bytes = data.len(),
            "document ingested"
        );

        Ok(IngestedArtifact {
            unique_filename: paths.unique_filename,
            original_filename: sanitized,
        })
    }

    /// Write the uploaded bytes durably to the original-file path and
    /// verify the write stuck. On error nothing but the (removed again)
    /// directory was persisted.
    async fn persist(&self, paths: &ArtifactPaths, data: &Bytes) -> Result<(), AppError> {
        fs::create_dir_all(&paths.root_dir)
            .await
            .map_err(AppError::Persistence)?;

        let write = async {
            let mut file = File::create(&paths.original_file).await?;
            file.write_all(data).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok::<_, io::Error>(())
        };
        if let Err(err) = write.await {
            let _ = fs::remove_file(&paths.original_file).await;
            let _ = fs::remove_dir(&paths.root_dir).await;
            return Err(AppError::Persistence(err));
        }

        // Defends against silent write failures.
        match fs::try_exists(&paths.original_file).await {
            Ok(true) => Ok(()),
            _ => {
                let _ = fs::remove_dir(&paths.root_dir).await;
                Err(AppError::Persistence(io::Error::new(
                    io::ErrorKind::NotFound,
                    "uploaded file missing after write",
                )))
            }
        }
    }

    /// Compensating cleanup: remove the original file and, if the root
    /// directory is now empty, the directory itself. Best-effort — a
    /// cleanup failure is logged and the processing outcome stands.
    async fn discard(&self, paths: &ArtifactPaths) {
        if let Err(err) = fs::remove_file(&paths.original_file).await {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(
                    path = %paths.original_file.display(),
                    %err,
                    "failed to remove original file during cleanup"
                );
            }
        }

        match fs::remove_dir(&paths.root_dir).await {
            Ok(()) => {}
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::DirectoryNotEmpty
                ) => {}
            Err(err) => {
                warn!(
                    path = %paths.root_dir.display(),
                    %err,
                    "failed to remove artifact directory during cleanup"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::processor::ProcessorError;
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::tempdir;

    /// Stub collaborator: writes an entry point, or not, or fails.
    enum StubBehavior {
        WriteEntryPoint,
        SucceedSilently,
        Fail,
    }

    struct StubProcessor(StubBehavior);

    #[async_trait]
    impl DocumentProcessor for StubProcessor {
        async fn process(&self, _input: &Path, output_dir: &Path) -> Result<(), ProcessorError> {
            match self.0 {
                StubBehavior::WriteEntryPoint => {
                    std::fs::create_dir_all(output_dir).unwrap();
                    std::fs::write(output_dir.join("index.html"), "<html>ok</html>").unwrap();
                    Ok(())
                }
                StubBehavior::SucceedSilently => Ok(()),
                StubBehavior::Fail => Err(ProcessorError::Spawn(io::Error::other("boom"))),
            }
        }
    }

    fn service(dir: &Path, behavior: StubBehavior) -> IngestService {
        let layout = ArtifactLayout::new(dir).unwrap();
        IngestService::new(layout, Arc::new(StubProcessor(behavior)))
    }

    fn entries(dir: &Path) -> Vec<std::fs::DirEntry> {
        std::fs::read_dir(dir).unwrap().map(Result::unwrap).collect()
    }

    #[tokio::test]
    async fn successful_ingest_creates_one_directory_and_entry_point() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path(), StubBehavior::WriteEntryPoint);

        let artifact = svc
            .ingest(Some("report.pdf"), Bytes::from_static(b"%PDF"))
            .await
            .unwrap();

        assert_eq!(artifact.original_filename, "report.pdf");
        let roots = entries(dir.path());
        assert_eq!(roots.len(), 1);

        let token_dir = roots[0].path();
        assert!(
            artifact.unique_filename.starts_with(token_dir.file_name().unwrap().to_str().unwrap())
        );
        assert!(token_dir.join(&artifact.unique_filename).is_file());
        assert!(token_dir.join("processed/index.html").is_file());
    }

    #[tokio::test]
    async fn validation_failure_writes_nothing() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path(), StubBehavior::WriteEntryPoint);

        let err = svc
            .ingest(Some("malware.exe"), Bytes::from_static(b"MZ"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn processor_failure_cleans_up_file_and_directory() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path(), StubBehavior::Fail);

        let err = svc
            .ingest(Some("report.pdf"), Bytes::from_static(b"%PDF"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Processing(_)));
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn silent_processor_success_is_treated_as_failure() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path(), StubBehavior::SucceedSilently);

        let err = svc
            .ingest(Some("report.pdf"), Bytes::from_static(b"%PDF"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IncompleteOutput));
        assert!(entries(dir.path()).is_empty());
    }
}

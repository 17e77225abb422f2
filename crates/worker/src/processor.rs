//! Simulated enhancement step.
//!
//! There is no real image model: the processor checks the source exists,
//! waits for the configured [`ProcessingDelay`], and copies the source bytes
//! to the derived output path.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use pixelift_core::enhancement::EnhancementType;
use pixelift_core::naming::enhanced_file_path;

use crate::delay::ProcessingDelay;

/// Errors that end a job in the `failed` state.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Original file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Cannot derive an output name from {}", .0.display())]
    InvalidSourcePath(PathBuf),

    #[error("Failed to write enhanced file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a successful enhancement.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub enhanced_path: PathBuf,
    /// Wall-clock seconds spent, always positive.
    pub processing_time: f64,
}

/// Runs the simulated enhancement for one source file.
#[derive(Clone)]
pub struct EnhancementProcessor {
    delay: Arc<dyn ProcessingDelay>,
}

impl EnhancementProcessor {
    pub fn new(delay: Arc<dyn ProcessingDelay>) -> Self {
        Self { delay }
    }

    /// Produce the enhanced copy of `source`.
    pub async fn process(
        &self,
        source: &Path,
        enhancement_type: EnhancementType,
    ) -> Result<ProcessedImage, ProcessError> {
        let started = Instant::now();
        tracing::info!(source = %source.display(), %enhancement_type, "Starting enhancement");

        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            return Err(ProcessError::SourceMissing(source.to_path_buf()));
        }
        let enhanced_path = enhanced_file_path(source)
            .ok_or_else(|| ProcessError::InvalidSourcePath(source.to_path_buf()))?;

        self.delay.wait(enhancement_type).await;

        tokio::fs::copy(source, &enhanced_path)
            .await
            .map_err(|source| ProcessError::Write {
                path: enhanced_path.clone(),
                source,
            })?;

        let processing_time = started.elapsed().as_secs_f64();
        tracing::info!(
            enhanced_path = %enhanced_path.display(),
            processing_time,
            "Enhancement finished",
        );

        Ok(ProcessedImage {
            enhanced_path,
            processing_time,
        })
    }
}

use crate::domain::model::{ConvertedDocument, ProcessOutput};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Runs an external program to completion and captures its output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        timeout: Duration,
    ) -> Result<ProcessOutput>;
}

/// Turns a PDF into Markdown plus any figure images.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn is_available(&self) -> bool;
    async fn convert(&self, pdf_path: &Path) -> Result<ConvertedDocument>;
}

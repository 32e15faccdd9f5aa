use crate::config::DoclingSettings;
use crate::domain::model::{ConvertedDocument, Figure};
use crate::domain::ports::{CommandRunner, DocumentConverter};
use crate::utils::error::{BridgeError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

const PROBE_TIMEOUT: Duration = Duration::from_secs(60);
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Converts PDFs by running the `docling` CLI into a throwaway staging directory.
pub struct DoclingCli<R: CommandRunner> {
    runner: R,
    settings: DoclingSettings,
}

impl<R: CommandRunner> DoclingCli<R> {
    pub fn new(runner: R, settings: DoclingSettings) -> Self {
        Self { runner, settings }
    }

    fn conversion_args(&self, pdf_path: &Path, staging: &Path) -> Vec<String> {
        vec![
            pdf_path.to_string_lossy().into_owned(),
            "--to".to_string(),
            "md".to_string(),
            "--image-export-mode".to_string(),
            self.settings.image_export_mode.clone(),
            "--output".to_string(),
            staging.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl<R: CommandRunner> DocumentConverter for DoclingCli<R> {
    async fn is_available(&self) -> bool {
        let cwd = std::env::temp_dir();
        match self
            .runner
            .run(&self.settings.command, &["--version".to_string()], &cwd, PROBE_TIMEOUT)
            .await
        {
            Ok(output) => output.success(),
            Err(e) => {
                tracing::debug!("docling probe failed: {}", e);
                false
            }
        }
    }

    async fn convert(&self, pdf_path: &Path) -> Result<ConvertedDocument> {
        let staging = tempfile::Builder::new().prefix("aria-docling-").tempdir()?;
        let pdf_path = pdf_path.canonicalize()?;

        tracing::info!("📄 Converting {} with docling", pdf_path.display());
        let output = self
            .runner
            .run(
                &self.settings.command,
                &self.conversion_args(&pdf_path, staging.path()),
                staging.path(),
                self.settings.timeout(),
            )
            .await?;

        if !output.success() {
            let fallback = format!("docling exited with code {}", output.exit_code);
            return Err(BridgeError::ConversionFailed(output.failure_text(&fallback)));
        }

        let markdown_file = find_markdown(staging.path(), &pdf_path).ok_or_else(|| {
            BridgeError::ConversionFailed("docling produced no Markdown output".to_string())
        })?;
        let markdown = tokio::fs::read_to_string(&markdown_file).await?;

        let figures = discover_images(staging.path())
            .into_iter()
            .map(|path| {
                let reference = figure_reference(&markdown, staging.path(), &path);
                Figure { path, reference }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "docling produced {} chars of Markdown and {} figures",
            markdown.len(),
            figures.len()
        );

        Ok(ConvertedDocument::new(markdown, figures).with_staging(staging))
    }
}

/// Prefers `<stem>.md`; otherwise the first Markdown file in the staging tree.
fn find_markdown(staging: &Path, pdf_path: &Path) -> Option<PathBuf> {
    if let Some(stem) = pdf_path.file_stem() {
        let expected = staging.join(format!("{}.md", stem.to_string_lossy()));
        if expected.is_file() {
            return Some(expected);
        }
    }

    let mut candidates = files_with_extensions(staging, &["md"]);
    candidates.sort_unstable();
    candidates.into_iter().next()
}

pub fn discover_images(folder: &Path) -> Vec<PathBuf> {
    let mut files = files_with_extensions(folder, IMAGE_EXTENSIONS);
    files.sort_unstable();
    files
}

fn files_with_extensions(folder: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        })
        .map(|entry| entry.path().to_path_buf())
        .collect()
}

/// The string the Markdown uses to point at `image`: a path relative to the
/// staging directory, or the absolute path.
fn figure_reference(markdown: &str, staging: &Path, image: &Path) -> Option<String> {
    if let Ok(relative) = image.strip_prefix(staging) {
        let relative = relative.to_string_lossy().replace('\\', "/");
        if markdown.contains(&relative) {
            return Some(relative);
        }
    }

    let absolute = image.to_string_lossy().into_owned();
    markdown.contains(&absolute).then_some(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_images_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let artifacts = dir.path().join("paper_artifacts");
        fs::create_dir_all(&artifacts).unwrap();
        fs::write(artifacts.join("image_000001.png"), b"png").unwrap();
        fs::write(artifacts.join("image_000000.PNG"), b"png").unwrap();
        fs::write(dir.path().join("paper.md"), "# Paper").unwrap();

        let images = discover_images(dir.path());
        assert_eq!(images.len(), 2);
        assert!(images[0].ends_with("image_000000.PNG"));
        assert!(images[1].ends_with("image_000001.png"));
    }

    #[test]
    fn test_find_markdown_prefers_pdf_stem() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "other").unwrap();
        fs::write(dir.path().join("paper.md"), "mine").unwrap();

        let found = find_markdown(dir.path(), Path::new("/papers/paper.pdf")).unwrap();
        assert!(found.ends_with("paper.md"));

        let found = find_markdown(dir.path(), Path::new("/papers/missing.pdf")).unwrap();
        assert!(found.ends_with("a.md"));
    }

    #[test]
    fn test_figure_reference() {
        let staging = Path::new("/tmp/stage");
        let image = Path::new("/tmp/stage/paper_artifacts/image_0.png");

        let markdown = "![Image](paper_artifacts/image_0.png)";
        assert_eq!(
            figure_reference(markdown, staging, image).as_deref(),
            Some("paper_artifacts/image_0.png")
        );

        assert_eq!(figure_reference("no images", staging, image), None);
    }
}

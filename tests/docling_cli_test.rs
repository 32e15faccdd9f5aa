use anyhow::Result;
use aria_bridge::config::DoclingSettings;
use aria_bridge::domain::model::ProcessOutput;
use aria_bridge::domain::ports::{CommandRunner, DocumentConverter};
use aria_bridge::{DoclingBridge, DoclingCli, ErrorCode};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

type Script = dyn Fn(&Path) -> std::io::Result<ProcessOutput> + Send + Sync;

/// Plays docling: `--version` succeeds, a conversion runs `script` in the
/// directory it was started in.
struct FakeDocling {
    script: Box<Script>,
    conversions: Arc<Mutex<Vec<(Vec<String>, PathBuf)>>>,
}

impl FakeDocling {
    fn new<F>(script: F) -> (Self, Arc<Mutex<Vec<(Vec<String>, PathBuf)>>>)
    where
        F: Fn(&Path) -> std::io::Result<ProcessOutput> + Send + Sync + 'static,
    {
        let conversions = Arc::new(Mutex::new(Vec::new()));
        let fake = Self {
            script: Box::new(script),
            conversions: conversions.clone(),
        };
        (fake, conversions)
    }
}

#[async_trait]
impl CommandRunner for FakeDocling {
    async fn run(
        &self,
        _program: &str,
        args: &[String],
        cwd: &Path,
        _timeout: Duration,
    ) -> aria_bridge::Result<ProcessOutput> {
        if args == ["--version".to_string()] {
            return Ok(ProcessOutput::default());
        }

        self.conversions
            .lock()
            .unwrap()
            .push((args.to_vec(), cwd.to_path_buf()));
        Ok((self.script)(cwd)?)
    }
}

fn exited(exit_code: i32, stderr: &str) -> ProcessOutput {
    ProcessOutput {
        exit_code,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Writes what `docling --to md --image-export-mode referenced` leaves behind.
fn write_referenced_output(cwd: &Path) -> std::io::Result<ProcessOutput> {
    let artifacts = cwd.join("paper_artifacts");
    std::fs::create_dir_all(&artifacts)?;
    std::fs::write(artifacts.join("image_000000_ab.png"), b"png-bytes")?;
    std::fs::write(
        cwd.join("paper.md"),
        "# T\n![Image](paper_artifacts/image_000000_ab.png)\n",
    )?;
    Ok(exited(0, ""))
}

fn write_pdf(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("paper.pdf");
    std::fs::write(&path, b"%PDF-1.4\n")?;
    Ok(path)
}

#[tokio::test]
async fn test_conversion_runs_docling_in_staging_dir() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let pdf = write_pdf(temp_dir.path())?;

    let (runner, conversions) = FakeDocling::new(write_referenced_output);
    let converter = DoclingCli::new(runner, DoclingSettings::default());

    assert!(converter.is_available().await);
    let document = converter.convert(&pdf).await?;

    assert_eq!(document.markdown, "# T\n![Image](paper_artifacts/image_000000_ab.png)\n");
    assert_eq!(document.figures.len(), 1);
    assert_eq!(
        document.figures[0].reference.as_deref(),
        Some("paper_artifacts/image_000000_ab.png")
    );

    let conversions = conversions.lock().unwrap();
    let (args, cwd) = &conversions[0];
    let staging = cwd.to_string_lossy().into_owned();
    assert_eq!(
        args,
        &vec![
            pdf.canonicalize()?.to_string_lossy().into_owned(),
            "--to".to_string(),
            "md".to_string(),
            "--image-export-mode".to_string(),
            "referenced".to_string(),
            "--output".to_string(),
            staging,
        ]
    );
    assert_eq!(document.staging_dir(), Some(cwd.as_path()));

    let staging = cwd.clone();
    drop(document);
    assert!(!staging.exists());
    Ok(())
}

#[tokio::test]
async fn test_bridge_rewrites_docling_figure_references() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let pdf = write_pdf(temp_dir.path())?;
    let output_dir = temp_dir.path().join("out");

    let (runner, _) = FakeDocling::new(write_referenced_output);
    let bridge = DoclingBridge::new(DoclingCli::new(runner, DoclingSettings::default()));
    let result = bridge.convert(&pdf, Some(&output_dir)).await?;

    let assets_dir = output_dir.join("paper_assets").canonicalize()?;
    assert_eq!(result.assets_dir.map(PathBuf::from), Some(assets_dir.clone()));
    assert_eq!(std::fs::read(assets_dir.join("figure_0.png"))?, b"png-bytes");
    assert_eq!(
        std::fs::read_to_string(&result.markdown_path)?,
        "# T\n![Image](paper_assets/figure_0.png)\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_nonzero_exit_is_conversion_failed() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let pdf = write_pdf(temp_dir.path())?;

    let (runner, _) = FakeDocling::new(|_| Ok(exited(2, "RuntimeError: PDF is encrypted")));
    let bridge = DoclingBridge::new(DoclingCli::new(runner, DoclingSettings::default()));

    let err = bridge.convert(&pdf, None).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConversionFailed);
    assert_eq!(err.to_string(), "RuntimeError: PDF is encrypted");

    let (runner, _) = FakeDocling::new(|_| Ok(exited(3, "")));
    let converter = DoclingCli::new(runner, DoclingSettings::default());
    let err = converter.convert(&pdf).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConversionFailed);
    assert_eq!(err.to_string(), "docling exited with code 3");

    assert!(!temp_dir.path().join("paper.md").exists());
    Ok(())
}

#[tokio::test]
async fn test_clean_exit_without_markdown_is_conversion_failed() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let pdf = write_pdf(temp_dir.path())?;

    let (runner, _) = FakeDocling::new(|cwd| {
        std::fs::write(cwd.join("paper.json"), "{}")?;
        Ok(exited(0, ""))
    });
    let bridge = DoclingBridge::new(DoclingCli::new(runner, DoclingSettings::default()));

    let err = bridge.convert(&pdf, None).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConversionFailed);
    assert_eq!(err.to_string(), "docling produced no Markdown output");
    Ok(())
}

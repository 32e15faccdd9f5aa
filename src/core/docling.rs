use crate::domain::model::{ConversionResult, ConvertedDocument};
use crate::domain::ports::DocumentConverter;
use crate::utils::error::{BridgeError, Result};
use crate::utils::validation;
use std::path::{Path, PathBuf};

pub const DOCLING_NOT_INSTALLED: &str = "docling is not installed. Run: pip install docling";

/// Fails with `INVALID_INPUT` unless `pdf_path` is an existing regular file.
pub fn ensure_pdf_exists(pdf_path: &Path) -> Result<()> {
    let valid = validation::validate_path("pdf_path", &pdf_path.to_string_lossy()).is_ok();

    if !valid || !pdf_path.is_file() {
        return Err(BridgeError::InvalidInput(format!(
            "PDF file not found: {}",
            pdf_path.display()
        )));
    }
    Ok(())
}

pub async fn ensure_converter_available<C: DocumentConverter>(converter: &C) -> Result<()> {
    if !converter.is_available().await {
        return Err(BridgeError::NotInstalled(DOCLING_NOT_INSTALLED.to_string()));
    }
    Ok(())
}

pub fn file_stem(pdf_path: &Path) -> String {
    pdf_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Absolute form of `path`, which must already exist.
pub fn absolute(path: &Path) -> Result<String> {
    Ok(path.canonicalize()?.to_string_lossy().into_owned())
}

pub struct DoclingBridge<C: DocumentConverter> {
    converter: C,
}

impl<C: DocumentConverter> DoclingBridge<C> {
    pub fn new(converter: C) -> Self {
        Self { converter }
    }

    /// Converts `pdf_path` into `<out>/<stem>.md` plus `<out>/<stem>_assets/figure_<i>.<ext>`.
    /// `out` defaults to the PDF's directory.
    pub async fn convert(&self, pdf_path: &Path, output_dir: Option<&Path>) -> Result<ConversionResult> {
        ensure_pdf_exists(pdf_path)?;
        ensure_converter_available(&self.converter).await?;

        let out_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => pdf_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        self.convert_into(pdf_path, &out_dir)
            .await
            .map_err(BridgeError::into_conversion_failure)
    }

    async fn convert_into(&self, pdf_path: &Path, out_dir: &Path) -> Result<ConversionResult> {
        tokio::fs::create_dir_all(out_dir).await?;

        let document = self.converter.convert(pdf_path).await?;
        if let Some(staging) = document.staging_dir() {
            tracing::debug!("Converter output staged in {}", staging.display());
        }
        let stem = file_stem(pdf_path);

        let assets_dir = out_dir.join(format!("{}_assets", stem));
        let (markdown, figure_count) = export_figures(&document, &assets_dir, &stem).await?;

        let md_path = out_dir.join(format!("{}.md", stem));
        tokio::fs::write(&md_path, markdown).await?;
        tracing::info!("✅ Saved Markdown to {}", md_path.display());

        let assets_dir = if figure_count > 0 {
            tracing::info!("🖼️ Exported {} figures to {}", figure_count, assets_dir.display());
            Some(absolute(&assets_dir)?)
        } else {
            None
        };

        Ok(ConversionResult {
            markdown_path: absolute(&md_path)?,
            assets_dir,
        })
    }
}

/// Copies figures to `assets_dir/figure_<i>.<ext>` and points Markdown image
/// references at the copies. The extension follows the source image, lowercased. Returns the rewritten Markdown and the number of
/// figures written; `assets_dir` is only created when there is a figure.
async fn export_figures(
    document: &ConvertedDocument,
    assets_dir: &Path,
    stem: &str,
) -> Result<(String, usize)> {
    let mut markdown = document.markdown.clone();
    if document.figures.is_empty() {
        return Ok((markdown, 0));
    }

    tokio::fs::create_dir_all(assets_dir).await?;

    for (i, figure) in document.figures.iter().enumerate() {
        let file_name = format!("figure_{}.{}", i, figure_extension(&figure.path));
        tokio::fs::copy(&figure.path, assets_dir.join(&file_name)).await?;

        if let Some(reference) = &figure.reference {
            markdown = markdown.replace(reference, &format!("{}_assets/{}", stem, file_name));
        }
    }

    Ok((markdown, document.figures.len()))
}

fn figure_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "png".to_string())
}

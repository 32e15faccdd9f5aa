use crate::core::docling::{absolute, ensure_converter_available, ensure_pdf_exists};
use crate::core::markdown;
use crate::domain::model::{AnalysisResult, PaperMetadata};
use crate::domain::ports::DocumentConverter;
use crate::utils::error::{BridgeError, Result};
use chrono::Utc;
use std::path::Path;

pub const MARKDOWN_FILE: &str = "paper.md";
pub const METADATA_FILE: &str = "metadata.json";

/// Runs every extractor over `markdown`.
pub fn build_metadata(pdf_path: &Path, markdown: &str) -> Result<PaperMetadata> {
    Ok(PaperMetadata {
        original_path: absolute(pdf_path)?,
        filename: pdf_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        title: markdown::extract_title(markdown),
        abstract_text: markdown::extract_abstract(markdown),
        sections: markdown::extract_sections(markdown),
        keywords: markdown::extract_keywords(markdown),
        processing_status: "completed".to_string(),
        word_count: markdown::word_count(markdown),
        char_count: markdown::char_count(markdown),
        processed_at: Utc::now(),
    })
}

pub struct PaperAnalyzer<C: DocumentConverter> {
    converter: C,
}

impl<C: DocumentConverter> PaperAnalyzer<C> {
    pub fn new(converter: C) -> Self {
        Self { converter }
    }

    /// Converts the paper, scrapes its metadata, and writes `paper.md` and
    /// `metadata.json` into `output_dir`.
    pub async fn analyze(&self, pdf_path: &Path, output_dir: &Path) -> Result<AnalysisResult> {
        ensure_pdf_exists(pdf_path)?;
        ensure_converter_available(&self.converter).await?;

        let document = self
            .converter
            .convert(pdf_path)
            .await
            .map_err(BridgeError::into_conversion_failure)?;

        let metadata = build_metadata(pdf_path, &document.markdown)?;
        tracing::info!(
            "🔎 Extracted \"{}\": {} sections, {} keywords",
            metadata.title,
            metadata.sections.len(),
            metadata.keywords.len()
        );

        tokio::fs::create_dir_all(output_dir).await?;

        let md_path = output_dir.join(MARKDOWN_FILE);
        tokio::fs::write(&md_path, &document.markdown).await?;
        tracing::info!("✅ Saved: {}", md_path.display());

        let metadata_path = output_dir.join(METADATA_FILE);
        tokio::fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?).await?;
        tracing::info!("✅ Saved: {}", metadata_path.display());

        Ok(AnalysisResult {
            markdown_path: absolute(&md_path)?,
            metadata_path: absolute(&metadata_path)?,
            metadata,
        })
    }
}

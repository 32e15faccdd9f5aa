use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Search strategy passed through to `graphrag query --method`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Local,
    Global,
    Drift,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Local => "local",
            QueryMode::Global => "global",
            QueryMode::Drift => "drift",
        }
    }
}

/// Captured result of one external process run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// A run that never produced output, e.g. it could not be spawned or timed out.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            stdout: String::new(),
            stderr: reason.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stderr, else stdout, else `fallback`.
    pub fn failure_text(&self, fallback: &str) -> String {
        if !self.stderr.is_empty() {
            self.stderr.clone()
        } else if !self.stdout.is_empty() {
            self.stdout.clone()
        } else {
            fallback.to_string()
        }
    }
}

/// An image emitted by the converter into its staging directory.
#[derive(Debug, Clone)]
pub struct Figure {
    pub path: PathBuf,
    /// How the Markdown refers to this image, if it does.
    pub reference: Option<String>,
}

/// Raw output of a PDF conversion. Figures live in `staging` and are only
/// valid while this value is alive.
#[derive(Debug)]
pub struct ConvertedDocument {
    pub markdown: String,
    pub figures: Vec<Figure>,
    staging: Option<tempfile::TempDir>,
}

impl ConvertedDocument {
    pub fn new(markdown: String, figures: Vec<Figure>) -> Self {
        Self {
            markdown,
            figures,
            staging: None,
        }
    }

    pub fn with_staging(mut self, staging: tempfile::TempDir) -> Self {
        self.staging = Some(staging);
        self
    }

    pub fn staging_dir(&self) -> Option<&std::path::Path> {
        self.staging.as_ref().map(|dir| dir.path())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub markdown_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResult {
    pub work_dir: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResult {
    pub index_id: String,
    pub output_dir: Option<String>,
    pub documents_processed: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub answer: String,
    pub mode: QueryMode,
    pub community_level: u32,
}

/// A document to be written into a GraphRAG `input/` directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRagDocument {
    pub id: String,
    pub text: String,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResult {
    pub input_dir: String,
    pub documents_staged: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub level: u8,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub original_path: String,
    pub filename: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub sections: Vec<Section>,
    pub keywords: Vec<String>,
    pub processing_status: String,
    pub word_count: usize,
    pub char_count: usize,
    pub processed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub markdown_path: String,
    pub metadata_path: String,
    pub metadata: PaperMetadata,
}

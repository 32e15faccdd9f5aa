use crate::config::GraphRagSettings;
use crate::core::docling::absolute;
use crate::domain::model::{
    GraphRagDocument, IndexResult, InitResult, ProcessOutput, QueryMode, QueryResult, StageResult,
};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{BridgeError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const GRAPHRAG_NOT_INSTALLED: &str = "graphrag is not installed. Run: pip install graphrag";
pub const API_KEY_NOT_CONFIGURED: &str = "OpenAI API key not configured";
pub const INPUT_EXTENSIONS: &[&str] = &["txt", "md"];

fn mentions_api_key(text: &str) -> bool {
    text.contains("OPENAI_API_KEY") || text.to_lowercase().contains("api_key")
}

/// Maps a failed `graphrag index` run to an error code.
pub fn classify_index_failure(output: &ProcessOutput) -> BridgeError {
    let message = output.failure_text("Indexing failed");

    if mentions_api_key(&message) {
        BridgeError::ApiKeyMissing(format!(
            "{}. Set OPENAI_API_KEY environment variable or configure in settings.yaml",
            API_KEY_NOT_CONFIGURED
        ))
    } else if message.to_lowercase().contains("rate limit") {
        BridgeError::RateLimit(message)
    } else {
        BridgeError::Unknown(message)
    }
}

/// Maps a failed `graphrag query` run to an error code.
pub fn classify_query_failure(output: &ProcessOutput) -> BridgeError {
    let message = output.failure_text("Query failed");

    if mentions_api_key(&message) {
        BridgeError::ApiKeyMissing(API_KEY_NOT_CONFIGURED.to_string())
    } else {
        BridgeError::QueryFailed(message)
    }
}

/// `*.txt` and `*.md` files directly inside `input_dir`, sorted. Anything
/// other than a directory holds no documents.
pub fn list_input_documents(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !input_dir.is_dir() {
        return Ok(files);
    }
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        let matches = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| INPUT_EXTENSIONS.contains(&ext));
        if matches {
            files.push(path);
        }
    }
    files.sort_unstable();
    Ok(files)
}

/// Document body as written into `input/`, with an optional JSON front-matter block.
pub fn render_document(document: &GraphRagDocument) -> Result<String> {
    match &document.metadata {
        Some(metadata) => Ok(format!(
            "---\n{}\n---\n\n{}",
            serde_json::to_string_pretty(metadata)?,
            document.text
        )),
        None => Ok(document.text.clone()),
    }
}

pub struct GraphRagBridge<R: CommandRunner> {
    runner: R,
    settings: GraphRagSettings,
}

impl<R: CommandRunner> GraphRagBridge<R> {
    pub fn new(runner: R, settings: GraphRagSettings) -> Self {
        Self { runner, settings }
    }

    pub async fn is_installed(&self) -> bool {
        let cwd = std::env::temp_dir();
        match self
            .runner
            .run(
                &self.settings.command,
                &["--help".to_string()],
                &cwd,
                self.settings.probe_timeout(),
            )
            .await
        {
            Ok(output) => output.success(),
            Err(e) => {
                tracing::debug!("graphrag probe failed: {}", e);
                false
            }
        }
    }

    async fn ensure_installed(&self) -> Result<()> {
        if !self.is_installed().await {
            return Err(BridgeError::NotInstalled(GRAPHRAG_NOT_INSTALLED.to_string()));
        }
        Ok(())
    }

    /// Runs the graphrag CLI in `work_dir`. Spawn failures and timeouts come
    /// back as a failed run carrying the reason on stderr.
    async fn run_cli(&self, args: Vec<String>, work_dir: &Path) -> ProcessOutput {
        tracing::info!("🚀 graphrag {}", args.first().map(String::as_str).unwrap_or(""));
        match self
            .runner
            .run(&self.settings.command, &args, work_dir, self.settings.timeout())
            .await
        {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("graphrag did not complete: {}", e);
                ProcessOutput::failed(e.to_string())
            }
        }
    }

    pub async fn init(&self, work_dir: &Path) -> Result<InitResult> {
        self.ensure_installed().await?;

        tokio::fs::create_dir_all(work_dir).await?;
        let root = absolute(work_dir)?;

        let output = self
            .run_cli(vec!["init".to_string(), "--root".to_string(), root.clone()], work_dir)
            .await;

        if !output.success() {
            return Err(BridgeError::InitFailed(
                output.failure_text("Failed to initialize GraphRAG"),
            ));
        }

        Ok(InitResult {
            work_dir: root,
            message: "GraphRAG initialized successfully".to_string(),
        })
    }

    pub async fn index(&self, work_dir: &Path) -> Result<IndexResult> {
        self.ensure_installed().await?;

        let input_dir = work_dir.join("input");
        if !input_dir.exists() {
            return Err(BridgeError::InvalidInput(format!(
                "Input directory not found: {}",
                input_dir.display()
            )));
        }

        let input_files = list_input_documents(&input_dir)?;
        if input_files.is_empty() {
            return Err(BridgeError::InvalidInput(format!(
                "No .txt or .md files found in {}",
                input_dir.display()
            )));
        }

        if !work_dir.join("settings.yaml").exists() {
            return Err(BridgeError::NotInitialized(format!(
                "settings.yaml not found. Run 'init' command first or create settings.yaml in {}",
                work_dir.display()
            )));
        }

        tracing::info!("📚 Indexing {} documents", input_files.len());
        let root = absolute(work_dir)?;
        let output = self
            .run_cli(vec!["index".to_string(), "--root".to_string(), root], work_dir)
            .await;

        if !output.success() {
            return Err(classify_index_failure(&output));
        }

        let output_dir = work_dir.join("output");
        let output_dir = if output_dir.exists() {
            Some(absolute(&output_dir)?)
        } else {
            None
        };

        Ok(IndexResult {
            index_id: index_id(work_dir),
            output_dir,
            documents_processed: input_files.len(),
            message: "Indexing completed successfully".to_string(),
        })
    }

    pub async fn query(
        &self,
        work_dir: &Path,
        query: &str,
        mode: Option<QueryMode>,
        community_level: Option<u32>,
    ) -> Result<QueryResult> {
        self.ensure_installed().await?;

        if query.trim().is_empty() {
            return Err(BridgeError::InvalidInput("query is required".to_string()));
        }

        let output_dir = work_dir.join("output");
        if !output_dir.exists() {
            return Err(BridgeError::IndexNotFound(format!(
                "Index not found at {}. Run indexing first.",
                output_dir.display()
            )));
        }

        let mode = mode.unwrap_or(self.settings.default_mode);
        let community_level = community_level.unwrap_or(self.settings.default_community_level);

        let args = vec![
            "query".to_string(),
            "--root".to_string(),
            absolute(work_dir)?,
            "--method".to_string(),
            mode.as_str().to_string(),
            "--community-level".to_string(),
            community_level.to_string(),
            "--query".to_string(),
            query.to_string(),
        ];
        let output = self.run_cli(args, work_dir).await;

        if !output.success() {
            return Err(classify_query_failure(&output));
        }

        let answer = if output.stdout.is_empty() {
            "No answer generated".to_string()
        } else {
            output.stdout.trim().to_string()
        };

        Ok(QueryResult {
            answer,
            mode,
            community_level,
        })
    }
}

/// Writes documents into `work_dir/input/<id>.txt`. Needs no graphrag install.
pub async fn stage_documents(work_dir: &Path, documents: &[GraphRagDocument]) -> Result<StageResult> {
    if documents.is_empty() {
        return Err(BridgeError::InvalidInput("documents is required".to_string()));
    }
    let mut seen = HashSet::with_capacity(documents.len());
    for document in documents {
        if document.id.trim().is_empty() || document.id.contains(|c| c == '/' || c == '\\') {
            return Err(BridgeError::InvalidInput(format!(
                "invalid document id: '{}'",
                document.id
            )));
        }
        if !seen.insert(document.id.as_str()) {
            return Err(BridgeError::InvalidInput(format!(
                "duplicate document id: '{}'",
                document.id
            )));
        }
    }

    let input_dir = work_dir.join("input");
    tokio::fs::create_dir_all(&input_dir).await?;

    let mut staged = Vec::with_capacity(documents.len());
    for document in documents {
        let path = input_dir.join(format!("{}.txt", document.id));
        tokio::fs::write(&path, render_document(document)?).await?;
        staged.push(absolute(&path)?);
    }

    tracing::info!("📥 Staged {} documents in {}", staged.len(), input_dir.display());
    Ok(StageResult {
        input_dir: absolute(&input_dir)?,
        documents_staged: staged,
    })
}

/// One document per file, named after the file stem.
pub async fn load_documents(files: &[PathBuf], metadata: Option<&str>) -> Result<Vec<GraphRagDocument>> {
    let metadata = match metadata {
        Some(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(map)) => Some(map),
            Ok(_) => {
                return Err(BridgeError::InvalidInput(
                    "--metadata must be a JSON object".to_string(),
                ))
            }
            Err(e) => {
                return Err(BridgeError::InvalidInput(format!(
                    "--metadata is not valid JSON: {}",
                    e
                )))
            }
        },
        None => None,
    };

    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        if !file.is_file() {
            return Err(BridgeError::InvalidInput(format!(
                "Document not found: {}",
                file.display()
            )));
        }
        let id = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = tokio::fs::read_to_string(file).await?;
        documents.push(GraphRagDocument {
            id,
            text,
            metadata: metadata.clone(),
        });
    }
    Ok(documents)
}

/// The index is named after its work directory.
fn index_id(work_dir: &Path) -> String {
    work_dir
        .canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(work_dir)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

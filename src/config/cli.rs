use crate::config::BridgeConfig;
use crate::core::envelope;
use crate::domain::model::QueryMode;
use crate::utils::error::Result;
use crate::utils::logger;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

pub const NO_COMMAND_SPECIFIED: &str =
    "No command specified. Use 'init', 'index', 'query', or 'stage'.";

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Path to TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "docling-bridge")]
#[command(about = "Convert a PDF to Markdown with docling and report the result as JSON")]
#[command(version)]
pub struct DoclingArgs {
    /// PDF file to convert
    pub pdf_path: PathBuf,

    /// Directory for the Markdown and figure assets (defaults to the PDF's directory)
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "graphrag-bridge")]
#[command(about = "Drive the GraphRAG CLI and report the result as JSON")]
#[command(version)]
pub struct GraphRagArgs {
    #[command(subcommand)]
    pub command: GraphRagCommand,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Subcommand)]
pub enum GraphRagCommand {
    /// Initialize GraphRAG configuration
    Init {
        /// Working directory to initialize
        work_dir: PathBuf,
    },
    /// Build GraphRAG index
    Index {
        /// Working directory with input/ folder
        work_dir: PathBuf,
    },
    /// Query the knowledge graph
    Query {
        /// Working directory with output/ folder
        work_dir: PathBuf,

        /// Query string
        query: String,

        /// Query mode (defaults to the configured mode, normally local)
        #[arg(long, value_enum)]
        mode: Option<QueryMode>,

        /// Community level for search (defaults to the configured level, normally 2)
        #[arg(long)]
        community_level: Option<u32>,
    },
    /// Copy text documents into the work directory's input/ folder
    Stage {
        /// Working directory that receives input/
        work_dir: PathBuf,

        /// Text or Markdown files to stage
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// JSON object written as front matter into every staged document
        #[arg(long)]
        metadata: Option<String>,
    },
}

#[derive(Debug, Clone, Parser)]
#[command(name = "paper-analyze")]
#[command(about = "Convert a paper with docling and extract title, abstract, sections and keywords")]
#[command(version)]
pub struct AnalyzeArgs {
    /// PDF file to analyze
    pub pdf_path: PathBuf,

    /// Directory receiving paper.md and metadata.json
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Parses the process arguments. Rejected arguments are reported as an
/// `INVALID_INPUT` envelope; `--help` and `--version` print as usual.
pub fn parse_args<P: Parser>() -> std::result::Result<P, ExitCode> {
    P::try_parse().map_err(report_parse_error)
}

pub fn report_parse_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            if let Err(e) = err.print() {
                eprintln!("{}", e);
            }
            ExitCode::SUCCESS
        }
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            envelope::emit_usage_error(NO_COMMAND_SPECIFIED)
        }
        _ => envelope::emit_usage_error(err.render().to_string().trim()),
    }
}

/// Loads configuration and installs logging. Logging comes up even when the
/// configuration is rejected so the failure is still traced.
pub fn bootstrap(common: &CommonArgs) -> Result<BridgeConfig> {
    let config = BridgeConfig::load(common.config.as_deref());
    let format = config
        .as_ref()
        .map(|config| config.logging.format)
        .unwrap_or_default();
    logger::init_cli_logger(common.verbose, format);

    if let Ok(config) = &config {
        tracing::debug!("Bridge config: {:?}", config);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_docling_args() {
        let args = DoclingArgs::try_parse_from(["docling-bridge", "paper.pdf", "out", "-v"]).unwrap();
        assert_eq!(args.pdf_path, PathBuf::from("paper.pdf"));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert!(args.common.verbose);

        assert!(DoclingArgs::try_parse_from(["docling-bridge"]).is_err());
    }

    #[test]
    fn test_parse_query_args() {
        let args = GraphRagArgs::try_parse_from([
            "graphrag-bridge",
            "query",
            "./work",
            "what is attention?",
            "--mode",
            "global",
            "--community-level",
            "3",
        ])
        .unwrap();

        match args.command {
            GraphRagCommand::Query {
                query,
                mode,
                community_level,
                ..
            } => {
                assert_eq!(query, "what is attention?");
                assert_eq!(mode, Some(QueryMode::Global));
                assert_eq!(community_level, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let result = GraphRagArgs::try_parse_from([
            "graphrag-bridge",
            "query",
            "./work",
            "q",
            "--mode",
            "basic",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_stage_args() {
        let args = GraphRagArgs::try_parse_from([
            "graphrag-bridge",
            "stage",
            "./work",
            "a.md",
            "b.txt",
            "--metadata",
            r#"{"source":"arxiv"}"#,
        ])
        .unwrap();

        match args.command {
            GraphRagCommand::Stage { files, metadata, .. } => {
                assert_eq!(files, vec![PathBuf::from("a.md"), PathBuf::from("b.txt")]);
                assert_eq!(metadata.as_deref(), Some(r#"{"source":"arxiv"}"#));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(GraphRagArgs::try_parse_from(["graphrag-bridge", "stage", "./work"]).is_err());
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(GraphRagArgs::try_parse_from(["graphrag-bridge"]).is_err());
    }
}

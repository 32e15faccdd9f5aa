use aria_bridge::config::cli::{self, GraphRagArgs, GraphRagCommand};
use aria_bridge::core::{envelope, graphrag};
use aria_bridge::{GraphRagBridge, TokioCommandRunner};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args::<GraphRagArgs>() {
        Ok(args) => args,
        Err(exit_code) => return exit_code,
    };

    let config = match cli::bootstrap(&args.common) {
        Ok(config) => config,
        Err(e) => return envelope::emit::<()>(&Err(e)),
    };

    let bridge = GraphRagBridge::new(TokioCommandRunner::new(), config.graphrag);

    match args.command {
        GraphRagCommand::Init { work_dir } => envelope::emit(&bridge.init(&work_dir).await),
        GraphRagCommand::Index { work_dir } => envelope::emit(&bridge.index(&work_dir).await),
        GraphRagCommand::Query {
            work_dir,
            query,
            mode,
            community_level,
        } => envelope::emit(&bridge.query(&work_dir, &query, mode, community_level).await),
        GraphRagCommand::Stage {
            work_dir,
            files,
            metadata,
        } => {
            let result = match graphrag::load_documents(&files, metadata.as_deref()).await {
                Ok(documents) => graphrag::stage_documents(&work_dir, &documents).await,
                Err(e) => Err(e),
            };
            envelope::emit(&result)
        }
    }
}

use aria_bridge::config::cli::{self, AnalyzeArgs};
use aria_bridge::core::envelope;
use aria_bridge::domain::model::AnalysisResult;
use aria_bridge::{DoclingCli, PaperAnalyzer, Result, TokioCommandRunner};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args::<AnalyzeArgs>() {
        Ok(args) => args,
        Err(exit_code) => return exit_code,
    };

    envelope::emit(&run(&args).await)
}

async fn run(args: &AnalyzeArgs) -> Result<AnalysisResult> {
    let config = cli::bootstrap(&args.common)?;

    tracing::info!("Analyzing {}", args.pdf_path.display());

    let converter = DoclingCli::new(TokioCommandRunner::new(), config.docling);
    let analyzer = PaperAnalyzer::new(converter);

    analyzer.analyze(&args.pdf_path, &args.output_dir).await
}

use aria_bridge::config::cli::{self, DoclingArgs};
use aria_bridge::core::envelope;
use aria_bridge::domain::model::ConversionResult;
use aria_bridge::{DoclingBridge, DoclingCli, Result, TokioCommandRunner};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args::<DoclingArgs>() {
        Ok(args) => args,
        Err(exit_code) => return exit_code,
    };

    envelope::emit(&run(&args).await)
}

async fn run(args: &DoclingArgs) -> Result<ConversionResult> {
    let config = cli::bootstrap(&args.common)?;

    tracing::info!("Starting docling bridge for {}", args.pdf_path.display());

    let converter = DoclingCli::new(TokioCommandRunner::new(), config.docling);
    let bridge = DoclingBridge::new(converter);

    bridge
        .convert(&args.pdf_path, args.output_dir.as_deref())
        .await
}

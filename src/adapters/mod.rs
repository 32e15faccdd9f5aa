// Adapters layer: concrete implementations of the domain ports backed by external processes.

pub mod docling_cli;
pub mod process;

pub use docling_cli::DoclingCli;
pub use process::TokioCommandRunner;

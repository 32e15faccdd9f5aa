pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{DoclingCli, TokioCommandRunner};
pub use crate::config::BridgeConfig;
pub use crate::core::{analyze::PaperAnalyzer, docling::DoclingBridge, graphrag::GraphRagBridge};
pub use crate::utils::error::{BridgeError, ErrorCode, Result};

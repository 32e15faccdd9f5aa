pub mod analyze;
pub mod docling;
pub mod envelope;
pub mod graphrag;
pub mod markdown;

pub use crate::domain::model::{ConversionResult, ConvertedDocument, ProcessOutput, QueryMode};
pub use crate::domain::ports::{CommandRunner, DocumentConverter};
pub use crate::utils::error::Result;

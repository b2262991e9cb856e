pub mod compare;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod types;

pub use config::{AnalysisOptions, AnalyzerConfig, OutputFormat, OutputTarget, ToolSpec};
pub use error::{AnalyzerError, Result};
pub use model::ModelAnalysis;
pub use pipeline::Analyzer;

use std::io;
use std::path::PathBuf;

/// All error types for the URDF analyzer.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid joint type: '{0}'")]
    InvalidJointType(String),
    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("Missing required attribute '{attribute}' on <{geometry}>")]
    MissingRequiredAttribute {
        geometry: &'static str,
        attribute: &'static str,
    },
    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Source descriptor not found in {}", .0.display())]
    SourceDescriptorNotFound(PathBuf),
    #[error("Descriptor error in {}: {message}", path.display())]
    Descriptor { path: PathBuf, message: String },
    #[error("Kinematics error: {0}")]
    Kinematics(String),
    #[error("Tool error: {0}")]
    Tool(String),
    #[error("Output error: {0}")]
    Output(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

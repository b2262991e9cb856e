//! Optional forward-kinematics collaborator used by the duplicate diff.

use std::path::Path;
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::compare::tools::FILE_PLACEHOLDER;
use crate::error::{AnalyzerError, Result};

/// Absolute tolerance used when comparing two poses.
pub const POSE_TOLERANCE: f64 = 1e-6;

/// A pose as produced by the kinematics tool, flattened row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pose {
    pub values: Vec<f64>,
}

impl Pose {
    /// Whether two poses differ: different shapes, or any element further
    /// apart than `tolerance`.
    pub fn differs_from(&self, other: &Pose, tolerance: f64) -> bool {
        self.values.len() != other.values.len()
            || self
                .values
                .iter()
                .zip(&other.values)
                .any(|(a, b)| (a - b).abs() > tolerance)
    }

    /// Element-wise `other - self`; `None` when the shapes differ.
    pub fn delta(&self, other: &Pose) -> Option<Vec<f64>> {
        (self.values.len() == other.values.len()).then(|| {
            self.values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| b - a)
                .collect()
        })
    }
}

/// Computes the forward-kinematics pose of a URDF model.
pub trait Kinematics {
    fn forward_kinematics(&self, urdf: &Path) -> Result<Pose>;
}

/// External program printing the pose as a JSON array of numbers (nested
/// arrays are flattened) on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandKinematics {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandKinematics {
    /// Split a command line on whitespace: program followed by arguments.
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AnalyzerError::Kinematics("empty kinematics command".into()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Kinematics for CommandKinematics {
    fn forward_kinematics(&self, urdf: &Path) -> Result<Pose> {
        let urdf = std::path::absolute(urdf).unwrap_or_else(|_| urdf.to_path_buf());
        let file = urdf.display().to_string();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(FILE_PLACEHOLDER, &file))
            .collect();
        if !self.args.iter().any(|a| a.contains(FILE_PLACEHOLDER)) {
            args.push(file);
        }

        let mut command = Command::new(&self.program);
        command.args(&args).stdin(Stdio::null()).stderr(Stdio::null());
        if let Some(dir) = urdf.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }
        let output = command
            .output()
            .map_err(|e| AnalyzerError::Kinematics(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(AnalyzerError::Kinematics(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        parse_pose(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse a JSON number array (possibly nested) into a [`Pose`].
pub fn parse_pose(text: &str) -> Result<Pose> {
    let value: serde_json::Value = serde_json::from_str(text.trim())
        .map_err(|e| AnalyzerError::Kinematics(format!("pose is not valid JSON: {e}")))?;

    let mut values = Vec::new();
    flatten_numbers(&value, &mut values)?;
    if values.is_empty() {
        return Err(AnalyzerError::Kinematics("pose is empty".into()));
    }
    Ok(Pose { values })
}

fn flatten_numbers(value: &serde_json::Value, out: &mut Vec<f64>) -> Result<()> {
    match value {
        serde_json::Value::Number(n) => {
            out.push(
                n.as_f64()
                    .ok_or_else(|| AnalyzerError::Kinematics(format!("bad number {n}")))?,
            );
        }
        serde_json::Value::Array(items) => {
            for item in items {
                flatten_numbers(item, out)?;
            }
        }
        other => {
            return Err(AnalyzerError::Kinematics(format!(
                "unexpected value in pose: {other}"
            )));
        }
    }
    Ok(())
}

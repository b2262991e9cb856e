//! Parsing-tool comparison: which tools load which files.
//!
//! Tools are black boxes that report success or failure for a file. The
//! comparison also scans each file for constructs that commonly trip tools
//! up (xacro macros, `package://` references) and tallies how each tool
//! fares on the files that contain them.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ToolSpec;
use crate::model::xml;

/// Placeholder replaced by the URDF path in command tool arguments.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Something that can attempt to load a URDF file.
pub trait UrdfTool: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the tool loads `path` successfully. `base_dir` is the
    /// directory relative references in the file are resolved against.
    fn load(&self, path: &Path, base_dir: &Path) -> bool;
}

/// This crate's own XML reader.
#[derive(Debug, Default)]
pub struct XmlTool;

impl UrdfTool for XmlTool {
    fn name(&self) -> &str {
        "xml"
    }

    fn load(&self, path: &Path, _base_dir: &Path) -> bool {
        xml::read_file(path).is_ok()
    }
}

/// The `urdf-rs` crate's typed URDF reader.
#[derive(Debug, Default)]
pub struct UrdfRsTool;

impl UrdfTool for UrdfRsTool {
    fn name(&self) -> &str {
        "urdf-rs"
    }

    fn load(&self, path: &Path, _base_dir: &Path) -> bool {
        match urdf_rs::read_file(path) {
            Ok(robot) => {
                debug!(robot = %robot.name, links = robot.links.len(), "urdf-rs loaded file");
                true
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "urdf-rs failed");
                false
            }
        }
    }
}

/// An external program; zero exit status means success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTool {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTool {
    /// Arguments with [`FILE_PLACEHOLDER`] substituted; the path is appended
    /// when no argument mentions the placeholder.
    pub fn arguments_for(&self, path: &Path) -> Vec<String> {
        let file = path.display().to_string();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(FILE_PLACEHOLDER, &file))
            .collect();
        if !self.args.iter().any(|a| a.contains(FILE_PLACEHOLDER)) {
            args.push(file);
        }
        args
    }
}

impl UrdfTool for CommandTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, path: &Path, base_dir: &Path) -> bool {
        // The child runs in `base_dir`, so hand it an absolute path.
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let status = Command::new(&self.program)
            .args(self.arguments_for(&path))
            .current_dir(base_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                warn!(tool = %self.name, program = %self.program, error = %e, "Failed to run tool");
                false
            }
        }
    }
}

/// Instantiate the tool named on the command line.
pub fn build_tool(spec: &ToolSpec) -> Box<dyn UrdfTool> {
    match spec {
        ToolSpec::Xml => Box::new(XmlTool),
        ToolSpec::UrdfRs => Box::new(UrdfRsTool),
        ToolSpec::Command {
            name,
            program,
            args,
        } => Box::new(CommandTool {
            name: name.clone(),
            program: program.clone(),
            args: args.clone(),
        }),
    }
}

/// A textual construct searched for in each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub name: &'static str,
    pub pattern: &'static str,
}

/// Macro-expansion constructs and cross-package references.
pub const MARKERS: [Marker; 2] = [
    Marker {
        name: "xacro",
        pattern: "xacro",
    },
    Marker {
        name: "package",
        pattern: "package://",
    },
];

/// Tool outcomes for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResultRow {
    pub file: PathBuf,
    /// One entry per tool, in tool order.
    pub results: Vec<bool>,
    pub passes: usize,
    /// One entry per marker, in [`MARKERS`] order.
    pub markers: Vec<bool>,
}

/// Per-marker cross-tabulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTally {
    pub marker: &'static str,
    pub files_with_marker: usize,
    /// Files containing the marker that each tool passed, in tool order.
    pub passed: Vec<usize>,
}

/// File x tool success matrix plus marker statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolComparison {
    pub tools: Vec<String>,
    /// Sorted by `passes`, descending; ties keep input order.
    pub rows: Vec<ToolResultRow>,
    pub markers: Vec<MarkerTally>,
}

/// Run every tool on every file.
pub fn compare_tools(files: &[PathBuf], tools: &[Box<dyn UrdfTool>]) -> ToolComparison {
    info!(files = files.len(), tools = tools.len(), "Comparing parsing tools");

    let mut rows: Vec<ToolResultRow> = files
        .par_iter()
        .map(|file| check_file(file, tools))
        .collect();
    rows.sort_by(|a, b| b.passes.cmp(&a.passes));

    let markers = MARKERS
        .iter()
        .enumerate()
        .map(|(m, marker)| {
            let with_marker: Vec<&ToolResultRow> = rows.iter().filter(|r| r.markers[m]).collect();
            MarkerTally {
                marker: marker.name,
                files_with_marker: with_marker.len(),
                passed: (0..tools.len())
                    .map(|t| with_marker.iter().filter(|r| r.results[t]).count())
                    .collect(),
            }
        })
        .collect();

    ToolComparison {
        tools: tools.iter().map(|t| t.name().to_string()).collect(),
        rows,
        markers,
    }
}

fn check_file(file: &Path, tools: &[Box<dyn UrdfTool>]) -> ToolResultRow {
    let base_dir = file.parent().unwrap_or_else(|| Path::new("."));
    let results: Vec<bool> = tools
        .iter()
        .map(|tool| {
            let ok = tool.load(file, base_dir);
            debug!(tool = tool.name(), file = %file.display(), ok, "Checked file");
            ok
        })
        .collect();

    ToolResultRow {
        file: file.to_path_buf(),
        passes: results.iter().filter(|&&ok| ok).count(),
        results,
        markers: scan_markers(file),
    }
}

/// Which [`MARKERS`] occur in the file's raw text. An unreadable file
/// contains none.
pub fn scan_markers(file: &Path) -> Vec<bool> {
    match fs::read_to_string(file) {
        Ok(text) => MARKERS.iter().map(|m| text.contains(m.pattern)).collect(),
        Err(e) => {
            debug!(file = %file.display(), error = %e, "Could not scan file for markers");
            vec![false; MARKERS.len()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Passes files whose name contains a fixed substring.
    struct NameTool {
        name: &'static str,
        accepts: &'static str,
    }

    impl UrdfTool for NameTool {
        fn name(&self) -> &str {
            self.name
        }

        fn load(&self, path: &Path, _base_dir: &Path) -> bool {
            path.to_string_lossy().contains(self.accepts)
        }
    }

    fn tools() -> Vec<Box<dyn UrdfTool>> {
        vec![
            Box::new(NameTool {
                name: "strict",
                accepts: "good",
            }),
            Box::new(NameTool {
                name: "lenient",
                accepts: ".urdf",
            }),
        ]
    }

    #[test]
    fn matrix_sorted_by_passes() {
        let tmp = tempfile::tempdir().unwrap();
        let files: Vec<PathBuf> = ["a.urdf", "good.urdf", "b.urdf"]
            .iter()
            .map(|f| {
                let p = tmp.path().join(f);
                fs::write(&p, "<robot/>").unwrap();
                p
            })
            .collect();

        let cmp = compare_tools(&files, &tools());
        assert_eq!(cmp.tools, vec!["strict", "lenient"]);
        assert_eq!(cmp.rows[0].file, files[1]);
        assert_eq!(cmp.rows[0].passes, 2);
        assert_eq!(cmp.rows[0].results, vec![true, true]);
        // Ties keep input order.
        assert_eq!(cmp.rows[1].file, files[0]);
        assert_eq!(cmp.rows[2].file, files[2]);
        assert_eq!(cmp.rows[2].passes, 1);
    }

    #[test]
    fn marker_cross_tabulation() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("good.urdf");
        let other = tmp.path().join("other.urdf");
        fs::write(
            &good,
            r#"<robot xmlns:xacro="http://ros.org/wiki/xacro"><link name="a"/></robot>"#,
        )
        .unwrap();
        fs::write(
            &other,
            r#"<robot><link name="a"><visual><geometry>
               <mesh filename="package://p/m.stl"/></geometry></visual></link>
               <xacro:include filename="x"/></robot>"#,
        )
        .unwrap();

        let cmp = compare_tools(&[good, other], &tools());
        let xacro = &cmp.markers[0];
        assert_eq!(xacro.marker, "xacro");
        assert_eq!(xacro.files_with_marker, 2);
        assert_eq!(xacro.passed, vec![1, 2]);
        let package = &cmp.markers[1];
        assert_eq!(package.files_with_marker, 1);
        assert_eq!(package.passed, vec![0, 1]);
    }

    #[test]
    fn unreadable_file_has_no_markers() {
        assert_eq!(
            scan_markers(Path::new("/nonexistent/robot.urdf")),
            vec![false; MARKERS.len()]
        );
    }

    #[test]
    fn xml_tool_detects_malformed_files() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("good.urdf");
        let bad = tmp.path().join("bad.urdf");
        fs::write(&good, r#"<robot name="r"><link name="a"/></robot>"#).unwrap();
        fs::write(&bad, "<robot><link></robot>").unwrap();
        assert!(XmlTool.load(&good, tmp.path()));
        assert!(!XmlTool.load(&bad, tmp.path()));
    }

    #[test]
    fn urdf_rs_tool_loads_valid_robot() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("r.urdf");
        fs::write(&path, r#"<robot name="r"><link name="base_link"/></robot>"#).unwrap();
        assert!(UrdfRsTool.load(&path, tmp.path()));
        assert!(!UrdfRsTool.load(&tmp.path().join("missing.urdf"), tmp.path()));
    }

    #[test]
    fn command_arguments_substitute_file() {
        let tool = CommandTool {
            name: "check".into(),
            program: "check_urdf".into(),
            args: vec!["--file={file}".into()],
        };
        assert_eq!(tool.arguments_for(Path::new("r.urdf")), vec!["--file=r.urdf"]);

        let tool = CommandTool {
            args: vec!["-q".into()],
            ..tool
        };
        assert_eq!(tool.arguments_for(Path::new("r.urdf")), vec!["-q", "r.urdf"]);
    }

    #[test]
    fn missing_program_fails_gracefully() {
        let tool = CommandTool {
            name: "ghost".into(),
            program: "definitely-not-a-real-urdf-tool".into(),
            args: vec![],
        };
        assert!(!tool.load(Path::new("r.urdf"), Path::new(".")));
    }
}

//! Structural diff of the same robot as published by different sources.
//!
//! Layout of a duplicates root:
//!
//! ```text
//! <root>/<robot>/robot.json            {"name", "type", "manufacturer"}
//! <root>/<robot>/<source>/source.json  {"source"}
//! <root>/<robot>/<source>/**/*.urdf
//! ```
//!
//! Only immediate children are scanned for robots and sources. When a source
//! directory has no top-level `source.json` the first one found below it is
//! used instead.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::compare::batch::search_for_urdfs;
use crate::compare::kinematics::{Kinematics, POSE_TOLERANCE, Pose};
use crate::error::{AnalyzerError, Result};
use crate::model::{MeshTypeHistogram, ModelAnalysis};

pub const ROBOT_DESCRIPTOR: &str = "robot.json";
pub const SOURCE_DESCRIPTOR: &str = "source.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotDescriptor {
    pub name: String,
    #[serde(rename = "type", default)]
    pub robot_type: String,
    #[serde(default)]
    pub manufacturer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub source: String,
}

/// Outcome of comparing one property between two sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffResult {
    Unchanged,
    Changed,
}

impl DiffResult {
    pub fn of<T: PartialEq + ?Sized>(a: &T, b: &T) -> Self {
        if a == b {
            DiffResult::Unchanged
        } else {
            DiffResult::Changed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiffResult::Unchanged => "unchanged",
            DiffResult::Changed => "changed",
        }
    }
}

/// Structural statistics of one source's URDF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStats {
    pub robot: String,
    pub source: String,
    pub urdf: PathBuf,
    pub n_joints: usize,
    pub n_links: usize,
    pub visual_mesh_types: MeshTypeHistogram,
    pub collision_mesh_types: MeshTypeHistogram,
    pub n_lines: usize,
}

/// Pairwise comparison of two sources of the same robot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateDiff {
    pub robot: String,
    pub source_a: String,
    pub source_b: String,
    pub joints_diff: DiffResult,
    pub links_diff: DiffResult,
    pub meshes_diff: DiffResult,
    pub lines_diff: DiffResult,
    /// `None` when no kinematics tool is configured or a pose failed.
    pub fk_diff: Option<DiffResult>,
    pub fk_artifact: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub robots: Vec<RobotDescriptor>,
    pub sources: Vec<SourceStats>,
    pub diffs: Vec<DuplicateDiff>,
}

#[derive(Serialize)]
struct PoseDelta<'a> {
    robot: &'a str,
    source_a: &'a str,
    source_b: &'a str,
    pose_a: &'a [f64],
    pose_b: &'a [f64],
    delta: Option<Vec<f64>>,
}

/// Compare every pair of sources for every robot under `root`.
///
/// Kinematic deltas for differing pairs are written to `artifact_dir`.
pub fn compare_duplicates(
    root: &Path,
    kinematics: Option<&dyn Kinematics>,
    artifact_dir: &Path,
) -> Result<DuplicateReport> {
    info!(root = %root.display(), fk = kinematics.is_some(), "Comparing duplicate robots");

    let mut report = DuplicateReport::default();
    for robot_dir in child_dirs(root)? {
        let robot: RobotDescriptor = match read_descriptor(&robot_dir.join(ROBOT_DESCRIPTOR)) {
            Ok(robot) => robot,
            Err(e) => {
                warn!(dir = %robot_dir.display(), error = %e, "Skipping robot directory");
                continue;
            }
        };

        let mut sources = Vec::new();
        let source_dirs = match child_dirs(&robot_dir) {
            Ok(dirs) => dirs,
            Err(e) => {
                warn!(dir = %robot_dir.display(), error = %e, "Skipping unreadable robot directory");
                continue;
            }
        };
        for source_dir in source_dirs {
            match source_stats(&robot.name, &source_dir) {
                Ok(Some(stats)) => sources.push(stats),
                Ok(None) => {}
                Err(e) => warn!(dir = %source_dir.display(), error = %e, "Dropping source"),
            }
        }
        debug!(robot = %robot.name, sources = sources.len(), "Collected sources");

        let poses: Vec<Option<Pose>> = sources
            .iter()
            .map(|s| {
                let k = kinematics?;
                k.forward_kinematics(&s.urdf)
                    .inspect_err(|e| {
                        warn!(robot = %s.robot, source = %s.source, error = %e, "Forward kinematics failed")
                    })
                    .ok()
            })
            .collect();

        for a in 0..sources.len() {
            for b in a + 1..sources.len() {
                let mut diff = diff_sources(&sources[a], &sources[b]);
                if let (Some(pose_a), Some(pose_b)) = (&poses[a], &poses[b]) {
                    if pose_a.differs_from(pose_b, POSE_TOLERANCE) {
                        diff.fk_diff = Some(DiffResult::Changed);
                        diff.fk_artifact = write_pose_delta(artifact_dir, &diff, pose_a, pose_b);
                    } else {
                        diff.fk_diff = Some(DiffResult::Unchanged);
                    }
                }
                report.diffs.push(diff);
            }
        }

        report.sources.extend(sources);
        report.robots.push(robot);
    }

    info!(
        robots = report.robots.len(),
        sources = report.sources.len(),
        pairs = report.diffs.len(),
        "Duplicate comparison complete"
    );
    Ok(report)
}

/// Property-by-property diff, without kinematics.
pub fn diff_sources(a: &SourceStats, b: &SourceStats) -> DuplicateDiff {
    let meshes_changed = a.visual_mesh_types != b.visual_mesh_types
        || a.collision_mesh_types != b.collision_mesh_types;
    DuplicateDiff {
        robot: a.robot.clone(),
        source_a: a.source.clone(),
        source_b: b.source.clone(),
        joints_diff: DiffResult::of(&a.n_joints, &b.n_joints),
        links_diff: DiffResult::of(&a.n_links, &b.n_links),
        meshes_diff: if meshes_changed {
            DiffResult::Changed
        } else {
            DiffResult::Unchanged
        },
        lines_diff: DiffResult::of(&a.n_lines, &b.n_lines),
        fk_diff: None,
        fk_artifact: None,
    }
}

/// Locate a source's descriptor: top-level first, then anywhere below.
pub fn find_source_descriptor(source_dir: &Path) -> Result<PathBuf> {
    let direct = source_dir.join(SOURCE_DESCRIPTOR);
    if direct.is_file() {
        return Ok(direct);
    }

    let pattern = format!(
        "{}/**/{SOURCE_DESCRIPTOR}",
        glob::Pattern::escape(&source_dir.to_string_lossy())
    );
    let mut found: Vec<PathBuf> = glob::glob(&pattern)
        .map(|entries| entries.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    found.sort();
    found
        .into_iter()
        .next()
        .ok_or_else(|| AnalyzerError::SourceDescriptorNotFound(source_dir.to_path_buf()))
}

pub fn read_descriptor<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| AnalyzerError::Descriptor {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| AnalyzerError::Descriptor {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Stats for one source; `Ok(None)` when the source has no usable URDF.
fn source_stats(robot: &str, source_dir: &Path) -> Result<Option<SourceStats>> {
    let descriptor: SourceDescriptor = read_descriptor(&find_source_descriptor(source_dir)?)?;

    let Some(urdf) = search_for_urdfs(source_dir).into_iter().next() else {
        warn!(source = %descriptor.source, dir = %source_dir.display(), "Source has no URDF file");
        return Ok(None);
    };

    let mut analysis = ModelAnalysis::new();
    if analysis.load(&urdf, None).is_none() {
        warn!(source = %descriptor.source, urdf = %urdf.display(), "Source URDF could not be parsed");
        return Ok(None);
    }
    let joints = analysis.get_joint_information();
    let links = analysis.get_link_information();
    let n_lines = fs::read_to_string(&urdf)?.lines().count();

    Ok(Some(SourceStats {
        robot: robot.to_string(),
        source: descriptor.source,
        n_joints: joints.n_joints(),
        n_links: links.n_links(),
        visual_mesh_types: links.visual_mesh_types().clone(),
        collision_mesh_types: links.collision_mesh_types().clone(),
        n_lines,
        urdf,
    }))
}

fn child_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn artifact_file_name(diff: &DuplicateDiff) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect()
    };
    format!(
        "{}__{}__{}.json",
        clean(&diff.robot),
        clean(&diff.source_a),
        clean(&diff.source_b)
    )
}

fn write_pose_delta(
    artifact_dir: &Path,
    diff: &DuplicateDiff,
    pose_a: &Pose,
    pose_b: &Pose,
) -> Option<PathBuf> {
    let path = artifact_dir.join(artifact_file_name(diff));
    let delta = PoseDelta {
        robot: &diff.robot,
        source_a: &diff.source_a,
        source_b: &diff.source_b,
        pose_a: &pose_a.values,
        pose_b: &pose_b.values,
        delta: pose_a.delta(pose_b),
    };

    let written = fs::create_dir_all(artifact_dir)
        .map_err(AnalyzerError::from)
        .and_then(|_| {
            serde_json::to_string_pretty(&delta)
                .map_err(|e| AnalyzerError::Output(e.to_string()))
        })
        .and_then(|json| fs::write(&path, json).map_err(AnalyzerError::from));

    match written {
        Ok(()) => {
            debug!(path = %path.display(), "Wrote pose delta");
            Some(path)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not write pose delta");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn robot_with_joints(n: usize) -> String {
        let mut xml = String::from("<robot name=\"p\">\n<link name=\"base\"/>\n");
        for i in 0..n {
            xml.push_str(&format!("<joint name=\"j{i}\" type=\"revolute\"/>\n"));
        }
        xml.push_str("</robot>\n");
        xml
    }

    fn write_robot(root: &Path, robot: &str) -> PathBuf {
        let dir = root.join(robot);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(ROBOT_DESCRIPTOR),
            format!(r#"{{"name": "{robot}", "type": "mobile", "manufacturer": "Adept"}}"#),
        )
        .unwrap();
        dir
    }

    fn write_source(robot_dir: &Path, source: &str, urdf: &str) -> PathBuf {
        let dir = robot_dir.join(source);
        fs::create_dir_all(dir.join("urdf")).unwrap();
        fs::write(
            dir.join(SOURCE_DESCRIPTOR),
            format!(r#"{{"source": "{source}"}}"#),
        )
        .unwrap();
        fs::write(dir.join("urdf/robot.urdf"), urdf).unwrap();
        dir
    }

    /// Pose chosen by which source directory the URDF lives in.
    struct FakeKinematics;

    impl Kinematics for FakeKinematics {
        fn forward_kinematics(&self, urdf: &Path) -> Result<Pose> {
            let path = urdf.to_string_lossy();
            if path.contains("broken") {
                Err(AnalyzerError::Kinematics("no solution".into()))
            } else if path.contains("shifted") {
                Ok(Pose {
                    values: vec![0.0, 0.0, 0.5],
                })
            } else {
                Ok(Pose {
                    values: vec![0.0, 0.0, 0.0],
                })
            }
        }
    }

    #[test]
    fn diff_result_of() {
        assert_eq!(DiffResult::of(&1, &1), DiffResult::Unchanged);
        assert_eq!(DiffResult::of(&1, &2), DiffResult::Changed);
        assert_eq!(DiffResult::Changed.as_str(), "changed");
    }

    #[test]
    fn joint_count_difference_is_changed() {
        let tmp = tempfile::tempdir().unwrap();
        let robot = write_robot(tmp.path(), "pioneer");
        write_source(&robot, "a", &robot_with_joints(10));
        write_source(&robot, "b", &robot_with_joints(11));

        let report = compare_duplicates(tmp.path(), None, tmp.path()).unwrap();
        assert_eq!(report.robots.len(), 1);
        assert_eq!(report.robots[0].robot_type, "mobile");
        assert_eq!(report.sources.len(), 2);
        assert_eq!(report.diffs.len(), 1);

        let diff = &report.diffs[0];
        assert_eq!((diff.source_a.as_str(), diff.source_b.as_str()), ("a", "b"));
        assert_eq!(diff.joints_diff, DiffResult::Changed);
        assert_eq!(diff.links_diff, DiffResult::Unchanged);
        assert_eq!(diff.lines_diff, DiffResult::Changed);
        assert_eq!(diff.fk_diff, None);
    }

    #[test]
    fn identical_sources_are_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let robot = write_robot(tmp.path(), "pioneer");
        write_source(&robot, "a", &robot_with_joints(4));
        write_source(&robot, "b", &robot_with_joints(4));
        write_source(&robot, "c", &robot_with_joints(4));

        let report = compare_duplicates(tmp.path(), None, tmp.path()).unwrap();
        assert_eq!(report.diffs.len(), 3);
        for diff in &report.diffs {
            assert_eq!(diff.joints_diff, DiffResult::Unchanged);
            assert_eq!(diff.links_diff, DiffResult::Unchanged);
            assert_eq!(diff.meshes_diff, DiffResult::Unchanged);
            assert_eq!(diff.lines_diff, DiffResult::Unchanged);
        }
    }

    #[test]
    fn mesh_histograms_are_compared() {
        let tmp = tempfile::tempdir().unwrap();
        let robot = write_robot(tmp.path(), "arm");
        let mesh = |file: &str| {
            format!(
                r#"<robot name="arm"><link name="l"><visual><geometry>
                   <mesh filename="{file}"/></geometry></visual></link></robot>"#
            )
        };
        write_source(&robot, "a", &mesh("l.stl"));
        write_source(&robot, "b", &mesh("l.dae"));

        let report = compare_duplicates(tmp.path(), None, tmp.path()).unwrap();
        assert_eq!(report.diffs[0].meshes_diff, DiffResult::Changed);
        assert_eq!(report.diffs[0].lines_diff, DiffResult::Unchanged);
    }

    #[test]
    fn nested_descriptor_is_found_and_missing_one_drops_source() {
        let tmp = tempfile::tempdir().unwrap();
        let robot = write_robot(tmp.path(), "pioneer");
        write_source(&robot, "a", &robot_with_joints(2));

        let nested = robot.join("b");
        fs::create_dir_all(nested.join("meta")).unwrap();
        fs::write(nested.join("meta/source.json"), r#"{"source": "b"}"#).unwrap();
        fs::write(nested.join("robot.urdf"), robot_with_joints(2)).unwrap();

        let orphan = robot.join("c");
        fs::create_dir_all(&orphan).unwrap();
        fs::write(orphan.join("robot.urdf"), robot_with_joints(2)).unwrap();

        assert!(matches!(
            find_source_descriptor(&orphan),
            Err(AnalyzerError::SourceDescriptorNotFound(_))
        ));

        let report = compare_duplicates(tmp.path(), None, tmp.path()).unwrap();
        let sources: Vec<&str> = report.sources.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(sources, vec!["a", "b"]);
        assert_eq!(report.diffs.len(), 1);
    }

    #[test]
    fn robot_without_descriptor_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let stray = tmp.path().join("stray");
        write_source(&stray, "a", &robot_with_joints(1));
        write_source(&stray, "b", &robot_with_joints(2));

        let report = compare_duplicates(tmp.path(), None, tmp.path()).unwrap();
        assert!(report.robots.is_empty());
        assert!(report.diffs.is_empty());
    }

    #[test]
    fn kinematics_delta_written_for_differing_pair() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("dups");
        let robot = write_robot(&root, "pioneer");
        write_source(&robot, "base", &robot_with_joints(3));
        write_source(&robot, "shifted", &robot_with_joints(3));
        write_source(&robot, "broken", &robot_with_joints(3));
        let artifacts = tmp.path().join("artifacts");

        let report = compare_duplicates(&root, Some(&FakeKinematics), &artifacts).unwrap();
        let find = |a: &str, b: &str| {
            report
                .diffs
                .iter()
                .find(|d| d.source_a == a && d.source_b == b)
                .unwrap()
        };

        assert_eq!(find("base", "broken").fk_diff, None);
        assert_eq!(find("broken", "shifted").fk_diff, None);

        let changed = find("base", "shifted");
        assert_eq!(changed.fk_diff, Some(DiffResult::Changed));
        let artifact = changed.fk_artifact.clone().unwrap();
        assert_eq!(artifact, artifacts.join("pioneer__base__shifted.json"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(artifact).unwrap()).unwrap();
        assert_eq!(json["delta"][2], 0.5);
    }

    #[cfg(unix)]
    #[test]
    fn unlistable_robot_does_not_stop_sweep() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let locked = write_robot(tmp.path(), "locked");
        write_source(&locked, "a", &robot_with_joints(1));
        let open = write_robot(tmp.path(), "open");
        write_source(&open, "a", &robot_with_joints(2));
        write_source(&open, "b", &robot_with_joints(3));

        // Search-only: robot.json stays readable, the listing does not.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o100)).unwrap();
        let report = compare_duplicates(tmp.path(), None, tmp.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let report = report.unwrap();
        assert!(report.robots.iter().any(|r| r.name == "open"));
        let open_diffs: Vec<_> = report.diffs.iter().filter(|d| d.robot == "open").collect();
        assert_eq!(open_diffs.len(), 1);
        assert_eq!(open_diffs[0].joints_diff, DiffResult::Changed);
    }

    #[test]
    fn missing_root_is_error() {
        assert!(compare_duplicates(Path::new("/nonexistent/dups"), None, Path::new(".")).is_err());
    }
}

//! Conversion of analysis results into report tables.

use serde_json::{Map, Value, json};

use crate::compare::duplicates::{DuplicateReport, SourceStats};
use crate::compare::tools::ToolComparison;
use crate::model::{JointsMetaInformation, LinksMetaInformation};
use crate::report::table::Table;
use crate::types::{JointType, UrdfInformation, VisualizationKind};

/// One row per record. Full mode adds per-type joint counts, link
/// geometries and mesh statistics.
pub fn information_table(records: &[UrdfInformation], full: bool) -> Table {
    Table::from_records(records.iter().map(|r| information_record(r, full)).collect())
}

pub fn information_record(information: &UrdfInformation, full: bool) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert(
        "filename".into(),
        information.filename.clone().map_or(Value::Null, Value::String),
    );
    if let Some(joints) = &information.joint_information {
        joint_columns(&mut record, joints, full);
    }
    if let Some(links) = &information.link_information {
        link_columns(&mut record, links, full);
        if full {
            let missing = information.missing_meshes.as_ref().map_or(0, Vec::len);
            record.insert("n_missing_meshes".into(), json!(missing));
        }
    }
    record
}

fn joint_columns(record: &mut Map<String, Value>, joints: &JointsMetaInformation, full: bool) {
    record.insert("n_joints".into(), json!(joints.n_joints()));
    record.insert(
        "joint_names".into(),
        json!(joints.joints().iter().map(|j| &j.name).collect::<Vec<_>>()),
    );
    record.insert(
        "joint_types".into(),
        json!(joints.joints().iter().map(|j| j.joint_type.as_str()).collect::<Vec<_>>()),
    );
    if full {
        for joint_type in JointType::ALL {
            record.insert(
                format!("n_{}_joints", joint_type.as_str()),
                json!(joints.count_of(joint_type)),
            );
        }
    }
}

fn link_columns(record: &mut Map<String, Value>, links: &LinksMetaInformation, full: bool) {
    record.insert("n_links".into(), json!(links.n_links()));
    record.insert(
        "link_names".into(),
        json!(links.links().iter().map(|l| &l.name).collect::<Vec<_>>()),
    );
    if !full {
        return;
    }

    for kind in VisualizationKind::ALL {
        let geometries: Vec<Value> = links
            .links()
            .iter()
            .filter_map(|l| {
                let geometry = l.geometry(kind)?;
                let mut entry = Map::new();
                entry.insert(
                    format!("{}_{}", l.name, kind.tag()),
                    json!(geometry.geometry_type().tag()),
                );
                Some(Value::Object(entry))
            })
            .collect();
        record.insert(format!("{}_geometry", kind.tag()), Value::Array(geometries));
    }
    // Mesh columns only appear when the model actually has meshes.
    for kind in VisualizationKind::ALL {
        let histogram = links.mesh_types(kind);
        if !histogram.is_empty() {
            record.insert(format!("{}_meshes", kind.tag()), json!(histogram));
        }
    }
}

/// File x tool success matrix, one row per file in comparison order.
pub fn tool_matrix_table(comparison: &ToolComparison) -> Table {
    let mut columns = vec!["file".to_string()];
    columns.extend(comparison.tools.iter().cloned());
    columns.push("passes".into());

    let mut table = Table::new(columns);
    for row in &comparison.rows {
        let mut cells = vec![json!(row.file.display().to_string())];
        cells.extend(row.results.iter().map(|&ok| json!(ok)));
        cells.push(json!(row.passes));
        table.push_row(cells);
    }
    table
}

/// Per marker: how many files contain it and how many of those each tool
/// passed.
pub fn marker_table(comparison: &ToolComparison) -> Table {
    let mut columns = vec!["marker".to_string(), "files_with_marker".to_string()];
    columns.extend(comparison.tools.iter().cloned());

    let mut table = Table::new(columns);
    for tally in &comparison.markers {
        let mut cells = vec![json!(tally.marker), json!(tally.files_with_marker)];
        cells.extend(tally.passed.iter().map(|&n| json!(n)));
        table.push_row(cells);
    }
    table
}

pub fn source_stats_table(sources: &[SourceStats]) -> Table {
    let mut table = Table::new(
        [
            "robot",
            "source",
            "urdf",
            "n_joints",
            "n_links",
            "visual_meshes",
            "collision_meshes",
            "n_lines",
        ]
        .map(String::from)
        .to_vec(),
    );
    for s in sources {
        table.push_row(vec![
            json!(s.robot),
            json!(s.source),
            json!(s.urdf.display().to_string()),
            json!(s.n_joints),
            json!(s.n_links),
            json!(s.visual_mesh_types),
            json!(s.collision_mesh_types),
            json!(s.n_lines),
        ]);
    }
    table
}

pub fn duplicate_diff_table(report: &DuplicateReport) -> Table {
    let mut table = Table::new(
        [
            "robot",
            "source_a",
            "source_b",
            "joints_diff",
            "links_diff",
            "meshes_diff",
            "lines_diff",
            "fk_diff",
            "fk_artifact",
        ]
        .map(String::from)
        .to_vec(),
    );
    for d in &report.diffs {
        table.push_row(vec![
            json!(d.robot),
            json!(d.source_a),
            json!(d.source_b),
            json!(d.joints_diff.as_str()),
            json!(d.links_diff.as_str()),
            json!(d.meshes_diff.as_str()),
            json!(d.lines_diff.as_str()),
            d.fk_diff.map_or(Value::Null, |f| json!(f.as_str())),
            d.fk_artifact
                .as_ref()
                .map_or(Value::Null, |p| json!(p.display().to_string())),
        ]);
    }
    table
}

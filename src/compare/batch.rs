//! Per-file model information, singly and in batches.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::AnalysisOptions;
use crate::model::ModelAnalysis;
use crate::types::UrdfInformation;

/// Recursively find every `*.urdf` file below `dir`, sorted by path.
///
/// A missing directory is not an error: it yields an empty list and a
/// warning.
pub fn search_for_urdfs(dir: impl AsRef<Path>) -> Vec<PathBuf> {
    let dir = dir.as_ref();
    if !dir.exists() {
        warn!(dir = %dir.display(), "Search path for URDF files does not exist, returning empty list");
        return Vec::new();
    }

    let pattern = format!(
        "{}/**/*.urdf",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let mut paths: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(entries) => entries.filter_map(|entry| entry.ok()).collect(),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Invalid search pattern");
            Vec::new()
        }
    };
    paths.sort();

    if paths.is_empty() {
        warn!(dir = %dir.display(), "No URDF files found");
    } else {
        debug!(dir = %dir.display(), count = paths.len(), "Found URDF files");
    }
    paths
}

/// Model information for one file.
///
/// When `filename` is given it is loaded first (relative to
/// `options.urdf_root_dir` if set); otherwise the document already loaded in
/// `analysis` is used. If nothing is loaded afterwards the empty
/// [`UrdfInformation`] is returned.
pub fn get_model_information(
    analysis: &mut ModelAnalysis,
    filename: Option<&Path>,
    options: &AnalysisOptions,
) -> UrdfInformation {
    if let Some(filename) = filename {
        analysis.load(filename, options.urdf_root_dir.as_deref());
    }

    let Some(loaded_path) = analysis.path() else {
        warn!("URDF file was not parsed by the XML reader, returning empty information");
        return UrdfInformation::default();
    };

    let label = filename.unwrap_or(loaded_path).display().to_string();
    collect_information(analysis, label, options)
}

/// Model information for every file, one record per input in input order.
///
/// Each file is resolved against its own directory. Files that fail to
/// parse still produce a record (carrying only the filename).
pub fn get_models_information(files: &[PathBuf], options: &AnalysisOptions) -> Vec<UrdfInformation> {
    let mut analysis = ModelAnalysis::new();

    let results: Vec<UrdfInformation> = files
        .iter()
        .map(|file| {
            let label = file.display().to_string();
            if analysis.load(file, None).is_some() {
                collect_information(&analysis, label, options)
            } else {
                warn!(file = %file.display(), "Skipping unparseable URDF file");
                UrdfInformation::new(label)
            }
        })
        .collect();

    let parsed = results.iter().filter(|r| !r.is_empty()).count();
    info!(files = files.len(), parsed, "Collected model information");
    results
}

fn collect_information(
    analysis: &ModelAnalysis,
    label: String,
    options: &AnalysisOptions,
) -> UrdfInformation {
    let mut information = UrdfInformation::new(label);

    if options.joints {
        information.joint_information = Some(analysis.get_joint_information());
    }
    if options.links {
        information.link_information = Some(analysis.get_link_information());
        if options.full {
            information.missing_meshes = Some(
                analysis
                    .mesh_references()
                    .into_iter()
                    .filter(|m| m.resolved.is_none())
                    .map(|m| m.filename)
                    .collect(),
            );
        }
    }
    information
}

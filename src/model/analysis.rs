//! Model analysis facade: owns the currently loaded URDF document.

use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::model::extract::{extract_joints, extract_links};
use crate::model::meta::{JointsMetaInformation, LinksMetaInformation};
use crate::model::resolve::resolve_mesh_path;
use crate::model::xml::{self, XmlElement};
use crate::types::{Entity, InformationKind, VisualizationKind};

/// A successfully parsed URDF document and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub path: PathBuf,
    /// Directory relative mesh and package references are resolved against.
    pub base_dir: PathBuf,
    pub root: XmlElement,
}

/// A mesh referenced by a link, with its on-disk location if found.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshReference {
    pub link: String,
    pub kind: VisualizationKind,
    pub filename: String,
    pub resolved: Option<PathBuf>,
}

/// Loads URDF files and answers structural queries about the loaded one.
///
/// The facade is either unloaded or holds exactly one parsed document. Every
/// [`load`](Self::load) replaces the previous state; a failed load leaves the
/// facade unloaded.
#[derive(Debug, Default)]
pub struct ModelAnalysis {
    loaded: Option<LoadedModel>,
}

impl ModelAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of `filename` given an optional URDF root directory.
    ///
    /// With a root directory only the file name component of `filename` is
    /// kept and looked up inside it.
    pub fn resolve_path(filename: &Path, urdf_root_dir: Option<&Path>) -> PathBuf {
        let path = match urdf_root_dir {
            Some(dir) => dir.join(filename.file_name().unwrap_or(filename.as_os_str())),
            None => filename.to_path_buf(),
        };
        std::path::absolute(&path).unwrap_or(path)
    }

    /// Parse `filename` as XML and make it the current document.
    ///
    /// Returns the parsed root, or `None` when the file is missing or not
    /// well-formed. The failure is logged, not propagated.
    pub fn load(
        &mut self,
        filename: impl AsRef<Path>,
        urdf_root_dir: Option<&Path>,
    ) -> Option<&XmlElement> {
        let path = Self::resolve_path(filename.as_ref(), urdf_root_dir);
        self.loaded = None;

        match xml::read_file(&path) {
            Ok(root) => {
                debug!(path = %path.display(), "Loaded URDF");
                let base_dir = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                self.loaded = Some(LoadedModel {
                    path,
                    base_dir,
                    root,
                });
                self.root()
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error while loading URDF with the XML reader");
                None
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn loaded(&self) -> Option<&LoadedModel> {
        self.loaded.as_ref()
    }

    pub fn root(&self) -> Option<&XmlElement> {
        self.loaded.as_ref().map(|m| &m.root)
    }

    pub fn path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|m| m.path.as_path())
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|m| m.base_dir.as_path())
    }

    /// Extract entities of the requested kind; empty when unloaded.
    pub fn extract(&self, kind: InformationKind) -> Vec<Entity> {
        let Some(root) = self.root() else {
            return Vec::new();
        };
        match kind {
            InformationKind::Joints => extract_joints(root).into_iter().map(Entity::from).collect(),
            InformationKind::Links => extract_links(root).into_iter().map(Entity::from).collect(),
        }
    }

    /// Joint statistics of the loaded document (empty aggregate if unloaded).
    pub fn get_joint_information(&self) -> JointsMetaInformation {
        self.root()
            .map(|root| JointsMetaInformation::new(extract_joints(root)))
            .unwrap_or_default()
    }

    /// Link statistics of the loaded document (empty aggregate if unloaded).
    pub fn get_link_information(&self) -> LinksMetaInformation {
        self.root()
            .map(|root| LinksMetaInformation::new(extract_links(root)))
            .unwrap_or_default()
    }

    /// Every mesh referenced by the loaded document's links.
    pub fn mesh_references(&self) -> Vec<MeshReference> {
        let Some(model) = &self.loaded else {
            return Vec::new();
        };

        let mut references = Vec::new();
        for link in extract_links(&model.root) {
            for kind in VisualizationKind::ALL {
                if let Some(filename) = link.geometry(kind).and_then(|g| g.mesh_filename()) {
                    references.push(MeshReference {
                        link: link.name.clone(),
                        kind,
                        filename: filename.to_string(),
                        resolved: resolve_mesh_path(filename, &model.base_dir),
                    });
                }
            }
        }
        references
    }
}

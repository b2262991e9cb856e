use serde::Serialize;

use crate::model::meta::{JointsMetaInformation, LinksMetaInformation};

/// Per-file analysis result.
///
/// A `None` sub-field means the information was not requested (or the file
/// could not be parsed); zero entities found is a `Some` aggregate with zero
/// counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UrdfInformation {
    pub filename: Option<String>,
    pub joint_information: Option<JointsMetaInformation>,
    pub link_information: Option<LinksMetaInformation>,
    /// Mesh filenames that did not resolve on disk (full link analysis only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_meshes: Option<Vec<String>>,
}

impl UrdfInformation {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Default::default()
        }
    }

    /// Whether no information at all was gathered.
    pub fn is_empty(&self) -> bool {
        self.joint_information.is_none() && self.link_information.is_none()
    }
}

//! Summary statistics over extracted entity lists.
//!
//! Aggregates are built once from their entity list and expose read-only
//! accessors, so the counts can never drift from the list they describe.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::AnalyzerError;
use crate::types::entity::Entity;
use crate::types::joint::Joint;
use crate::types::link::Link;
use crate::types::standard::{JointType, VisualizationKind};

/// Mesh file type -> number of occurrences.
pub type MeshTypeHistogram = BTreeMap<String, usize>;

/// Joint counts for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointsMetaInformation {
    n_joints: usize,
    joints: Vec<Joint>,
    n_joint_types: BTreeMap<JointType, usize>,
}

impl JointsMetaInformation {
    pub fn new(joints: Vec<Joint>) -> Self {
        let n_joint_types = JointType::ALL
            .into_iter()
            .map(|t| (t, joints.iter().filter(|j| j.joint_type == t).count()))
            .collect();

        Self {
            n_joints: joints.len(),
            joints,
            n_joint_types,
        }
    }

    pub fn n_joints(&self) -> usize {
        self.n_joints
    }

    /// Joints in extraction (document) order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Count per joint type; every type is present, absent ones map to 0.
    pub fn n_joint_types(&self) -> &BTreeMap<JointType, usize> {
        &self.n_joint_types
    }

    pub fn count_of(&self, joint_type: JointType) -> usize {
        self.n_joint_types.get(&joint_type).copied().unwrap_or(0)
    }
}

impl Default for JointsMetaInformation {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TryFrom<Vec<Entity>> for JointsMetaInformation {
    type Error = AnalyzerError;

    fn try_from(entities: Vec<Entity>) -> Result<Self, Self::Error> {
        let joints = entities
            .into_iter()
            .map(|e| match e {
                Entity::Joint(j) => Ok(j),
                other => Err(AnalyzerError::TypeMismatch {
                    expected: "Joint",
                    found: other.kind_name(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(joints))
    }
}

/// Link and mesh-usage counts for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinksMetaInformation {
    n_links: usize,
    links: Vec<Link>,
    visual_mesh_types: MeshTypeHistogram,
    collision_mesh_types: MeshTypeHistogram,
}

impl LinksMetaInformation {
    pub fn new(links: Vec<Link>) -> Self {
        let histogram = |kind| {
            let mut counts = MeshTypeHistogram::new();
            for mesh_type in links
                .iter()
                .filter_map(|l: &Link| l.geometry(kind))
                .filter_map(|g| g.mesh_type())
            {
                *counts.entry(mesh_type).or_insert(0) += 1;
            }
            counts
        };
        let visual_mesh_types = histogram(VisualizationKind::Visual);
        let collision_mesh_types = histogram(VisualizationKind::Collision);

        Self {
            n_links: links.len(),
            links,
            visual_mesh_types,
            collision_mesh_types,
        }
    }

    pub fn n_links(&self) -> usize {
        self.n_links
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn visual_mesh_types(&self) -> &MeshTypeHistogram {
        &self.visual_mesh_types
    }

    pub fn collision_mesh_types(&self) -> &MeshTypeHistogram {
        &self.collision_mesh_types
    }

    pub fn mesh_types(&self, kind: VisualizationKind) -> &MeshTypeHistogram {
        match kind {
            VisualizationKind::Visual => &self.visual_mesh_types,
            VisualizationKind::Collision => &self.collision_mesh_types,
        }
    }
}

impl Default for LinksMetaInformation {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TryFrom<Vec<Entity>> for LinksMetaInformation {
    type Error = AnalyzerError;

    fn try_from(entities: Vec<Entity>) -> Result<Self, Self::Error> {
        let links = entities
            .into_iter()
            .map(|e| match e {
                Entity::Link(l) => Ok(l),
                other => Err(AnalyzerError::TypeMismatch {
                    expected: "Link",
                    found: other.kind_name(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(links))
    }
}

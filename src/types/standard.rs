//! Reference data from the URDF standard.
//!
//! Joint types follow <https://wiki.ros.org/urdf/XML/joint>; geometry
//! attributes follow the `urdfdom` XSD with the attribute defaults used by
//! ROS tooling.

use std::str::FromStr;

use serde::Serialize;

use crate::error::{AnalyzerError, Result};

/// URDF joint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JointType {
    Revolute,
    Prismatic,
    Continuous,
    Fixed,
    Floating,
    Planar,
}

impl JointType {
    /// Every joint type, in the order the standard lists them.
    pub const ALL: [JointType; 6] = [
        JointType::Revolute,
        JointType::Prismatic,
        JointType::Continuous,
        JointType::Fixed,
        JointType::Floating,
        JointType::Planar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JointType::Revolute => "revolute",
            JointType::Prismatic => "prismatic",
            JointType::Continuous => "continuous",
            JointType::Fixed => "fixed",
            JointType::Floating => "floating",
            JointType::Planar => "planar",
        }
    }

    /// Human-readable explanation of the joint type.
    pub fn explanation(&self) -> &'static str {
        match self {
            JointType::Revolute => {
                "a hinge joint that rotates along the axis and has a limited range specified by the upper and lower limits."
            }
            JointType::Prismatic => {
                "a sliding joint that slides along the axis, and has a limited range specified by the upper and lower limits."
            }
            JointType::Continuous => {
                "a continuous hinge joint that rotates around the axis and has no upper and lower limits."
            }
            JointType::Fixed => {
                "this is not really a joint because it cannot move. All degrees of freedom are locked. This type of joint does not require the <axis>, <calibration>, <dynamics>, <limits> or <safety_controller>."
            }
            JointType::Floating => "this joint allows motion for all 6 degrees of freedom.",
            JointType::Planar => "this joint allows motion in a plane perpendicular to the axis.",
        }
    }
}

impl FromStr for JointType {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        JointType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AnalyzerError::InvalidJointType(s.to_string()))
    }
}

impl std::fmt::Display for JointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visualization kind a link geometry is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualizationKind {
    Visual,
    Collision,
}

impl VisualizationKind {
    pub const ALL: [VisualizationKind; 2] = [VisualizationKind::Visual, VisualizationKind::Collision];

    /// XML tag of the element holding the geometry.
    pub fn tag(&self) -> &'static str {
        match self {
            VisualizationKind::Visual => "visual",
            VisualizationKind::Collision => "collision",
        }
    }
}

/// URDF geometry element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    Mesh,
    Sphere,
    Cylinder,
    Box,
}

impl GeometryType {
    pub const ALL: [GeometryType; 4] = [
        GeometryType::Mesh,
        GeometryType::Sphere,
        GeometryType::Cylinder,
        GeometryType::Box,
    ];

    /// Order in which geometry elements are looked up under a `<visual>` or
    /// `<collision>` element. The first type present wins.
    pub const RESOLUTION_ORDER: [GeometryType; 4] = [
        GeometryType::Mesh,
        GeometryType::Box,
        GeometryType::Cylinder,
        GeometryType::Sphere,
    ];

    /// XML tag of the geometry element.
    pub fn tag(&self) -> &'static str {
        match self {
            GeometryType::Mesh => "mesh",
            GeometryType::Sphere => "sphere",
            GeometryType::Cylinder => "cylinder",
            GeometryType::Box => "box",
        }
    }

    pub fn required_attributes(&self) -> &'static [&'static str] {
        match self {
            GeometryType::Mesh => &["filename"],
            GeometryType::Sphere => &["radius"],
            GeometryType::Cylinder => &["radius", "length"],
            GeometryType::Box => &[],
        }
    }

    pub fn optional_attributes(&self) -> &'static [&'static str] {
        match self {
            GeometryType::Mesh => &["scale"],
            GeometryType::Box => &["size"],
            GeometryType::Sphere | GeometryType::Cylinder => &[],
        }
    }

    /// Default value of an optional attribute, if the standard defines one.
    pub fn default_value(&self, attribute: &str) -> Option<&'static str> {
        match (self, attribute) {
            (GeometryType::Mesh, "scale") => Some("1 1 1"),
            (GeometryType::Box, "size") => Some("0 0 0"),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

pub mod entity;
pub mod geometry;
pub mod information;
pub mod joint;
pub mod link;
pub mod standard;

pub use entity::{Entity, InformationKind};
pub use geometry::Geometry;
pub use information::UrdfInformation;
pub use joint::Joint;
pub use link::Link;
pub use standard::{GeometryType, JointType, VisualizationKind};

pub mod analysis;
pub mod extract;
pub mod meta;
pub mod resolve;
pub mod xml;

pub use analysis::{LoadedModel, MeshReference, ModelAnalysis};
pub use extract::{extract_joints, extract_links};
pub use meta::{JointsMetaInformation, LinksMetaInformation, MeshTypeHistogram};
pub use xml::XmlElement;

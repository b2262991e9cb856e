use crate::types::joint::Joint;
use crate::types::link::Link;

/// Kind of structural information that can be extracted from a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InformationKind {
    Joints,
    Links,
}

/// An extracted entity of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Joint(Joint),
    Link(Link),
}

impl Entity {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::Joint(_) => "Joint",
            Entity::Link(_) => "Link",
        }
    }
}

impl From<Joint> for Entity {
    fn from(joint: Joint) -> Self {
        Entity::Joint(joint)
    }
}

impl From<Link> for Entity {
    fn from(link: Link) -> Self {
        Entity::Link(link)
    }
}

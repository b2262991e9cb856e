use serde::Serialize;

use crate::error::Result;
use crate::types::standard::JointType;

/// A `<joint>` element: name plus validated type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Joint {
    pub name: String,
    #[serde(rename = "type")]
    pub joint_type: JointType,
}

impl Joint {
    /// Create a joint from its raw `type` attribute.
    ///
    /// Fails with `InvalidJointType` when `jtype` is not one of the six
    /// standard joint types; no default is substituted.
    pub fn new(name: impl Into<String>, jtype: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            joint_type: jtype.parse()?,
        })
    }

    pub fn explanation(&self) -> &'static str {
        self.joint_type.explanation()
    }
}

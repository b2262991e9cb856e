use serde::Serialize;

use crate::types::geometry::Geometry;
use crate::types::standard::VisualizationKind;

/// A `<link>` element with at most one geometry per visualization kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub name: String,
    pub visual_geometry: Option<Geometry>,
    pub collision_geometry: Option<Geometry>,
}

impl Link {
    /// Create a link with only a name (no geometry).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visual_geometry: None,
            collision_geometry: None,
        }
    }

    pub fn geometry(&self, kind: VisualizationKind) -> Option<&Geometry> {
        match kind {
            VisualizationKind::Visual => self.visual_geometry.as_ref(),
            VisualizationKind::Collision => self.collision_geometry.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_new_has_no_geometry() {
        let link = Link::new("base_link");
        assert_eq!(link.name, "base_link");
        assert!(link.geometry(VisualizationKind::Visual).is_none());
        assert!(link.geometry(VisualizationKind::Collision).is_none());
    }

    #[test]
    fn geometry_by_kind() {
        let link = Link {
            visual_geometry: Some(Geometry::Sphere { radius: 0.1 }),
            ..Link::new("wheel")
        };
        assert!(matches!(
            link.geometry(VisualizationKind::Visual),
            Some(Geometry::Sphere { .. })
        ));
        assert!(link.geometry(VisualizationKind::Collision).is_none());
    }
}

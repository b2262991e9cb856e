//! Mapping from a parsed URDF element tree to `Joint` and `Link` entities.
//!
//! Malformed elements are dropped one at a time; a single bad joint or
//! geometry never fails the whole extraction.

use tracing::debug;

use crate::error::{AnalyzerError, Result};
use crate::model::xml::XmlElement;
use crate::types::geometry::Geometry;
use crate::types::joint::Joint;
use crate::types::link::Link;
use crate::types::standard::{GeometryType, VisualizationKind};

/// Every valid `<joint>` in the document, in document order.
pub fn extract_joints(root: &XmlElement) -> Vec<Joint> {
    root.iter("joint")
        .filter_map(|element| match joint_from_element(element) {
            Ok(joint) => Some(joint),
            Err(e) => {
                debug!(error = %e, "Skipping joint element");
                None
            }
        })
        .collect()
}

/// Every named `<link>` in the document, in document order.
pub fn extract_links(root: &XmlElement) -> Vec<Link> {
    root.iter("link")
        .filter_map(|element| {
            let Some(name) = element.attribute("name") else {
                debug!("Skipping link element without a name");
                return None;
            };
            Some(Link {
                name: name.to_string(),
                visual_geometry: resolve_geometry(element, name, VisualizationKind::Visual),
                collision_geometry: resolve_geometry(element, name, VisualizationKind::Collision),
            })
        })
        .collect()
}

fn joint_from_element(element: &XmlElement) -> Result<Joint> {
    let name = element.attribute("name").ok_or(AnalyzerError::MissingAttribute {
        element: "joint",
        attribute: "name",
    })?;
    let jtype = element.attribute("type").ok_or(AnalyzerError::MissingAttribute {
        element: "joint",
        attribute: "type",
    })?;
    Joint::new(name, jtype)
}

/// Geometry across all of the link's `<visual>` / `<collision>` elements.
///
/// Geometry tags are tried in [`GeometryType::RESOLUTION_ORDER`] over every
/// holder of the kind in document order; the first tag present wins even if
/// another geometry type is also declared.
fn resolve_geometry(link: &XmlElement, link_name: &str, kind: VisualizationKind) -> Option<Geometry> {
    let holders: Vec<&XmlElement> = link
        .descendants()
        .skip(1)
        .filter(|e| e.name == kind.tag())
        .collect();

    let (geometry_type, element) = GeometryType::RESOLUTION_ORDER
        .into_iter()
        .find_map(|t| holders.iter().find_map(|h| h.find(t.tag())).map(|e| (t, e)))?;

    match Geometry::from_element(geometry_type, element) {
        Ok(geometry) => Some(geometry),
        Err(e) => {
            debug!(link = link_name, kind = kind.tag(), error = %e, "Unreadable geometry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::meta::{JointsMetaInformation, LinksMetaInformation};
    use crate::model::xml::parse_str;
    use crate::types::standard::JointType;

    const ROBOT: &str = r#"
        <robot name="test">
            <link name="base_link">
                <visual>
                    <geometry><mesh filename="package://test/meshes/base.DAE" scale="1 1 1"/></geometry>
                </visual>
                <collision>
                    <geometry><box size="0.5 0.4 0.2"/></geometry>
                </collision>
            </link>
            <link name="wheel">
                <visual>
                    <geometry>
                        <sphere radius="0.1"/>
                        <cylinder radius="0.1" length="0.05"/>
                    </geometry>
                </visual>
                <collision>
                    <geometry><cylinder radius="0.1"/></geometry>
                </collision>
            </link>
            <link>
                <visual><geometry><sphere radius="1"/></geometry></visual>
            </link>
            <joint name="base_to_wheel" type="continuous">
                <parent link="base_link"/>
                <child link="wheel"/>
            </joint>
            <joint name="bad_type" type="spherical"/>
            <joint name="no_type"/>
            <joint type="fixed"/>
            <gazebo>
                <joint name="nested_fixed" type="fixed"/>
            </gazebo>
        </robot>
    "#;

    #[test]
    fn joints_are_filtered_and_ordered() {
        let root = parse_str(ROBOT).unwrap();
        let joints = extract_joints(&root);
        let names: Vec<_> = joints.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["base_to_wheel", "nested_fixed"]);
        assert_eq!(joints[0].joint_type, JointType::Continuous);
        assert_eq!(joints[1].joint_type, JointType::Fixed);
    }

    #[test]
    fn unnamed_links_are_skipped() {
        let root = parse_str(ROBOT).unwrap();
        let links = extract_links(&root);
        let names: Vec<_> = links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["base_link", "wheel"]);
    }

    #[test]
    fn geometries_resolved_per_kind() {
        let root = parse_str(ROBOT).unwrap();
        let links = extract_links(&root);

        assert!(matches!(
            links[0].visual_geometry,
            Some(Geometry::Mesh { ref filename, .. }) if filename == "package://test/meshes/base.DAE"
        ));
        assert_eq!(
            links[0].collision_geometry,
            Some(Geometry::Box {
                size: [0.5, 0.4, 0.2]
            })
        );
    }

    #[test]
    fn cylinder_takes_priority_over_sphere() {
        let root = parse_str(ROBOT).unwrap();
        let links = extract_links(&root);
        assert!(matches!(
            links[1].visual_geometry,
            Some(Geometry::Cylinder { .. })
        ));
    }

    #[test]
    fn broken_geometry_keeps_link() {
        let root = parse_str(ROBOT).unwrap();
        let links = extract_links(&root);
        // Cylinder without `length`.
        assert_eq!(links[1].name, "wheel");
        assert!(links[1].collision_geometry.is_none());
    }

    #[test]
    fn empty_document_yields_empty_lists() {
        let root = parse_str(r#"<robot name="empty"/>"#).unwrap();
        assert!(extract_joints(&root).is_empty());
        assert!(extract_links(&root).is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let root = parse_str(ROBOT).unwrap();
        assert_eq!(extract_joints(&root), extract_joints(&root));
        assert_eq!(extract_links(&root), extract_links(&root));
    }

    #[test]
    fn mesh_in_later_visual_wins() {
        let root = parse_str(
            r#"<robot name="r"><link name="a">
                <visual><geometry><box size="1 1 1"/></geometry></visual>
                <visual><geometry><mesh filename="a.dae"/></geometry></visual>
                <collision><geometry><sphere radius="1"/></geometry></collision>
                <collision><geometry><cylinder radius="1" length="2"/></geometry></collision>
            </link></robot>"#,
        )
        .unwrap();
        let links = extract_links(&root);
        assert!(matches!(
            links[0].visual_geometry,
            Some(Geometry::Mesh { ref filename, .. }) if filename == "a.dae"
        ));
        assert!(matches!(links[0].collision_geometry, Some(Geometry::Cylinder { .. })));
    }

    #[test]
    fn unparseable_mesh_scale_keeps_mesh() {
        let root = parse_str(
            r#"<robot name="r"><link name="a"><visual><geometry>
                <mesh filename="meshes/a.stl" scale="${s}"/>
            </geometry></visual></link></robot>"#,
        )
        .unwrap();
        let links = extract_links(&root);
        assert_eq!(
            links[0].visual_geometry,
            Some(Geometry::Mesh {
                filename: "meshes/a.stl".into(),
                scale: [1.0; 3],
            })
        );
        let info = LinksMetaInformation::new(links);
        assert_eq!(info.visual_mesh_types().get("stl"), Some(&1));
    }

    #[test]
    fn revolute_joints_counted_despite_malformed_ones() {
        let mut xml = String::from(r#"<robot name="r">"#);
        for i in 0..4 {
            xml.push_str(&format!(r#"<joint name="j{i}" type="revolute"/>"#));
        }
        xml.push_str(r#"<joint name="untyped_a"/><joint name="untyped_b"/></robot>"#);

        let root = parse_str(&xml).unwrap();
        let info = JointsMetaInformation::new(extract_joints(&root));
        assert_eq!(info.n_joints(), 4);
        for joint_type in JointType::ALL {
            let expected = if joint_type == JointType::Revolute { 4 } else { 0 };
            assert_eq!(info.count_of(joint_type), expected, "{joint_type}");
        }
    }

    #[test]
    fn link_without_geometry_holder() {
        let root = parse_str(r#"<robot name="r"><link name="bare"/></robot>"#).unwrap();
        let links = extract_links(&root);
        assert_eq!(links, vec![Link::new("bare")]);
    }
}

use serde::Serialize;
use tracing::debug;

use crate::error::{AnalyzerError, Result};
use crate::model::xml::XmlElement;
use crate::types::standard::GeometryType;

/// Shape attached to a link's `<visual>` or `<collision>` element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Mesh { filename: String, scale: [f64; 3] },
    Box { size: [f64; 3] },
    Cylinder { radius: f64, length: f64 },
    Sphere { radius: f64 },
}

impl Geometry {
    /// Build a geometry of the given type from its XML element.
    ///
    /// Required attributes are checked against the schema first; optional
    /// ones fall back to the standard's defaults.
    pub fn from_element(geometry_type: GeometryType, element: &XmlElement) -> Result<Self> {
        for &attribute in geometry_type.required_attributes() {
            if element.attribute(attribute).is_none() {
                return Err(AnalyzerError::MissingRequiredAttribute {
                    geometry: geometry_type.tag(),
                    attribute,
                });
            }
        }

        let attr = |name| attribute_or_default(element, geometry_type, name);

        let geometry = match geometry_type {
            GeometryType::Mesh => Geometry::Mesh {
                filename: attr("filename").to_string(),
                scale: optional_vector3(element, geometry_type, "scale")?,
            },
            GeometryType::Box => Geometry::Box {
                size: optional_vector3(element, geometry_type, "size")?,
            },
            GeometryType::Cylinder => Geometry::Cylinder {
                radius: parse_float(element, "radius", attr("radius"))?,
                length: parse_float(element, "length", attr("length"))?,
            },
            GeometryType::Sphere => Geometry::Sphere {
                radius: parse_float(element, "radius", attr("radius"))?,
            },
        };
        Ok(geometry)
    }

    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Mesh { .. } => GeometryType::Mesh,
            Geometry::Box { .. } => GeometryType::Box,
            Geometry::Cylinder { .. } => GeometryType::Cylinder,
            Geometry::Sphere { .. } => GeometryType::Sphere,
        }
    }

    /// Mesh filename, for mesh geometries only.
    pub fn mesh_filename(&self) -> Option<&str> {
        match self {
            Geometry::Mesh { filename, .. } => Some(filename),
            _ => None,
        }
    }

    /// Mesh file type: everything after the first `.` of the filename,
    /// lowercased. `None` for non-mesh geometries and dot-less filenames.
    pub fn mesh_type(&self) -> Option<String> {
        self.mesh_filename()
            .and_then(|f| f.split_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
    }
}

fn attribute_or_default<'a>(
    element: &'a XmlElement,
    geometry_type: GeometryType,
    name: &str,
) -> &'a str {
    element
        .attribute(name)
        .or_else(|| geometry_type.default_value(name))
        .unwrap_or_default()
}

fn invalid(element: &XmlElement, attribute: &str, value: &str) -> AnalyzerError {
    AnalyzerError::InvalidAttribute {
        element: element.name.clone(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

fn parse_float(element: &XmlElement, attribute: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(element, attribute, value))
}

/// Parse a space-separated `"x y z"` triple.
fn parse_vector3(element: &XmlElement, attribute: &str, value: &str) -> Result<[f64; 3]> {
    let parts: Vec<f64> = value
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| invalid(element, attribute, value))?;

    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(invalid(element, attribute, value)),
    }
}

/// An optional `"x y z"` attribute; an unparseable value falls back to the
/// standard's default.
fn optional_vector3(
    element: &XmlElement,
    geometry_type: GeometryType,
    attribute: &str,
) -> Result<[f64; 3]> {
    let default = geometry_type.default_value(attribute).unwrap_or_default();
    match element.attribute(attribute) {
        Some(value) => parse_vector3(element, attribute, value).or_else(|e| {
            debug!(geometry = geometry_type.tag(), error = %e, default, "Using default for optional attribute");
            parse_vector3(element, attribute, default)
        }),
        None => parse_vector3(element, attribute, default),
    }
}

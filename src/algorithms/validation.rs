use crate::errors::CommandError;
use crate::feature_map::fields::FeatureKind;
use crate::geometry::GDALGeometryWrapper as _;
use crate::geometry::LineString;
use crate::geometry::Point;
use crate::geometry::Polygon;
use crate::utils::coordinates::Coordinates;

pub(crate) const MINIMUM_LINE_VERTICES: usize = 2;
pub(crate) const MINIMUM_RING_VERTICES: usize = 4;

/// Names are required, must start with an uppercase letter, and can't start with a soft g.
pub(crate) fn check_name(name: &str) -> Result<(),CommandError> {
    if name.trim().is_empty() {
        return Err(CommandError::NameRequired)
    }
    match name.chars().next() {
        Some('ğ' | 'Ğ') => Err(CommandError::NameCannotStartWithSoftG),
        Some(first) if first.is_uppercase() => Ok(()),
        _ => Err(CommandError::NameMustStartWithUppercase)
    }
}

fn check_coordinates(vertices: &[Coordinates]) -> Result<(),CommandError> {
    for vertex in vertices {
        vertex.check_range()?
    }
    Ok(())
}

pub(crate) fn check_point(point: &Point) -> Result<(),CommandError> {
    if point.is_empty() {
        return Err(CommandError::EmptyGeometry(FeatureKind::Point))
    }
    point.coordinates()?.check_range()
}

pub(crate) fn check_line(line: &LineString) -> Result<(),CommandError> {
    if line.is_empty() {
        return Err(CommandError::EmptyGeometry(FeatureKind::Line))
    }
    let vertices = line.vertices()?;
    if vertices.len() < MINIMUM_LINE_VERTICES {
        return Err(CommandError::TooFewVertices {
            kind: FeatureKind::Line,
            minimum: MINIMUM_LINE_VERTICES,
            found: vertices.len()
        })
    }
    check_coordinates(&vertices)
}

pub(crate) fn check_polygon(polygon: &Polygon) -> Result<(),CommandError> {
    if polygon.is_empty() {
        return Err(CommandError::EmptyGeometry(FeatureKind::Polygon))
    }
    let exterior = polygon.exterior_vertices()?;
    if exterior.len() < MINIMUM_RING_VERTICES {
        return Err(CommandError::TooFewVertices {
            kind: FeatureKind::Polygon,
            minimum: MINIMUM_RING_VERTICES,
            found: exterior.len()
        })
    }
    if exterior.first() != exterior.last() {
        return Err(CommandError::UnclosedRing)
    }
    // holes are checked too, not just the exterior
    check_coordinates(&polygon.vertices()?)
}

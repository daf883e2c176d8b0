use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FormatResult;

use serde::Serialize;

use crate::errors::CommandError;
use crate::errors::ReconcileError;
use crate::feature_map::polygon_layer::PolygonEntity;
use crate::geometry::GDALGeometryWrapper as _;
use crate::geometry::Polygon;
use crate::geometry::VariantArealGeometry;
use crate::progress::ProgressObserver;
use crate::typed_map::fields::IdRef;

/// Overlaps and remainders with an area at or below this are treated as if they weren't there.
pub(crate) const NEGLIGIBLE_AREA: f64 = 1e-6;

const BUFFER_QUAD_SEGMENTS: u32 = 30;

#[derive(Clone,Debug)]
pub(crate) struct ReconcileSettings {
    pub(crate) negligible_area: f64
}

impl Default for ReconcileSettings {

    fn default() -> Self {
        Self {
            negligible_area: NEGLIGIBLE_AREA
        }
    }
}

/// Describes an area which was cut out of a new polygon because another polygon already covered it.
#[derive(Clone,Debug,Serialize)]
pub(crate) struct OverlapNote {
    pub(crate) id: IdRef,
    pub(crate) name: String,
    pub(crate) area: f64
}

impl Display for OverlapNote {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f,"overlaps polygon '{}' (area: {:.6})",self.name,self.area)
    }
}

#[derive(Debug)]
pub(crate) struct Reconciled {
    pub(crate) polygon: Polygon,
    pub(crate) notes: Vec<OverlapNote>
}

#[derive(Clone,Debug,Serialize)]
pub(crate) struct IntersectingPolygon {
    pub(crate) id: IdRef,
    pub(crate) name: String,
    pub(crate) intersection_area: f64
}

#[derive(Clone,Debug,Serialize)]
pub(crate) struct IntersectionReport {
    pub(crate) has_intersection: bool,
    pub(crate) intersecting_count: usize,
    pub(crate) intersecting_polygons: Vec<IntersectingPolygon>
}

fn has_finite_coordinates(polygon: &Polygon) -> bool {
    match polygon.vertices() {
        Ok(vertices) => vertices.iter().all(|vertex| {
            let (x,y) = vertex.to_tuple();
            x.is_finite() && y.is_finite()
        }),
        Err(_) => false
    }
}

// Returns the overlap area and what remains of the working polygon, or None if the overlap is negligible.
fn subtract(working: &Polygon, existing: &PolygonEntity, settings: &ReconcileSettings) -> Result<Option<(f64,Polygon)>,CommandError> {
    if !working.intersects(&existing.geometry) {
        return Ok(None)
    }

    let overlap = working.intersection_area(&existing.geometry)?;
    if overlap <= settings.negligible_area {
        return Ok(None)
    }

    let difference = working.difference(&existing.geometry)?;
    if difference.is_empty() {
        return Err(ReconcileError::FullyCovered(existing.name.clone()).into())
    }

    let remainder = match difference {
        VariantArealGeometry::Polygon(polygon) => polygon,
        multiple => multiple.largest_fragment(settings.negligible_area, |_| true)?.ok_or(ReconcileError::NoValidRemainder)?
    };

    Ok(Some((overlap,remainder)))
}

// A valid polygon is returned untouched. Otherwise a zero-width buffer usually repairs it, though it might split into pieces.
fn clean_up(polygon: Polygon) -> Result<Polygon,CommandError> {
    if polygon.is_valid() {
        return Ok(polygon)
    }

    match polygon.buffer(0.0, BUFFER_QUAD_SEGMENTS).map_err(|_| ReconcileError::CleanupFailed)? {
        VariantArealGeometry::Polygon(buffered) => if buffered.is_valid() && !buffered.is_empty() {
            Ok(buffered)
        } else {
            Err(ReconcileError::CleanupFailed.into())
        },
        multiple => Ok(multiple.largest_fragment(0.0, |fragment| fragment.is_valid())?.ok_or(ReconcileError::CleanupFailed)?)
    }
}

/**
Cuts the areas already covered by existing polygons out of a new polygon.

An invalid input is cleaned up first. The existing polygons are then processed one at a time, in the order given. Each overlap larger than the negligible area is removed
from the working polygon. If that splits it, only the largest piece is kept. The insert is rejected if an existing polygon covers
everything that is left.
*/
pub(crate) fn reconcile_polygon<'existing, Existing: IntoIterator<Item = &'existing PolygonEntity>, Progress: ProgressObserver>(geometry: Polygon, existing: Existing, settings: &ReconcileSettings, progress: &mut Progress) -> Result<Reconciled,CommandError> {

    if geometry.is_empty() || !has_finite_coordinates(&geometry) {
        return Err(ReconcileError::InvalidGeometry.into())
    }

    // a self-intersecting input can make the engine fail to compare it, so it is healed before anything else.
    let mut working = clean_up(geometry)?;
    let mut notes = Vec::new();

    progress.start_unknown_endpoint(|| "Checking for overlapping polygons.");

    for existing in existing {
        match subtract(&working, existing, settings) {
            Ok(None) => (),
            Ok(Some((area,remainder))) => {
                let note = OverlapNote {
                    id: existing.fid.clone(),
                    name: existing.name.clone(),
                    area
                };
                progress.warning(|| format!("New polygon {}.",note));
                notes.push(note);
                working = remainder;
            },
            Err(CommandError::GeometryOperationFailed(operation)) => {
                // the engine couldn't compare these two, so leave this one out rather than failing the whole insert.
                progress.warning(|| format!("Could not calculate the {} with polygon {}, it was skipped.",operation,existing.fid))
            },
            Err(err) => return Err(err)
        }
    }

    progress.finish(|| "Overlaps checked.");

    if working.area() < settings.negligible_area {
        return Err(ReconcileError::NegligibleRemainder.into())
    }

    Ok(Reconciled {
        polygon: clean_up(working)?,
        notes
    })

}

/// Reports which existing polygons overlap the candidate by more than the negligible area. Nothing is changed.
pub(crate) fn check_intersection<'existing, Existing: IntoIterator<Item = &'existing PolygonEntity>, Progress: ProgressObserver>(geometry: &Polygon, existing: Existing, settings: &ReconcileSettings, progress: &mut Progress) -> IntersectionReport {

    let mut intersecting_polygons = Vec::new();

    for existing in existing {
        if !geometry.intersects(&existing.geometry) {
            continue;
        }
        match geometry.intersection_area(&existing.geometry) {
            Ok(area) if area > settings.negligible_area => intersecting_polygons.push(IntersectingPolygon {
                id: existing.fid.clone(),
                name: existing.name.clone(),
                intersection_area: area
            }),
            Ok(_) => (),
            Err(err) => progress.warning(|| format!("Polygon {} was skipped: {}",existing.fid,err))
        }
    }

    IntersectionReport {
        has_intersection: !intersecting_polygons.is_empty(),
        intersecting_count: intersecting_polygons.len(),
        intersecting_polygons
    }
}

#[cfg(test)]
mod test {

    use super::check_intersection;
    use super::clean_up;
    use super::reconcile_polygon;
    use super::ReconcileSettings;
    use crate::errors::CommandError;
    use crate::errors::ReconcileError;
    use crate::feature_map::fields::Rank;
    use crate::feature_map::polygon_layer::PolygonEntity;
    use crate::geometry::GDALGeometryWrapper as _;
    use crate::geometry::Polygon;
    use crate::typed_map::fields::IdRef;

    fn polygon(wkt: &str) -> Polygon {
        Polygon::from_wkt(wkt).unwrap()
    }

    fn entity(id: u64, name: &str, wkt: &str) -> PolygonEntity {
        PolygonEntity {
            fid: IdRef::new(id),
            name: name.to_owned(),
            wkt: wkt.to_owned(),
            rank: Some(Rank::A),
            geometry: polygon(wkt)
        }
    }

    const UNIT_SQUARE: &str = "POLYGON((0 0,0 1,1 1,1 0,0 0))";

    #[test]
    fn test_no_overlap_keeps_polygon() {
        let existing = vec![entity(1,"Far",UNIT_SQUARE)];
        let candidate = polygon("POLYGON((5 5,5 6,6 6,6 5,5 5))");
        let result = reconcile_polygon(candidate.clone(), &existing, &ReconcileSettings::default(), &mut ()).unwrap();
        assert!(result.notes.is_empty());
        assert!(result.polygon.equals_exact(&candidate).unwrap());
    }

    #[test]
    fn test_partial_overlap_is_cut_out() {
        let existing = vec![entity(1,"P1",UNIT_SQUARE)];
        let candidate = polygon("POLYGON((0.5 0.5,0.5 1.5,1.5 1.5,1.5 0.5,0.5 0.5))");
        let result = reconcile_polygon(candidate, &existing, &ReconcileSettings::default(), &mut ()).unwrap();
        assert_eq!(result.notes.len(),1);
        assert_eq!(result.notes[0].name,"P1");
        assert!((result.notes[0].area - 0.25).abs() < 1e-9);
        assert!((result.polygon.area() - 0.75).abs() < 1e-9);
        assert!(result.polygon.intersection_area(&polygon(UNIT_SQUARE)).unwrap() < 1e-9);
    }

    #[test]
    fn test_identical_polygon_is_covered() {
        let existing = vec![entity(1,"P1",UNIT_SQUARE)];
        let result = reconcile_polygon(polygon(UNIT_SQUARE), &existing, &ReconcileSettings::default(), &mut ());
        assert!(matches!(result,Err(CommandError::Reconcile(ReconcileError::FullyCovered(name))) if name == "P1"));
    }

    #[test]
    fn test_touching_polygons_are_not_overlaps() {
        let existing = vec![entity(1,"Neighbor",UNIT_SQUARE)];
        let candidate = polygon("POLYGON((1 0,1 1,2 1,2 0,1 0))");
        let result = reconcile_polygon(candidate, &existing, &ReconcileSettings::default(), &mut ()).unwrap();
        assert!(result.notes.is_empty());
        assert!((result.polygon.area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_keeps_largest_piece() {
        // a bar across the middle of the candidate leaves a thin piece below and a thick piece above
        let existing = vec![entity(1,"Bar","POLYGON((-1 1,-1 2,5 2,5 1,-1 1))")];
        let candidate = polygon("POLYGON((0 0,0 5,4 5,4 0,0 0))");
        let result = reconcile_polygon(candidate, &existing, &ReconcileSettings::default(), &mut ()).unwrap();
        assert_eq!(result.notes.len(),1);
        assert!((result.polygon.area() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_sequential_overlaps_are_all_noted() {
        let existing = vec![
            entity(1,"Left","POLYGON((-1 0,-1 4,1 4,1 0,-1 0))"),
            entity(2,"Right","POLYGON((3 0,3 4,5 4,5 0,3 0))")
        ];
        let candidate = polygon("POLYGON((0 0,0 4,4 4,4 0,0 0))");
        let result = reconcile_polygon(candidate, &existing, &ReconcileSettings::default(), &mut ()).unwrap();
        let names: Vec<_> = result.notes.iter().map(|note| note.name.as_str()).collect();
        assert_eq!(names,vec!["Left","Right"]);
        assert!((result.polygon.area() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let existing = vec![entity(1,"P1",UNIT_SQUARE)];
        let candidate = polygon("POLYGON((0.5 0.5,0.5 1.5,1.5 1.5,1.5 0.5,0.5 0.5))");
        let settings = ReconcileSettings {
            negligible_area: 0.5
        };
        let result = reconcile_polygon(candidate, &existing, &settings, &mut ()).unwrap();
        assert!(result.notes.is_empty());
        assert!((result.polygon.area() - 1.0).abs() < 1e-9);

        let tiny = polygon("POLYGON((10 10,10 10.1,10.1 10.1,10.1 10,10 10))");
        assert!(matches!(reconcile_polygon(tiny, &existing, &settings, &mut ()),Err(CommandError::Reconcile(ReconcileError::NegligibleRemainder))));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let existing: Vec<PolygonEntity> = Vec::new();
        let result = reconcile_polygon(polygon("POLYGON EMPTY"), &existing, &ReconcileSettings::default(), &mut ());
        assert!(matches!(result,Err(CommandError::Reconcile(ReconcileError::InvalidGeometry))));
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let existing = vec![entity(1,"P1",UNIT_SQUARE)];
        let not_a_number = Polygon::from_vertices([(5.0,5.0),(5.0,f64::NAN),(6.0,6.0),(6.0,5.0),(5.0,5.0)]).unwrap();
        let result = reconcile_polygon(not_a_number, &existing, &ReconcileSettings::default(), &mut ());
        assert!(matches!(result,Err(CommandError::Reconcile(ReconcileError::InvalidGeometry))));

        let infinite = Polygon::from_vertices([(5.0,5.0),(5.0,f64::INFINITY),(6.0,6.0),(6.0,5.0),(5.0,5.0)]).unwrap();
        let result = reconcile_polygon(infinite, &existing, &ReconcileSettings::default(), &mut ());
        assert!(matches!(result,Err(CommandError::Reconcile(ReconcileError::InvalidGeometry))));
    }

    #[test]
    fn test_only_slivers_left() {
        // the strip leaves two slivers 1e-7 wide on either side, both below the negligible area
        let existing = vec![entity(1,"Strip","POLYGON((1e-7 -1,1e-7 2,0.9999999 2,0.9999999 -1,1e-7 -1))")];
        let result = reconcile_polygon(polygon(UNIT_SQUARE), &existing, &ReconcileSettings::default(), &mut ());
        assert!(matches!(result,Err(CommandError::Reconcile(ReconcileError::NoValidRemainder))));
    }

    #[test]
    fn test_self_intersecting_input_is_healed_first() {
        let bow_tie = polygon("POLYGON((0 0,2 2,2 0,0 2,0 0))");
        let strip = "POLYGON((0.5 -1,0.5 3,1.5 3,1.5 -1,0.5 -1))";
        let existing = vec![entity(1,"Strip",strip)];
        let result = reconcile_polygon(bow_tie, &existing, &ReconcileSettings::default(), &mut ()).unwrap();
        assert_eq!(result.notes.len(),1);
        assert!(result.polygon.is_valid());
        // either lobe of the bow tie is a triangle of area 1, and the strip takes 0.25 of it
        assert!((result.polygon.area() - 0.75).abs() < 1e-9);
        assert!(result.polygon.intersection_area(&polygon(strip)).unwrap() < 1e-9);
    }

    #[test]
    fn test_clean_up_keeps_valid_polygon() {
        let valid = polygon("POLYGON((0 0,0 3,2 5,4 3,4 0,0 0))");
        let cleaned = clean_up(valid.clone()).unwrap();
        assert!(cleaned.equals_exact(&valid).unwrap());
    }

    #[test]
    fn test_clean_up_repairs_bow_tie() {
        let bow_tie = polygon("POLYGON((0 0,2 2,2 0,0 2,0 0))");
        assert!(!bow_tie.is_valid());
        let cleaned = clean_up(bow_tie).unwrap();
        assert!(cleaned.is_valid());
        assert!(cleaned.area() > 0.0);
    }

    #[test]
    fn test_clean_up_of_collapsed_polygon_fails() {
        // every vertex is on one line, so there is no area for the buffer to keep
        let collapsed = polygon("POLYGON((0 0,1 1,2 2,0 0))");
        assert!(!collapsed.is_valid());
        assert!(matches!(clean_up(collapsed),Err(CommandError::Reconcile(ReconcileError::CleanupFailed))));

        let existing: Vec<PolygonEntity> = Vec::new();
        let result = reconcile_polygon(polygon("POLYGON((0 0,1 1,2 2,0 0))"), &existing, &ReconcileSettings::default(), &mut ());
        assert!(matches!(result,Err(CommandError::Reconcile(ReconcileError::CleanupFailed))));
    }

    #[test]
    fn test_check_intersection_report() {
        let existing = vec![
            entity(1,"P1",UNIT_SQUARE),
            entity(2,"Neighbor","POLYGON((1 0,1 1,2 1,2 0,1 0))"),
            entity(3,"Far","POLYGON((5 5,5 6,6 6,6 5,5 5))")
        ];
        let candidate = polygon("POLYGON((0.5 0.5,0.5 1.5,1.5 1.5,1.5 0.5,0.5 0.5))");
        let report = check_intersection(&candidate, &existing, &ReconcileSettings::default(), &mut ());
        assert!(report.has_intersection);
        assert_eq!(report.intersecting_count,2);
        assert_eq!(report.intersecting_polygons[0].id,IdRef::new(1));
        assert!((report.intersecting_polygons[1].intersection_area - 0.25).abs() < 1e-9);

        let report = check_intersection(&polygon("POLYGON((8 8,8 9,9 9,9 8,8 8))"), &existing, &ReconcileSettings::default(), &mut ());
        assert!(!report.has_intersection);
        assert_eq!(report.intersecting_count,0);
    }
}

use std::collections::HashSet;

use crate::errors::CommandError;
use crate::errors::RuleViolation;
use crate::feature_map::FeatureMapTransaction;
use crate::feature_map::fields::FeatureKind;
use crate::feature_map::fields::Rank;
use crate::geometry::GDALGeometryWrapper;
use crate::geometry::LineString;
use crate::geometry::Point;
use crate::geometry::Polygon;
use crate::progress::ProgressObserver;
use crate::typed_map::fields::IdRef;
use crate::utils::coordinates::Coordinates;

/// A geometry which can be given a rank and checked against the other ranked features.
pub(crate) trait RankedGeometry: GDALGeometryWrapper {

    const KIND: FeatureKind;

    /// The coordinates which other features can attach to. A point's location, or a line's first and last vertex.
    fn anchors(&self) -> Result<Vec<Coordinates>,CommandError>;

}

impl RankedGeometry for Point {

    const KIND: FeatureKind = FeatureKind::Point;

    fn anchors(&self) -> Result<Vec<Coordinates>,CommandError> {
        Ok(vec![self.coordinates()?])
    }

}

impl RankedGeometry for LineString {

    const KIND: FeatureKind = FeatureKind::Line;

    fn anchors(&self) -> Result<Vec<Coordinates>,CommandError> {
        Ok(match self.endpoints()? {
            Some((start,end)) => vec![start,end],
            None => Vec::new()
        })
    }

}

/// Stored rank A or rank B points and lines.
#[derive(Default)]
pub(crate) struct RankedFeatures {
    pub(crate) points: Vec<Point>,
    pub(crate) lines: Vec<LineString>
}

impl RankedFeatures {

    fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty()
    }

    fn anchors(&self) -> Result<HashSet<Coordinates>,CommandError> {
        let mut result = HashSet::new();
        for point in &self.points {
            result.extend(point.anchors()?)
        }
        for line in &self.lines {
            result.extend(line.anchors()?)
        }
        Ok(result)
    }

    fn any_intersects<Geometry: RankedGeometry>(&self, geometry: &Geometry) -> bool {
        self.points.iter().any(|point| point.intersects(geometry)) ||
        self.lines.iter().any(|line| line.intersects(geometry))
    }

}

/// Rank A features must be inside a rank A polygon.
pub(crate) fn check_rank_a<Geometry: RankedGeometry>(geometry: &Geometry, rank_a_polygons: &[Polygon]) -> Result<(),RuleViolation> {
    if rank_a_polygons.is_empty() {
        Err(RuleViolation::NoRankAContext(Geometry::KIND, Rank::A))
    } else if rank_a_polygons.iter().any(|polygon| polygon.contains(geometry)) {
        Ok(())
    } else {
        Err(RuleViolation::NotInsideRankA(Geometry::KIND))
    }
}

/// Rank B features must share an anchor with a rank A point or line. For lines, one matching endpoint is enough.
pub(crate) fn check_rank_b<Geometry: RankedGeometry>(geometry: &Geometry, rank_a: &RankedFeatures) -> Result<(),CommandError> {
    if rank_a.is_empty() {
        return Err(RuleViolation::NoRankAContext(Geometry::KIND, Rank::B).into())
    }
    let available = rank_a.anchors()?;
    if geometry.anchors()?.iter().any(|anchor| available.contains(anchor)) {
        Ok(())
    } else {
        Err(RuleViolation::NotAnchoredToRankA(Geometry::KIND).into())
    }
}

/// Rank C features must avoid all rank A points and lines, and must touch at least one rank B point or line. The rank A
/// check comes first.
pub(crate) fn check_rank_c<Geometry: RankedGeometry>(geometry: &Geometry, rank_a: &RankedFeatures, rank_b: &RankedFeatures) -> Result<(),RuleViolation> {
    if rank_a.is_empty() {
        Err(RuleViolation::NoRankAContext(Geometry::KIND, Rank::C))
    } else if rank_a.any_intersects(geometry) {
        Err(RuleViolation::IntersectsRankA(Geometry::KIND))
    } else if rank_b.any_intersects(geometry) {
        Ok(())
    } else {
        Err(RuleViolation::NotAnchoredToRankB(Geometry::KIND))
    }
}

fn read_rank_a_polygons<Progress: ProgressObserver>(target: &FeatureMapTransaction, progress: &mut Progress) -> Result<Vec<Polygon>,CommandError> {
    let mut layer = target.edit_polygons_layer()?;
    Ok(layer.read_polygons_by_rank(Rank::A, progress)?.into_iter().map(|(_,polygon)| polygon.geometry).collect())
}

// The excluded record is only skipped from the layer of the same kind as the feature being checked.
fn read_ranked_features<Progress: ProgressObserver>(target: &FeatureMapTransaction, rank: Rank, kind: FeatureKind, excluding: Option<&IdRef>, progress: &mut Progress) -> Result<RankedFeatures,CommandError> {
    let is_excluded = |layer_kind: FeatureKind, fid: &IdRef| (layer_kind == kind) && excluding.is_some_and(|excluded| excluded == fid);

    let mut points_layer = target.edit_points_layer()?;
    let points = points_layer.read_points_by_rank(rank, progress)?.into_iter().filter_map(|(fid,point)| {
        (!is_excluded(FeatureKind::Point,&fid)).then_some(point.geometry)
    }).collect();

    let mut lines_layer = target.edit_lines_layer()?;
    let lines = lines_layer.read_lines_by_rank(rank, progress)?.into_iter().filter_map(|(fid,line)| {
        (!is_excluded(FeatureKind::Line,&fid)).then_some(line.geometry)
    }).collect();

    Ok(RankedFeatures {
        points,
        lines
    })
}

/// Checks the rank rules for a point or line against the stored features. When a record is being replaced, pass its id as
/// `excluding` so it can't satisfy the rules by referring to its own old geometry.
pub(crate) fn validate_rank<Geometry: RankedGeometry, Progress: ProgressObserver>(target: &FeatureMapTransaction, geometry: &Geometry, rank: Rank, excluding: Option<&IdRef>, progress: &mut Progress) -> Result<(),CommandError> {
    match rank {
        Rank::A => {
            let polygons = read_rank_a_polygons(target, progress)?;
            Ok(check_rank_a(geometry, &polygons)?)
        },
        Rank::B => {
            let rank_a = read_ranked_features(target, Rank::A, Geometry::KIND, excluding, progress)?;
            check_rank_b(geometry, &rank_a)
        },
        Rank::C => {
            let rank_a = read_ranked_features(target, Rank::A, Geometry::KIND, excluding, progress)?;
            let rank_b = read_ranked_features(target, Rank::B, Geometry::KIND, excluding, progress)?;
            Ok(check_rank_c(geometry, &rank_a, &rank_b)?)
        }
    }
}

#[cfg(test)]
mod test {

    use super::check_rank_a;
    use super::check_rank_b;
    use super::check_rank_c;
    use super::RankedFeatures;
    use crate::errors::CommandError;
    use crate::errors::RuleViolation;
    use crate::feature_map::fields::FeatureKind;
    use crate::feature_map::fields::Rank;
    use crate::geometry::GDALGeometryWrapper as _;
    use crate::geometry::LineString;
    use crate::geometry::Point;
    use crate::geometry::Polygon;

    fn point(wkt: &str) -> Point {
        Point::from_wkt(wkt).unwrap()
    }

    fn line(wkt: &str) -> LineString {
        LineString::from_wkt(wkt).unwrap()
    }

    #[test]
    fn test_rank_a_containment() {
        let polygons = vec![Polygon::from_wkt("POLYGON((0 0,0 10,10 10,10 0,0 0))").unwrap()];
        assert_eq!(check_rank_a(&point("POINT(5 5)"),&polygons),Ok(()));
        assert_eq!(check_rank_a(&point("POINT(50 50)"),&polygons),Err(RuleViolation::NotInsideRankA(FeatureKind::Point)));
        assert_eq!(check_rank_a(&line("LINESTRING(1 1, 9 9)"),&polygons),Ok(()));
        assert_eq!(check_rank_a(&line("LINESTRING(1 1, 19 9)"),&polygons),Err(RuleViolation::NotInsideRankA(FeatureKind::Line)));
        assert_eq!(check_rank_a(&point("POINT(5 5)"),&[]),Err(RuleViolation::NoRankAContext(FeatureKind::Point,Rank::A)));
    }

    #[test]
    fn test_more_polygons_keep_acceptance() {
        let mut polygons = vec![Polygon::from_wkt("POLYGON((0 0,0 10,10 10,10 0,0 0))").unwrap()];
        let candidate = point("POINT(5 5)");
        assert!(check_rank_a(&candidate,&polygons).is_ok());
        polygons.push(Polygon::from_wkt("POLYGON((20 20,20 30,30 30,30 20,20 20))").unwrap());
        polygons.push(Polygon::from_wkt("POLYGON((4 4,4 6,6 6,6 4,4 4))").unwrap());
        assert!(check_rank_a(&candidate,&polygons).is_ok());
    }

    #[test]
    fn test_rank_b_anchors() {
        let rank_a = RankedFeatures {
            points: Vec::new(),
            lines: vec![line("LINESTRING(0 0, 10 10)")]
        };
        assert!(check_rank_b(&point("POINT(0 0)"),&rank_a).is_ok());
        assert!(check_rank_b(&point("POINT(10 10)"),&rank_a).is_ok());
        assert!(matches!(check_rank_b(&point("POINT(1 1)"),&rank_a),Err(CommandError::RuleViolation(RuleViolation::NotAnchoredToRankA(FeatureKind::Point)))));

        // only one end needs to match
        assert!(check_rank_b(&line("LINESTRING(10 10, 20 0)"),&rank_a).is_ok());
        // a vertex in the middle doesn't count
        assert!(check_rank_b(&line("LINESTRING(20 20, 10 10, 30 0)"),&rank_a).is_err());

        let rank_a = RankedFeatures {
            points: vec![point("POINT(3 4)")],
            lines: Vec::new()
        };
        assert!(check_rank_b(&line("LINESTRING(-1 -1, 3 4)"),&rank_a).is_ok());
    }

    #[test]
    fn test_rank_b_and_c_need_rank_a() {
        let empty = RankedFeatures::default();
        assert!(matches!(check_rank_b(&point("POINT(0 0)"),&empty),Err(CommandError::RuleViolation(RuleViolation::NoRankAContext(FeatureKind::Point,Rank::B)))));
        assert_eq!(check_rank_c(&line("LINESTRING(0 0, 1 1)"),&empty,&empty),Err(RuleViolation::NoRankAContext(FeatureKind::Line,Rank::C)));
    }

    #[test]
    fn test_rank_c_order() {
        let rank_a = RankedFeatures {
            points: vec![point("POINT(5 5)")],
            lines: Vec::new()
        };
        let rank_b = RankedFeatures {
            points: vec![point("POINT(2 2)")],
            lines: Vec::new()
        };
        assert_eq!(check_rank_c(&line("LINESTRING(2 2, 3 3)"),&rank_a,&rank_b),Ok(()));
        // touches both, the rank A check wins
        assert_eq!(check_rank_c(&line("LINESTRING(2 2, 6 6)"),&rank_a,&rank_b),Err(RuleViolation::IntersectsRankA(FeatureKind::Line)));
        assert_eq!(check_rank_c(&line("LINESTRING(0 1, 1 0)"),&rank_a,&rank_b),Err(RuleViolation::NotAnchoredToRankB(FeatureKind::Line)));
        assert_eq!(check_rank_c(&point("POINT(5 5)"),&rank_a,&RankedFeatures::default()),Err(RuleViolation::IntersectsRankA(FeatureKind::Point)));
    }
}

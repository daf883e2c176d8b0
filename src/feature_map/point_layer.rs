use crate::entity;
use crate::errors::CommandError;
use crate::feature_map::fields::Rank;
use crate::geometry::Point;
use crate::layer;
use crate::progress::ProgressObserver;
use crate::typed_map::entities::EntityIndex;
use crate::typed_map::fields::IdRef;

layer!(
/// Ranked point features
Point["points"]: Point {
    name: String,
    /// The text the geometry was created from. It is always replaced together with the geometry.
    wkt: String,
    rank: Rank,
});

entity!(PointEntity: Point {
    fid: IdRef,
    name: String,
    wkt: String,
    rank: Rank,
    geometry: Point
});

impl PointLayer<'_> {

    pub(crate) fn add_point(&self, point: &NewPoint, geometry: Point) -> Result<IdRef,CommandError> {
        self.add_struct(point, geometry)
    }

    pub(crate) fn update_point(&self, fid: &IdRef, point: &NewPoint, geometry: Point) -> Result<(),CommandError> {
        self.update_struct(fid, point, geometry)
    }

    pub(crate) fn get_point(&self, fid: &IdRef) -> Result<PointEntity,CommandError> {
        self.try_feature_by_id(fid)?.try_into()
    }

    pub(crate) fn read_points<Progress: ProgressObserver>(&mut self, progress: &mut Progress) -> Result<EntityIndex<PointSchema,PointEntity>,CommandError> {
        self.read_features().into_entities_index(progress)
    }

    pub(crate) fn read_points_by_rank<Progress: ProgressObserver>(&mut self, rank: Rank, progress: &mut Progress) -> Result<EntityIndex<PointSchema,PointEntity>,CommandError> {
        self.read_features().into_entities_index_filtered(|_,point: &PointEntity| point.rank == rank, progress)
    }

    /// Finds points whose name contains the text. The match is case-sensitive.
    pub(crate) fn search_points_by_name<Progress: ProgressObserver>(&mut self, text: &str, progress: &mut Progress) -> Result<EntityIndex<PointSchema,PointEntity>,CommandError> {
        self.read_features().into_entities_index_filtered(|_,point: &PointEntity| point.name.contains(text), progress)
    }

}

use crate::entity;
use crate::errors::CommandError;
use crate::feature_map::fields::Rank;
use crate::geometry::Polygon;
use crate::layer;
use crate::progress::ProgressObserver;
use crate::typed_map::entities::EntityIndex;
use crate::typed_map::fields::IdRef;

layer!(
/// Polygon features, which are always rank A. The rank is empty for polygons that were stored before ranks were recorded.
Polygon["polygons"]: Polygon {
    name: String,
    /// The text of the stored geometry. After reconciliation this is not the text that was submitted.
    wkt: String,
    rank: Option<Rank>,
});

entity!(PolygonEntity: Polygon {
    fid: IdRef,
    name: String,
    wkt: String,
    rank: Option<Rank>,
    geometry: Polygon
});

impl PolygonEntity {

    /// A missing rank counts as rank A.
    pub(crate) fn effective_rank(&self) -> Rank {
        self.rank.unwrap_or(Rank::A)
    }

}

impl PolygonLayer<'_> {

    pub(crate) fn add_polygon(&self, polygon: &NewPolygon, geometry: Polygon) -> Result<IdRef,CommandError> {
        self.add_struct(polygon, geometry)
    }

    pub(crate) fn update_polygon(&self, fid: &IdRef, polygon: &NewPolygon, geometry: Polygon) -> Result<(),CommandError> {
        self.update_struct(fid, polygon, geometry)
    }

    pub(crate) fn get_polygon(&self, fid: &IdRef) -> Result<PolygonEntity,CommandError> {
        self.try_feature_by_id(fid)?.try_into()
    }

    pub(crate) fn read_polygons<Progress: ProgressObserver>(&mut self, progress: &mut Progress) -> Result<EntityIndex<PolygonSchema,PolygonEntity>,CommandError> {
        self.read_features().into_entities_index(progress)
    }

    pub(crate) fn read_polygons_by_rank<Progress: ProgressObserver>(&mut self, rank: Rank, progress: &mut Progress) -> Result<EntityIndex<PolygonSchema,PolygonEntity>,CommandError> {
        self.read_features().into_entities_index_filtered(|_,polygon: &PolygonEntity| polygon.effective_rank() == rank, progress)
    }

}

use crate::entity;
use crate::errors::CommandError;
use crate::feature_map::fields::Rank;
use crate::geometry::LineString;
use crate::layer;
use crate::progress::ProgressObserver;
use crate::typed_map::entities::EntityIndex;
use crate::typed_map::fields::IdRef;

layer!(
/// Ranked line features
Line["lines"]: LineString {
    name: String,
    wkt: String,
    rank: Rank,
});

entity!(LineEntity: Line {
    fid: IdRef,
    name: String,
    wkt: String,
    rank: Rank,
    geometry: LineString
});

impl LineLayer<'_> {

    pub(crate) fn add_line(&self, line: &NewLine, geometry: LineString) -> Result<IdRef,CommandError> {
        self.add_struct(line, geometry)
    }

    pub(crate) fn update_line(&self, fid: &IdRef, line: &NewLine, geometry: LineString) -> Result<(),CommandError> {
        self.update_struct(fid, line, geometry)
    }

    pub(crate) fn get_line(&self, fid: &IdRef) -> Result<LineEntity,CommandError> {
        self.try_feature_by_id(fid)?.try_into()
    }

    pub(crate) fn read_lines<Progress: ProgressObserver>(&mut self, progress: &mut Progress) -> Result<EntityIndex<LineSchema,LineEntity>,CommandError> {
        self.read_features().into_entities_index(progress)
    }

    pub(crate) fn read_lines_by_rank<Progress: ProgressObserver>(&mut self, rank: Rank, progress: &mut Progress) -> Result<EntityIndex<LineSchema,LineEntity>,CommandError> {
        self.read_features().into_entities_index_filtered(|_,line: &LineEntity| line.rank == rank, progress)
    }

}

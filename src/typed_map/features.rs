use gdal::vector::Feature;
use gdal::vector::FeatureIterator;
use indexmap::IndexMap;

use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::progress::WatchableIterator as _;
use crate::typed_map::fields::IdRef;
use crate::typed_map::entities::Entity;
use crate::typed_map::entities::EntityIndex;
use crate::typed_map::schema::Schema;
use core::marker::PhantomData;


fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map(|first| first.to_uppercase().chain(chars).collect()).unwrap_or_default()
}

pub(crate) trait TypedFeature<'data_life,SchemaType: Schema>: From<Feature<'data_life>>  {

    fn fid(&self) -> Result<IdRef,CommandError>;

    fn into_feature(self) -> Feature<'data_life>;

    fn geometry(&self) -> Result<SchemaType::Geometry,CommandError>;

    fn set_geometry(&mut self, value: SchemaType::Geometry) -> Result<(),CommandError>;


}


pub(crate) struct TypedFeatureIterator<'data_life, SchemaType: Schema, Feature: TypedFeature<'data_life,SchemaType>> {
    features: FeatureIterator<'data_life>,
    _phantom_feature: PhantomData<Feature>,
    _phantom_schema: PhantomData<SchemaType>
}

impl<'impl_life, SchemaType: Schema, Feature: TypedFeature<'impl_life,SchemaType>> Iterator for TypedFeatureIterator<'impl_life, SchemaType, Feature> {
    type Item = Feature;

    fn next(&mut self) -> Option<Self::Item> {
        self.features.next().map(Feature::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.features.size_hint()
    }
}

impl<'impl_life, SchemaType: Schema, Feature: TypedFeature<'impl_life,SchemaType>> From<FeatureIterator<'impl_life>> for TypedFeatureIterator<'impl_life,SchemaType, Feature> {
    fn from(features: FeatureIterator<'impl_life>) -> Self {
        Self {
            features,
            _phantom_feature: PhantomData,
            _phantom_schema: PhantomData
        }
    }
}

impl<'impl_life, SchemaType: Schema, Feature: TypedFeature<'impl_life,SchemaType>> TypedFeatureIterator<'impl_life, SchemaType, Feature> {

    /// Reads every feature into an index ordered by fid, skipping features the filter rejects.
    pub(crate) fn into_entities_index_filtered<Progress: ProgressObserver, Data: Entity<SchemaType> + TryFrom<Feature,Error=CommandError>, Filter: FnMut(&IdRef,&Data) -> bool>(self, mut filter: Filter, progress: &mut Progress) -> Result<EntityIndex<SchemaType,Data>,CommandError> {

        let mut result = IndexMap::new();
        for feature in self.watch(progress,format!("Reading {}.",SchemaType::LAYER_NAME),format!("{} read.",capitalize(SchemaType::LAYER_NAME))) {
            let fid = feature.fid()?;
            let entity = Data::try_from(feature)?;

            if filter(&fid,&entity) {
                _ = result.insert(fid,entity);
            }
        }

        Ok(EntityIndex::from(result))
    }

    pub(crate) fn into_entities_index<Progress: ProgressObserver, Data: Entity<SchemaType> + TryFrom<Feature,Error=CommandError>>(self, progress: &mut Progress) -> Result<EntityIndex<SchemaType,Data>,CommandError> {

        self.into_entities_index_filtered(|_,_| true, progress)

    }

}

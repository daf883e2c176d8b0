use std::path::Path;

use gdal::Dataset;
use gdal::DatasetOptions;
use gdal::DriverManager;
use gdal::GdalOpenFlags;
use gdal::vector::sql::Dialect;
use gdal::vector::Transaction;

use crate::errors::CommandError;
use crate::feature_map::line_layer::LineLayer;
use crate::feature_map::point_layer::PointLayer;
use crate::feature_map::polygon_layer::PolygonLayer;
use crate::progress::ProgressObserver;
use crate::typed_map::fields::IdRef;
use crate::typed_map::layers::MapLayer;
use crate::typed_map::schema::Schema;

pub(crate) mod fields;

pub(crate) mod point_layer;
pub(crate) mod line_layer;
pub(crate) mod polygon_layer;

/// The feature store. A GeoPackage with one layer each for points, lines and polygons.
pub(crate) struct FeatureMap {
    dataset: Dataset
}

impl FeatureMap {

    const GDAL_DRIVER: &'static str = "GPKG";

    const fn new(dataset: Dataset) -> Self {
        Self {
            dataset
        }
    }

    fn open_dataset<FilePath: AsRef<Path>>(path: &FilePath) -> Result<Dataset, CommandError> {
        Ok(Dataset::open_ex(path, DatasetOptions {
            open_flags: GdalOpenFlags::GDAL_OF_UPDATE,
            ..Default::default()
        })?)
    }

    pub(crate) fn edit<FilePath: AsRef<Path>>(path: &FilePath) -> Result<Self,CommandError> {
        Ok(Self::new(Self::open_dataset(path)?))
    }

    /// Creates a new, empty, GeoPackage file. Use `initialize` to add the layers.
    pub(crate) fn create<FilePath: AsRef<Path>>(path: &FilePath) -> Result<Self,CommandError> {
        let driver = DriverManager::get_driver_by_name(Self::GDAL_DRIVER)?;
        let dataset = driver.create_vector_only(path)?;
        Ok(Self::new(dataset))
    }

    pub(crate) fn create_or_edit<FilePath: AsRef<Path>>(path: &FilePath) -> Result<Self,CommandError> {
        if path.as_ref().exists() {
            Self::edit(path)
        } else {
            Self::create(path)
        }

    }

    /// Runs the callback inside a transaction. Changes are committed if the callback succeeds, and rolled back if it fails.
    pub(crate) fn with_transaction<ResultType, Callback: FnOnce(&mut FeatureMapTransaction) -> Result<ResultType,CommandError>>(&mut self, callback: Callback) -> Result<ResultType,CommandError> {
        let transaction = self.dataset.start_transaction()?;
        let mut transaction = FeatureMapTransaction::new(transaction);
        match callback(&mut transaction) {
            Ok(result) => {
                transaction.dataset.commit()?;
                Ok(result)
            },
            Err(err) => {
                transaction.dataset.rollback()?;
                Err(err)
            },
        }

    }

    /// Creates the three feature layers.
    pub(crate) fn initialize<Progress: ProgressObserver>(&mut self, overwrite: bool, progress: &mut Progress) -> Result<(),CommandError> {
        progress.start_unknown_endpoint(|| "Creating layers.");
        self.with_transaction(|transaction| {
            progress.message(|| "Creating points layer.");
            _ = transaction.create_points_layer(overwrite)?;
            progress.message(|| "Creating lines layer.");
            _ = transaction.create_lines_layer(overwrite)?;
            progress.message(|| "Creating polygons layer.");
            _ = transaction.create_polygons_layer(overwrite)?;
            Ok(())
        })?;
        progress.finish(|| "Layers created.");
        Ok(())
    }

}

pub(crate) struct FeatureMapTransaction<'data_life> {
    dataset: Transaction<'data_life>
}

impl<'impl_life> FeatureMapTransaction<'impl_life> {

    const fn new(dataset: Transaction<'impl_life>) -> Self {
        Self {
            dataset
        }
    }

    pub(crate) fn create_points_layer(&mut self, overwrite: bool) -> Result<PointLayer,CommandError> {
        PointLayer::create_from_dataset(&mut self.dataset, overwrite)
    }

    pub(crate) fn edit_points_layer(&self) -> Result<PointLayer,CommandError> {
        PointLayer::open_from_dataset(&self.dataset)
    }

    pub(crate) fn create_lines_layer(&mut self, overwrite: bool) -> Result<LineLayer,CommandError> {
        LineLayer::create_from_dataset(&mut self.dataset, overwrite)
    }

    pub(crate) fn edit_lines_layer(&self) -> Result<LineLayer,CommandError> {
        LineLayer::open_from_dataset(&self.dataset)
    }

    pub(crate) fn create_polygons_layer(&mut self, overwrite: bool) -> Result<PolygonLayer,CommandError> {
        PolygonLayer::create_from_dataset(&mut self.dataset, overwrite)
    }

    pub(crate) fn edit_polygons_layer(&self) -> Result<PolygonLayer,CommandError> {
        PolygonLayer::open_from_dataset(&self.dataset)
    }

    // A missing record is an error, so deleting twice reports the second attempt.
    fn delete_from_layer<SchemaType: Schema>(&self, layer: &MapLayer<'_,SchemaType>, fid: &IdRef) -> Result<(),CommandError> {
        if !layer.has_feature(fid) {
            return Err(CommandError::MissingFeature(SchemaType::LAYER_NAME, fid.clone()))
        }
        // the gdal crate doesn't expose feature deletion on layers, but the GeoPackage tables can be edited directly.
        _ = self.dataset.execute_sql(format!("DELETE FROM \"{}\" WHERE fid = {}",SchemaType::LAYER_NAME,fid.to_inner()), None, Dialect::DEFAULT)?;
        Ok(())
    }

    pub(crate) fn delete_point(&self, fid: &IdRef) -> Result<(),CommandError> {
        self.delete_from_layer(&self.edit_points_layer()?, fid)
    }

    pub(crate) fn delete_line(&self, fid: &IdRef) -> Result<(),CommandError> {
        self.delete_from_layer(&self.edit_lines_layer()?, fid)
    }

    pub(crate) fn delete_polygon(&self, fid: &IdRef) -> Result<(),CommandError> {
        self.delete_from_layer(&self.edit_polygons_layer()?, fid)
    }

}

#[cfg(test)]
mod test {

    use super::FeatureMap;
    use crate::errors::CommandError;
    use crate::feature_map::fields::Rank;
    use crate::feature_map::line_layer::NewLine;
    use crate::feature_map::polygon_layer::NewPolygon;
    use crate::geometry::GDALGeometryWrapper as _;
    use crate::geometry::LineString;
    use crate::geometry::Polygon;
    use crate::typed_map::fields::IdRef;

    fn new_map(name: &str) -> FeatureMap {
        let mut map = FeatureMap::create(&format!("/vsimem/strata_feature_map_{}.gpkg",name)).unwrap();
        map.initialize(false, &mut ()).unwrap();
        map
    }

    fn new_line(name: &str) -> NewLine {
        NewLine {
            name: name.to_owned(),
            wkt: "LINESTRING (0 0,1 1)".to_owned(),
            rank: Rank::B
        }
    }

    #[test]
    fn test_lines_read_back_in_fid_order() {
        let mut map = new_map("fid_order");
        let ids = map.with_transaction(|transaction| {
            let layer = transaction.edit_lines_layer()?;
            let first = layer.add_line(&new_line("First"), LineString::from_vertices([(0.0,0.0),(1.0,1.0)])?)?;
            let second = layer.add_line(&new_line("Second"), LineString::from_vertices([(0.0,0.0),(1.0,1.0)])?)?;
            Ok((first,second))
        }).unwrap();
        assert!(ids.0 < ids.1);

        let names = map.with_transaction(|transaction| {
            let mut layer = transaction.edit_lines_layer()?;
            Ok(layer.read_lines_by_rank(Rank::B, &mut ())?.into_iter().map(|(_,line)| line.name).collect::<Vec<_>>())
        }).unwrap();
        assert_eq!(names,vec!["First","Second"]);
    }

    #[test]
    fn test_failed_callback_rolls_back() {
        let mut map = new_map("rollback");
        let result: Result<(),CommandError> = map.with_transaction(|transaction| {
            _ = transaction.edit_polygons_layer()?.add_polygon(&NewPolygon {
                name: "Doomed".to_owned(),
                wkt: "POLYGON ((0 0,0 1,1 1,1 0,0 0))".to_owned(),
                rank: Some(Rank::A)
            }, Polygon::from_wkt("POLYGON ((0 0,0 1,1 1,1 0,0 0))")?)?;
            Err(CommandError::RequestRejected)
        });
        assert!(matches!(result,Err(CommandError::RequestRejected)));

        let count = map.with_transaction(|transaction| {
            Ok(transaction.edit_polygons_layer()?.read_polygons(&mut ())?.into_iter().count())
        }).unwrap();
        assert_eq!(count,0);
    }

    #[test]
    fn test_delete_reports_missing_records() {
        let mut map = new_map("delete");
        let id = map.with_transaction(|transaction| {
            transaction.edit_lines_layer()?.add_line(&new_line("Gone"), LineString::from_vertices([(0.0,0.0),(1.0,1.0)])?)
        }).unwrap();

        map.with_transaction(|transaction| transaction.delete_line(&id)).unwrap();
        let again = map.with_transaction(|transaction| transaction.delete_line(&id));
        assert!(matches!(again,Err(CommandError::MissingFeature("lines",missing)) if missing == id));
        assert!(matches!(map.with_transaction(|transaction| transaction.delete_point(&IdRef::new(1))),Err(CommandError::MissingFeature("points",_))));
    }

    #[test]
    fn test_missing_rank_is_rank_a() {
        let mut map = new_map("null_rank");
        let polygons = map.with_transaction(|transaction| {
            let mut layer = transaction.edit_polygons_layer()?;
            _ = layer.add_polygon(&NewPolygon {
                name: "Old".to_owned(),
                wkt: "POLYGON ((0 0,0 1,1 1,1 0,0 0))".to_owned(),
                rank: None
            }, Polygon::from_wkt("POLYGON ((0 0,0 1,1 1,1 0,0 0))")?)?;
            layer.read_polygons_by_rank(Rank::A, &mut ())
        }).unwrap();
        let stored: Vec<_> = polygons.into_iter().map(|(_,polygon)| polygon).collect();
        assert_eq!(stored.len(),1);
        assert_eq!(stored[0].rank,None);
        assert_eq!(stored[0].effective_rank(),Rank::A);
    }
}

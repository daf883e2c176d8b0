use crate::algorithms::rank_rules::validate_rank;
use crate::algorithms::rank_rules::RankedGeometry;
use crate::algorithms::validation::check_line;
use crate::algorithms::validation::check_name;
use crate::algorithms::validation::check_point;
use crate::errors::CommandError;
use crate::feature_map::FeatureMap;
use crate::feature_map::FeatureMapTransaction;
use crate::feature_map::fields::FeatureKind;
use crate::feature_map::fields::Rank;
use crate::feature_map::line_layer::NewLine;
use crate::feature_map::point_layer::NewPoint;
use crate::geometry::GDALGeometryWrapper as _;
use crate::geometry::LineString;
use crate::geometry::Point;
use crate::progress::ProgressObserver;
use crate::service::plural;
use crate::service::FeatureRecord;
use crate::service::Response;
use crate::typed_map::fields::IdRef;

/// The storage operations for a kind of feature which carries a rank and is checked by the rank rules.
pub(crate) trait RankedFeatureKind {

    type Geometry: RankedGeometry;

    fn check_shape(geometry: &Self::Geometry) -> Result<(),CommandError>;

    fn add(target: &FeatureMapTransaction, name: &str, wkt: &str, rank: Rank, geometry: Self::Geometry) -> Result<IdRef,CommandError>;

    fn update(target: &FeatureMapTransaction, fid: &IdRef, name: &str, wkt: &str, rank: Rank, geometry: Self::Geometry) -> Result<(),CommandError>;

    fn get(target: &FeatureMapTransaction, fid: &IdRef) -> Result<FeatureRecord,CommandError>;

    fn list<Progress: ProgressObserver>(target: &FeatureMapTransaction, progress: &mut Progress) -> Result<Vec<FeatureRecord>,CommandError>;

    fn delete(target: &FeatureMapTransaction, fid: &IdRef) -> Result<(),CommandError>;

}

pub(crate) struct Points;

impl RankedFeatureKind for Points {

    type Geometry = Point;

    fn check_shape(geometry: &Self::Geometry) -> Result<(),CommandError> {
        check_point(geometry)
    }

    fn add(target: &FeatureMapTransaction, name: &str, wkt: &str, rank: Rank, geometry: Self::Geometry) -> Result<IdRef,CommandError> {
        target.edit_points_layer()?.add_point(&NewPoint {
            name: name.to_owned(),
            wkt: wkt.to_owned(),
            rank
        }, geometry)
    }

    fn update(target: &FeatureMapTransaction, fid: &IdRef, name: &str, wkt: &str, rank: Rank, geometry: Self::Geometry) -> Result<(),CommandError> {
        target.edit_points_layer()?.update_point(fid, &NewPoint {
            name: name.to_owned(),
            wkt: wkt.to_owned(),
            rank
        }, geometry)
    }

    fn get(target: &FeatureMapTransaction, fid: &IdRef) -> Result<FeatureRecord,CommandError> {
        Ok(target.edit_points_layer()?.get_point(fid)?.into())
    }

    fn list<Progress: ProgressObserver>(target: &FeatureMapTransaction, progress: &mut Progress) -> Result<Vec<FeatureRecord>,CommandError> {
        Ok(target.edit_points_layer()?.read_points(progress)?.into_iter().map(|(_,point)| point.into()).collect())
    }

    fn delete(target: &FeatureMapTransaction, fid: &IdRef) -> Result<(),CommandError> {
        target.delete_point(fid)
    }

}

pub(crate) struct Lines;

impl RankedFeatureKind for Lines {

    type Geometry = LineString;

    fn check_shape(geometry: &Self::Geometry) -> Result<(),CommandError> {
        check_line(geometry)
    }

    fn add(target: &FeatureMapTransaction, name: &str, wkt: &str, rank: Rank, geometry: Self::Geometry) -> Result<IdRef,CommandError> {
        target.edit_lines_layer()?.add_line(&NewLine {
            name: name.to_owned(),
            wkt: wkt.to_owned(),
            rank
        }, geometry)
    }

    fn update(target: &FeatureMapTransaction, fid: &IdRef, name: &str, wkt: &str, rank: Rank, geometry: Self::Geometry) -> Result<(),CommandError> {
        target.edit_lines_layer()?.update_line(fid, &NewLine {
            name: name.to_owned(),
            wkt: wkt.to_owned(),
            rank
        }, geometry)
    }

    fn get(target: &FeatureMapTransaction, fid: &IdRef) -> Result<FeatureRecord,CommandError> {
        Ok(target.edit_lines_layer()?.get_line(fid)?.into())
    }

    fn list<Progress: ProgressObserver>(target: &FeatureMapTransaction, progress: &mut Progress) -> Result<Vec<FeatureRecord>,CommandError> {
        Ok(target.edit_lines_layer()?.read_lines(progress)?.into_iter().map(|(_,line)| line.into()).collect())
    }

    fn delete(target: &FeatureMapTransaction, fid: &IdRef) -> Result<(),CommandError> {
        target.delete_line(fid)
    }

}

// Runs the checks which need the geometry but not the store, in order: shape, rank token.
fn check_geometry<Kind: RankedFeatureKind>(geometry: &Kind::Geometry, rank: &str) -> Result<(String,Rank),CommandError> {
    Kind::check_shape(geometry)?;
    let rank: Rank = rank.parse()?;
    Ok((geometry.to_wkt()?,rank))
}

// Runs the checks which don't need the store, in order: name, text, shape, rank token.
fn check_input<Kind: RankedFeatureKind>(name: &str, wkt: &str, rank: &str) -> Result<(Kind::Geometry,String,Rank),CommandError> {
    check_name(name)?;
    let geometry = Kind::Geometry::from_wkt(wkt)?;
    let (wkt,rank) = check_geometry::<Kind>(&geometry, rank)?;
    Ok((geometry,wkt,rank))
}

/// Checks an already parsed geometry and stores it inside the open transaction. The name is expected to be checked already, since that comes before parsing.
pub(crate) fn insert_ranked<Kind: RankedFeatureKind, Progress: ProgressObserver>(transaction: &FeatureMapTransaction, name: &str, geometry: Kind::Geometry, rank: &str, progress: &mut Progress) -> Result<(String,FeatureRecord),CommandError> {
    let (wkt,rank) = check_geometry::<Kind>(&geometry, rank)?;
    validate_rank(transaction, &geometry, rank, None, progress)?;
    let fid = Kind::add(transaction, name, &wkt, rank, geometry)?;
    Ok((format!("Rank {} {} added.",rank,Kind::Geometry::KIND),FeatureRecord {
        id: fid,
        kind: Kind::Geometry::KIND,
        name: name.to_owned(),
        wkt,
        rank: Some(rank)
    }))
}

pub(crate) fn add_ranked<Kind: RankedFeatureKind, Progress: ProgressObserver>(target: &mut FeatureMap, name: &str, wkt: &str, rank: &str, progress: &mut Progress) -> Response<FeatureRecord> {
    target.with_transaction(|transaction| {
        check_name(name)?;
        let geometry = Kind::Geometry::from_wkt(wkt)?;
        insert_ranked::<Kind,_>(transaction, name, geometry, rank, progress)
    }).into()
}

/// Replaces a stored feature. The checks are the same as for adding, except the stored record can't be used to satisfy its own rank rules.
pub(crate) fn update_ranked<Kind: RankedFeatureKind, Progress: ProgressObserver>(target: &mut FeatureMap, fid: &IdRef, name: &str, wkt: &str, rank: &str, progress: &mut Progress) -> Response<FeatureRecord> {
    target.with_transaction(|transaction| {
        _ = Kind::get(transaction, fid)?;
        let (geometry,wkt,rank) = check_input::<Kind>(name, wkt, rank)?;
        validate_rank(transaction, &geometry, rank, Some(fid), progress)?;
        Kind::update(transaction, fid, name, &wkt, rank, geometry)?;
        Ok((format!("Rank {} {} updated.",rank,Kind::Geometry::KIND),FeatureRecord {
            id: fid.clone(),
            kind: Kind::Geometry::KIND,
            name: name.to_owned(),
            wkt,
            rank: Some(rank)
        }))
    }).into()
}

pub(crate) fn delete_ranked<Kind: RankedFeatureKind>(target: &mut FeatureMap, fid: &IdRef) -> Response<FeatureRecord> {
    target.with_transaction(|transaction| {
        let record = Kind::get(transaction, fid)?;
        Kind::delete(transaction, fid)?;
        Ok((format!("Rank {} {} deleted.",record.rank.unwrap_or(Rank::A),record.kind),record))
    }).into()
}

pub(crate) fn get_ranked<Kind: RankedFeatureKind>(target: &mut FeatureMap, fid: &IdRef) -> Response<FeatureRecord> {
    target.with_transaction(|transaction| {
        let record = Kind::get(transaction, fid)?;
        Ok((format!("Rank {} {} found.",record.rank.unwrap_or(Rank::A),record.kind),record))
    }).into()
}

pub(crate) fn list_ranked<Kind: RankedFeatureKind, Progress: ProgressObserver>(target: &mut FeatureMap, progress: &mut Progress) -> Response<Vec<FeatureRecord>> {
    target.with_transaction(|transaction| {
        let records = Kind::list(transaction, progress)?;
        Ok((plural(Kind::Geometry::KIND, records.len()),records))
    }).into()
}

/// Finds points whose name contains the text, matching case.
pub(crate) fn search_points<Progress: ProgressObserver>(target: &mut FeatureMap, text: &str, progress: &mut Progress) -> Response<Vec<FeatureRecord>> {
    target.with_transaction(|transaction| {
        let mut layer = transaction.edit_points_layer()?;
        let records: Vec<FeatureRecord> = layer.search_points_by_name(text, progress)?.into_iter().map(|(_,point)| point.into()).collect();
        Ok((plural(FeatureKind::Point, records.len()),records))
    }).into()
}

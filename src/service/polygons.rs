use crate::algorithms::reconcile::check_intersection;
use crate::algorithms::reconcile::reconcile_polygon;
use crate::algorithms::reconcile::IntersectionReport;
use crate::algorithms::reconcile::Reconciled;
use crate::algorithms::reconcile::ReconcileSettings;
use crate::algorithms::validation::check_name;
use crate::algorithms::validation::check_polygon;
use crate::errors::CommandError;
use crate::feature_map::FeatureMap;
use crate::feature_map::FeatureMapTransaction;
use crate::feature_map::fields::FeatureKind;
use crate::feature_map::fields::Rank;
use crate::feature_map::polygon_layer::NewPolygon;
use crate::geometry::GDALGeometryWrapper as _;
use crate::geometry::Polygon;
use crate::progress::ProgressObserver;
use crate::service::plural;
use crate::service::FeatureRecord;
use crate::service::Response;
use crate::typed_map::fields::IdRef;

fn check_input(name: &str, wkt: &str) -> Result<Polygon,CommandError> {
    check_name(name)?;
    let polygon = Polygon::from_wkt(wkt)?;
    check_polygon(&polygon)?;
    Ok(polygon)
}

fn reconcile_with_stored<Progress: ProgressObserver>(target: &FeatureMapTransaction, polygon: Polygon, excluding: Option<&IdRef>, settings: &ReconcileSettings, progress: &mut Progress) -> Result<Reconciled,CommandError> {
    let stored = target.edit_polygons_layer()?.read_polygons(progress)?;
    let others = stored.values().filter(|existing| !excluding.is_some_and(|excluded| excluded == &existing.fid));
    reconcile_polygon(polygon, others, settings, progress)
}

fn describe(action: &str, reconciled: &Reconciled) -> String {
    if reconciled.notes.is_empty() {
        format!("Polygon {}.",action)
    } else {
        let notes: Vec<String> = reconciled.notes.iter().map(ToString::to_string).collect();
        format!("Polygon {}. Warning: {}.",action,notes.join("; "))
    }
}

/// Checks an already parsed polygon, cuts out the areas covered by other polygons, and stores the rest as rank A inside the open
/// transaction. The name is expected to be checked already.
pub(crate) fn insert_polygon<Progress: ProgressObserver>(transaction: &FeatureMapTransaction, name: &str, polygon: Polygon, settings: &ReconcileSettings, progress: &mut Progress) -> Result<(String,FeatureRecord),CommandError> {
    check_polygon(&polygon)?;
    let reconciled = reconcile_with_stored(transaction, polygon, None, settings, progress)?;
    let message = describe("added", &reconciled);
    let wkt = reconciled.polygon.to_wkt()?;
    let fid = transaction.edit_polygons_layer()?.add_polygon(&NewPolygon {
        name: name.to_owned(),
        wkt: wkt.clone(),
        rank: Some(Rank::A)
    }, reconciled.polygon)?;
    Ok((message,FeatureRecord {
        id: fid,
        kind: FeatureKind::Polygon,
        name: name.to_owned(),
        wkt,
        rank: Some(Rank::A)
    }))
}

/// Stores a new rank A polygon, after cutting out the areas already covered by other polygons.
pub(crate) fn add_polygon<Progress: ProgressObserver>(target: &mut FeatureMap, name: &str, wkt: &str, settings: &ReconcileSettings, progress: &mut Progress) -> Response<FeatureRecord> {
    target.with_transaction(|transaction| {
        check_name(name)?;
        let polygon = Polygon::from_wkt(wkt)?;
        insert_polygon(transaction, name, polygon, settings, progress)
    }).into()
}

/// Replaces a stored polygon. The new geometry is reconciled against every other polygon, never against the one it replaces.
pub(crate) fn update_polygon<Progress: ProgressObserver>(target: &mut FeatureMap, fid: &IdRef, name: &str, wkt: &str, settings: &ReconcileSettings, progress: &mut Progress) -> Response<FeatureRecord> {
    target.with_transaction(|transaction| {
        let stored = transaction.edit_polygons_layer()?.get_polygon(fid)?;
        let polygon = check_input(name, wkt)?;
        let reconciled = reconcile_with_stored(transaction, polygon, Some(fid), settings, progress)?;
        let message = describe("updated", &reconciled);
        let wkt = reconciled.polygon.to_wkt()?;
        let rank = Some(stored.effective_rank());
        transaction.edit_polygons_layer()?.update_polygon(fid, &NewPolygon {
            name: name.to_owned(),
            wkt: wkt.clone(),
            rank
        }, reconciled.polygon)?;
        Ok((message,FeatureRecord {
            id: fid.clone(),
            kind: FeatureKind::Polygon,
            name: name.to_owned(),
            wkt,
            rank
        }))
    }).into()
}

pub(crate) fn delete_polygon(target: &mut FeatureMap, fid: &IdRef) -> Response<FeatureRecord> {
    target.with_transaction(|transaction| {
        let record: FeatureRecord = transaction.edit_polygons_layer()?.get_polygon(fid)?.into();
        transaction.delete_polygon(fid)?;
        Ok(("Polygon deleted.".to_owned(),record))
    }).into()
}

pub(crate) fn get_polygon(target: &mut FeatureMap, fid: &IdRef) -> Response<FeatureRecord> {
    target.with_transaction(|transaction| {
        let record: FeatureRecord = transaction.edit_polygons_layer()?.get_polygon(fid)?.into();
        Ok(("Polygon found.".to_owned(),record))
    }).into()
}

pub(crate) fn list_polygons<Progress: ProgressObserver>(target: &mut FeatureMap, progress: &mut Progress) -> Response<Vec<FeatureRecord>> {
    target.with_transaction(|transaction| {
        let records: Vec<FeatureRecord> = transaction.edit_polygons_layer()?.read_polygons(progress)?.into_iter().map(|(_,polygon)| polygon.into()).collect();
        Ok((plural(FeatureKind::Polygon, records.len()),records))
    }).into()
}

/// Reports which stored polygons a candidate would overlap. The store is not changed, and the candidate's shape is not checked.
pub(crate) fn check_polygon_intersection<Progress: ProgressObserver>(target: &mut FeatureMap, wkt: &str, settings: &ReconcileSettings, progress: &mut Progress) -> Response<IntersectionReport> {
    target.with_transaction(|transaction| {
        let polygon = Polygon::from_wkt(wkt)?;
        let stored = transaction.edit_polygons_layer()?.read_polygons(progress)?;
        let report = check_intersection(&polygon, stored.values(), settings, progress);
        let message = if report.has_intersection {
            format!("The polygon overlaps {} stored polygon(s).",report.intersecting_count)
        } else {
            "The polygon doesn't overlap any stored polygons.".to_owned()
        };
        Ok((message,report))
    }).into()
}

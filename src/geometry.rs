use gdal::vector::Geometry as GDALGeometry;
use gdal::vector::OGRwkbGeometryType;
use geo::CoordsIter as _;

use crate::errors::CommandError;
use crate::utils::coordinates::Coordinates;

fn to_geo_type(geometry: &GDALGeometry) -> Result<geo_types::Geometry,CommandError> {
    Ok(geometry.to_geo()?)
}

fn collect_vertices(geometry: &GDALGeometry) -> Result<Vec<Coordinates>,CommandError> {
    let mut result = Vec::new();
    for coord in to_geo_type(geometry)?.coords_iter() {
        result.push(coord.try_into()?)
    }
    Ok(result)
}

pub(crate) trait GDALGeometryWrapper: TryFrom<GDALGeometry,Error=CommandError> + Into<GDALGeometry> {

    const INTERNAL_TYPE: OGRwkbGeometryType::Type;

    fn as_gdal(&self) -> &GDALGeometry;

    /// Parses the text. Text which can't be read is reported differently from text which reads as the wrong kind of geometry.
    fn from_wkt(wkt: &str) -> Result<Self,CommandError> {
        let geometry = GDALGeometry::from_wkt(wkt).map_err(|e| CommandError::InvalidWkt(e.to_string()))?;
        Self::try_from(geometry)
    }

    fn to_wkt(&self) -> Result<String,CommandError> {
        Ok(self.as_gdal().wkt()?)
    }

    fn is_valid(&self) -> bool {
        // FUTURE: This writes text to stderr if it isn't valid. Is there a way to fix that?
        self.as_gdal().is_valid()
    }

    fn is_empty(&self) -> bool {
        self.as_gdal().is_empty()
    }

    fn vertices(&self) -> Result<Vec<Coordinates>,CommandError> {
        collect_vertices(self.as_gdal())
    }

    // boundary-inclusive containment is not what OGR provides, so points on the boundary of the container are checked separately.
    fn contains<Other: GDALGeometryWrapper>(&self, other: &Other) -> bool {
        self.as_gdal().contains(other.as_gdal()) || (self.as_gdal().intersects(other.as_gdal()) && boundary_covers(self.as_gdal(),other.as_gdal()))
    }

    fn intersects<Other: GDALGeometryWrapper>(&self, other: &Other) -> bool {
        self.as_gdal().intersects(other.as_gdal())
    }

    fn equals_exact<Other: GDALGeometryWrapper>(&self, other: &Other) -> Result<bool,CommandError> {
        Ok(to_geo_type(self.as_gdal())? == to_geo_type(other.as_gdal())?)
    }

}

// A geometry which lies entirely in the closure of the container (interior plus boundary) is "covered". This handles points
// and lines drawn exactly on the edge of a polygon, which 'contains' rejects.
fn boundary_covers(container: &GDALGeometry, other: &GDALGeometry) -> bool {
    match other.difference(container) {
        Some(outside) => outside.is_empty(),
        None => false
    }
}

macro_rules! non_collection_geometry {
    ($struct: ident, $geo_type: ident) => {

        #[derive(Clone,Debug)]
        pub(crate) struct $struct {
            inner: GDALGeometry,
        }

        impl $struct {

            // private method, use TryFrom to actually try to convert
            fn try_from_gdal(value: GDALGeometry) -> Result<Self,CommandError> {
                let found = value.geometry_type();
                if found == Self::INTERNAL_TYPE {
                    Ok(Self {
                        inner: value
                    })
                } else {
                    Err(CommandError::IncorrectGdalGeometryType{
                        expected: Self::INTERNAL_TYPE,
                        found
                    })
                }

            }

            // internal function for constructing a blank, but empty and therefore incorrect, value which then gets filled in by constructor
            fn blank() -> Result<Self,CommandError> {
                let inner = GDALGeometry::empty(Self::INTERNAL_TYPE)?;
                Ok(Self {
                    inner
                })
            }

        }


        impl GDALGeometryWrapper for $struct {

            const INTERNAL_TYPE: OGRwkbGeometryType::Type = OGRwkbGeometryType::$geo_type;

            fn as_gdal(&self) -> &GDALGeometry {
                &self.inner
            }

        }

        impl TryFrom<GDALGeometry> for $struct {

            type Error = CommandError;

            fn try_from(value: GDALGeometry) -> Result<Self,Self::Error> {
                Self::try_from_gdal(value)
            }

        }

        impl From<$struct> for GDALGeometry {

            fn from(value: $struct) -> GDALGeometry {
                value.inner
            }
        }

    };
}



non_collection_geometry!(Point,wkbPoint);

impl Point {

    #[cfg(test)]
    pub(crate) fn new(x: f64, y: f64) -> Result<Self,CommandError> {
        let mut this = Self::blank()?;
        this.inner.add_point_2d((x,y));
        Ok(this)
    }

    pub(crate) fn coordinates(&self) -> Result<Coordinates,CommandError> {
        Ok(self.inner.get_point(0).try_into()?)
    }

}

non_collection_geometry!(LineString,wkbLineString);

impl LineString {

    #[cfg(test)]
    pub(crate) fn from_vertices<Items: IntoIterator<Item=(f64,f64)>>(vertices: Items) -> Result<Self,CommandError> {
        let mut this = Self::blank()?;
        for point in vertices {
            this.inner.add_point_2d(point)
        }
        Ok(this)

    }

    pub(crate) fn get_point(&self, index: usize) -> Result<Coordinates,CommandError> {
        Ok(self.inner.get_point(index as i32).try_into()?)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.point_count()
    }

    /// The first and last vertex, or nothing for an empty line.
    pub(crate) fn endpoints(&self) -> Result<Option<(Coordinates,Coordinates)>,CommandError> {
        let len = self.len();
        if len == 0 {
            Ok(None)
        } else {
            Ok(Some((self.get_point(0)?,self.get_point(len - 1)?)))
        }
    }

}

non_collection_geometry!(Polygon,wkbPolygon);

impl Polygon {

    #[cfg(test)]
    pub(crate) fn from_vertices<Items: IntoIterator<Item=(f64,f64)>>(vertices: Items) -> Result<Self,CommandError> {
        let mut ring = GDALGeometry::empty(OGRwkbGeometryType::wkbLinearRing)?;
        for point in vertices {
            ring.add_point_2d(point)
        }
        let mut this = Self::blank()?;
        this.inner.add_geometry(ring)?;
        Ok(this)
    }

    pub(crate) fn ring_count(&self) -> usize {
        self.inner.geometry_count()
    }

    /// Vertices of the outer ring in drawing order, including the closing vertex.
    pub(crate) fn exterior_vertices(&self) -> Result<Vec<Coordinates>,CommandError> {
        if self.ring_count() == 0 {
            return Ok(Vec::new())
        }
        let ring = self.inner.get_geometry(0);
        let mut result = Vec::new();
        for i in 0..ring.point_count() {
            result.push(ring.get_point(i as i32).try_into()?)
        }
        Ok(result)
    }

    pub(crate) fn area(&self) -> f64 {
        self.inner.area()
    }

    pub(crate) fn buffer(&self, distance: f64, n_quad_segs: u32) -> Result<VariantArealGeometry,CommandError> {
        self.inner.buffer(distance, n_quad_segs)?.try_into()
    }

    /// The area of the shared region. Polygons which only touch have no shared area.
    pub(crate) fn intersection_area(&self, rhs: &Self) -> Result<f64,CommandError> {
        if let Some(intersected) = self.inner.intersection(&rhs.inner) {
            // the result might be a line or point if they only touch, which is fine, since area is 0 for those
            Ok(intersected.area())
        } else {
            Err(CommandError::GeometryOperationFailed("intersection"))
        }
    }

    pub(crate) fn difference(&self, rhs: &Self) -> Result<VariantArealGeometry,CommandError> {
        if let Some(different) = self.inner.difference(&rhs.inner) {
            different.try_into()
        } else {
            Err(CommandError::GeometryOperationFailed("difference"))
        }
    }

}


non_collection_geometry!(MultiPolygon,wkbMultiPolygon);

impl MultiPolygon {

    pub(crate) fn len(&self) -> usize {
        self.inner.geometry_count()
    }

    pub(crate) fn get_polygon(&self, index: usize) -> Result<Polygon,CommandError> {
        let polygon = self.inner.get_geometry(index);
        Polygon::try_from(polygon.clone()) // FUTURE: Unfortunately, GeometryRef is inaccessible, which might mess with performance a little.
    }

    #[cfg(test)]
    pub(crate) fn area(&self) -> f64 {
        self.inner.area()
    }

}

/// A geometry collection returned by an operation. It can contain anything, but only the polygonal parts matter for areas.
#[derive(Clone,Debug)]
pub(crate) struct Collection {
    inner: GDALGeometry
}

impl Collection {

    #[cfg(test)]
    pub(crate) fn area(&self) -> f64 {
        self.inner.area()
    }

    fn push_polygons(geometry: &GDALGeometry, target: &mut Vec<Polygon>) -> Result<(),CommandError> {
        match geometry.geometry_type() {
            OGRwkbGeometryType::wkbPolygon => target.push(Polygon::try_from(geometry.clone())?),
            OGRwkbGeometryType::wkbMultiPolygon | OGRwkbGeometryType::wkbGeometryCollection => {
                for i in 0..geometry.geometry_count() {
                    let part = geometry.get_geometry(i);
                    Self::push_polygons(&part, target)?
                }
            },
            // points and lines left over from touching boundaries
            _ => ()
        }
        Ok(())
    }

    pub(crate) fn polygons(&self) -> Result<Vec<Polygon>,CommandError> {
        let mut result = Vec::new();
        Self::push_polygons(&self.inner, &mut result)?;
        Ok(result)
    }

}

impl GDALGeometryWrapper for Collection {

    const INTERNAL_TYPE: OGRwkbGeometryType::Type = OGRwkbGeometryType::wkbGeometryCollection;

    fn as_gdal(&self) -> &GDALGeometry {
        &self.inner
    }

}

impl TryFrom<GDALGeometry> for Collection {

    type Error = CommandError;

    fn try_from(value: GDALGeometry) -> Result<Self,Self::Error> {
        let found = value.geometry_type();
        if found == OGRwkbGeometryType::wkbGeometryCollection {
            Ok(Self {
                inner: value
            })
        } else {
            Err(CommandError::IncorrectGdalGeometryType{
                expected: OGRwkbGeometryType::wkbGeometryCollection,
                found
            })
        }
    }
}

impl From<Collection> for GDALGeometry {

    fn from(value: Collection) -> Self {
        value.inner
    }
}

/// The result of an operation on polygons, which could come back in any of several forms.
#[derive(Clone,Debug)]
pub(crate) enum VariantArealGeometry {
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
    Collection(Collection),
}

impl VariantArealGeometry {

    #[cfg(test)]
    pub(crate) fn area(&self) -> f64 {
        match self {
            Self::Polygon(inner) => inner.area(),
            Self::MultiPolygon(inner) => inner.area(),
            Self::Collection(inner) => inner.area(),
        }
    }

    /// Every polygon part, in the order the geometry engine returned them.
    pub(crate) fn fragments(self) -> Result<Vec<Polygon>,CommandError> {
        match self {
            Self::Polygon(inner) => if inner.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(vec![inner])
            },
            Self::MultiPolygon(inner) => {
                let mut result = Vec::with_capacity(inner.len());
                for i in 0..inner.len() {
                    let polygon = inner.get_polygon(i)?;
                    if !polygon.is_empty() {
                        result.push(polygon)
                    }
                }
                Ok(result)
            },
            Self::Collection(inner) => inner.polygons(),
        }
    }

    /// Chooses the fragment with the largest area above the minimum. When areas are tied, the first one wins. Returns None
    /// if nothing qualifies.
    pub(crate) fn largest_fragment<Filter: Fn(&Polygon) -> bool>(self, minimum_area: f64, filter: Filter) -> Result<Option<Polygon>,CommandError> {
        let mut result: Option<(f64,Polygon)> = None;
        for fragment in self.fragments()? {
            let area = fragment.area();
            if (area > minimum_area) && filter(&fragment) {
                match &result {
                    Some((best,_)) if *best >= area => (),
                    _ => result = Some((area,fragment))
                }
            }
        }
        Ok(result.map(|(_,polygon)| polygon))
    }

}

impl GDALGeometryWrapper for VariantArealGeometry {

    const INTERNAL_TYPE: OGRwkbGeometryType::Type = OGRwkbGeometryType::wkbUnknown;

    fn as_gdal(&self) -> &GDALGeometry {
        match self {
            Self::Polygon(a) => a.as_gdal(),
            Self::MultiPolygon(a) => a.as_gdal(),
            Self::Collection(a) => a.as_gdal(),
        }
    }

}

impl TryFrom<GDALGeometry> for VariantArealGeometry {
    type Error = CommandError;

    fn try_from(value: GDALGeometry) -> Result<Self, Self::Error> {
        match value.geometry_type() {
            OGRwkbGeometryType::wkbPolygon => Ok(Self::Polygon(value.try_into()?)),
            OGRwkbGeometryType::wkbMultiPolygon => Ok(Self::MultiPolygon(value.try_into()?)),
            OGRwkbGeometryType::wkbGeometryCollection => Ok(Self::Collection(value.try_into()?)),
            unknown => Err(CommandError::UnsupportedGdalGeometryType(unknown))
        }
    }
}

impl From<VariantArealGeometry> for GDALGeometry {
    fn from(value: VariantArealGeometry) -> GDALGeometry {
        match value {
            VariantArealGeometry::Polygon(a) => a.into(),
            VariantArealGeometry::MultiPolygon(a) => a.into(),
            VariantArealGeometry::Collection(a) => a.into(),
        }
    }
}

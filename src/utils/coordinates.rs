use ordered_float::NotNan;
use ordered_float::FloatIsNan;

use crate::errors::CommandError;

pub(crate) const LONGITUDE_LIMIT: f64 = 180.0;
pub(crate) const LATITUDE_LIMIT: f64 = 90.0;

/// A vertex. Since NaN is impossible here, equality is exact and hashable, which is what anchor matching depends on.
#[derive(Hash,Eq,PartialEq,Clone,Debug)]
pub(crate) struct Coordinates {
    x: NotNan<f64>,
    y: NotNan<f64>
}

impl Coordinates {

    pub(crate) fn to_tuple(&self) -> (f64,f64) {
        (*self.x,*self.y)
    }

    pub(crate) const fn new(x: NotNan<f64>, y: NotNan<f64>) -> Self {
        Self { x, y }
    }

    /// Fails if the coordinate isn't finite, or falls outside of longitude/latitude space.
    pub(crate) fn check_range(&self) -> Result<(),CommandError> {
        let (x,y) = self.to_tuple();
        if !x.is_finite() || !y.is_finite() {
            Err(CommandError::NonFiniteCoordinate)
        } else if !(-LONGITUDE_LIMIT..=LONGITUDE_LIMIT).contains(&x) {
            Err(CommandError::LongitudeOutOfRange(x))
        } else if !(-LATITUDE_LIMIT..=LATITUDE_LIMIT).contains(&y) {
            Err(CommandError::LatitudeOutOfRange(y))
        } else {
            Ok(())
        }
    }

}

impl TryFrom<(f64,f64,f64)> for Coordinates {

    type Error = FloatIsNan;

    fn try_from(value: (f64,f64,f64)) -> Result<Self, Self::Error> {
        Ok(Self {
            x: NotNan::new(value.0)?,
            y: NotNan::new(value.1)?
        })
    }
}

impl TryFrom<(f64,f64)> for Coordinates {

    type Error = FloatIsNan;

    fn try_from(value: (f64,f64)) -> Result<Self, Self::Error> {
        Ok(Self {
            x: value.0.try_into()?,
            y: value.1.try_into()?
        })
    }
}

impl TryFrom<geo_types::Coord> for Coordinates {

    type Error = FloatIsNan;

    fn try_from(value: geo_types::Coord) -> Result<Self, Self::Error> {
        Ok(Self::new(NotNan::new(value.x)?,NotNan::new(value.y)?))
    }

}

#[cfg(test)]
mod test {

    use super::Coordinates;
    use crate::errors::CommandError;

    #[test]
    fn test_nan_is_rejected() {
        assert!(Coordinates::try_from((f64::NAN,0.0)).is_err());
        assert!(Coordinates::try_from((0.0,f64::NAN,0.0)).is_err());
    }

    #[test]
    fn test_check_range() {
        Coordinates::try_from((180.0,-90.0)).unwrap().check_range().unwrap();
        Coordinates::try_from((-180.0,90.0)).unwrap().check_range().unwrap();

        assert!(matches!(Coordinates::try_from((180.5,0.0)).unwrap().check_range(),Err(CommandError::LongitudeOutOfRange(_))));
        assert!(matches!(Coordinates::try_from((0.0,-90.1)).unwrap().check_range(),Err(CommandError::LatitudeOutOfRange(_))));
        assert!(matches!(Coordinates::try_from((f64::INFINITY,0.0)).unwrap().check_range(),Err(CommandError::NonFiniteCoordinate)));
    }

    #[test]
    fn test_equality_is_exact() {
        let a = Coordinates::try_from((10.0,10.0)).unwrap();
        let b = Coordinates::try_from((10.0,10.0,0.0)).unwrap();
        let c = Coordinates::try_from((10.0,10.000_000_1)).unwrap();
        assert_eq!(a,b);
        assert_ne!(a,c);
    }
}

use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FormatResult;
use core::str::FromStr;

use gdal::vector::Feature;
use gdal::vector::OGRFieldType;
use serde::Serialize;

use crate::errors::CommandError;

pub(crate) trait TypedField: Sized {

    const STORAGE_TYPE: OGRFieldType::Type;

    fn get_required<FieldType>(value: Option<FieldType>, field_id: &'static str) -> Result<FieldType,CommandError> {
        value.ok_or_else(|| CommandError::MissingField(field_id))
    }

    fn get_field(feature: &Feature, field_name: &str, field_id: &'static str) -> Result<Self,CommandError>;

    fn set_field(&self, feature: &mut Feature, field_name: &str) -> Result<(),CommandError>;

}

/// The 'fid' of a record in one of the layers.
#[derive(PartialEq,Eq,Hash,PartialOrd,Ord,Clone,Debug,Serialize)]
pub(crate) struct IdRef(u64);

impl IdRef {

    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    pub(crate) const fn to_inner(&self) -> u64 {
        self.0
    }

}

impl Display for IdRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f,"{}",self.0)
    }
}

impl FromStr for IdRef {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl TypedField for String {

    const STORAGE_TYPE: OGRFieldType::Type = OGRFieldType::OFTString;

    fn get_field(feature: &Feature, field_name: &str, field_id: &'static str) -> Result<Self,CommandError> {
        Self::get_required(feature.field_as_string(feature.field_index(field_name)?)?, field_id)
    }


    fn set_field(&self, feature: &mut Feature, field_name: &str) -> Result<(),CommandError> {
        Ok(feature.set_field_string(feature.field_index(field_name)?, self)?)
    }

}

/// Implements TypedField for a type which is stored as its Display string and read back with FromStr. An invalid stored
/// value is reported as a missing field.
#[macro_export]
macro_rules! impl_string_typed_field {
    ($type: ty) => {

        impl $crate::typed_map::fields::TypedField for $type {

            const STORAGE_TYPE: gdal::vector::OGRFieldType::Type = gdal::vector::OGRFieldType::OFTString;

            fn get_field(feature: &gdal::vector::Feature, field_name: &str, field_id: &'static str) -> Result<Self,$crate::errors::CommandError> {
                let value = <Self as $crate::typed_map::fields::TypedField>::get_required(feature.field_as_string(feature.field_index(field_name)?)?, field_id)?;
                value.parse().map_err(|_| $crate::errors::CommandError::MissingField(field_id))
            }

            fn set_field(&self, feature: &mut gdal::vector::Feature, field_name: &str) -> Result<(),$crate::errors::CommandError> {
                Ok(feature.set_field_string(feature.field_index(field_name)?, &self.to_string())?)
            }

        }

        impl $crate::typed_map::fields::TypedField for Option<$type> {

            const STORAGE_TYPE: gdal::vector::OGRFieldType::Type = gdal::vector::OGRFieldType::OFTString;

            fn get_field(feature: &gdal::vector::Feature, field_name: &str, field_id: &'static str) -> Result<Self,$crate::errors::CommandError> {
                if let Some(value) = feature.field_as_string(feature.field_index(field_name)?)? {
                    if value.trim().is_empty() {
                        Ok(None)
                    } else {
                        value.parse().map(Some).map_err(|_| $crate::errors::CommandError::MissingField(field_id))
                    }
                } else {
                    Ok(None)
                }
            }

            fn set_field(&self, feature: &mut gdal::vector::Feature, field_name: &str) -> Result<(),$crate::errors::CommandError> {
                if let Some(value) = self {
                    $crate::typed_map::fields::TypedField::set_field(value,feature,field_name)
                } else {
                    Ok(feature.set_field_null(feature.field_index(field_name)?)?)
                }
            }

        }

    };
}

#[cfg(test)]
mod test {

    use super::IdRef;

    #[test]
    fn test_id_ref_parse() {
        assert_eq!("12".parse::<IdRef>().unwrap(),IdRef::new(12));
        assert_eq!(" 7 ".parse::<IdRef>().unwrap().to_inner(),7);
        assert!("-1".parse::<IdRef>().is_err());
        assert!("seven".parse::<IdRef>().is_err());
    }

    #[test]
    fn test_id_ref_serializes_as_number() {
        assert_eq!(serde_json::to_string(&IdRef::new(3)).unwrap(),"3");
    }
}

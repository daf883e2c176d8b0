use gdal::Dataset;
use gdal::vector::LayerOptions;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::Layer;
use gdal::vector::LayerAccess;

use crate::errors::CommandError;
use crate::geometry::GDALGeometryWrapper;
use crate::typed_map::fields::IdRef;
use crate::typed_map::schema::Schema;

#[macro_export]
macro_rules! count_ids {
    () => {
        0
    };
    ($prop: ident) => {
        1
    };
    ($prop: ident, $($props: ident),+) => {
        $($crate::count_ids!($props)+)+ $crate::count_ids!($prop)
    };
}

#[macro_export]
/**
Creates the types needed to work with one layer of the feature map.

* `$name` is the prefix for the generated types: `<$name>Feature`, `<$name>Schema`, `New<$name>` and `<$name>Layer`.
* `$layer_name` is the name of the table in the GeoPackage.
* `$geometry_type` is one of the geometry wrappers from `crate::geometry`.

Each field gets a getter and setter on the feature type, and a field on the `New` struct used to add or replace records.
*/
macro_rules! layer {
    ($(#[doc = $layer_doc_attr: literal])? $name: ident [$layer_name: literal]: $geometry_type: ident {$(
        $(#[doc = $field_doc_attr: literal])? $(#[get($get_attr: meta)])* $(#[set($set_attr: meta)])* $prop: ident: $prop_type: ty
    ),*$(,)?}) => {

        paste::paste!{
            pub(crate) struct [<$name Feature>]<'data_life> {

                feature: gdal::vector::Feature<'data_life>
            }

        }

        paste::paste!{
            impl<'impl_life> From<gdal::vector::Feature<'impl_life>> for [<$name Feature>]<'impl_life> {

                fn from(feature: gdal::vector::Feature<'impl_life>) -> Self {
                    Self {
                        feature
                    }
                }
            }

        }

        paste::paste!{
            $(#[doc = $layer_doc_attr])?
            pub(crate) struct [<$name Schema>];
        }

        paste::paste!{
            impl [<$name Schema>] {
                // constant field names
                paste::paste!{
                    $(pub(crate) const [<FIELD_ $prop:snake:upper>]: &'static str = stringify!($prop);)*
                }

                // field definitions
                const FIELD_DEFS: [(&'static str,gdal::vector::OGRFieldType::Type); $crate::count_ids!($($prop),*)] = [
                    $((paste::paste!{Self::[<FIELD_ $prop:snake:upper>]},<$prop_type as $crate::typed_map::fields::TypedField>::STORAGE_TYPE)),*
                ];


            }
        }


        paste::paste!{
            impl $crate::typed_map::schema::Schema for [<$name Schema>] {

                type Geometry = $geometry_type;

                const LAYER_NAME: &'static str = $layer_name;

                fn get_field_defs() -> &'static [(&'static str,gdal::vector::OGRFieldType::Type)] {
                    &Self::FIELD_DEFS
                }


            }
        }

        paste::paste!{

            impl<'impl_life> $crate::typed_map::features::TypedFeature<'impl_life,[<$name Schema>]> for [<$name Feature>]<'impl_life> {

                // fid field
                fn fid(&self) -> Result<$crate::typed_map::fields::IdRef,$crate::errors::CommandError> {
                    Ok($crate::typed_map::fields::IdRef::new(self.feature.fid().ok_or_else(|| $crate::errors::CommandError::MissingField(concat!($layer_name,".","fid")))?))
                }

                fn into_feature(self) -> gdal::vector::Feature<'impl_life> {
                    self.feature
                }

                fn geometry(&self) -> Result<$geometry_type,$crate::errors::CommandError> {
                    self.feature.geometry().ok_or_else(|| $crate::errors::CommandError::MissingGeometry($layer_name))?.clone().try_into()
                }

                fn set_geometry(&mut self, value: $geometry_type) -> Result<(),$crate::errors::CommandError> {
                    Ok(self.feature.set_geometry(value.into())?)
                }

            }
        }

        paste::paste!{

            impl [<$name Feature>]<'_> {

                // property functions
                $(
                    paste::paste!{
                        $(#[doc = $field_doc_attr])?
                        $(#[$get_attr])* pub(crate) fn $prop(&self) -> Result<$prop_type,$crate::errors::CommandError> {
                            <$prop_type as $crate::typed_map::fields::TypedField>::get_field(&self.feature,[<$name Schema>]::[<FIELD_ $prop:snake:upper>],concat!($layer_name,".",stringify!($prop)))
                        }
                    }

                    paste::paste!{
                        $(#[doc = $field_doc_attr])?
                        $(#[$set_attr])* pub(crate) fn [<set_ $prop>](&mut self, value: &$prop_type) -> Result<(),$crate::errors::CommandError> {
                            $crate::typed_map::fields::TypedField::set_field(value,&mut self.feature,[<$name Schema>]::[<FIELD_ $prop:snake:upper>])
                        }

                    }

                )*

            }

        }

        paste::paste!{

            pub(crate) struct [<New $name>] {
                $(
                    pub(crate) $prop: $prop_type
                ),*
            }
        }

        paste::paste!{
            pub(crate) type [<$name Layer>]<'layer> = $crate::typed_map::layers::MapLayer<'layer,[<$name Schema>]>;

            impl [<$name Layer>]<'_> {

                pub(crate) fn try_feature_by_id(&self, fid: &$crate::typed_map::fields::IdRef) -> Result<[<$name Feature>]<'_>,$crate::errors::CommandError> {
                    gdal::vector::LayerAccess::feature(&self.layer,fid.to_inner()).map([<$name Feature>]::from).ok_or_else(|| $crate::errors::CommandError::MissingFeature($layer_name,fid.clone()))
                }

                pub(crate) fn read_features(&mut self) -> $crate::typed_map::features::TypedFeatureIterator<'_,[<$name Schema>],[<$name Feature>]<'_>> {
                    $crate::typed_map::features::TypedFeatureIterator::from(gdal::vector::LayerAccess::features(&mut self.layer))
                }

                fn add_struct(&self, entity: &[<New $name>], geometry: $geometry_type) -> Result<$crate::typed_map::fields::IdRef,$crate::errors::CommandError> {
                    // Feature::new is used instead of the layer's create_feature functions so the fid of the new feature can be returned.
                    let mut feature = [<$name Feature>]::from(gdal::vector::Feature::new(gdal::vector::LayerAccess::defn(&self.layer))?);
                    $(
                        paste::paste!{
                            feature.[<set_ $prop>](&entity.$prop)?;
                        }
                    )*
                    $crate::typed_map::features::TypedFeature::set_geometry(&mut feature,geometry)?;
                    let feature = $crate::typed_map::features::TypedFeature::into_feature(feature);
                    feature.create(&self.layer)?;
                    Ok($crate::typed_map::fields::IdRef::new(feature.fid().ok_or_else(|| $crate::errors::CommandError::MissingField(concat!($layer_name,".","fid")))?))
                }

                fn update_struct(&self, fid: &$crate::typed_map::fields::IdRef, entity: &[<New $name>], geometry: $geometry_type) -> Result<(),$crate::errors::CommandError> {
                    let mut feature = self.try_feature_by_id(fid)?;
                    $(
                        paste::paste!{
                            feature.[<set_ $prop>](&entity.$prop)?;
                        }
                    )*
                    $crate::typed_map::features::TypedFeature::set_geometry(&mut feature,geometry)?;
                    Ok(gdal::vector::LayerAccess::set_feature(&self.layer,$crate::typed_map::features::TypedFeature::into_feature(feature))?)
                }


            }

        }

    };
}

pub(crate) struct MapLayer<'layer, SchemaType: Schema> {
    pub(crate) layer: Layer<'layer>,
    _phantom_schema: core::marker::PhantomData<SchemaType>
}

impl<'layer, SchemaType: Schema> MapLayer<'layer,SchemaType> {


    pub(crate) fn create_from_dataset(dataset: &'layer mut Dataset, overwrite: bool) -> Result<Self,CommandError> {

        // WKT input is longitude and latitude, so the layers are marked as WGS 84.
        let srs = SpatialRef::from_epsg(4326)?;
        let layer = dataset.create_layer(LayerOptions {
            name: SchemaType::LAYER_NAME,
            ty: SchemaType::Geometry::INTERNAL_TYPE,
            srs: Some(&srs),
            options: if overwrite {
                Some(&["OVERWRITE=YES"])
            } else {
                None
            }
        })?;
        layer.create_defn_fields(SchemaType::get_field_defs())?;

        Ok(Self {
            layer,
            _phantom_schema: core::marker::PhantomData
        })
    }

    pub(crate) fn open_from_dataset(dataset: &'layer Dataset) -> Result<Self,CommandError> {

        let layer = dataset.layer_by_name(SchemaType::LAYER_NAME)?;
        Ok(Self {
            layer,
            _phantom_schema: core::marker::PhantomData
        })

    }

    pub(crate) fn has_feature(&self, fid: &IdRef) -> bool {
        self.layer.feature(fid.to_inner()).is_some()
    }

}

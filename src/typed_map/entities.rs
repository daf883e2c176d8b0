use indexmap::IndexMap;
use indexmap::map::IntoIter as IndexIntoIter;
use indexmap::map::Values as IndexValues;

use crate::typed_map::fields::IdRef;
use crate::typed_map::schema::Schema;


pub(crate) trait Entity<SchemaType: Schema> {

}

pub(crate) struct EntityIndex<SchemaType: Schema, EntityType: Entity<SchemaType>> {
    // An IndexMap keeps the order stable when iterating, which keeps the overlap reconciliation reproducible.
    inner: IndexMap<IdRef,EntityType>,
    _phantom: core::marker::PhantomData<SchemaType>
}

impl<SchemaType: Schema, EntityType: Entity<SchemaType>> EntityIndex<SchemaType,EntityType> {

    // NOTE: There is no 'insert' or 'new' function because this should be created with into_entities_index.

    pub(crate) fn from(mut inner: IndexMap<IdRef,EntityType>) -> Self {
        // Features usually come back in fid order, but that isn't guaranteed, so sort them here.
        inner.sort_keys();
        Self {
            inner,
            _phantom: core::marker::PhantomData
        }
    }

    pub(crate) fn values(&self) -> IndexValues<'_, IdRef, EntityType> {
        self.inner.values()
    }

}

impl<SchemaType: Schema, EntityType: Entity<SchemaType>> IntoIterator for EntityIndex<SchemaType,EntityType> {
    type Item = (IdRef,EntityType);

    type IntoIter = IndexIntoIter<IdRef,EntityType>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

#[macro_export]
/// Used by `entity!` to generate expression for assigning to an entity field.
macro_rules! entity_field_assign {
    ($feature: ident geometry) => {
        $crate::typed_map::features::TypedFeature::geometry(&$feature)?
    };
    ($feature: ident fid) => {
        $crate::typed_map::features::TypedFeature::fid(&$feature)?
    };
    ($feature: ident $field: ident) => {
        $feature.$field()?
    };
}

#[macro_export]
/**
Creates an entity struct that contains the specified fields. (See Entity trait)

* `$struct_attr` is an attribute that will be placed on the entity struct.
* `$name` is the name of the struct
* `$layer` is the prefix used for the types generated by `layer!`

Each field is assigned from the function on the feature with the same name. The names `fid` and `geometry` are special, they are
read from the feature id and the feature geometry.
*/
macro_rules! entity {
    ($(#[$struct_attr: meta])* $name: ident: $layer: ident {$($field: ident: $type: ty),*$(,)?}) => {
        #[derive(Clone,Debug)]
        $(#[$struct_attr])*
        pub(crate) struct $name {
            $(
                pub(crate) $field: $type
            ),*
        }

        paste::paste!{
            impl $crate::typed_map::entities::Entity<[<$layer Schema>]> for $name {

            }


        }

        paste::paste!{
            impl TryFrom<[<$layer Feature>]<'_>> for $name {

                type Error = $crate::errors::CommandError;

                fn try_from(value: [<$layer Feature>]) -> Result<Self,Self::Error> {
                    Ok($name {
                        $(
                            $field: $crate::entity_field_assign!(value $field)
                        ),*
                    })
                }
            }

        }

    };
}

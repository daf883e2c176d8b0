pub(crate) mod fields;
pub(crate) mod schema;
pub(crate) mod layers;
pub(crate) mod features;
pub(crate) mod entities;

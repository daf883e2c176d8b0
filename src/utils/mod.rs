pub(crate) mod coordinates;

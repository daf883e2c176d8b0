pub(crate) mod validation;
pub(crate) mod rank_rules;
pub(crate) mod reconcile;

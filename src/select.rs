pub(crate) mod context;
pub(crate) mod engine;
pub(crate) mod precedence;

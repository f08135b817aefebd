//! CLI command implementations

pub(crate) mod common;
pub(crate) mod drop_table;
pub(crate) mod migrate;
pub(crate) mod new;
pub(crate) mod resolve;
pub(crate) mod status;
pub(crate) mod validate;

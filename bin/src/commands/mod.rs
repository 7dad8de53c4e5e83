//! CLI command implementations.

pub(crate) mod clear;
pub(crate) mod fetch;
pub(crate) mod inspect;
pub(crate) mod list;
pub(crate) mod show;

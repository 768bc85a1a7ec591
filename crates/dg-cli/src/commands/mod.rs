//! CLI command implementations

pub(crate) mod common;
pub(crate) mod compiled;
pub(crate) mod deps;
pub(crate) mod env;
pub(crate) mod ls;
pub(crate) mod run;
pub(crate) mod script;
pub(crate) mod spec;
pub(crate) mod tailor;

//! CLI command implementations.

pub(crate) mod nav;
pub(crate) mod process;

pub(crate) use nav::NavArgs;
pub(crate) use process::ProcessArgs;

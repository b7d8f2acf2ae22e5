//! Navigation sidebar for generated API documentation.
//!
//! [`NavTree`] is built once per documentation set from the categorized
//! members and the link registry. Each page then takes its own
//! [`NavView`], which highlights the page's entry and its ancestors
//! without touching the shared tree.

mod tree;
mod view;

pub use tree::{NavConfig, NavLabel, NavTree};
pub use view::{NavItem, NavView};

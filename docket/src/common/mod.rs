//! Common types shared by the collection engine.
//!
//! - [`Value`] - the typed value stored in documents
//! - [`SortOrder`] / [`SortSpec`] - sort directions and multi-field sort specifications
//! - constants such as [`DOC_ID`]
//! - small utilities (`Atomic` shared state, clock access)

mod constants;
mod sort;
mod util;
mod value;

pub use constants::*;
pub use sort::*;
pub use util::*;
pub use value::*;

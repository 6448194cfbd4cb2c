//! In-memory reference implementation of the key-value substrate.

mod store;

pub use store::*;

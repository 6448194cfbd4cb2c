//! # Store Module
//!
//! The ordered, versioned key-value substrate the collection engine persists into.
//!
//! ## Components
//!
//! - [`KvKey`] / [`KeyPart`]: tuple keys ordered part by part
//! - [`KvStoreProvider`]: the provider contract (point get, paged prefix scan,
//!   check-and-mutate commit)
//! - [`KvStore`]: cloneable handle over a provider, with [`KvStore::list`] and
//!   [`KvStore::atomic`]
//! - [`AtomicWrite`]: builder of an all-or-nothing write
//! - [`KvIterator`]: lazy paged prefix iterator
//! - [`memory::InMemoryKv`]: in-memory provider backed by a skip list

mod iters;
mod kv_key;
mod kv_store;
pub mod memory;

pub use iters::*;
pub use kv_key::*;
pub use kv_store::*;
pub use memory::InMemoryKv;

//! # Docket - Embedded Document Database
//!
//! Docket stores schemaless documents in named collections on top of an
//! ordered, versioned key-value store. It provides:
//!
//! - **Structural queries**: field maps of literals and operators, or plain predicates
//! - **Secondary indexes**: up to six per collection, used automatically by the planner
//! - **Transactional writes**: every document write is one atomic commit covering
//!   the document and its index entries, with optimistic concurrency control
//! - **Lazy cursors**: skip, limit and sort with bounded reads from the store
//! - **Pluggable storage**: any [KvStoreProvider](store::KvStoreProvider); an
//!   in-memory store is included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docket::collection::{CollectionOptions, UpdateSpec};
//! use docket::docket::Docket;
//! use docket::query::field;
//! use docket::{doc, query};
//!
//! let db = Docket::builder().open()?;
//! let users = db.collection_with_options("users", CollectionOptions::new().index("email"))?;
//!
//! let alice = users.insert_one(doc! { name: "Alice", email: "a@x.com", age: 31 })?;
//!
//! // resolved through the email index
//! let found = users.find_one(query! { email: "a@x.com" })?;
//! assert_eq!(found.as_ref(), Some(&alice));
//!
//! users.update_one(
//!     field("email").eq("a@x.com"),
//!     UpdateSpec::fields().set("email", "alice@x.com"),
//! )?;
//!
//! db.close()?;
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - documents, collections, cursors and write options
//! - [`common`] - values, sort specifications and shared constants
//! - [`errors`] - error type and result alias
//! - [`query`] - query construction, compilation and matching
//! - [`store`] - key-value store contract and the in-memory store
//! - [`docket`] - the database handle
//! - [`docket_builder`] - database builder
//! - [`docket_config`] - database configuration

pub mod collection;
pub mod common;
pub mod docket;
pub mod docket_builder;
pub mod docket_config;
pub mod errors;
pub mod query;
pub mod store;

#[doc(hidden)]
pub use indexmap;

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    colog::init();
}

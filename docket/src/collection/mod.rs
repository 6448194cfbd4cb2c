//! Collections and documents.
//!
//! # Documents
//!
//! A [Document] is an ordered map from field names to [Value](crate::common::Value)s.
//! Field names are non-empty and never contain `.`; dotted paths such as
//! `"address.city"` address nested maps in queries, updates and sorts.
//!
//! ```rust,ignore
//! use docket::doc;
//!
//! let user = doc! { name: "Alice", address: { city: "Oslo" } };
//! assert_eq!(user.get_path("address.city"), Some(&Value::from("Oslo")));
//! ```
//!
//! # Collections
//!
//! A [Collection] groups documents under a name, with up to six secondary
//! indexes and an optional validator. Every document carries a string `_id`,
//! generated on insert when missing and immutable afterwards.
//!
//! ```rust,ignore
//! let users = db.collection_with_options("users", CollectionOptions::new().index("email"))?;
//! users.insert_one(doc! { email: "a@x.com", name: "A" })?;
//!
//! let cursor = users.find(query! { email: "a@x.com" });
//! assert!(cursor.find_plan().is_index_scan());
//! ```
//!
//! # Writes
//!
//! Each insert, update or delete of a document is one atomic commit covering
//! its primary entry and all of its secondary index entries. Updates and
//! deletes detect concurrent writers through versionstamps and resolve the
//! conflict according to a [RetryPolicy].

mod collection_factory;
mod collection_options;
mod cursor;
mod document;
mod document_collection;
mod find_plan;
mod id_generator;
mod index_set;
mod key_scheme;
pub(crate) mod operation;
mod sanitizer;
pub(crate) mod snowflake;
mod update_spec;
mod validator;
mod write_options;

pub(crate) use collection_factory::*;
pub use collection_options::*;
pub use cursor::*;
pub use document::*;
pub use document_collection::*;
pub use find_plan::*;
pub use id_generator::*;
pub use index_set::*;
pub use key_scheme::*;
pub(crate) use sanitizer::*;
pub use snowflake::SnowflakeIdGenerator;
pub use update_spec::*;
pub use validator::*;
pub use write_options::*;

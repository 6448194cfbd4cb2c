//! Structural queries over documents.
//!
//! A [`Query`] is either `All`, a whole-document predicate, or a field map from
//! field name to [`QueryValue`]. Queries compile into a [`CompiledQuery`] whose
//! [`CompiledQuery::matches`] applies the rules of [`match_value`].
//!
//! # Creating Queries
//!
//! - `field("email").eq("a@x.com")` - literal equality
//! - `field("phone").is_absent()` - missing field
//! - `field("age").matches(|v| ..)` - value predicate
//! - `field("name").regex("^A")?` - regular expression
//! - `field("tags").contains(vec!["a", "b"])` - list subset
//! - `by_id(id)`, `all()`, `where_doc(|doc| ..)`
//! - `query! { status: "active", age: 30 }`
//! - `q1.and(q2)` - both must match

mod fluent;
mod matcher;
#[allow(clippy::module_inception)]
mod query;
mod query_value;

pub use fluent::*;
pub use matcher::*;
pub use query::*;
pub use query_value::*;

use crate::collection::Document;
use crate::common::Value;
use crate::store::KeyPart;
use indexmap::IndexMap;
use regex::Regex;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Predicate over a single field value; `None` means the field is absent.
pub type ValuePredicate = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// The value side of one entry in a field-map query.
///
/// Literals are compared with strict per-kind equality. The remaining variants are
/// operators:
///
/// - `Absent`: the field must be missing
/// - `List`: the field must be a list of the same length, matched positionally
/// - `Map`: the field must be a map; every query key must match (extra keys allowed)
/// - `Predicate`: arbitrary test over the field value
/// - `Regex`: the field must be a string matched by the expression
/// - `Contains`: the field must be a list holding a match for every item, in any order
#[derive(Clone)]
pub enum QueryValue {
    Absent,
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<QueryValue>),
    Map(IndexMap<String, QueryValue>),
    Predicate(ValuePredicate),
    Regex(Regex),
    Contains(Vec<QueryValue>),
}

impl QueryValue {
    /// Wraps a predicate function.
    pub fn predicate<F>(f: F) -> QueryValue
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        QueryValue::Predicate(Arc::new(f))
    }

    /// The key part a secondary index would store for this literal, if the
    /// literal is of an indexable kind.
    pub fn as_index_literal(&self) -> Option<KeyPart> {
        match self {
            QueryValue::String(s) => Some(KeyPart::String(s.clone())),
            QueryValue::Integer(i) => Some(KeyPart::Integer(*i)),
            QueryValue::Number(n) => Some(KeyPart::number(*n)),
            QueryValue::Bool(b) => Some(KeyPart::Bool(*b)),
            QueryValue::Bytes(b) => Some(KeyPart::Bytes(b.clone())),
            _ => None,
        }
    }

    /// Whether this is a plain literal (no operator, at any depth).
    pub fn is_literal(&self) -> bool {
        match self {
            QueryValue::Null
            | QueryValue::Bool(_)
            | QueryValue::Integer(_)
            | QueryValue::Number(_)
            | QueryValue::String(_)
            | QueryValue::Bytes(_) => true,
            QueryValue::List(items) => items.iter().all(QueryValue::is_literal),
            QueryValue::Map(fields) => fields.values().all(QueryValue::is_literal),
            QueryValue::Absent
            | QueryValue::Predicate(_)
            | QueryValue::Regex(_)
            | QueryValue::Contains(_) => false,
        }
    }
}

impl Debug for QueryValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryValue::Absent => write!(f, "Absent"),
            QueryValue::Null => write!(f, "Null"),
            QueryValue::Bool(b) => write!(f, "Bool({})", b),
            QueryValue::Integer(i) => write!(f, "Integer({})", i),
            QueryValue::Number(n) => write!(f, "Number({})", n),
            QueryValue::String(s) => write!(f, "String({:?})", s),
            QueryValue::Bytes(b) => write!(f, "Bytes({:?})", b),
            QueryValue::List(items) => f.debug_list().entries(items).finish(),
            QueryValue::Map(fields) => f.debug_map().entries(fields.iter()).finish(),
            QueryValue::Predicate(_) => write!(f, "Predicate(..)"),
            QueryValue::Regex(re) => write!(f, "Regex({:?})", re.as_str()),
            QueryValue::Contains(items) => {
                write!(f, "Contains")?;
                f.debug_list().entries(items).finish()
            }
        }
    }
}

impl From<Value> for QueryValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => QueryValue::Null,
            Value::Bool(b) => QueryValue::Bool(b),
            Value::Integer(i) => QueryValue::Integer(i),
            Value::Number(n) => QueryValue::Number(n),
            Value::String(s) => QueryValue::String(s),
            Value::Bytes(b) => QueryValue::Bytes(b),
            Value::List(items) => QueryValue::List(items.into_iter().map(Into::into).collect()),
            Value::Map(doc) => doc.into(),
        }
    }
}

impl From<Document> for QueryValue {
    fn from(doc: Document) -> Self {
        QueryValue::Map(
            doc.iter()
                .map(|(k, v)| (k.clone(), QueryValue::from(v.clone())))
                .collect(),
        )
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Integer(value as i64)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Number(value)
    }
}

impl From<Regex> for QueryValue {
    fn from(value: Regex) -> Self {
        QueryValue::Regex(value)
    }
}

impl From<Vec<QueryValue>> for QueryValue {
    fn from(value: Vec<QueryValue>) -> Self {
        QueryValue::List(value)
    }
}

impl From<IndexMap<String, QueryValue>> for QueryValue {
    fn from(value: IndexMap<String, QueryValue>) -> Self {
        QueryValue::Map(value)
    }
}

use crate::collection::Document;
use crate::common::DOC_ID;
use crate::query::{match_value, QueryValue};
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Predicate over a whole document.
pub type DocumentPredicate = Arc<dyn Fn(&Document) -> bool + Send + Sync>;

pub(crate) type FieldVec = SmallVec<[String; 8]>;

/// A query as written by the caller.
///
/// - `All` matches every document
/// - `Predicate` runs an arbitrary function over each document
/// - `Fields` maps field names to [QueryValue]s; a document matches when every
///   entry matches. Keys may be dotted paths into nested maps.
///
/// Queries are compiled once into a [CompiledQuery] before execution.
#[derive(Clone)]
pub enum Query {
    All,
    Predicate(DocumentPredicate),
    Fields(IndexMap<String, QueryValue>),
}

impl Query {
    /// Combines two queries; a document must match both.
    ///
    /// Field maps with disjoint keys merge into one field map so the planner can
    /// still use indexes. Any other combination becomes a predicate over the two
    /// compiled queries.
    pub fn and(self, other: Query) -> Query {
        match (self, other) {
            (Query::All, query) | (query, Query::All) => query,
            (Query::Fields(mut left), Query::Fields(right))
                if right.keys().all(|key| !left.contains_key(key)) =>
            {
                left.extend(right);
                Query::Fields(left)
            }
            (left, right) => {
                let left = left.compile();
                let right = right.compile();
                Query::Predicate(Arc::new(move |doc: &Document| {
                    left.matches(doc) && right.matches(doc)
                }))
            }
        }
    }

    pub fn compile(self) -> CompiledQuery {
        CompiledQuery::compile(self)
    }
}

impl Debug for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::All => write!(f, "All"),
            Query::Predicate(_) => write!(f, "Predicate(..)"),
            Query::Fields(fields) => f.debug_map().entries(fields.iter()).finish(),
        }
    }
}

impl From<Document> for Query {
    fn from(doc: Document) -> Self {
        Query::Fields(
            doc.iter()
                .map(|(k, v)| (k.clone(), QueryValue::from(v.clone())))
                .collect(),
        )
    }
}

impl From<IndexMap<String, QueryValue>> for Query {
    fn from(fields: IndexMap<String, QueryValue>) -> Self {
        Query::Fields(fields)
    }
}

/// A query ready for execution.
///
/// An empty field map compiles to `MatchAll`. For a field map, `keys` is the
/// evaluation order: `_id` first when present, then the caller's order.
#[derive(Clone)]
pub enum CompiledQuery {
    MatchAll,
    Predicate(DocumentPredicate),
    FieldMap {
        keys: FieldVec,
        fields: Arc<IndexMap<String, QueryValue>>,
    },
}

impl CompiledQuery {
    pub fn compile(query: Query) -> CompiledQuery {
        match query {
            Query::All => CompiledQuery::MatchAll,
            Query::Predicate(predicate) => CompiledQuery::Predicate(predicate),
            Query::Fields(fields) if fields.is_empty() => CompiledQuery::MatchAll,
            Query::Fields(fields) => {
                let mut keys = FieldVec::with_capacity(fields.len());
                if fields.contains_key(DOC_ID) {
                    keys.push(DOC_ID.to_string());
                }
                keys.extend(fields.keys().filter(|k| *k != DOC_ID).cloned());
                CompiledQuery::FieldMap {
                    keys,
                    fields: Arc::new(fields),
                }
            }
        }
    }

    /// Tests a document, short-circuiting at the first failing field.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            CompiledQuery::MatchAll => true,
            CompiledQuery::Predicate(predicate) => predicate(doc),
            CompiledQuery::FieldMap { keys, fields } => keys.iter().all(|key| {
                fields
                    .get(key)
                    .map(|query| match_value(query, doc.get_path(key)))
                    .unwrap_or(true)
            }),
        }
    }

    /// The query value bound to `field` in a field-map query.
    pub fn field(&self, field: &str) -> Option<&QueryValue> {
        match self {
            CompiledQuery::FieldMap { fields, .. } => fields.get(field),
            _ => None,
        }
    }

    /// Field names in evaluation order; empty unless this is a field map.
    pub fn keys(&self) -> &[String] {
        match self {
            CompiledQuery::FieldMap { keys, .. } => keys,
            _ => &[],
        }
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, CompiledQuery::MatchAll)
    }
}

impl Debug for CompiledQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompiledQuery::MatchAll => write!(f, "MatchAll"),
            CompiledQuery::Predicate(_) => write!(f, "Predicate(..)"),
            CompiledQuery::FieldMap { keys, fields } => {
                write!(f, "FieldMap ")?;
                f.debug_map()
                    .entries(keys.iter().filter_map(|k| fields.get(k).map(|v| (k, v))))
                    .finish()
            }
        }
    }
}

impl From<Query> for CompiledQuery {
    fn from(query: Query) -> Self {
        CompiledQuery::compile(query)
    }
}

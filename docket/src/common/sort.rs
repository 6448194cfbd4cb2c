use crate::collection::Document;
use std::cmp::Ordering;

/// Specifies the direction for sorting documents.
///
/// - `Ascending`: smallest to largest value
/// - `Descending`: largest to smallest value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// An ordered list of `(field, direction)` pairs.
///
/// Documents are compared field by field in declaration order using the natural
/// [Value](crate::common::Value) ordering. An absent field sorts before any present
/// value, the first non-equal field decides and `Descending` reverses that field's
/// result. Field names may be dotted paths into nested maps.
///
/// # Examples
/// ```rust,ignore
/// let spec = SortSpec::by("age", SortOrder::Descending).then("name", SortOrder::Ascending);
/// let cursor = collection.find(all()).sort(spec);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    fields: Vec<(String, SortOrder)>,
}

impl SortSpec {
    pub fn new() -> Self {
        SortSpec { fields: Vec::new() }
    }

    /// Starts a spec sorting on a single field.
    pub fn by(field: &str, order: SortOrder) -> Self {
        SortSpec::new().then(field, order)
    }

    /// Appends a tie-breaking field.
    pub fn then(mut self, field: &str, order: SortOrder) -> Self {
        self.fields.push((field.to_string(), order));
        self
    }

    pub fn fields(&self) -> &[(String, SortOrder)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Compares two documents under this spec.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for (field, order) in &self.fields {
            let ordering = match (a.get_path(field), b.get_path(field)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => x.cmp(y),
            };

            let ordering = match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Sorts the buffer in place. The sort is stable so ties keep their scan order.
    pub(crate) fn sort_documents(&self, documents: &mut [Document]) {
        documents.sort_by(|a, b| self.compare(a, b));
    }
}

impl From<(&str, SortOrder)> for SortSpec {
    fn from((field, order): (&str, SortOrder)) -> Self {
        SortSpec::by(field, order)
    }
}

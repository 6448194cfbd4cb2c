use crate::common::DOC_ID;
use crate::store::{KeyPart, KvKey};

/// Maps a collection's documents and index entries onto substrate keys.
///
/// - primary entry: `(collection, "_id", id)` holding the document
/// - secondary entry: `(collection, field, value, id)` holding a copy of the document
///
/// Index field names never equal `_id`, so the primary range and every
/// secondary range are disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyScheme {
    collection: String,
}

impl KeyScheme {
    pub fn new(collection: &str) -> Self {
        KeyScheme {
            collection: collection.to_string(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn primary_key(&self, id: &str) -> KvKey {
        self.primary_prefix().with(id)
    }

    /// Prefix of every primary entry of the collection.
    pub fn primary_prefix(&self) -> KvKey {
        KvKey::new().with(self.collection.as_str()).with(DOC_ID)
    }

    pub fn index_key(&self, field: &str, value: KeyPart, id: &str) -> KvKey {
        self.index_prefix(field, value).with(id)
    }

    /// Prefix of every secondary entry of `field` holding `value`.
    pub fn index_prefix(&self, field: &str, value: KeyPart) -> KvKey {
        KvKey::new()
            .with(self.collection.as_str())
            .with(field)
            .with(value)
    }
}

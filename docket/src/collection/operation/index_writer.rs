use crate::collection::{Document, IndexSet, KeyScheme};
use crate::common::Value;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::store::{AtomicWrite, KeyPart};
use std::sync::Arc;

/// Adds the secondary-entry mutations of a document write to an [AtomicWrite].
///
/// Every indexed field holding an indexable value owns one secondary entry
/// `(collection, field, value, id)` whose value is a copy of the document.
/// Absent fields own none.
#[derive(Clone)]
pub(crate) struct DocumentIndexWriter {
    inner: Arc<DocumentIndexWriterInner>,
}

impl DocumentIndexWriter {
    pub fn new(key_scheme: KeyScheme, indexes: IndexSet) -> Self {
        DocumentIndexWriter {
            inner: Arc::new(DocumentIndexWriterInner {
                key_scheme,
                indexes,
            }),
        }
    }

    /// Validates the indexed fields of a document about to be persisted.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if an indexed field holds a value that cannot
    /// be indexed (null, list or map).
    pub fn validate_index_fields(&self, document: &Document) -> DocketResult<()> {
        for field in self.inner.indexes.iter() {
            self.inner.index_value(document, field)?;
        }
        Ok(())
    }

    /// Adds the secondary entries of a new document, each guarded by an
    /// absence check.
    pub fn write_index_entry(
        &self,
        write: &mut AtomicWrite,
        document: &Document,
        id: &str,
    ) -> DocketResult<()> {
        self.inner.write_index_entry(write, document, id)
    }

    /// Deletes the secondary entries implied by a stored document.
    pub fn remove_index_entry(&self, write: &mut AtomicWrite, document: &Document, id: &str) {
        self.inner.remove_index_entry(write, document, id)
    }

    /// Moves the secondary entries of `old_document` to match `new_document`.
    ///
    /// Entries whose key is unchanged are rewritten in place with the new copy;
    /// changed keys are deleted and set.
    pub fn update_index_entry(
        &self,
        write: &mut AtomicWrite,
        old_document: &Document,
        new_document: &Document,
        id: &str,
    ) -> DocketResult<()> {
        self.inner
            .update_index_entry(write, old_document, new_document, id)
    }
}

struct DocumentIndexWriterInner {
    key_scheme: KeyScheme,
    indexes: IndexSet,
}

impl DocumentIndexWriterInner {
    fn index_value(&self, document: &Document, field: &str) -> DocketResult<Option<KeyPart>> {
        match document.get(field) {
            None => Ok(None),
            Some(value) => match KeyPart::from_value(value) {
                Some(part) => Ok(Some(part)),
                None => {
                    log::error!(
                        "Indexed field '{}' of collection {} holds a {} value",
                        field,
                        self.key_scheme.collection(),
                        value.kind_name()
                    );
                    Err(DocketError::new(
                        &format!(
                            "Indexed field '{}' must hold a string, number, boolean or bytes value, found {}",
                            field,
                            value.kind_name()
                        ),
                        ErrorKind::ValidationError,
                    ))
                }
            },
        }
    }

    fn stored_index_value(&self, document: &Document, field: &str) -> Option<KeyPart> {
        // stored documents were validated on write; anything else owns no entry
        document.get(field).and_then(KeyPart::from_value)
    }

    fn write_index_entry(
        &self,
        write: &mut AtomicWrite,
        document: &Document,
        id: &str,
    ) -> DocketResult<()> {
        for field in self.indexes.iter() {
            if let Some(part) = self.index_value(document, field)? {
                let key = self.key_scheme.index_key(field, part, id);
                write
                    .check(key.clone(), None)
                    .set(key, Value::Map(document.clone()));
            }
        }
        Ok(())
    }

    fn remove_index_entry(&self, write: &mut AtomicWrite, document: &Document, id: &str) {
        for field in self.indexes.iter() {
            if let Some(part) = self.stored_index_value(document, field) {
                write.delete(self.key_scheme.index_key(field, part, id));
            }
        }
    }

    fn update_index_entry(
        &self,
        write: &mut AtomicWrite,
        old_document: &Document,
        new_document: &Document,
        id: &str,
    ) -> DocketResult<()> {
        for field in self.indexes.iter() {
            let old_part = self.stored_index_value(old_document, field);
            let new_part = self.index_value(new_document, field)?;

            if old_part.is_some() && old_part != new_part {
                if let Some(part) = old_part {
                    write.delete(self.key_scheme.index_key(field, part, id));
                }
            }
            if let Some(part) = new_part {
                write.set(
                    self.key_scheme.index_key(field, part, id),
                    Value::Map(new_document.clone()),
                );
            }
        }
        Ok(())
    }
}

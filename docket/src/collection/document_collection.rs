use crate::collection::operation::{DocumentIndexWriter, ReadOperations, WriteOperations};
use crate::collection::{
    CollectionOptions, Cursor, Document, IndexSet, KeyScheme, UpdateSpec, WriteOptions,
};
use crate::docket_config::DocketConfig;
use crate::errors::DocketResult;
use crate::query::{all, by_id, Query};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A named set of documents with its secondary indexes and validator.
///
/// A collection handle holds no documents: every call reads from or commits to
/// the store. Handles are cheap to clone and can be shared between threads.
///
/// # Examples
///
/// ```rust,ignore
/// let users = db.collection_with_options("users", CollectionOptions::new().index("email"))?;
///
/// let alice = users.insert_one(doc! { name: "Alice", email: "alice@example.com" })?;
/// let found = users.find_one(query! { email: "alice@example.com" })?;
///
/// users.update_one(
///     by_id(alice.id().unwrap()),
///     UpdateSpec::fields().set("email", "alice@example.org"),
/// )?;
/// users.delete_many(field("inactive").eq(true))?;
/// ```
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

struct CollectionInner {
    name: String,
    options: CollectionOptions,
    indexes: IndexSet,
    read_operations: ReadOperations,
    write_operations: WriteOperations,
}

impl Collection {
    pub(crate) fn new(
        name: &str,
        options: CollectionOptions,
        config: DocketConfig,
    ) -> DocketResult<Collection> {
        let indexes = IndexSet::new(options.index_fields())?;
        if let Some(policy) = options.get_update_retry_policy() {
            policy.validate()?;
        }
        if let Some(policy) = options.get_delete_retry_policy() {
            policy.validate()?;
        }

        let store = config.store();
        let key_scheme = KeyScheme::new(name);
        let read_operations = ReadOperations::new(
            key_scheme.clone(),
            indexes.clone(),
            store.clone(),
            config.clone(),
        );
        let index_writer = DocumentIndexWriter::new(key_scheme.clone(), indexes.clone());
        let write_operations = WriteOperations::new(
            key_scheme,
            store,
            index_writer,
            read_operations.clone(),
            options.clone(),
            config,
        );

        Ok(Collection {
            inner: Arc::new(CollectionInner {
                name: name.to_string(),
                options,
                indexes,
                read_operations,
                write_operations,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn indexes(&self) -> &IndexSet {
        &self.inner.indexes
    }

    pub fn options(&self) -> &CollectionOptions {
        &self.inner.options
    }

    /// Inserts a document, assigning an `_id` when it has none.
    ///
    /// Returns the document as stored.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the document is rejected by the sanitizer, the
    ///   validator or an index
    /// - `ConflictError` if a document with the same `_id` exists
    pub fn insert_one(&self, document: Document) -> DocketResult<Document> {
        self.inner.write_operations.insert(document)
    }

    /// Inserts a batch of documents in one atomic commit; either every document
    /// is stored or none is.
    pub fn insert_many(&self, documents: Vec<Document>) -> DocketResult<Vec<Document>> {
        self.inner.write_operations.insert_many(documents)
    }

    /// Plans `query` and returns a cursor over its matches.
    pub fn find<Q: Into<Query>>(&self, query: Q) -> Cursor {
        let query = query.into().compile();
        let plan = self.inner.read_operations.find_plan(&query);
        Cursor::new(self.inner.read_operations.clone(), plan)
    }

    pub fn find_one<Q: Into<Query>>(&self, query: Q) -> DocketResult<Option<Document>> {
        self.find(query).get_one()
    }

    pub fn find_many<Q: Into<Query>>(&self, query: Q) -> DocketResult<Vec<Document>> {
        self.find(query).get_many()
    }

    pub fn find_by_id(&self, id: &str) -> DocketResult<Option<Document>> {
        self.find(by_id(id)).get_one()
    }

    pub fn count<Q: Into<Query>>(&self, query: Q) -> DocketResult<usize> {
        self.find(query).count()
    }

    /// Updates the first match of `query`, returning the updated document.
    pub fn update_one<Q, U>(&self, query: Q, update: U) -> DocketResult<Option<Document>>
    where
        Q: Into<Query>,
        U: Into<UpdateSpec>,
    {
        Ok(self
            .update_with_options(query, update, &WriteOptions::just_once())?
            .into_iter()
            .next())
    }

    /// Updates every match of `query`, returning the updated documents.
    pub fn update_many<Q, U>(&self, query: Q, update: U) -> DocketResult<Vec<Document>>
    where
        Q: Into<Query>,
        U: Into<UpdateSpec>,
    {
        self.update_with_options(query, update, &WriteOptions::new())
    }

    /// Updates the matches of `query`.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the update changes `_id` or produces a document
    ///   that cannot be persisted; the stored document is left unchanged
    /// - `RetryExhausted` if a document kept conflicting with concurrent
    ///   writers past the retry policy's bound
    pub fn update_with_options<Q, U>(
        &self,
        query: Q,
        update: U,
        options: &WriteOptions,
    ) -> DocketResult<Vec<Document>>
    where
        Q: Into<Query>,
        U: Into<UpdateSpec>,
    {
        let query = query.into().compile();
        self.inner
            .write_operations
            .update(&query, &update.into(), options)
    }

    /// Deletes the first match of `query`, returning it.
    pub fn delete_one<Q: Into<Query>>(&self, query: Q) -> DocketResult<Option<Document>> {
        Ok(self
            .delete_with_options(query, &WriteOptions::just_once())?
            .into_iter()
            .next())
    }

    /// Deletes every match of `query`, returning the deleted documents.
    pub fn delete_many<Q: Into<Query>>(&self, query: Q) -> DocketResult<Vec<Document>> {
        self.delete_with_options(query, &WriteOptions::new())
    }

    /// Deletes the matches of `query`.
    ///
    /// Under the default `SingleAttempt` policy a document modified
    /// concurrently between the scan and the commit is left in place.
    pub fn delete_with_options<Q: Into<Query>>(
        &self,
        query: Q,
        options: &WriteOptions,
    ) -> DocketResult<Vec<Document>> {
        let query = query.into().compile();
        self.inner.write_operations.delete(&query, options)
    }

    /// Deletes every document, returning how many were removed.
    pub fn drop_all(&self) -> DocketResult<usize> {
        let removed = self.delete_many(all())?.len();
        log::debug!("Dropped {} documents from {}", removed, self.inner.name);
        Ok(removed)
    }
}

impl Debug for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .field("indexes", &self.inner.indexes)
            .finish()
    }
}

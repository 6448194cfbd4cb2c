use crate::collection::{Collection, CollectionFactory, CollectionOptions};
use crate::docket_builder::DocketBuilder;
use crate::docket_config::DocketConfig;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::store::KvStore;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// An open database.
///
/// `Docket` is the entry point: it owns the configuration, the store handle
/// and the registry of collections. Clones share the same database and can
/// be used from several threads.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::docket::Docket;
/// use docket::collection::CollectionOptions;
/// use docket::{doc, query};
///
/// let db = Docket::builder().open()?;
/// let users = db.collection_with_options("users", CollectionOptions::new().index("email"))?;
///
/// users.insert_one(doc! { name: "Alice", email: "alice@example.com" })?;
/// let alice = users.find_one(query! { email: "alice@example.com" })?;
///
/// db.close()?;
/// ```
#[derive(Clone)]
pub struct Docket {
    inner: Arc<DocketInner>,
}

impl Docket {
    /// Creates a [DocketBuilder] with the default configuration.
    pub fn builder() -> DocketBuilder {
        DocketBuilder::new()
    }

    pub(crate) fn new(config: DocketConfig) -> Self {
        Docket {
            inner: Arc::new(DocketInner {
                config,
                collection_factory: CollectionFactory::new(),
            }),
        }
    }

    /// Opens a collection, defining it without indexes on first use.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the name is empty, contains whitespace
    /// or starts with `$`, and a `BackendError` if the database is closed.
    pub fn collection(&self, name: &str) -> DocketResult<Collection> {
        self.inner.collection(name, None)
    }

    /// Opens a collection, defining it with `options` on first use.
    ///
    /// Reopening an existing collection returns it unchanged; the options
    /// must then declare the same indexes.
    pub fn collection_with_options(
        &self,
        name: &str,
        options: CollectionOptions,
    ) -> DocketResult<Collection> {
        self.inner.collection(name, Some(options))
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.inner.collection_factory.has_collection(name)
    }

    /// Names of the collections opened so far, sorted.
    pub fn list_collection_names(&self) -> Vec<String> {
        self.inner.collection_factory.collection_names()
    }

    /// Deletes every document of a collection and forgets its definition.
    ///
    /// Returns the number of deleted documents; destroying an unknown
    /// collection removes nothing.
    pub fn destroy_collection(&self, name: &str) -> DocketResult<usize> {
        self.inner.destroy_collection(name)
    }

    pub fn config(&self) -> DocketConfig {
        self.inner.config.clone()
    }

    pub fn store(&self) -> KvStore {
        self.inner.config.store()
    }

    /// Closes the underlying store. Later operations fail with `BackendError`.
    pub fn close(&self) -> DocketResult<()> {
        self.inner.config.close()?;
        log::debug!("Database closed");
        Ok(())
    }

    pub fn is_closed(&self) -> DocketResult<bool> {
        self.inner.config.store().is_closed()
    }

    pub(crate) fn initialize(&self) -> DocketResult<()> {
        self.inner.config.initialize()
    }
}

impl Debug for Docket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Docket")
            .field("config", &self.inner.config)
            .field("collections", &self.list_collection_names())
            .finish()
    }
}

struct DocketInner {
    config: DocketConfig,
    collection_factory: CollectionFactory,
}

impl DocketInner {
    fn collection(
        &self,
        name: &str,
        options: Option<CollectionOptions>,
    ) -> DocketResult<Collection> {
        self.ensure_open()?;
        self.collection_factory
            .get_collection(name, options, self.config.clone())
    }

    fn destroy_collection(&self, name: &str) -> DocketResult<usize> {
        self.ensure_open()?;
        let collection = self
            .collection_factory
            .get_collection(name, None, self.config.clone())?;
        let removed = collection.drop_all()?;
        self.collection_factory.remove_collection(name);
        log::debug!("Destroyed collection {} ({} documents)", name, removed);
        Ok(removed)
    }

    fn ensure_open(&self) -> DocketResult<()> {
        if self.config.store().is_closed()? {
            log::error!("Database is closed");
            return Err(DocketError::new(
                "Database is closed",
                ErrorKind::BackendError,
            ));
        }
        Ok(())
    }
}

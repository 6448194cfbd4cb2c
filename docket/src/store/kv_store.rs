use crate::common::Value;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::store::iters::KvIterator;
use crate::store::KvKey;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Opaque, totally ordered token identifying the commit that last wrote a key.
///
/// Every key written by one commit carries the same versionstamp. A later commit
/// always produces a greater versionstamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Versionstamp(u64);

impl Versionstamp {
    pub fn new(version: u64) -> Self {
        Versionstamp(version)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for Versionstamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:020x}", self.0)
    }
}

/// A stored entry with the versionstamp of its last write.
#[derive(Debug, Clone, PartialEq)]
pub struct KvEntry {
    pub key: KvKey,
    pub value: Value,
    pub versionstamp: Versionstamp,
}

/// Precondition of an atomic write: the key's current versionstamp must equal
/// `versionstamp`, where `None` requires the key to be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct KvCheck {
    pub key: KvKey,
    pub versionstamp: Option<Versionstamp>,
}

/// A mutation applied by an atomic write.
#[derive(Debug, Clone, PartialEq)]
pub enum KvMutation {
    Set(KvKey, Value),
    Delete(KvKey),
}

impl KvMutation {
    pub fn key(&self) -> &KvKey {
        match self {
            KvMutation::Set(key, _) => key,
            KvMutation::Delete(key) => key,
        }
    }
}

/// Outcome of committing an atomic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    /// Every check held and every mutation was applied.
    Committed(Versionstamp),
    /// At least one check failed; nothing was applied.
    Conflict,
}

impl CommitResult {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitResult::Committed(_))
    }
}

/// Options for a prefix listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Number of entries fetched from the provider per page.
    pub batch_size: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            batch_size: crate::common::DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

/// Contract of an ordered, versioned key-value substrate.
///
/// # Purpose
/// The collection engine keeps every document and secondary index entry in a
/// provider implementing this trait. The provider owns durability and conflict
/// detection; the engine never locks.
///
/// # Key Methods
/// - **Point read**: `get()` returns the value with its versionstamp
/// - **Paged scan**: `scan()` returns one page of entries under a prefix
/// - **Atomic write**: `commit()` applies mutations iff every check holds
/// - **Lifecycle**: `close()`, `is_closed()`
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; the engine shares one provider across
/// every collection and thread.
pub trait KvStoreProvider: Send + Sync {
    /// Reads the entry stored under `key`.
    ///
    /// # Returns
    /// * `Ok(Some(entry))` if the key exists
    /// * `Ok(None)` if it does not
    /// * `Err(DocketError)` if the provider fails
    fn get(&self, key: &KvKey) -> DocketResult<Option<KvEntry>>;

    /// Returns up to `limit` entries whose key has `prefix` as a strict prefix,
    /// in ascending key order, starting after `start_after` when given.
    ///
    /// # Arguments
    /// * `prefix` - The key prefix to list
    /// * `start_after` - Exclusive lower bound, usually the last key of the previous page
    /// * `limit` - Maximum number of entries in the page
    fn scan(
        &self,
        prefix: &KvKey,
        start_after: Option<&KvKey>,
        limit: usize,
    ) -> DocketResult<Vec<KvEntry>>;

    /// Applies `mutations` atomically if every check in `checks` holds.
    ///
    /// # Returns
    /// * `Ok(CommitResult::Committed(vs))` with the versionstamp of the commit
    /// * `Ok(CommitResult::Conflict)` if a check failed and nothing was written
    /// * `Err(DocketError)` if the provider fails
    fn commit(&self, checks: Vec<KvCheck>, mutations: Vec<KvMutation>) -> DocketResult<CommitResult>;

    /// Closes the provider. Later calls fail with a `BackendError`.
    fn close(&self) -> DocketResult<()>;

    fn is_closed(&self) -> DocketResult<bool>;
}

/// Cloneable handle to a [KvStoreProvider].
///
/// Cloning is cheap; every clone shares the same provider.
#[derive(Clone)]
pub struct KvStore {
    inner: Arc<dyn KvStoreProvider>,
}

impl Deref for KvStore {
    type Target = Arc<dyn KvStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl KvStore {
    /// Creates a new `KvStore` wrapping a provider implementation.
    pub fn new<T: KvStoreProvider + 'static>(inner: T) -> Self {
        KvStore {
            inner: Arc::new(inner),
        }
    }

    /// Lists every entry under `prefix` lazily, one page of
    /// `options.batch_size` entries at a time.
    ///
    /// # Errors
    /// Returns a `BackendError` if the store is closed or the batch size is zero.
    pub fn list(&self, prefix: KvKey, options: ListOptions) -> DocketResult<KvIterator> {
        if options.batch_size == 0 {
            log::error!("List batch size must be greater than zero");
            return Err(DocketError::new(
                "List batch size must be greater than zero",
                ErrorKind::BackendError,
            ));
        }

        if self.inner.is_closed()? {
            log::error!("Cannot list {} from a closed store", prefix);
            return Err(DocketError::new(
                "Store is closed",
                ErrorKind::BackendError,
            ));
        }

        Ok(KvIterator::new(self.clone(), prefix, options.batch_size))
    }

    /// Starts an atomic write against this store.
    pub fn atomic(&self) -> AtomicWrite {
        AtomicWrite {
            store: self.clone(),
            checks: Vec::new(),
            mutations: Vec::new(),
        }
    }
}

/// Builder of an all-or-nothing write: a set of version checks and a list of
/// mutations committed together.
///
/// # Examples
/// ```rust,ignore
/// let mut op = store.atomic();
/// op.check(key.clone(), None).set(key, Value::from("v"));
/// match op.commit()? {
///     CommitResult::Committed(vs) => println!("written at {}", vs),
///     CommitResult::Conflict => println!("key already exists"),
/// }
/// ```
pub struct AtomicWrite {
    store: KvStore,
    checks: Vec<KvCheck>,
    mutations: Vec<KvMutation>,
}

impl AtomicWrite {
    /// Requires `key` to currently carry `versionstamp` (`None` = absent).
    pub fn check(&mut self, key: KvKey, versionstamp: Option<Versionstamp>) -> &mut Self {
        self.checks.push(KvCheck { key, versionstamp });
        self
    }

    pub fn set(&mut self, key: KvKey, value: Value) -> &mut Self {
        self.mutations.push(KvMutation::Set(key, value));
        self
    }

    pub fn delete(&mut self, key: KvKey) -> &mut Self {
        self.mutations.push(KvMutation::Delete(key));
        self
    }

    pub fn checks(&self) -> &[KvCheck] {
        &self.checks
    }

    pub fn mutations(&self) -> &[KvMutation] {
        &self.mutations
    }

    pub fn commit(self) -> DocketResult<CommitResult> {
        self.store.commit(self.checks, self.mutations)
    }
}

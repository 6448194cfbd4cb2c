//! Configuration shared by a [Docket](crate::docket::Docket) and its collections.

use crate::collection::{default_id_generator, IdGen, IdGenerator, RetryPolicy};
use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor, DEFAULT_SCAN_BATCH_SIZE};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::store::{InMemoryKv, KvStore};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Database-wide settings.
///
/// Settings can be changed until the database is opened; afterwards every
/// setter fails with `InvalidOperation`. Cloning is cheap and every clone
/// shares the same settings.
///
/// | setting | default |
/// |---|---|
/// | store | a fresh [InMemoryKv] |
/// | id generator | snowflake ids |
/// | update retry policy | `RetryUntilSuccess { max_attempts: 16 }` |
/// | delete retry policy | `SingleAttempt` |
/// | scan batch size | 100 |
#[derive(Clone)]
pub struct DocketConfig {
    inner: Arc<DocketConfigInner>,
}

impl Default for DocketConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DocketConfig {
    pub fn new() -> Self {
        DocketConfig {
            inner: Arc::new(DocketConfigInner::new()),
        }
    }

    pub fn store(&self) -> KvStore {
        self.inner.store.read_with(|store| store.clone())
    }

    pub fn set_store(&self, store: KvStore) -> DocketResult<()> {
        self.inner.ensure_not_configured("store")?;
        self.inner.store.write_with(|it| *it = store);
        Ok(())
    }

    pub fn id_generator(&self) -> IdGen {
        self.inner.id_generator.read_with(|generator| generator.clone())
    }

    pub fn set_id_generator<G: IdGenerator + 'static>(&self, generator: G) -> DocketResult<()> {
        self.inner.ensure_not_configured("id generator")?;
        self.inner
            .id_generator
            .write_with(|it| *it = Arc::new(generator));
        Ok(())
    }

    pub fn update_retry_policy(&self) -> RetryPolicy {
        self.inner.update_retry_policy.read_with(|policy| *policy)
    }

    pub fn set_update_retry_policy(&self, policy: RetryPolicy) -> DocketResult<()> {
        self.inner.ensure_not_configured("update retry policy")?;
        policy.validate()?;
        self.inner.update_retry_policy.write_with(|it| *it = policy);
        Ok(())
    }

    pub fn delete_retry_policy(&self) -> RetryPolicy {
        self.inner.delete_retry_policy.read_with(|policy| *policy)
    }

    pub fn set_delete_retry_policy(&self, policy: RetryPolicy) -> DocketResult<()> {
        self.inner.ensure_not_configured("delete retry policy")?;
        policy.validate()?;
        self.inner.delete_retry_policy.write_with(|it| *it = policy);
        Ok(())
    }

    /// Maximum number of entries requested from the store per scan page.
    pub fn scan_batch_size(&self) -> usize {
        self.inner.scan_batch_size.load(Ordering::Relaxed)
    }

    pub fn set_scan_batch_size(&self, batch_size: usize) -> DocketResult<()> {
        self.inner.ensure_not_configured("scan batch size")?;
        if batch_size == 0 {
            log::error!("Scan batch size must be greater than zero");
            return Err(DocketError::new(
                "Scan batch size must be greater than zero",
                ErrorKind::ConfigurationError,
            ));
        }
        self.inner.scan_batch_size.store(batch_size, Ordering::Relaxed);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    /// Freezes the settings and checks that the store is usable.
    pub(crate) fn initialize(&self) -> DocketResult<()> {
        if self.store().is_closed()? {
            log::error!("Cannot open a database on a closed store");
            return Err(DocketError::new(
                "Cannot open a database on a closed store",
                ErrorKind::BackendError,
            ));
        }
        self.inner.configured.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub(crate) fn close(&self) -> DocketResult<()> {
        self.store().close()
    }
}

impl Debug for DocketConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocketConfig")
            .field("configured", &self.is_configured())
            .field("update_retry_policy", &self.update_retry_policy())
            .field("delete_retry_policy", &self.delete_retry_policy())
            .field("scan_batch_size", &self.scan_batch_size())
            .finish()
    }
}

struct DocketConfigInner {
    configured: AtomicBool,
    store: Atomic<KvStore>,
    id_generator: Atomic<IdGen>,
    update_retry_policy: Atomic<RetryPolicy>,
    delete_retry_policy: Atomic<RetryPolicy>,
    scan_batch_size: AtomicUsize,
}

impl DocketConfigInner {
    fn new() -> Self {
        DocketConfigInner {
            configured: AtomicBool::from(false),
            store: atomic(KvStore::new(InMemoryKv::new())),
            id_generator: atomic(default_id_generator()),
            update_retry_policy: atomic(RetryPolicy::default_update()),
            delete_retry_policy: atomic(RetryPolicy::default_delete()),
            scan_batch_size: AtomicUsize::new(DEFAULT_SCAN_BATCH_SIZE),
        }
    }

    fn ensure_not_configured(&self, setting: &str) -> DocketResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("The {} cannot be changed after the database is opened", setting);
            return Err(DocketError::new(
                &format!("The {} cannot be changed after the database is opened", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}

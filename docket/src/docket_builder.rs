use crate::collection::{IdGenerator, RetryPolicy};
use crate::docket::Docket;
use crate::docket_config::DocketConfig;
use crate::errors::{DocketError, DocketResult};
use crate::store::KvStore;

/// Builder of a [Docket].
///
/// Invalid settings do not fail immediately: the first error is kept and
/// returned by [DocketBuilder::open].
///
/// # Examples
///
/// ```rust,ignore
/// let kv = InMemoryKv::new();
/// let db = Docket::builder()
///     .store(KvStore::new(kv.clone()))
///     .scan_batch_size(500)
///     .update_retry_policy(RetryPolicy::RetryUntilSuccess { max_attempts: 32 })
///     .open()?;
/// ```
#[derive(Default)]
pub struct DocketBuilder {
    error: Option<DocketError>,
    config: DocketConfig,
}

impl DocketBuilder {
    pub fn new() -> Self {
        DocketBuilder {
            error: None,
            config: DocketConfig::new(),
        }
    }

    /// Uses `store` instead of a fresh in-memory store.
    pub fn store(mut self, store: KvStore) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_store(store) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn id_generator<G: IdGenerator + 'static>(mut self, generator: G) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_id_generator(generator) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn update_retry_policy(mut self, policy: RetryPolicy) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_update_retry_policy(policy) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn delete_retry_policy(mut self, policy: RetryPolicy) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_delete_retry_policy(policy) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn scan_batch_size(mut self, batch_size: usize) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_scan_batch_size(batch_size) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the database.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by a setter, or a `BackendError` if the
    /// store is closed.
    pub fn open(self) -> DocketResult<Docket> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let docket = Docket::new(self.config);
        docket.initialize()?;
        Ok(docket)
    }
}

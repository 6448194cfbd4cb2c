use super::find_optimizer::FindOptimizer;
use crate::collection::{Document, FindPlan, IndexSet, KeyScheme, ScanStrategy};
use crate::common::Value;
use crate::docket_config::DocketConfig;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::query::CompiledQuery;
use crate::store::{KvEntry, KvIterator, KvStore, ListOptions, Versionstamp};
use std::sync::Arc;

/// A stored document matching a query, with the versionstamp its primary
/// entry carried when it was read.
///
/// Secondary entries are always written in the same commit as their primary,
/// so a candidate read from an index carries the primary's versionstamp too.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub document: Document,
    pub versionstamp: Versionstamp,
}

/// Read path of a collection: planning and candidate enumeration.
#[derive(Clone)]
pub(crate) struct ReadOperations {
    inner: Arc<ReadOperationsInner>,
}

impl ReadOperations {
    pub fn new(
        key_scheme: KeyScheme,
        indexes: IndexSet,
        store: KvStore,
        config: DocketConfig,
    ) -> Self {
        ReadOperations {
            inner: Arc::new(ReadOperationsInner {
                key_scheme,
                indexes,
                store,
                config,
                find_optimizer: FindOptimizer::new(),
            }),
        }
    }

    pub fn find_plan(&self, query: &CompiledQuery) -> FindPlan {
        self.inner
            .find_optimizer
            .create_find_plan(query, &self.inner.indexes)
    }

    /// Streams the matches of a plan.
    ///
    /// `bound` is the number of matches the caller will consume at most; it caps
    /// the page size requested from the store.
    pub fn find(&self, plan: &FindPlan, bound: Option<usize>) -> DocketResult<CandidateStream> {
        self.inner.find(plan, bound)
    }

    #[cfg(test)]
    pub fn get_by_id(&self, id: &str) -> DocketResult<Option<Candidate>> {
        self.inner.get_by_id(id)
    }

    /// Re-reads a document for a retry; `None` if it is gone or no longer
    /// matches `query`.
    pub fn refetch(&self, id: &str, query: &CompiledQuery) -> DocketResult<Option<Candidate>> {
        Ok(self
            .inner
            .get_by_id(id)?
            .filter(|candidate| query.matches(&candidate.document)))
    }
}

struct ReadOperationsInner {
    key_scheme: KeyScheme,
    indexes: IndexSet,
    store: KvStore,
    config: DocketConfig,
    find_optimizer: FindOptimizer,
}

impl ReadOperationsInner {
    fn find(&self, plan: &FindPlan, bound: Option<usize>) -> DocketResult<CandidateStream> {
        let query = plan.query().clone();
        if bound == Some(0) {
            return Ok(CandidateStream::new(CandidateSource::Empty, query));
        }

        let source = match plan.strategy() {
            ScanStrategy::Empty => CandidateSource::Empty,
            ScanStrategy::ById(id) => {
                let entry = self.store.get(&self.key_scheme.primary_key(id))?;
                CandidateSource::Single(entry)
            }
            ScanStrategy::IndexScan { field, value } => {
                let prefix = self.key_scheme.index_prefix(field, value.clone());
                CandidateSource::Scan(self.store.list(prefix, self.list_options(bound))?)
            }
            ScanStrategy::FullScan => {
                let prefix = self.key_scheme.primary_prefix();
                CandidateSource::Scan(self.store.list(prefix, self.list_options(bound))?)
            }
        };
        Ok(CandidateStream::new(source, query))
    }

    fn list_options(&self, bound: Option<usize>) -> ListOptions {
        let scan_batch_size = self.config.scan_batch_size();
        ListOptions {
            batch_size: bound.map_or(scan_batch_size, |b| b.min(scan_batch_size)),
        }
    }

    fn get_by_id(&self, id: &str) -> DocketResult<Option<Candidate>> {
        self.store
            .get(&self.key_scheme.primary_key(id))?
            .map(decode_entry)
            .transpose()
    }
}

fn decode_entry(entry: KvEntry) -> DocketResult<Candidate> {
    match entry.value {
        Value::Map(document) => Ok(Candidate {
            document,
            versionstamp: entry.versionstamp,
        }),
        other => {
            log::error!(
                "Entry {} holds a {} value instead of a document",
                entry.key,
                other.kind_name()
            );
            Err(DocketError::new(
                &format!("Corrupt entry {}: expected a document", entry.key),
                ErrorKind::InternalError,
            ))
        }
    }
}

enum CandidateSource {
    Empty,
    Single(Option<KvEntry>),
    Scan(KvIterator),
}

/// Lazy stream of the stored documents matching a query.
///
/// Ends after the first error.
pub(crate) struct CandidateStream {
    source: CandidateSource,
    query: CompiledQuery,
}

impl CandidateStream {
    fn new(source: CandidateSource, query: CompiledQuery) -> Self {
        CandidateStream { source, query }
    }

    fn next_entry(&mut self) -> Option<DocketResult<KvEntry>> {
        match &mut self.source {
            CandidateSource::Empty => None,
            CandidateSource::Single(entry) => entry.take().map(Ok),
            CandidateSource::Scan(iter) => iter.next(),
        }
    }
}

impl Iterator for CandidateStream {
    type Item = DocketResult<Candidate>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let candidate = self.next_entry()?.and_then(decode_entry);
            match candidate {
                Ok(candidate) => {
                    if self.query.matches(&candidate.document) {
                        return Some(Ok(candidate));
                    }
                }
                Err(err) => {
                    self.source = CandidateSource::Empty;
                    return Some(Err(err));
                }
            }
        }
    }
}

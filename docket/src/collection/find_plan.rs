use crate::query::CompiledQuery;
use crate::store::KeyPart;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// How candidates for a query are read from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanStrategy {
    /// The query can match nothing; the store is not touched.
    Empty,
    /// Point lookup of the primary entry with this id.
    ById(String),
    /// Prefix scan over the secondary entries of `field` holding `value`.
    IndexScan { field: String, value: KeyPart },
    /// Prefix scan over every primary entry of the collection.
    FullScan,
}

impl Display for ScanStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStrategy::Empty => write!(f, "empty"),
            ScanStrategy::ById(id) => write!(f, "point lookup of {:?}", id),
            ScanStrategy::IndexScan { field, value } => {
                write!(f, "index scan of {} = {}", field, value)
            }
            ScanStrategy::FullScan => write!(f, "full scan"),
        }
    }
}

/// Execution plan of a query: the scan strategy plus the compiled query every
/// candidate is re-checked against.
///
/// The strategy only narrows the candidates; a document is reported only if
/// it matches the full query.
#[derive(Clone)]
pub struct FindPlan {
    inner: Arc<FindPlanInner>,
}

struct FindPlanInner {
    strategy: ScanStrategy,
    query: CompiledQuery,
}

impl FindPlan {
    pub(crate) fn new(strategy: ScanStrategy, query: CompiledQuery) -> Self {
        FindPlan {
            inner: Arc::new(FindPlanInner { strategy, query }),
        }
    }

    pub fn strategy(&self) -> &ScanStrategy {
        &self.inner.strategy
    }

    pub fn query(&self) -> &CompiledQuery {
        &self.inner.query
    }

    pub fn is_point_lookup(&self) -> bool {
        matches!(self.inner.strategy, ScanStrategy::ById(_))
    }

    pub fn is_index_scan(&self) -> bool {
        matches!(self.inner.strategy, ScanStrategy::IndexScan { .. })
    }

    pub fn is_full_scan(&self) -> bool {
        matches!(self.inner.strategy, ScanStrategy::FullScan)
    }
}

impl Debug for FindPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindPlan")
            .field("strategy", &self.inner.strategy)
            .field("query", &self.inner.query)
            .finish()
    }
}

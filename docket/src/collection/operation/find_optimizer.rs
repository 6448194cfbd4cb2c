use crate::collection::{FindPlan, IndexSet, ScanStrategy};
use crate::common::DOC_ID;
use crate::query::{CompiledQuery, QueryValue};

/// Chooses the scan strategy of a query.
///
/// Priority: point lookup on `_id`, then a prefix scan over the first declared
/// index bound to an indexable literal, then a full scan. The plan keeps the
/// whole compiled query so every candidate is re-checked.
#[derive(Clone, Default)]
pub(crate) struct FindOptimizer;

impl FindOptimizer {
    pub fn new() -> Self {
        FindOptimizer
    }

    pub fn create_find_plan(&self, query: &CompiledQuery, indexes: &IndexSet) -> FindPlan {
        let strategy = self.select_strategy(query, indexes);
        log::debug!("Selected {} for query {:?}", strategy, query);
        FindPlan::new(strategy, query.clone())
    }

    fn select_strategy(&self, query: &CompiledQuery, indexes: &IndexSet) -> ScanStrategy {
        if !matches!(query, CompiledQuery::FieldMap { .. }) {
            return ScanStrategy::FullScan;
        }

        if let Some(id_query) = query.field(DOC_ID) {
            match id_query {
                QueryValue::String(id) => return ScanStrategy::ById(id.clone()),
                // stored ids are always strings
                QueryValue::Absent => return ScanStrategy::Empty,
                literal if literal.is_literal() => return ScanStrategy::Empty,
                _ => {}
            }
        }

        indexes
            .iter()
            .find_map(|field| {
                query
                    .field(field)
                    .and_then(QueryValue::as_index_literal)
                    .map(|value| ScanStrategy::IndexScan {
                        field: field.clone(),
                        value,
                    })
            })
            .unwrap_or(ScanStrategy::FullScan)
    }
}

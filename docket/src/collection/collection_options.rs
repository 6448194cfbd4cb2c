use crate::collection::{Document, DocumentValidator, RetryPolicy, Validator};
use crate::errors::DocketResult;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Definition-time options of a collection.
///
/// # Examples
///
/// ```rust,ignore
/// let users = db.collection_with_options(
///     "users",
///     CollectionOptions::new()
///         .index("email")
///         .validator(|doc: &Document| require_email(doc))
///         .delete_retry_policy(RetryPolicy::RetryUntilSuccess { max_attempts: 4 }),
/// )?;
/// ```
#[derive(Clone, Default)]
pub struct CollectionOptions {
    indexes: Vec<String>,
    validator: Option<Validator>,
    update_retry_policy: Option<RetryPolicy>,
    delete_retry_policy: Option<RetryPolicy>,
}

impl CollectionOptions {
    pub fn new() -> Self {
        CollectionOptions::default()
    }

    /// Declares a secondary index on a top-level field.
    pub fn index(mut self, field: &str) -> Self {
        self.indexes.push(field.to_string());
        self
    }

    /// Declares several secondary indexes, in order.
    pub fn indexes(mut self, fields: &[&str]) -> Self {
        self.indexes.extend(fields.iter().map(|f| f.to_string()));
        self
    }

    pub fn validator<V: DocumentValidator + 'static>(mut self, validator: V) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Overrides the database default retry policy of updates.
    pub fn update_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.update_retry_policy = Some(policy);
        self
    }

    /// Overrides the database default retry policy of deletes.
    pub fn delete_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.delete_retry_policy = Some(policy);
        self
    }

    pub fn index_fields(&self) -> &[String] {
        &self.indexes
    }

    pub fn get_validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn get_update_retry_policy(&self) -> Option<RetryPolicy> {
        self.update_retry_policy
    }

    pub fn get_delete_retry_policy(&self) -> Option<RetryPolicy> {
        self.delete_retry_policy
    }

    pub(crate) fn validate_document(&self, document: &Document) -> DocketResult<()> {
        match &self.validator {
            Some(validator) => validator.validate(document),
            None => Ok(()),
        }
    }
}

impl Debug for CollectionOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionOptions")
            .field("indexes", &self.indexes)
            .field("validator", &self.validator.is_some())
            .field("update_retry_policy", &self.update_retry_policy)
            .field("delete_retry_policy", &self.delete_retry_policy)
            .finish()
    }
}

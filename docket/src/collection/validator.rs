use crate::collection::Document;
use crate::errors::DocketResult;
use std::sync::Arc;

/// Checks the shape of a document before it is written.
///
/// The validator runs on every document an insert or update is about to persist,
/// after `_id` assignment and sanitizing. Any error aborts the write before the
/// store is touched.
///
/// Closures of the form `Fn(&Document) -> DocketResult<()>` implement this trait.
///
/// # Examples
///
/// ```rust,ignore
/// let options = CollectionOptions::new().validator(|doc: &Document| {
///     if doc.get("email").and_then(|v| v.as_str()).is_some() {
///         Ok(())
///     } else {
///         Err(DocketError::new("email is required", ErrorKind::ValidationError))
///     }
/// });
/// ```
pub trait DocumentValidator: Send + Sync {
    fn validate(&self, document: &Document) -> DocketResult<()>;
}

impl<F> DocumentValidator for F
where
    F: Fn(&Document) -> DocketResult<()> + Send + Sync,
{
    fn validate(&self, document: &Document) -> DocketResult<()> {
        self(document)
    }
}

/// Shared handle to a validator.
pub type Validator = Arc<dyn DocumentValidator>;

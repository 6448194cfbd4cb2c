use crate::collection::snowflake::SnowflakeIdGenerator;
use std::sync::Arc;

/// Source of document ids for inserts that do not carry an `_id`.
///
/// Ids must be unique within a collection; an insert whose generated id collides
/// with a stored document fails with a `ConflictError`.
///
/// Closures of the form `Fn() -> String` implement this trait.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

impl IdGenerator for SnowflakeIdGenerator {
    fn generate(&self) -> String {
        self.get_id().to_string()
    }
}

/// Shared handle to an id generator.
pub type IdGen = Arc<dyn IdGenerator>;

pub(crate) fn default_id_generator() -> IdGen {
    Arc::new(SnowflakeIdGenerator::new())
}

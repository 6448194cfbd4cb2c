use crate::common::{DOC_ID, FIELD_SEPARATOR, MAX_INDEXES};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use std::fmt::{Display, Formatter};

/// The secondary indexes of a collection, in declaration order.
///
/// At most six distinct, non-empty, dot-free field names other than `_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSet {
    fields: Vec<String>,
}

impl IndexSet {
    /// Validates and creates an index set.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` for more than six fields, or for an `_id`,
    /// empty, dotted or duplicate field name.
    pub fn new<S: AsRef<str>>(fields: &[S]) -> DocketResult<IndexSet> {
        if fields.len() > MAX_INDEXES {
            log::error!(
                "A collection supports at most {} indexes, got {}",
                MAX_INDEXES,
                fields.len()
            );
            return Err(DocketError::new(
                &format!(
                    "A collection supports at most {} indexes, got {}",
                    MAX_INDEXES,
                    fields.len()
                ),
                ErrorKind::ConfigurationError,
            ));
        }

        let mut validated: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            let field = field.as_ref();
            let problem = if field.is_empty() {
                Some("index field name must not be empty")
            } else if field == DOC_ID {
                Some("_id is always indexed and cannot be a secondary index")
            } else if field.contains(FIELD_SEPARATOR) {
                Some("index field name must not contain '.'")
            } else if validated.iter().any(|f| f == field) {
                Some("index field is declared more than once")
            } else {
                None
            };

            if let Some(problem) = problem {
                log::error!("Invalid index field '{}': {}", field, problem);
                return Err(DocketError::new(
                    &format!("Invalid index field '{}': {}", field, problem),
                    ErrorKind::ConfigurationError,
                ));
            }
            validated.push(field.to_string());
        }

        Ok(IndexSet { fields: validated })
    }

    pub fn empty() -> IndexSet {
        IndexSet::default()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.fields.iter()
    }
}

impl Display for IndexSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.fields.join(", "))
    }
}

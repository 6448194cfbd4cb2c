use crate::collection::{Collection, CollectionOptions};
use crate::common::RESERVED_NAME_PREFIX;
use crate::docket_config::DocketConfig;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Registry of the collections opened through one database handle.
///
/// A name is bound to its definition the first time it is opened. Opening it
/// again returns the same collection; asking for a different index set is a
/// `ConfigurationError`.
#[derive(Clone, Default)]
pub(crate) struct CollectionFactory {
    inner: Arc<CollectionFactoryInner>,
}

#[derive(Default)]
struct CollectionFactoryInner {
    collections: DashMap<String, Collection>,
}

impl CollectionFactory {
    pub fn new() -> Self {
        CollectionFactory::default()
    }

    /// Returns the collection named `name`, creating it with `options` (or the
    /// defaults) on first use.
    pub fn get_collection(
        &self,
        name: &str,
        options: Option<CollectionOptions>,
        config: DocketConfig,
    ) -> DocketResult<Collection> {
        validate_collection_name(name)?;

        match self.inner.collections.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let collection = entry.get();
                if let Some(options) = options {
                    if collection.indexes().fields() != options.index_fields() {
                        log::error!(
                            "Collection {} is already defined with indexes {}",
                            name,
                            collection.indexes()
                        );
                        return Err(DocketError::new(
                            &format!(
                                "Collection {} is already defined with indexes {}",
                                name,
                                collection.indexes()
                            ),
                            ErrorKind::ConfigurationError,
                        ));
                    }
                }
                Ok(collection.clone())
            }
            Entry::Vacant(entry) => {
                let collection = Collection::new(name, options.unwrap_or_default(), config)?;
                log::debug!(
                    "Opened collection {} with indexes {}",
                    name,
                    collection.indexes()
                );
                entry.insert(collection.clone());
                Ok(collection)
            }
        }
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.inner.collections.contains_key(name)
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Forgets a collection definition, returning the collection if it was
    /// registered.
    pub fn remove_collection(&self, name: &str) -> Option<Collection> {
        self.inner
            .collections
            .remove(name)
            .map(|(_, collection)| collection)
    }
}

fn validate_collection_name(name: &str) -> DocketResult<()> {
    let problem = if name.is_empty() {
        Some("name must not be empty")
    } else if name.trim().is_empty() {
        Some("name must not be blank")
    } else if name.chars().any(char::is_whitespace) {
        Some("name must not contain whitespace")
    } else if name.starts_with(RESERVED_NAME_PREFIX) {
        Some("names starting with '$' are reserved")
    } else {
        None
    };

    match problem {
        Some(problem) => {
            log::error!("Invalid collection name '{}': {}", name, problem);
            Err(DocketError::new(
                &format!("Invalid collection name '{}': {}", name, problem),
                ErrorKind::ConfigurationError,
            ))
        }
        None => Ok(()),
    }
}

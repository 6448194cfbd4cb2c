use super::index_writer::DocumentIndexWriter;
use super::read_operations::{Candidate, ReadOperations};
use crate::collection::{
    document_id, sanitize_document, CollectionOptions, Document, KeyScheme, RetryPolicy,
    UpdateSpec, WriteOptions,
};
use crate::common::{Value, DOC_ID};
use crate::docket_config::DocketConfig;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::query::CompiledQuery;
use crate::store::{CommitResult, KvStore};
use itertools::Itertools;
use std::sync::Arc;

/// Mutation path of a collection.
///
/// Every write is one atomic commit against the store. Inserts guard the
/// primary and secondary keys with absence checks; updates and deletes guard
/// the primary key with the versionstamp the document was read at, and
/// resolve conflicts according to their [RetryPolicy].
#[derive(Clone)]
pub(crate) struct WriteOperations {
    inner: Arc<WriteOperationsInner>,
}

impl WriteOperations {
    pub fn new(
        key_scheme: KeyScheme,
        store: KvStore,
        index_writer: DocumentIndexWriter,
        read_operations: ReadOperations,
        options: CollectionOptions,
        config: DocketConfig,
    ) -> Self {
        WriteOperations {
            inner: Arc::new(WriteOperationsInner {
                key_scheme,
                store,
                index_writer,
                read_operations,
                options,
                config,
            }),
        }
    }

    /// Inserts a document and returns it as stored, `_id` included.
    pub fn insert(&self, document: Document) -> DocketResult<Document> {
        self.inner.insert(document)
    }

    /// Inserts every document in one atomic commit.
    pub fn insert_many(&self, documents: Vec<Document>) -> DocketResult<Vec<Document>> {
        self.inner.insert_many(documents)
    }

    /// Updates the matches of `query`, returning the updated documents.
    pub fn update(
        &self,
        query: &CompiledQuery,
        update: &UpdateSpec,
        options: &WriteOptions,
    ) -> DocketResult<Vec<Document>> {
        self.inner.update(query, update, options)
    }

    /// Deletes the matches of `query`, returning the deleted documents.
    pub fn delete(
        &self,
        query: &CompiledQuery,
        options: &WriteOptions,
    ) -> DocketResult<Vec<Document>> {
        self.inner.delete(query, options)
    }
}

struct WriteOperationsInner {
    key_scheme: KeyScheme,
    store: KvStore,
    index_writer: DocumentIndexWriter,
    read_operations: ReadOperations,
    options: CollectionOptions,
    config: DocketConfig,
}

impl WriteOperationsInner {
    fn insert(&self, document: Document) -> DocketResult<Document> {
        let (id, document) = self.prepare_insert(document)?;

        let mut write = self.store.atomic();
        let key = self.key_scheme.primary_key(&id);
        write
            .check(key.clone(), None)
            .set(key, Value::Map(document.clone()));
        self.index_writer
            .write_index_entry(&mut write, &document, &id)?;

        match write.commit()? {
            CommitResult::Committed(versionstamp) => {
                log::debug!(
                    "Inserted document {} into {} at {}",
                    id,
                    self.key_scheme.collection(),
                    versionstamp
                );
                Ok(document)
            }
            CommitResult::Conflict => {
                log::error!(
                    "Document with id {} already exists in collection {}",
                    id,
                    self.key_scheme.collection()
                );
                Err(DocketError::new(
                    &format!(
                        "Document with id {} already exists in collection {}",
                        id,
                        self.key_scheme.collection()
                    ),
                    ErrorKind::ConflictError,
                ))
            }
        }
    }

    fn insert_many(&self, documents: Vec<Document>) -> DocketResult<Vec<Document>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let prepared = documents
            .into_iter()
            .map(|document| self.prepare_insert(document))
            .collect::<DocketResult<Vec<_>>>()?;

        if let Some(id) = prepared.iter().map(|(id, _)| id).duplicates().next() {
            log::error!("Duplicate id {} in batch insert", id);
            return Err(DocketError::new(
                &format!("Duplicate id {} in batch insert", id),
                ErrorKind::ConflictError,
            ));
        }

        let mut write = self.store.atomic();
        for (id, document) in &prepared {
            let key = self.key_scheme.primary_key(id);
            write
                .check(key.clone(), None)
                .set(key, Value::Map(document.clone()));
            self.index_writer
                .write_index_entry(&mut write, document, id)?;
        }

        match write.commit()? {
            CommitResult::Committed(versionstamp) => {
                log::debug!(
                    "Inserted {} documents into {} at {}",
                    prepared.len(),
                    self.key_scheme.collection(),
                    versionstamp
                );
                Ok(prepared.into_iter().map(|(_, document)| document).collect())
            }
            CommitResult::Conflict => {
                log::error!(
                    "Batch insert into {} collides with existing documents",
                    self.key_scheme.collection()
                );
                Err(DocketError::new(
                    &format!(
                        "One or more documents already exist in collection {}",
                        self.key_scheme.collection()
                    ),
                    ErrorKind::ConflictError,
                ))
            }
        }
    }

    /// Assigns a missing `_id`, then sanitizes and validates the document.
    fn prepare_insert(&self, mut document: Document) -> DocketResult<(String, Document)> {
        if !document.has_id() {
            let id = self.config.id_generator().generate();
            document.put(DOC_ID, id)?;
        }
        self.check_persistable(&document)?;
        let id = document_id(&document)?.to_string();
        Ok((id, document))
    }

    fn check_persistable(&self, document: &Document) -> DocketResult<()> {
        sanitize_document(document)?;
        self.index_writer.validate_index_fields(document)?;
        self.options.validate_document(document)
    }

    fn update(
        &self,
        query: &CompiledQuery,
        update: &UpdateSpec,
        options: &WriteOptions,
    ) -> DocketResult<Vec<Document>> {
        let policy = self.resolve_policy(
            options,
            self.options.get_update_retry_policy(),
            self.config.update_retry_policy(),
        )?;

        self.for_each_candidate("update", query, options, policy, |current, id| {
            let updated = update.apply_to(&current.document)?;
            self.check_persistable(&updated)?;

            let mut write = self.store.atomic();
            let key = self.key_scheme.primary_key(id);
            write
                .check(key.clone(), Some(current.versionstamp))
                .set(key, Value::Map(updated.clone()));
            self.index_writer
                .update_index_entry(&mut write, &current.document, &updated, id)?;
            Ok((write.commit()?, updated))
        })
    }

    fn delete(&self, query: &CompiledQuery, options: &WriteOptions) -> DocketResult<Vec<Document>> {
        let policy = self.resolve_policy(
            options,
            self.options.get_delete_retry_policy(),
            self.config.delete_retry_policy(),
        )?;

        self.for_each_candidate("delete", query, options, policy, |current, id| {
            let mut write = self.store.atomic();
            let key = self.key_scheme.primary_key(id);
            write
                .check(key.clone(), Some(current.versionstamp))
                .delete(key);
            self.index_writer
                .remove_index_entry(&mut write, &current.document, id);
            Ok((write.commit()?, current.document.clone()))
        })
    }

    /// Per-call policy, else the collection's, else the database default.
    fn resolve_policy(
        &self,
        options: &WriteOptions,
        collection_policy: Option<RetryPolicy>,
        default_policy: RetryPolicy,
    ) -> DocketResult<RetryPolicy> {
        let policy = options
            .retry_policy_override()
            .or(collection_policy)
            .unwrap_or(default_policy);
        policy.validate()?;
        Ok(policy)
    }

    /// Runs `attempt` against every candidate of `query`, or up to the first
    /// success when `options` asks for a single document.
    ///
    /// `update_many` and `delete_many` work on the candidates of the initial
    /// scan; documents inserted meanwhile are not visited.
    fn for_each_candidate<F>(
        &self,
        operation: &str,
        query: &CompiledQuery,
        options: &WriteOptions,
        policy: RetryPolicy,
        mut attempt: F,
    ) -> DocketResult<Vec<Document>>
    where
        F: FnMut(&Candidate, &str) -> DocketResult<(CommitResult, Document)>,
    {
        let plan = self.read_operations.find_plan(query);
        let candidates = self.read_operations.find(&plan, None)?;

        if options.is_just_once() {
            for candidate in candidates {
                let candidate = candidate?;
                if let Some(document) =
                    self.run_optimistic(operation, query, policy, candidate, &mut attempt)?
                {
                    return Ok(vec![document]);
                }
            }
            return Ok(Vec::new());
        }

        let candidates = candidates.collect::<DocketResult<Vec<_>>>()?;
        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if let Some(document) =
                self.run_optimistic(operation, query, policy, candidate, &mut attempt)?
            {
                results.push(document);
            }
        }
        Ok(results)
    }

    /// Commits one document change, re-reading the document after each
    /// conflict while `policy` allows.
    ///
    /// Returns `None` when the document was skipped: it vanished or stopped
    /// matching before a retry, or it conflicted under `SingleAttempt`.
    fn run_optimistic<F>(
        &self,
        operation: &str,
        query: &CompiledQuery,
        policy: RetryPolicy,
        candidate: Candidate,
        attempt: &mut F,
    ) -> DocketResult<Option<Document>>
    where
        F: FnMut(&Candidate, &str) -> DocketResult<(CommitResult, Document)>,
    {
        let id = document_id(&candidate.document)?.to_string();
        let mut current = candidate;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let (result, document) = attempt(&current, &id)?;
            if result.is_committed() {
                return Ok(Some(document));
            }

            if !policy.allows_retry(attempts) {
                return match policy {
                    RetryPolicy::SingleAttempt => {
                        log::debug!(
                            "Skipping {} of document {} in {} after a concurrent modification",
                            operation,
                            id,
                            self.key_scheme.collection()
                        );
                        Ok(None)
                    }
                    RetryPolicy::RetryUntilSuccess { max_attempts } => {
                        log::error!(
                            "Giving up {} of document {} in {} after {} attempts",
                            operation,
                            id,
                            self.key_scheme.collection(),
                            max_attempts
                        );
                        Err(DocketError::new(
                            &format!(
                                "Could not {} document {} after {} attempts",
                                operation, id, max_attempts
                            ),
                            ErrorKind::RetryExhausted,
                        ))
                    }
                };
            }

            log::debug!(
                "Conflict on {} of document {}, retrying (attempt {})",
                operation,
                id,
                attempts + 1
            );
            match self.read_operations.refetch(&id, query)? {
                Some(candidate) => current = candidate,
                None => {
                    log::debug!(
                        "Document {} is gone or no longer matches, skipping {}",
                        id,
                        operation
                    );
                    return Ok(None);
                }
            }
        }
    }
}

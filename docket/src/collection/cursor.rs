use crate::collection::operation::{CandidateStream, ReadOperations};
use crate::collection::{Document, FindPlan};
use crate::common::SortSpec;
use crate::errors::DocketResult;
use std::fmt::{Debug, Formatter};

/// A deferred step of a [Cursor], applied in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorOp {
    Skip(usize),
    Limit(usize),
    Sort(SortSpec),
}

/// Lazy, chainable view over the matches of a query.
///
/// Building a cursor never touches the store. The terminal accessors
/// [Cursor::get_many], [Cursor::get_one], [Cursor::count] and [Cursor::iter]
/// run the plan. When only skips and limits are queued the scan stops as soon
/// as enough matches are read; a sort reads every match first.
///
/// # Examples
///
/// ```rust,ignore
/// let page = users
///     .find(field("active").eq(true))
///     .sort(SortSpec::by("age", SortOrder::Descending))
///     .skip(20)
///     .limit(10)
///     .get_many()?;
/// ```
#[derive(Clone)]
pub struct Cursor {
    read_operations: ReadOperations,
    find_plan: FindPlan,
    operations: Vec<CursorOp>,
}

impl Cursor {
    pub(crate) fn new(read_operations: ReadOperations, find_plan: FindPlan) -> Self {
        Cursor {
            read_operations,
            find_plan,
            operations: Vec::new(),
        }
    }

    pub fn skip(mut self, count: usize) -> Self {
        self.operations.push(CursorOp::Skip(count));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.operations.push(CursorOp::Limit(count));
        self
    }

    pub fn sort<S: Into<SortSpec>>(mut self, spec: S) -> Self {
        self.operations.push(CursorOp::Sort(spec.into()));
        self
    }

    pub fn operations(&self) -> &[CursorOp] {
        &self.operations
    }

    /// The plan chosen for the cursor's query.
    pub fn find_plan(&self) -> &FindPlan {
        &self.find_plan
    }

    /// Number of matches the queued operations can consume, `None` when every
    /// match is needed.
    ///
    /// Skips queued before the first limit add to the bound and the first limit
    /// closes it. A sort anywhere in the cursor needs the full match set, as
    /// does a cursor without any limit.
    pub fn required_fetch_count(&self) -> Option<usize> {
        if self
            .operations
            .iter()
            .any(|operation| matches!(operation, CursorOp::Sort(_)))
        {
            return None;
        }

        let mut bound = 0usize;
        for operation in &self.operations {
            match operation {
                CursorOp::Sort(_) => {}
                CursorOp::Skip(count) => bound = bound.saturating_add(*count),
                CursorOp::Limit(count) => return Some(bound.saturating_add(*count)),
            }
        }
        None
    }

    /// Runs the cursor and collects the results.
    pub fn get_many(&self) -> DocketResult<Vec<Document>> {
        if self.operations.is_empty() {
            return self.stream(None)?.collect();
        }

        let mut buffer = self.fetch(self.required_fetch_count())?;
        for operation in &self.operations {
            match operation {
                CursorOp::Skip(count) => {
                    let count = (*count).min(buffer.len());
                    buffer.drain(..count);
                }
                CursorOp::Limit(count) => buffer.truncate(*count),
                CursorOp::Sort(spec) => spec.sort_documents(&mut buffer),
            }
        }
        Ok(buffer)
    }

    /// First result of the cursor, if any.
    pub fn get_one(&self) -> DocketResult<Option<Document>> {
        if self.operations.is_empty() {
            return self.stream(Some(1))?.next().transpose();
        }
        Ok(self.clone().limit(1).get_many()?.into_iter().next())
    }

    /// Number of results, counted without keeping documents when no operation
    /// is queued.
    pub fn count(&self) -> DocketResult<usize> {
        if self.operations.is_empty() {
            let mut count = 0;
            for candidate in self.read_operations.find(&self.find_plan, None)? {
                candidate?;
                count += 1;
            }
            return Ok(count);
        }
        Ok(self.get_many()?.len())
    }

    /// Iterates the results.
    ///
    /// Without queued operations documents are streamed from the store page by
    /// page; otherwise they are computed as by [Cursor::get_many] first.
    pub fn iter(&self) -> DocketResult<DocumentStream> {
        if self.operations.is_empty() {
            return self.stream(None);
        }
        Ok(DocumentStream {
            source: DocumentSource::Buffered(self.get_many()?.into_iter()),
        })
    }

    fn stream(&self, bound: Option<usize>) -> DocketResult<DocumentStream> {
        let candidates = self.read_operations.find(&self.find_plan, bound)?;
        Ok(DocumentStream {
            source: DocumentSource::Streaming(candidates),
        })
    }

    fn fetch(&self, bound: Option<usize>) -> DocketResult<Vec<Document>> {
        let stream = self.stream(bound)?;
        match bound {
            Some(bound) => stream.take(bound).collect(),
            None => stream.collect(),
        }
    }
}

impl Debug for Cursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("find_plan", &self.find_plan)
            .field("operations", &self.operations)
            .finish()
    }
}

/// Iterator over the documents of a [Cursor].
pub struct DocumentStream {
    source: DocumentSource,
}

enum DocumentSource {
    Streaming(CandidateStream),
    Buffered(std::vec::IntoIter<Document>),
}

impl Iterator for DocumentStream {
    type Item = DocketResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            DocumentSource::Streaming(candidates) => candidates
                .next()
                .map(|candidate| candidate.map(|c| c.document)),
            DocumentSource::Buffered(documents) => documents.next().map(Ok),
        }
    }
}

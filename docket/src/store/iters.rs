use crate::errors::DocketResult;
use crate::store::{KvEntry, KvKey, KvStore};
use std::collections::VecDeque;

/// Lazy iterator over every entry under a key prefix.
///
/// Entries are fetched from the provider one page at a time; the next page is
/// requested only once the current one is drained, so a consumer that stops
/// early never pulls more than the pages it touched. Iteration ends after the
/// first error.
pub struct KvIterator {
    store: KvStore,
    prefix: KvKey,
    batch_size: usize,
    page: VecDeque<KvEntry>,
    last_key: Option<KvKey>,
    exhausted: bool,
}

impl KvIterator {
    pub(crate) fn new(store: KvStore, prefix: KvKey, batch_size: usize) -> Self {
        KvIterator {
            store,
            prefix,
            batch_size,
            page: VecDeque::new(),
            last_key: None,
            exhausted: false,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn fetch_page(&mut self) -> DocketResult<()> {
        let page = self
            .store
            .scan(&self.prefix, self.last_key.as_ref(), self.batch_size)?;
        if page.len() < self.batch_size {
            self.exhausted = true;
        }
        self.page.extend(page);
        Ok(())
    }
}

impl Iterator for KvIterator {
    type Item = DocketResult<KvEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page.is_empty() && !self.exhausted {
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }

        let entry = self.page.pop_front()?;
        self.last_key = Some(entry.key.clone());
        Some(Ok(entry))
    }
}

use docket::collection::Document;
use docket::doc;
use docket::docket::Docket;
use docket::errors::DocketResult;
use docket::store::{
    CommitResult, InMemoryKv, KvCheck, KvEntry, KvKey, KvMutation, KvStore, KvStoreProvider,
};
use rand::Rng;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Runs a test between a setup and a teardown step.
///
/// The teardown runs even when the test body fails or panics; the failure is
/// reported afterwards with the elapsed time.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> DocketResult<()>,
    B: Fn() -> DocketResult<TestContext>,
    A: Fn(TestContext) -> DocketResult<()>,
{
    let start_time = Instant::now();
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| test(ctx.clone())));
    let after_result = after(ctx);
    let elapsed = start_time.elapsed();

    match result {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            eprintln!("\n==================== TEST FAILED ====================");
            eprintln!("Failed after {:?}", elapsed);
            eprintln!("Error: {:?}", e);
            eprintln!("=====================================================\n");
            panic!("Test failed: {}", e);
        }
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            eprintln!("\n==================== TEST PANICKED ====================");
            eprintln!("Panicked after {:?}: {}", elapsed, err_msg);
            eprintln!("=======================================================\n");
            std::panic::resume_unwind(panic_err);
        }
    }

    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

#[derive(Clone)]
pub struct TestContext {
    name: String,
    db: Docket,
    kv: InMemoryKv,
    contended: Option<ContendedKv>,
}

impl TestContext {
    pub fn new(name: String, db: Docket, kv: InMemoryKv) -> Self {
        Self {
            name,
            db,
            kv,
            contended: None,
        }
    }

    /// A collection name unique to this context.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn db(&self) -> Docket {
        self.db.clone()
    }

    /// The in-memory store behind the database, for read and commit statistics.
    pub fn kv(&self) -> InMemoryKv {
        self.kv.clone()
    }

    /// The conflict-injecting wrapper, for contexts made by
    /// [create_contended_context].
    pub fn contended(&self) -> Option<ContendedKv> {
        self.contended.clone()
    }
}

pub fn random_name() -> String {
    format!("test_{}", uuid::Uuid::new_v4().simple())
}

pub fn create_test_context() -> DocketResult<TestContext> {
    let kv = InMemoryKv::new();
    let db = Docket::builder().store(KvStore::new(kv.clone())).open()?;
    Ok(TestContext::new(random_name(), db, kv))
}

/// Context whose store can be told to report conflicts, through
/// [TestContext::contended].
pub fn create_contended_context() -> DocketResult<TestContext> {
    let kv = InMemoryKv::new();
    let contended = ContendedKv::new(kv.clone());
    let db = Docket::builder()
        .store(KvStore::new(contended.clone()))
        .open()?;
    let mut ctx = TestContext::new(random_name(), db, kv);
    ctx.contended = Some(contended);
    Ok(ctx)
}

pub fn cleanup(ctx: TestContext) -> DocketResult<()> {
    if !ctx.db().is_closed()? {
        ctx.db().close()?;
    }
    Ok(())
}

pub fn create_test_docs() -> Vec<Document> {
    vec![
        doc! {
            first_name: "fn1",
            last_name: "ln1",
            birth_year: 1985,
            data: [1, 2, 3],
            list: ["one", "two", "three"],
            body: "a quick brown fox jump over the lazy dog",
        },
        doc! {
            first_name: "fn2",
            last_name: "ln2",
            birth_year: 1979,
            data: [3, 4, 3],
            list: ["three", "four", "five"],
            body: "quick hello world from docket",
        },
        doc! {
            first_name: "fn3",
            last_name: "ln2",
            birth_year: 2001,
            data: [9, 4, 8],
            list: ["four", "five", "six"],
            body: "Lorem ipsum dolor sit amet",
        },
    ]
}

/// Documents with a random `score` between 0 and 99 and a `group` cycling
/// through `g0`..`g4`.
pub fn create_random_docs(count: usize) -> Vec<Document> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            doc! {
                seq: i,
                score: (rng.gen_range(0..100i64)),
                group: (format!("g{}", i % 5)),
            }
        })
        .collect()
}

/// Store wrapper that turns conditional commits into conflicts while its
/// budget lasts, as if another writer always got there first.
///
/// Commits without checks are never affected.
#[derive(Clone)]
pub struct ContendedKv {
    inner: InMemoryKv,
    conflicts: Arc<AtomicU32>,
}

impl ContendedKv {
    pub fn new(inner: InMemoryKv) -> Self {
        ContendedKv {
            inner,
            conflicts: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Makes the next `count` conditional commits fail with a conflict.
    pub fn fail_next(&self, count: u32) {
        self.conflicts.store(count, Ordering::SeqCst);
    }

    /// Makes every conditional commit fail with a conflict.
    pub fn fail_always(&self) {
        self.fail_next(u32::MAX);
    }

    pub fn remaining(&self) -> u32 {
        self.conflicts.load(Ordering::SeqCst)
    }
}

impl KvStoreProvider for ContendedKv {
    fn get(&self, key: &KvKey) -> DocketResult<Option<KvEntry>> {
        self.inner.get(key)
    }

    fn scan(
        &self,
        prefix: &KvKey,
        start_after: Option<&KvKey>,
        limit: usize,
    ) -> DocketResult<Vec<KvEntry>> {
        self.inner.scan(prefix, start_after, limit)
    }

    fn commit(&self, checks: Vec<KvCheck>, mutations: Vec<KvMutation>) -> DocketResult<CommitResult> {
        if !checks.is_empty() {
            let taken = self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                    0 => None,
                    u32::MAX => Some(u32::MAX),
                    n => Some(n - 1),
                })
                .is_ok();
            if taken {
                log::debug!("Injected conflict for {} checks", checks.len());
                return Ok(CommitResult::Conflict);
            }
        }
        self.inner.commit(checks, mutations)
    }

    fn close(&self) -> DocketResult<()> {
        self.inner.close()
    }

    fn is_closed(&self) -> DocketResult<bool> {
        self.inner.is_closed()
    }
}

use docket::collection::{CollectionOptions, RetryPolicy, UpdateSpec, WriteOptions};
use docket::common::Value;
use docket::errors::ErrorKind;
use docket::query::{all, by_id};
use docket::{doc, query};
use docket_int_test::test_util::{cleanup, create_contended_context, create_test_context, run_test};

#[test]
fn test_update_retries_after_conflict() {
    run_test(
        create_contended_context,
        |ctx| {
            let contended = ctx.contended().unwrap();
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_one(doc! { _id: "c", n: 1 })?;

            contended.fail_next(2);
            let updated = coll.update_one(by_id("c"), UpdateSpec::fields().set("n", 2))?;
            assert_eq!(updated.and_then(|d| d.get("n").cloned()), Some(Value::from(2)));
            assert_eq!(contended.remaining(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_gives_up_after_max_attempts() {
    run_test(
        create_contended_context,
        |ctx| {
            let contended = ctx.contended().unwrap();
            let coll = ctx.db().collection_with_options(
                ctx.name(),
                CollectionOptions::new()
                    .update_retry_policy(RetryPolicy::RetryUntilSuccess { max_attempts: 3 }),
            )?;
            coll.insert_one(doc! { _id: "c", n: 1 })?;
            let commits = ctx.kv().commit_count();

            contended.fail_always();
            let err = coll
                .update_one(by_id("c"), UpdateSpec::fields().set("n", 2))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::RetryExhausted);
            assert_eq!(ctx.kv().commit_count(), commits);

            contended.fail_next(0);
            assert_eq!(coll.find_by_id("c")?.unwrap().get("n"), Some(&Value::from(1)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_single_attempt_skips_conflicting_documents() {
    run_test(
        create_contended_context,
        |ctx| {
            let contended = ctx.contended().unwrap();
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_many(vec![
                doc! { _id: "a", k: "x" },
                doc! { _id: "b", k: "x" },
            ])?;

            // deletes default to a single attempt
            contended.fail_next(1);
            let removed = coll.delete_many(query! { k: "x" })?;
            assert_eq!(removed.len(), 1);
            assert_eq!(coll.count(all())?, 1);

            contended.fail_next(1);
            let updated = coll.update_with_options(
                all(),
                UpdateSpec::fields().set("k", "y"),
                &WriteOptions::new().retry_policy(RetryPolicy::SingleAttempt),
            )?;
            assert!(updated.is_empty());
            assert_eq!(coll.count(query! { k: "x" })?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_retry_skips_documents_that_stop_matching() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_one(doc! { _id: "a", state: "open" })?;

            // the document is closed by another writer between the scan and the retry
            let writer = coll.clone();
            let spec = UpdateSpec::transform(move |doc| {
                if doc.get("state").and_then(|v| v.as_str()) == Some("open") {
                    writer.update_with_options(
                        by_id("a"),
                        UpdateSpec::fields().set("state", "closed"),
                        &WriteOptions::new().retry_policy(RetryPolicy::SingleAttempt),
                    )?;
                }
                Ok(doc)
            });

            let updated = coll.update_many(query! { state: "open" }, spec)?;
            assert!(updated.is_empty());
            assert_eq!(coll.count(query! { state: "closed" })?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_retry_policy() {
    run_test(
        create_test_context,
        |ctx| {
            let err = ctx
                .db()
                .collection_with_options(
                    ctx.name(),
                    CollectionOptions::new()
                        .delete_retry_policy(RetryPolicy::RetryUntilSuccess { max_attempts: 0 }),
                )
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_one(doc! { _id: "a" })?;
            let err = coll
                .delete_with_options(
                    all(),
                    &WriteOptions::new().retry_policy(RetryPolicy::RetryUntilSuccess { max_attempts: 0 }),
                )
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
            Ok(())
        },
        cleanup,
    )
}

use docket::collection::{CollectionOptions, Document, UpdateSpec, WriteOptions};
use docket::common::Value;
use docket::errors::ErrorKind;
use docket::query::{all, by_id, field};
use docket::{doc, query};
use docket_int_test::test_util::{cleanup, create_test_context, create_test_docs, run_test};

#[test]
fn test_update_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_many(create_test_docs())?;

            let updated = coll.update_many(
                query! { last_name: "ln2" },
                UpdateSpec::fields()
                    .set("last_name", "ln4")
                    .set("meta.reviewed", true)
                    .unset("body"),
            )?;
            assert_eq!(updated.len(), 2);

            assert_eq!(coll.count(query! { last_name: "ln2" })?, 0);
            let changed = coll.find_many(query! { last_name: "ln4" })?;
            assert_eq!(changed.len(), 2);
            for doc in changed {
                assert_eq!(doc.get_path("meta.reviewed"), Some(&Value::from(true)));
                assert!(doc.get("body").is_none());
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_one_affects_single_document() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_many(create_test_docs())?;

            let updated = coll.update_one(
                query! { last_name: "ln2" },
                UpdateSpec::fields().set("picked", true),
            )?;
            assert!(updated.is_some());
            assert_eq!(coll.count(query! { picked: true })?, 1);

            let none = coll.update_one(query! { last_name: "nobody" }, UpdateSpec::fields().set("x", 1))?;
            assert!(none.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_with_transform() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_one(doc! { _id: "c", hits: 1 })?;

            let bump = UpdateSpec::fields().apply("hits", |v| {
                v.and_then(|v| v.as_i64()).map(|n| Value::from(n + 1))
            });
            coll.update_one(by_id("c"), bump)?;

            let rename = UpdateSpec::transform(|mut doc: Document| {
                let hits = doc.remove("hits");
                doc.put("visits", hits)?;
                Ok(doc)
            });
            let updated = coll.update_one(by_id("c"), rename)?.unwrap();
            assert_eq!(updated.get("visits").and_then(|v| v.as_i64()), Some(2));
            assert!(updated.get("hits").is_none());
            assert_eq!(coll.find_by_id("c")?, Some(updated));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_cannot_change_id() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_one(doc! { _id: "fixed", v: 1 })?;

            let err = coll
                .update_one(by_id("fixed"), UpdateSpec::fields().set("_id", "moved"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);

            let err = coll
                .update_one(by_id("fixed"), UpdateSpec::fields().unset("_id"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);

            assert!(coll.find_by_id("moved")?.is_none());
            assert_eq!(coll.find_by_id("fixed")?.unwrap().get("v"), Some(&Value::from(1)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_runs_validator() {
    run_test(
        create_test_context,
        |ctx| {
            let options = CollectionOptions::new().validator(|doc: &Document| {
                if doc.contains_key("name") {
                    Ok(())
                } else {
                    Err(docket::errors::DocketError::new(
                        "name is required",
                        ErrorKind::ValidationError,
                    ))
                }
            });
            let coll = ctx.db().collection_with_options(ctx.name(), options)?;
            coll.insert_one(doc! { _id: "a", name: "A" })?;

            let err = coll
                .update_one(by_id("a"), UpdateSpec::fields().unset("name"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            assert!(coll.find_by_id("a")?.unwrap().contains_key("name"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_just_once() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            for i in 0..5 {
                coll.insert_one(doc! { kind: "job", n: i })?;
            }

            let updated = coll.update_with_options(
                query! { kind: "job" },
                UpdateSpec::fields().set("kind", "done"),
                &WriteOptions::just_once(),
            )?;
            assert_eq!(updated.len(), 1);
            assert_eq!(coll.count(query! { kind: "done" })?, 1);
            assert_eq!(coll.count(query! { kind: "job" })?, 4);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_with_document_replaces_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_one(doc! { _id: "p", a: 1, b: 2 })?;

            let updated = coll.update_many(all(), doc! { b: 3, c: 4 })?;
            assert_eq!(updated.len(), 1);
            let stored = coll.find_by_id("p")?.unwrap();
            assert_eq!(stored.get("a"), Some(&Value::from(1)));
            assert_eq!(stored.get("b"), Some(&Value::from(3)));
            assert_eq!(stored.get("c"), Some(&Value::from(4)));
            assert_eq!(coll.count(field("c").eq(4))?, 1);
            Ok(())
        },
        cleanup,
    )
}

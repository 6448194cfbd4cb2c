use docket::collection::CollectionOptions;
use docket::common::Value;
use docket::doc;
use docket::errors::ErrorKind;
use docket::query::all;
use docket_int_test::test_util::{cleanup, create_test_context, create_test_docs, run_test};

#[test]
fn test_insert() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection(ctx.name())?;

            let document = doc! {
                first_name: "John",
                last_name: "Doe",
                birth_year: 1990,
                data: [1, 2, 3],
                body: "This is a test document"
            };

            let inserted = collection.insert_one(document)?;
            assert!(inserted.id().is_some());

            let found = collection.find_many(all())?;
            assert_eq!(found.len(), 1);
            let stored = &found[0];
            assert_eq!(stored, &inserted);
            assert_eq!(stored.get("first_name").and_then(|v| v.as_str()), Some("John"));
            assert_eq!(stored.get("birth_year").and_then(|v| v.as_i64()), Some(1990));
            assert_eq!(
                stored.get("data"),
                Some(&Value::from(vec![1, 2, 3]))
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_keeps_given_id() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection(ctx.name())?;
            let inserted = collection.insert_one(doc! { _id: "user-1", name: "A" })?;
            assert_eq!(inserted.id(), Some("user-1"));
            assert_eq!(collection.find_by_id("user-1")?, Some(inserted));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_duplicate_id() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection(ctx.name())?;
            collection.insert_one(doc! { _id: "dup", n: 1 })?;

            let err = collection.insert_one(doc! { _id: "dup", n: 2 }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConflictError);

            let stored = collection.find_by_id("dup")?.unwrap();
            assert_eq!(stored.get("n").and_then(|v| v.as_i64()), Some(1));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_non_string_id() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection(ctx.name())?;
            let err = collection.insert_one(doc! { _id: 42 }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            assert_eq!(ctx.kv().len(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_batch() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection(ctx.name())?;
            let commits = ctx.kv().commit_count();

            let inserted = collection.insert_many(create_test_docs())?;
            assert_eq!(inserted.len(), 3);
            assert_eq!(ctx.kv().commit_count(), commits + 1);

            for document in collection.find(all()).iter()? {
                let document = document?;
                assert!(document.get("first_name").is_some());
                assert!(document.get("body").is_some());
                assert!(document.id().is_some());
            }
            assert_eq!(collection.count(all())?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_batch_is_all_or_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection_with_options(
                ctx.name(),
                CollectionOptions::new().index("email"),
            )?;
            collection.insert_one(doc! { _id: "taken", email: "t@x.com" })?;
            let before = ctx.kv().len();

            let batch = vec![
                doc! { _id: "fresh", email: "f@x.com" },
                doc! { _id: "taken", email: "again@x.com" },
            ];
            let err = collection.insert_many(batch).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConflictError);

            assert_eq!(ctx.kv().len(), before);
            assert!(collection.find_by_id("fresh")?.is_none());
            assert_eq!(collection.count(docket::query! { email: "f@x.com" })?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_batch_with_repeated_id() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection(ctx.name())?;
            let batch = vec![doc! { _id: "x", n: 1 }, doc! { _id: "x", n: 2 }];
            let err = collection.insert_many(batch).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConflictError);
            assert_eq!(collection.count(all())?, 0);

            assert!(collection.insert_many(vec![])?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_rejected_by_validator() {
    run_test(
        create_test_context,
        |ctx| {
            let options = CollectionOptions::new().validator(|doc: &docket::collection::Document| {
                match doc.get("age").and_then(|v| v.as_i64()) {
                    Some(age) if age >= 0 => Ok(()),
                    _ => Err(docket::errors::DocketError::new(
                        "age must be a non-negative integer",
                        ErrorKind::ValidationError,
                    )),
                }
            });
            let collection = ctx.db().collection_with_options(ctx.name(), options)?;

            collection.insert_one(doc! { age: 3 })?;
            let err = collection.insert_one(doc! { age: "three" }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            assert_eq!(collection.count(all())?, 1);
            Ok(())
        },
        cleanup,
    )
}

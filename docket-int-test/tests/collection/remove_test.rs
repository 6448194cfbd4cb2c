use docket::collection::{CollectionOptions, WriteOptions};
use docket::query::{all, by_id, field};
use docket::{doc, query};
use docket_int_test::test_util::{cleanup, create_test_context, create_test_docs, run_test};

#[test]
fn test_delete_many() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_many(create_test_docs())?;

            let removed = coll.delete_many(query! { last_name: "ln2" })?;
            assert_eq!(removed.len(), 2);
            assert_eq!(coll.count(all())?, 1);
            assert_eq!(coll.count(query! { last_name: "ln2" })?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_one_returns_document() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            let inserted = coll.insert_one(doc! { _id: "gone", v: 1 })?;

            assert_eq!(coll.delete_one(by_id("gone"))?, Some(inserted));
            assert_eq!(coll.delete_one(by_id("gone"))?, None);
            assert!(coll.find_by_id("gone")?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_just_once() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_many(create_test_docs())?;

            let removed = coll.delete_with_options(field("birth_year").matches(|v| v.is_some()), &WriteOptions::just_once())?;
            assert_eq!(removed.len(), 1);
            assert_eq!(coll.count(all())?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_removes_index_entries() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection_with_options(
                ctx.name(),
                CollectionOptions::new().indexes(&["first_name", "last_name"]),
            )?;
            coll.insert_many(create_test_docs())?;
            assert_eq!(ctx.kv().len(), 9);

            coll.delete_many(query! { first_name: "fn1" })?;
            assert_eq!(ctx.kv().len(), 6);
            assert_eq!(coll.count(query! { last_name: "ln1" })?, 0);

            assert_eq!(coll.drop_all()?, 2);
            assert!(ctx.kv().is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_destroy_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection(ctx.name())?;
            coll.insert_many(create_test_docs())?;
            let other = db.collection("other")?;
            other.insert_one(doc! { keep: true })?;

            assert_eq!(db.destroy_collection(ctx.name())?, 3);
            assert!(!db.has_collection(ctx.name()));
            assert_eq!(db.destroy_collection("never_opened")?, 0);
            assert_eq!(other.count(all())?, 1);
            assert_eq!(ctx.kv().len(), 1);
            Ok(())
        },
        cleanup,
    )
}

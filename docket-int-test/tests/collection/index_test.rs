use docket::collection::{CollectionOptions, Document};
use docket::common::Value;
use docket::errors::ErrorKind;
use docket::query::{all, field, where_doc};
use docket::{doc, kv_key, query};
use docket_int_test::test_util::{cleanup, create_random_docs, create_test_context, run_test};

fn ids(mut docs: Vec<Document>) -> Vec<String> {
    docs.sort_by(|a, b| a.id().cmp(&b.id()));
    docs.iter().filter_map(|d| d.id().map(String::from)).collect()
}

#[test]
fn test_index_scan_matches_full_scan() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection_with_options(
                ctx.name(),
                CollectionOptions::new().indexes(&["group", "score"]),
            )?;
            coll.insert_many(create_random_docs(60))?;

            for group in ["g0", "g3", "g9"] {
                let indexed = coll.find(query! { group: group });
                assert!(indexed.find_plan().is_index_scan());

                let wanted = group.to_string();
                let scanned = coll.find(where_doc(move |d| {
                    d.get("group").and_then(|v| v.as_str()) == Some(wanted.as_str())
                }));
                assert!(scanned.find_plan().is_full_scan());

                assert_eq!(ids(indexed.get_many()?), ids(scanned.get_many()?));
            }

            let by_score = coll.find(query! { score: 42 }).get_many()?;
            let scanned = coll
                .find(field("score").matches(|v| v.and_then(Value::as_i64) == Some(42)))
                .get_many()?;
            assert_eq!(ids(by_score), ids(scanned));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_index_scan_reads_only_matching_entries() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection_with_options(
                ctx.name(),
                CollectionOptions::new().index("email"),
            )?;
            for i in 0..50 {
                coll.insert_one(doc! { email: (format!("user{}@x.com", i)) })?;
            }

            ctx.kv().reset_stats();
            let found = coll.find_many(query! { email: "user7@x.com" })?;
            assert_eq!(found.len(), 1);
            assert!(ctx.kv().entries_read() <= 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_index_entries_follow_updates_and_deletes() {
    run_test(
        create_test_context,
        |ctx| {
            let name = ctx.name().to_string();
            let coll = ctx.db().collection_with_options(
                &name,
                CollectionOptions::new().indexes(&["email", "city"]),
            )?;
            coll.insert_one(doc! { _id: "u1", email: "old@x.com", city: "Oslo" })?;
            assert_eq!(ctx.kv().len(), 3);

            coll.update_one(
                query! { email: "old@x.com" },
                docket::collection::UpdateSpec::fields().set("email", "new@x.com"),
            )?;
            assert_eq!(coll.count(query! { email: "old@x.com" })?, 0);
            assert_eq!(coll.count(query! { email: "new@x.com" })?, 1);
            assert_eq!(ctx.kv().len(), 3);

            let stale = ctx.db().store().get(&kv_key![name.as_str(), "email", "old@x.com", "u1"])?;
            assert!(stale.is_none());

            // the unchanged city entry carries the updated document
            let city = ctx
                .db()
                .store()
                .get(&kv_key![name.as_str(), "city", "Oslo", "u1"])?
                .unwrap();
            let doc = city.value.as_document().unwrap();
            assert_eq!(doc.get("email").and_then(|v| v.as_str()), Some("new@x.com"));

            coll.delete_one(query! { city: "Oslo" })?;
            assert_eq!(ctx.kv().len(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unindexable_value_is_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection_with_options(
                ctx.name(),
                CollectionOptions::new().index("tag"),
            )?;
            let err = coll.insert_one(doc! { tag: ["a", "b"] }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            assert_eq!(ctx.kv().len(), 0);

            // documents without the field are not indexed
            coll.insert_one(doc! { other: 1 })?;
            assert_eq!(ctx.kv().len(), 1);
            assert_eq!(coll.count(all())?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_index_definitions() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            for options in [
                CollectionOptions::new().index("_id"),
                CollectionOptions::new().index("a.b"),
                CollectionOptions::new().indexes(&["a", "a"]),
                CollectionOptions::new().indexes(&["a", "b", "c", "d", "e", "f", "g"]),
            ] {
                let err = db.collection_with_options(ctx.name(), options).unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
            }
            assert!(!db.has_collection(ctx.name()));

            db.collection_with_options(ctx.name(), CollectionOptions::new().index("a"))?;
            let err = db
                .collection_with_options(ctx.name(), CollectionOptions::new().index("b"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
            Ok(())
        },
        cleanup,
    )
}

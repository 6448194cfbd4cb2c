use docket::collection::CollectionOptions;
use docket::common::Value;
use docket::errors::ErrorKind;
use docket::query::{all, by_id, field, where_doc, QueryValue};
use docket::{doc, query};
use docket_int_test::test_util::{cleanup, create_test_context, create_test_docs, run_test};

#[test]
fn test_find_all() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_many(create_test_docs())?;

            assert_eq!(coll.find(all()).count()?, 3);
            assert_eq!(coll.find(query! {}).count()?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_literal_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_many(create_test_docs())?;

            assert_eq!(coll.count(query! { last_name: "ln2" })?, 2);
            assert_eq!(coll.count(query! { last_name: "ln2", first_name: "fn3" })?, 1);
            assert_eq!(coll.count(query! { birth_year: 1985 })?, 1);
            assert_eq!(coll.count(query! { birth_year: 1985.0 })?, 0);
            assert_eq!(coll.count(field("first_name").eq("nobody"))?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_users_by_email() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection_with_options(
                ctx.name(),
                CollectionOptions::new().index("email"),
            )?;
            let alice = users.insert_one(doc! { name: "Alice", email: "alice@x.com", age: 31 })?;
            users.insert_one(doc! { name: "Bob", email: "bob@x.com", age: 27 })?;
            users.insert_one(doc! { name: "Eve" })?;

            let cursor = users.find(query! { email: "alice@x.com" });
            assert!(cursor.find_plan().is_index_scan());
            assert_eq!(cursor.get_one()?, Some(alice.clone()));

            // a literal on an indexed field still has to match the rest
            assert_eq!(users.count(query! { email: "alice@x.com", age: 30 })?, 0);

            let missing = users.find(field("email").is_absent());
            assert!(missing.find_plan().is_full_scan());
            let names: Vec<String> = missing
                .get_many()?
                .iter()
                .filter_map(|d| d.get("name").and_then(|v| v.as_str()).map(String::from))
                .collect();
            assert_eq!(names, vec!["Eve"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_by_id() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            let doc = coll.insert_one(doc! { _id: "k1", v: 1 })?;
            coll.insert_one(doc! { _id: "k2", v: 2 })?;

            let cursor = coll.find(by_id("k1"));
            assert!(cursor.find_plan().is_point_lookup());
            assert_eq!(cursor.get_many()?, vec![doc]);

            assert_eq!(coll.count(query! { _id: "k2", v: 1 })?, 0);
            assert_eq!(coll.count(query! { _id: 1 })?, 0);
            assert_eq!(coll.count(field("_id").is_absent())?, 0);
            assert!(coll.find_by_id("nope")?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_by_nested_path() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_one(doc! { name: "a", address: { city: "Oslo", zip: "0150" } })?;
            coll.insert_one(doc! { name: "b", address: { city: "Bergen" } })?;
            coll.insert_one(doc! { name: "c", address: "unknown" })?;

            assert_eq!(coll.count(query! { "address.city": "Oslo" })?, 1);
            assert_eq!(coll.count(query! { address: (doc! { city: "Bergen" }) })?, 1);
            assert_eq!(coll.count(field("address.zip").is_absent())?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_contains_and_list_equality() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_many(create_test_docs())?;

            assert_eq!(coll.count(field("list").contains(vec!["four"]))?, 2);
            assert_eq!(coll.count(field("list").contains(vec!["five", "three"]))?, 1);
            assert_eq!(coll.count(field("list").contains(vec!["seven"]))?, 0);

            // a list literal is ordered equality, not containment
            assert_eq!(coll.count(field("data").eq(vec![1, 2, 3]))?, 1);
            assert_eq!(coll.count(field("data").eq(vec![3, 2, 1]))?, 0);
            assert_eq!(coll.count(field("data").eq(vec![1, 2]))?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_operators() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            coll.insert_many(create_test_docs())?;

            assert_eq!(coll.count(field("body").regex("quick")?)?, 2);
            assert_eq!(coll.count(field("body").regex("^quick")?)?, 1);

            let born_before_1990 = field("birth_year")
                .matches(|v| v.and_then(Value::as_i64).map(|y| y < 1990).unwrap_or(false));
            assert_eq!(coll.count(born_before_1990)?, 2);

            let with_predicate = where_doc(|d| d.get("data").and_then(|v| v.as_list()).map(|l| l.len()) == Some(3));
            assert_eq!(coll.count(with_predicate)?, 3);

            let null_query = field("first_name").is(QueryValue::Null);
            assert_eq!(coll.count(null_query)?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_invalid_regex() {
    run_test(
        create_test_context,
        |_ctx| {
            let err = field("body").regex("(unclosed").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            Ok(())
        },
        cleanup,
    )
}

use docket::common::{SortOrder, SortSpec};
use docket::doc;
use docket::query::{all, field};
use docket_int_test::test_util::{cleanup, create_test_context, run_test};

fn seqs(docs: &[docket::collection::Document]) -> Vec<i64> {
    docs.iter()
        .filter_map(|d| d.get("seq").and_then(|v| v.as_i64()))
        .collect()
}

#[test]
fn test_skip_and_limit_read_a_bounded_prefix() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            for i in 0..40 {
                coll.insert_one(doc! { _id: (format!("{:03}", i)), seq: i })?;
            }

            let cursor = coll.find(all()).skip(10).limit(5);
            assert_eq!(cursor.required_fetch_count(), Some(15));

            ctx.kv().reset_stats();
            let page = cursor.get_many()?;
            assert_eq!(seqs(&page), vec![10, 11, 12, 13, 14]);
            assert!(ctx.kv().entries_read() <= 15);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_reads_every_candidate() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            for i in 0..12 {
                coll.insert_one(doc! { seq: i, parity: (i % 2) })?;
            }

            let cursor = coll
                .find(all())
                .sort(("seq", SortOrder::Descending))
                .limit(3);
            assert_eq!(cursor.required_fetch_count(), None);

            ctx.kv().reset_stats();
            assert_eq!(seqs(&cursor.get_many()?), vec![11, 10, 9]);
            assert_eq!(ctx.kv().entries_read(), 12);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_limit_before_sort_reads_every_candidate() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            for i in 0..12 {
                coll.insert_one(doc! { _id: (format!("{:02}", i)), seq: i })?;
            }

            let cursor = coll
                .find(all())
                .limit(3)
                .sort(("seq", SortOrder::Descending));
            assert_eq!(cursor.required_fetch_count(), None);

            ctx.kv().reset_stats();
            assert_eq!(seqs(&cursor.get_many()?), vec![2, 1, 0]);
            assert_eq!(ctx.kv().entries_read(), 12);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_operations_apply_in_order() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            for i in 0..10 {
                coll.insert_one(doc! { _id: (format!("{:02}", i)), seq: i })?;
            }

            // limit first: the three smallest ids, then sorted descending
            let limited_then_sorted = coll
                .find(all())
                .limit(3)
                .sort(("seq", SortOrder::Descending))
                .get_many()?;
            assert_eq!(seqs(&limited_then_sorted), vec![2, 1, 0]);

            // sort first: the three largest values
            let sorted_then_limited = coll
                .find(all())
                .sort(("seq", SortOrder::Descending))
                .limit(3)
                .get_many()?;
            assert_eq!(seqs(&sorted_then_limited), vec![9, 8, 7]);

            let skipped_twice = coll.find(all()).skip(2).skip(3).limit(2).get_many()?;
            assert_eq!(seqs(&skipped_twice), vec![5, 6]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_multi_field_sort() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            for i in 0..6 {
                coll.insert_one(doc! { seq: i, parity: (i % 2) })?;
            }
            coll.insert_one(doc! { seq: 100 })?;

            let spec = SortSpec::by("parity", SortOrder::Ascending)
                .then("seq", SortOrder::Descending);
            let sorted = coll.find(field("seq").matches(|v| v.is_some())).sort(spec).get_many()?;
            // documents missing the sort field come first
            assert_eq!(seqs(&sorted), vec![100, 4, 2, 0, 5, 3, 1]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_get_one_count_and_iter() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.db().collection(ctx.name())?;
            for i in 0..7 {
                coll.insert_one(doc! { _id: (format!("{}", i)), seq: i })?;
            }

            let cursor = coll.find(all()).skip(2);
            assert_eq!(cursor.count()?, 5);
            assert_eq!(seqs(&[cursor.get_one()?.unwrap()]), vec![2]);

            let streamed: Vec<_> = coll
                .find(all())
                .limit(4)
                .iter()?
                .collect::<Result<_, _>>()?;
            assert_eq!(seqs(&streamed), vec![0, 1, 2, 3]);

            assert_eq!(coll.find(all()).limit(0).get_many()?.len(), 0);
            assert!(coll.find(all()).skip(100).get_one()?.is_none());
            Ok(())
        },
        cleanup,
    )
}

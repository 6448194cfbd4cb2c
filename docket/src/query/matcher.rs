use crate::common::{num_eq_float, Value};
use crate::query::QueryValue;

/// Tests a document value against a query value.
///
/// This is the single comparison rule set of the engine; list elements and nested
/// map values are compared with it recursively.
///
/// - `Absent` matches only an absent value
/// - a literal never matches an absent value
/// - scalars use strict per-kind equality, with NaN matching NaN
/// - `Predicate` is called with the value (absent included)
/// - `Regex` matches a string value the expression finds a match in
/// - `List` requires a list of equal length matched positionally
/// - `Map` requires a map holding a match for every query key
/// - `Contains` requires a list holding a match for every query item
pub fn match_value(query: &QueryValue, value: Option<&Value>) -> bool {
    match query {
        QueryValue::Absent => value.is_none(),
        QueryValue::Predicate(predicate) => predicate(value),
        _ => match value {
            None => false,
            Some(value) => match_present(query, value),
        },
    }
}

fn match_present(query: &QueryValue, value: &Value) -> bool {
    match (query, value) {
        (QueryValue::Null, Value::Null) => true,
        (QueryValue::Bool(a), Value::Bool(b)) => a == b,
        (QueryValue::Integer(a), Value::Integer(b)) => a == b,
        (QueryValue::Number(a), Value::Number(b)) => num_eq_float(*a, *b),
        (QueryValue::String(a), Value::String(b)) => a == b,
        (QueryValue::Bytes(a), Value::Bytes(b)) => a == b,
        (QueryValue::Regex(re), Value::String(s)) => re.is_match(s),
        (QueryValue::List(items), Value::List(values)) => {
            items.len() == values.len()
                && items
                    .iter()
                    .zip(values.iter())
                    .all(|(item, value)| match_value(item, Some(value)))
        }
        (QueryValue::Map(fields), Value::Map(doc)) => fields
            .iter()
            .all(|(key, item)| match_value(item, doc.get(key))),
        (QueryValue::Contains(items), Value::List(values)) => items
            .iter()
            .all(|item| values.iter().any(|value| match_value(item, Some(value)))),
        _ => false,
    }
}

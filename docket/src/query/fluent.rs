use crate::collection::Document;
use crate::common::{Value, DOC_ID};
use crate::errors::DocketResult;
use crate::query::{Query, QueryValue};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::Arc;

/// Creates a fluent query builder for the specified field.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::query::field;
///
/// let by_email = field("email").eq("a@x.com");
/// let missing_phone = field("phone").is_absent();
/// let adults = field("age").matches(|v| v.and_then(|v| v.as_i64()).map_or(false, |a| a >= 18));
/// let combined = by_email.and(adults);
/// ```
pub fn field(field_name: &str) -> FluentQuery {
    FluentQuery {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder producing a single-field [Query].
pub struct FluentQuery {
    field_name: String,
}

impl FluentQuery {
    /// Matches documents whose field equals the value (strict per-kind equality).
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Query {
        self.bind(QueryValue::from(value.into()))
    }

    /// Matches documents where the field is missing.
    #[inline]
    pub fn is_absent(self) -> Query {
        self.bind(QueryValue::Absent)
    }

    /// Matches documents for which the predicate returns true; the predicate
    /// receives `None` when the field is missing.
    pub fn matches<F>(self, predicate: F) -> Query
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        self.bind(QueryValue::predicate(predicate))
    }

    /// Matches string fields the regular expression finds a match in.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the pattern does not compile.
    pub fn regex(self, pattern: &str) -> DocketResult<Query> {
        let regex = Regex::new(pattern)?;
        Ok(self.bind(QueryValue::Regex(regex)))
    }

    /// Matches list fields holding an element equal to every given value, in any order.
    pub fn contains<T: Into<Value>>(self, values: Vec<T>) -> Query {
        let items = values
            .into_iter()
            .map(|v| QueryValue::from(v.into()))
            .collect();
        self.bind(QueryValue::Contains(items))
    }

    /// Binds an arbitrary query value to the field.
    pub fn is(self, value: QueryValue) -> Query {
        self.bind(value)
    }

    fn bind(self, value: QueryValue) -> Query {
        let mut fields = IndexMap::with_capacity(1);
        fields.insert(self.field_name, value);
        Query::Fields(fields)
    }
}

/// Matches every document.
pub fn all() -> Query {
    Query::All
}

/// Matches the document with the given `_id`.
pub fn by_id(id: &str) -> Query {
    field(DOC_ID).eq(id)
}

/// Matches documents for which the function returns true.
pub fn where_doc<F>(predicate: F) -> Query
where
    F: Fn(&Document) -> bool + Send + Sync + 'static,
{
    Query::Predicate(Arc::new(predicate))
}

/// Creates a field-map [Query] from `field: value` pairs.
///
/// Values are converted with `QueryValue::from`, so literals, [Value]s and
/// explicit [QueryValue] operators can be mixed.
///
/// # Examples
///
/// ```rust
/// use docket::query;
/// use docket::query::QueryValue;
///
/// let q = query! { status: "active", phone: (QueryValue::Absent) };
/// ```
#[macro_export]
macro_rules! query {
    () => {
        $crate::query::Query::All
    };

    ($($key:tt : $value:expr),* $(,)?) => {
        {
            let mut fields = $crate::indexmap::IndexMap::new();
            $(
                fields.insert(
                    $crate::collection::normalize(stringify!($key)),
                    $crate::query::QueryValue::from($value),
                );
            )*
            $crate::query::Query::Fields(fields)
        }
    };
}

use im::OrdMap;

use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use std::fmt::{Debug, Display, Formatter};

/// Represents a document stored in a collection.
///
/// A document is an ordered map from field name to [Value]. Nested documents are
/// stored as [Value::Map]. The reserved field `_id` holds the document identity; it
/// is assigned at insert time when absent and never changes afterwards.
///
/// Field names stored in a collection must be non-empty and must not contain `.`,
/// which is reserved for addressing nested fields (`"address.city"`) through
/// [Document::get_path], [Document::set_path] and [Document::remove_path].
///
/// ## Persistent storage
///
/// Fields live in an `im::OrdMap`, so cloning a document is O(1) and a mutated
/// clone shares structure with its original.
#[derive(Clone, Eq, PartialEq, Default, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified value with the specified top-level key.
    ///
    /// The key is stored as given; use [Document::set_path] to address a nested field.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the key is empty.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> DocketResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocketError::new(
                "Document does not support empty key",
                ErrorKind::ValidationError,
            ));
        }

        self.data.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Returns the value of a top-level field, `None` when absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Removes a top-level field and returns its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the value at a dotted path such as `"address.city"`.
    ///
    /// Every intermediate segment must resolve to a nested map; otherwise the
    /// value is absent.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split(FIELD_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.data.get(first)?;
        for segment in segments {
            current = current.as_document()?.data.get(segment)?;
        }
        Some(current)
    }

    /// Sets the value at a dotted path, creating intermediate maps as needed.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if a segment is empty or an intermediate
    /// segment holds a value that is not a map.
    pub fn set_path<T: Into<Value>>(&mut self, path: &str, value: T) -> DocketResult<()> {
        let segments: Vec<&str> = path.split(FIELD_SEPARATOR).collect();
        self.deep_put(&segments, value.into())
    }

    /// Removes the value at a dotted path and returns it.
    ///
    /// Removing through a missing or non-map intermediate is a no-op.
    pub fn remove_path(&mut self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.split(FIELD_SEPARATOR).collect();
        self.deep_remove(&segments)
    }

    /// Returns the value of `_id`, whatever its kind.
    pub fn id_value(&self) -> Option<&Value> {
        self.data.get(DOC_ID)
    }

    /// Returns the document id when it is present and a string.
    pub fn id(&self) -> Option<&str> {
        self.id_value().and_then(|v| v.as_str())
    }

    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    fn deep_put(&mut self, segments: &[&str], value: Value) -> DocketResult<()> {
        let key = match segments.first() {
            Some(key) if !key.is_empty() => *key,
            _ => {
                log::error!("Document does not support empty key");
                return Err(DocketError::new(
                    "Document does not support empty key",
                    ErrorKind::ValidationError,
                ));
            }
        };

        if segments.len() == 1 {
            return self.put(key, value);
        }

        let mut nested = match self.data.get(key) {
            Some(Value::Map(doc)) => doc.clone(),
            None | Some(Value::Null) => Document::new(),
            Some(other) => {
                log::error!(
                    "Cannot address nested field {} through a {} value",
                    segments.join("."),
                    other.kind_name()
                );
                return Err(DocketError::new(
                    &format!(
                        "Cannot address nested field {} through a {} value",
                        segments.join("."),
                        other.kind_name()
                    ),
                    ErrorKind::ValidationError,
                ));
            }
        };

        nested.deep_put(&segments[1..], value)?;
        self.data.insert(key.to_string(), Value::Map(nested));
        Ok(())
    }

    fn deep_remove(&mut self, segments: &[&str]) -> Option<Value> {
        let key = *segments.first()?;
        if segments.len() == 1 {
            return self.data.remove(key);
        }

        let mut nested = self.data.get(key)?.as_document()?.clone();
        let removed = nested.deep_remove(&segments[1..]);
        if removed.is_some() {
            self.data.insert(key.to_string(), Value::Map(nested));
        }
        removed
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: ", key)?;
            value.write_json(f)?;
        }
        write!(f, "}}")
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Document {}", self)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// # Examples
///
/// ```rust
/// use docket::doc;
///
/// let empty = doc!{};
///
/// let user = doc!{
///     name: "Alice",
///     "email": "alice@example.com",
///     address: {
///         city: "Oslo",
///         tags: ["home", "primary"]
///     },
///     score: (40 + 2)
/// };
/// assert_eq!(user.get_path("address.city").and_then(|v| v.as_str()), Some("Oslo"));
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            let mut doc = $crate::collection::Document::new();
            $(
                doc.put(&$crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro converting values for the [doc!] macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Map($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::List(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

use crate::collection::Document;
use crate::common::Value;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use indexmap::IndexMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Whole-document update function.
pub type DocumentTransform = Arc<dyn Fn(Document) -> DocketResult<Document> + Send + Sync>;

/// Field update function; receives the current value (`None` if absent) and
/// returns the new one (`None` removes the field).
pub type FieldTransform = Arc<dyn Fn(Option<&Value>) -> Option<Value> + Send + Sync>;

/// Change applied to a single field.
#[derive(Clone)]
pub enum UpdateField {
    Set(Value),
    Unset,
    Transform(FieldTransform),
}

impl Debug for UpdateField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateField::Set(value) => write!(f, "Set({})", value),
            UpdateField::Unset => write!(f, "Unset"),
            UpdateField::Transform(_) => write!(f, "Transform(..)"),
        }
    }
}

/// Describes how an update changes each matched document.
///
/// Either a whole-document transform or a map from field path to
/// [UpdateField]. Paths may be dotted (`"address.city"`); intermediate maps are
/// created when missing. The `_id` of a document can never change.
///
/// # Examples
///
/// ```rust,ignore
/// let spec = UpdateSpec::fields()
///     .set("email", "new@x.com")
///     .unset("phone")
///     .apply("visits", |v| Some(Value::from(v.and_then(|v| v.as_i64()).unwrap_or(0) + 1)));
///
/// let spec = UpdateSpec::transform(|mut doc| {
///     doc.put("checked", true)?;
///     Ok(doc)
/// });
/// ```
#[derive(Clone)]
pub enum UpdateSpec {
    Document(DocumentTransform),
    Fields(IndexMap<String, UpdateField>),
}

impl UpdateSpec {
    /// An update replacing each document with the function's result.
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(Document) -> DocketResult<Document> + Send + Sync + 'static,
    {
        UpdateSpec::Document(Arc::new(f))
    }

    /// An empty field-map update to extend with [UpdateSpec::set],
    /// [UpdateSpec::unset] and [UpdateSpec::apply].
    pub fn fields() -> Self {
        UpdateSpec::Fields(IndexMap::new())
    }

    pub fn set<T: Into<Value>>(self, path: &str, value: T) -> Self {
        self.with_field(path, UpdateField::Set(value.into()))
    }

    pub fn unset(self, path: &str) -> Self {
        self.with_field(path, UpdateField::Unset)
    }

    pub fn apply<F>(self, path: &str, f: F) -> Self
    where
        F: Fn(Option<&Value>) -> Option<Value> + Send + Sync + 'static,
    {
        self.with_field(path, UpdateField::Transform(Arc::new(f)))
    }

    fn with_field(self, path: &str, field: UpdateField) -> Self {
        match self {
            UpdateSpec::Fields(mut fields) => {
                fields.insert(path.to_string(), field);
                UpdateSpec::Fields(fields)
            }
            UpdateSpec::Document(transform) => {
                // a field change after a whole-document transform runs on its output
                let path = path.to_string();
                UpdateSpec::Document(Arc::new(move |doc: Document| {
                    let mut doc = transform(doc)?;
                    apply_field(&path, &field, &mut doc)?;
                    Ok(doc)
                }))
            }
        }
    }

    /// Produces the updated copy of `doc`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the update would change `_id` or addresses
    /// a nested field through a non-map value, or whatever the transform returns.
    pub(crate) fn apply_to(&self, doc: &Document) -> DocketResult<Document> {
        let updated = match self {
            UpdateSpec::Document(transform) => transform(doc.clone())?,
            UpdateSpec::Fields(fields) => apply_fields(fields, doc.clone())?,
        };

        if updated.id_value() != doc.id_value() {
            log::error!(
                "Update would change _id of document {:?}",
                doc.id_value().map(|v| v.to_string())
            );
            return Err(DocketError::new(
                "Document _id cannot be changed by an update",
                ErrorKind::ValidationError,
            ));
        }
        Ok(updated)
    }
}

fn apply_fields(fields: &IndexMap<String, UpdateField>, mut doc: Document) -> DocketResult<Document> {
    for (path, field) in fields {
        apply_field(path, field, &mut doc)?;
    }
    Ok(doc)
}

fn apply_field(path: &str, field: &UpdateField, doc: &mut Document) -> DocketResult<()> {
    match field {
        UpdateField::Set(value) => doc.set_path(path, value.clone()),
        UpdateField::Unset => {
            doc.remove_path(path);
            Ok(())
        }
        UpdateField::Transform(transform) => match transform(doc.get_path(path)) {
            Some(value) => doc.set_path(path, value),
            None => {
                doc.remove_path(path);
                Ok(())
            }
        },
    }
}

impl Debug for UpdateSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateSpec::Document(_) => write!(f, "Document(..)"),
            UpdateSpec::Fields(fields) => f.debug_map().entries(fields.iter()).finish(),
        }
    }
}

impl From<Document> for UpdateSpec {
    /// Sets every top-level field of the document.
    fn from(doc: Document) -> Self {
        UpdateSpec::Fields(
            doc.iter()
                .map(|(k, v)| (k.clone(), UpdateField::Set(v.clone())))
                .collect(),
        )
    }
}

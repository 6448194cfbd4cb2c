use crate::collection::Document;
use crate::common::{Value, FIELD_SEPARATOR};
use crate::errors::{DocketError, DocketResult, ErrorKind};

/// Checks that a document can be persisted.
///
/// `_id` must be present and a string. Every field name, at every nesting depth
/// (including maps inside lists), must be non-empty and must not contain `.`.
pub(crate) fn sanitize_document(doc: &Document) -> DocketResult<()> {
    match doc.id_value() {
        Some(Value::String(_)) => {}
        Some(other) => {
            log::error!("Document _id must be a string, found {}", other.kind_name());
            return Err(DocketError::new(
                &format!("Document _id must be a string, found {}", other.kind_name()),
                ErrorKind::ValidationError,
            ));
        }
        None => {
            log::error!("Document has no _id");
            return Err(DocketError::new(
                "Document has no _id",
                ErrorKind::ValidationError,
            ));
        }
    }

    sanitize_fields(doc, "")
}

fn sanitize_fields(doc: &Document, parent: &str) -> DocketResult<()> {
    for (name, value) in doc.iter() {
        validate_field_name(name, parent)?;
        let path = if parent.is_empty() {
            name.clone()
        } else {
            format!("{}{}{}", parent, FIELD_SEPARATOR, name)
        };
        sanitize_value(value, &path)?;
    }
    Ok(())
}

fn sanitize_value(value: &Value, path: &str) -> DocketResult<()> {
    match value {
        Value::Map(doc) => sanitize_fields(doc, path),
        Value::List(items) => items.iter().try_for_each(|item| sanitize_value(item, path)),
        _ => Ok(()),
    }
}

fn validate_field_name(name: &str, parent: &str) -> DocketResult<()> {
    if name.is_empty() {
        log::error!("Empty field name under '{}'", parent);
        return Err(DocketError::new(
            &format!("Field name must not be empty (under '{}')", parent),
            ErrorKind::ValidationError,
        ));
    }

    if name.contains(FIELD_SEPARATOR) {
        log::error!("Field name '{}' contains '{}'", name, FIELD_SEPARATOR);
        return Err(DocketError::new(
            &format!(
                "Field name '{}' must not contain '{}'",
                name, FIELD_SEPARATOR
            ),
            ErrorKind::ValidationError,
        ));
    }
    Ok(())
}

/// Returns the `_id` of a sanitized document.
pub(crate) fn document_id(doc: &Document) -> DocketResult<&str> {
    doc.id().ok_or_else(|| {
        log::error!("Document has no string _id");
        DocketError::new("Document has no string _id", ErrorKind::ValidationError)
    })
}

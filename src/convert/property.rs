// src/convert/property.rs
//! Raw text to typed values, one property at a time.
//!
//! Pure and synchronous: no registry, no I/O. The caller supplies the
//! definition; a value that does not fit it is a `MalformedProperty`.

use crate::constants::{BOOLEAN_FALSE, BOOLEAN_TRUE};
use crate::error::AppError;
use crate::model::{PropertyValue, RawValue, TypedValue};
use crate::types::{Cardinality, PropertyDefinition, PropertyId, PropertyType};
use chrono::{DateTime, TimeZone, Utc};
use url::Url;

/// Converts one raw value according to its definition.
pub fn convert_value(
    raw: &RawValue,
    definition: &PropertyDefinition,
) -> Result<PropertyValue, AppError> {
    let id = &definition.id;
    let ty = definition.property_type;

    match (definition.cardinality, raw) {
        (_, RawValue::Absent) => Ok(PropertyValue::Absent),

        (Cardinality::Single, RawValue::Scalar(text)) => {
            parse_typed(text, ty, id).map(PropertyValue::Single)
        }
        (Cardinality::Single, RawValue::Multi(values)) => match values.as_slice() {
            [] => Ok(PropertyValue::Absent),
            [only] => {
                log::debug!("Unwrapping one-element sequence for single-valued '{}'", id);
                parse_typed(only, ty, id).map(PropertyValue::Single)
            }
            _ => Err(AppError::malformed(
                id,
                format!("expected a single value, got {} values", values.len()),
            )),
        },

        (Cardinality::Multi, RawValue::Scalar(_)) => Err(AppError::malformed(
            id,
            "expected a sequence of values, got a single value",
        )),
        (Cardinality::Multi, RawValue::Multi(values)) => values
            .iter()
            .map(|text| parse_typed(text, ty, id))
            .collect::<Result<Vec<_>, _>>()
            .map(PropertyValue::Multi),
    }
}

/// Parses one textual value as `ty`.
pub fn parse_typed(text: &str, ty: PropertyType, id: &PropertyId) -> Result<TypedValue, AppError> {
    match ty {
        PropertyType::String => Ok(TypedValue::String(text.to_string())),
        PropertyType::Id => Ok(TypedValue::Id(text.to_string())),
        PropertyType::Html => Ok(TypedValue::Html(text.to_string())),
        PropertyType::Integer => text
            .parse::<i64>()
            .map(TypedValue::Integer)
            .map_err(|e| AppError::malformed(id, format!("not an integer: {:?} ({})", text, e))),
        PropertyType::Decimal => parse_decimal(text, id).map(TypedValue::Decimal),
        PropertyType::Boolean => match text {
            BOOLEAN_TRUE => Ok(TypedValue::Boolean(true)),
            BOOLEAN_FALSE => Ok(TypedValue::Boolean(false)),
            other => Err(AppError::malformed(
                id,
                format!("expected 'true' or 'false', got {:?}", other),
            )),
        },
        PropertyType::DateTime => parse_datetime(text, id).map(TypedValue::DateTime),
        PropertyType::Uri => Url::parse(text)
            .map(TypedValue::Uri)
            .map_err(|e| AppError::malformed(id, format!("not a URI: {:?} ({})", text, e))),
    }
}

fn parse_decimal(text: &str, id: &PropertyId) -> Result<f64, AppError> {
    let value = text
        .parse::<f64>()
        .map_err(|e| AppError::malformed(id, format!("not a decimal: {:?} ({})", text, e)))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AppError::malformed(
            id,
            format!("decimal must be finite, got {:?}", text),
        ))
    }
}

/// RFC 3339, or epoch milliseconds as sent by the JSON binding.
fn parse_datetime(text: &str, id: &PropertyId) -> Result<DateTime<Utc>, AppError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(parsed) = text
            .parse::<i64>()
            .ok()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        {
            return Ok(parsed);
        }
    }

    Err(AppError::malformed(
        id,
        format!("not a timestamp: {:?}", text),
    ))
}

use super::raw::{ExtensionBag, RawValue};
use crate::types::{Cardinality, PropertyId, PropertyType};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use url::Url;

/// A single typed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    String(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Id(String),
    Uri(Url),
    Html(String),
}

impl TypedValue {
    /// Returns the property type this value belongs to.
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::String(_) => PropertyType::String,
            Self::Integer(_) => PropertyType::Integer,
            Self::Decimal(_) => PropertyType::Decimal,
            Self::Boolean(_) => PropertyType::Boolean,
            Self::DateTime(_) => PropertyType::DateTime,
            Self::Id(_) => PropertyType::Id,
            Self::Uri(_) => PropertyType::Uri,
            Self::Html(_) => PropertyType::Html,
        }
    }

    /// Renders the value back into the protocol's canonical text.
    pub fn to_raw(&self) -> String {
        match self {
            Self::String(s) | Self::Id(s) | Self::Html(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Decimal(d) => d.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            Self::Uri(url) => url.as_str().to_string(),
        }
    }

    /// Text for the string-like variants (string, id, html, uri).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Id(s) | Self::Html(s) => Some(s),
            Self::Uri(url) => Some(url.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Decimal(d) => Some(*d),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

/// A converted property value, shaped by cardinality.
///
/// `Multi(vec![])` and `Absent` are different things: the first is a
/// multi-valued property explicitly set to nothing, the second was sent
/// without a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Absent,
    Single(TypedValue),
    Multi(Vec<TypedValue>),
}

impl PropertyValue {
    /// The first (or only) value.
    pub fn first(&self) -> Option<&TypedValue> {
        match self {
            Self::Absent => None,
            Self::Single(value) => Some(value),
            Self::Multi(values) => values.first(),
        }
    }

    /// All values in order; empty for `Absent`.
    pub fn values(&self) -> &[TypedValue] {
        match self {
            Self::Absent => &[],
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multi(values) => values,
        }
    }

    /// Re-serializes into the raw shape the value was converted from.
    pub fn to_raw(&self) -> RawValue {
        match self {
            Self::Absent => RawValue::Absent,
            Self::Single(value) => RawValue::Scalar(value.to_raw()),
            Self::Multi(values) => RawValue::Multi(values.iter().map(TypedValue::to_raw).collect()),
        }
    }
}

/// A typed value with its property id and declared shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyData {
    pub id: PropertyId,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub cardinality: Cardinality,
    pub value: PropertyValue,
}

/// Typed properties of one object plus the passthrough extension bag.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConvertedProperties {
    properties: IndexMap<PropertyId, PropertyData>,
    extensions: ExtensionBag,
}

impl ConvertedProperties {
    pub(crate) fn from_parts(
        properties: IndexMap<PropertyId, PropertyData>,
        extensions: ExtensionBag,
    ) -> Self {
        Self {
            properties,
            extensions,
        }
    }

    pub fn get(&self, id: &str) -> Option<&PropertyData> {
        self.properties.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.properties.contains_key(id)
    }

    /// Property ids in the order the server sent them.
    pub fn ids(&self) -> impl Iterator<Item = &PropertyId> {
        self.properties.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyData> {
        self.properties.values()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn extensions(&self) -> &ExtensionBag {
        &self.extensions
    }

    /// First value of a property, if present and set.
    pub fn value(&self, id: &str) -> Option<&TypedValue> {
        self.get(id).and_then(|data| data.value.first())
    }

    pub fn string(&self, id: &str) -> Option<&str> {
        self.value(id).and_then(TypedValue::as_str)
    }

    pub fn integer(&self, id: &str) -> Option<i64> {
        self.value(id).and_then(TypedValue::as_i64)
    }

    pub fn boolean(&self, id: &str) -> Option<bool> {
        self.value(id).and_then(TypedValue::as_bool)
    }

    pub fn datetime(&self, id: &str) -> Option<&DateTime<Utc>> {
        self.value(id).and_then(TypedValue::as_datetime)
    }

    /// Every string-like value of a (usually multi-valued) property.
    pub fn strings(&self, id: &str) -> Vec<&str> {
        self.get(id)
            .map(|data| data.value.values().iter().filter_map(TypedValue::as_str).collect())
            .unwrap_or_default()
    }
}

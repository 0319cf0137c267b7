// src/model/raw.rs
//! Untyped, protocol-level shapes handed over by the response parser.
//!
//! Nothing here knows property types. Values stay text until the property
//! converter meets them with a definition.

use crate::types::{ObjectId, ObjectTypeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A raw property value: absent, one string, or a sequence of strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawValue {
    #[default]
    Absent,
    Scalar(String),
    Multi(Vec<String>),
}

impl RawValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multi(values.into_iter().map(Into::into).collect())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Every string carried by this value, in order.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Absent => Vec::new(),
            Self::Scalar(value) => vec![value.as_str()],
            Self::Multi(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawValueRepr {
    Multi(Vec<String>),
    Scalar(String),
}

impl Serialize for RawValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Scalar(value) => serializer.serialize_str(value),
            Self::Multi(values) => values.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match Option::<RawValueRepr>::deserialize(deserializer)? {
            None => Self::Absent,
            Some(RawValueRepr::Scalar(value)) => Self::Scalar(value),
            Some(RawValueRepr::Multi(values)) => Self::Multi(values),
        })
    }
}

/// Namespace-qualified entries carried through conversion unchanged.
pub type ExtensionBag = IndexMap<String, RawValue>;

/// Raw property map keyed by the property id exactly as the server sent it.
pub type RawProperties = IndexMap<String, RawValue>;

/// One repository object as parsed from a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObjectData {
    pub id: ObjectId,
    pub object_type_id: ObjectTypeId,
    #[serde(default)]
    pub properties: RawProperties,
    #[serde(default)]
    pub extensions: ExtensionBag,
    #[serde(default)]
    pub allowable_actions: Vec<String>,
}

impl RawObjectData {
    pub fn new(id: ObjectId, object_type_id: ObjectTypeId) -> Self {
        Self {
            id,
            object_type_id,
            properties: IndexMap::new(),
            extensions: IndexMap::new(),
            allowable_actions: Vec::new(),
        }
    }

    pub fn with_property(mut self, id: impl Into<String>, value: RawValue) -> Self {
        self.properties.insert(id.into(), value);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: RawValue) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowable_actions = actions.into_iter().map(Into::into).collect();
        self
    }
}

/// One window of a server-side listing, before conversion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPagedResult {
    pub items: Vec<RawObjectData>,
    #[serde(default)]
    pub has_more_items: bool,
    /// Total size of the listing, when the server reports one.
    #[serde(default)]
    pub total_items: Option<u64>,
}

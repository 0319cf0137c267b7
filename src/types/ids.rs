use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

/// Strong typing for repository identifiers with phantom types
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectTypeMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyMarker;

/// Identifies a single repository object (`cmis:objectId`).
pub type ObjectId = Id<ObjectMarker>;
/// Identifies an object type (`cmis:document`, `D:cm:content`, ...).
pub type ObjectTypeId = Id<ObjectTypeMarker>;
/// Identifies a property within a type definition (`cmis:name`, ...).
pub type PropertyId = Id<PropertyMarker>;

impl<T> Id<T> {
    /// Validates and wraps an identifier. Surrounding whitespace is trimmed;
    /// an identifier that is empty after trimming is rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidId(format!(
                "identifier must not be empty (got {:?})",
                input
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::InvalidId(format!(
                "identifier contains control characters: {:?}",
                input
            )));
        }
        Ok(Self::from_trusted(trimmed.to_string()))
    }

    /// Wraps a value that already came from a validated source (internal use)
    pub(crate) fn from_trusted(value: String) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }

    /// Get the ID as a string reference
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the namespace prefix of a qualified id (`cmis` for `cmis:name`).
    pub fn namespace(&self) -> Option<&str> {
        self.value.split_once(':').map(|(prefix, _)| prefix)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        &self.value
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

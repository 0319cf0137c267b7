// src/types/definitions.rs
//! Property and object-type definitions as reported by the repository.
//!
//! A [`TypeDefinition`] is immutable once built. The registry hands out
//! `Arc<TypeDefinition>` so every converter shares one copy per type id.

use super::{ObjectTypeId, PropertyId, ValidationError};
use crate::constants::{
    BASE_TYPE_DOCUMENT, BASE_TYPE_FOLDER, BASE_TYPE_ITEM, BASE_TYPE_POLICY,
    BASE_TYPE_RELATIONSHIP, BASE_TYPE_SECONDARY,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Decimal,
    Boolean,
    #[serde(alias = "dateTime")]
    DateTime,
    Id,
    Uri,
    Html,
}

impl PropertyType {
    /// Returns the protocol name for this property type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Id => "id",
            Self::Uri => "uri",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a property holds one value or an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    Single,
    Multi,
}

/// Definition of one property of an object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub id: PropertyId,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub updatable: bool,
}

impl PropertyDefinition {
    pub fn new(id: PropertyId, property_type: PropertyType, cardinality: Cardinality) -> Self {
        Self {
            id,
            property_type,
            cardinality,
            updatable: false,
        }
    }

    /// Marks the property as writable by clients.
    pub fn updatable(self) -> Self {
        Self {
            updatable: true,
            ..self
        }
    }

    pub fn is_multi(&self) -> bool {
        self.cardinality == Cardinality::Multi
    }
}

/// The root kind an object type descends from.
///
/// Selected from the type definition, never from the raw object, so a
/// custom type like `D:my:invoice` still becomes a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    Document,
    Folder,
    Relationship,
    Policy,
    Item,
    Secondary,
    /// A base-type id this crate does not know about.
    Other(String),
}

impl BaseType {
    /// Maps a `cmis:*` base-type id onto the vocabulary.
    pub fn from_base_type_id(id: &str) -> Self {
        match id {
            BASE_TYPE_DOCUMENT => Self::Document,
            BASE_TYPE_FOLDER => Self::Folder,
            BASE_TYPE_RELATIONSHIP => Self::Relationship,
            BASE_TYPE_POLICY => Self::Policy,
            BASE_TYPE_ITEM => Self::Item,
            BASE_TYPE_SECONDARY => Self::Secondary,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_base_type_id(&self) -> &str {
        match self {
            Self::Document => BASE_TYPE_DOCUMENT,
            Self::Folder => BASE_TYPE_FOLDER,
            Self::Relationship => BASE_TYPE_RELATIONSHIP,
            Self::Policy => BASE_TYPE_POLICY,
            Self::Item => BASE_TYPE_ITEM,
            Self::Secondary => BASE_TYPE_SECONDARY,
            Self::Other(id) => id,
        }
    }
}

impl Serialize for BaseType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_base_type_id())
    }
}

impl<'de> Deserialize<'de> for BaseType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = String::deserialize(deserializer)?;
        Ok(Self::from_base_type_id(&id))
    }
}

/// An object type with its property definitions, unique by property id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    id: ObjectTypeId,
    base_type: BaseType,
    parent_type_id: Option<ObjectTypeId>,
    property_definitions: IndexMap<PropertyId, PropertyDefinition>,
}

impl TypeDefinition {
    /// Builds a definition, rejecting duplicate property ids.
    pub fn new(
        id: ObjectTypeId,
        base_type: BaseType,
        parent_type_id: Option<ObjectTypeId>,
        definitions: impl IntoIterator<Item = PropertyDefinition>,
    ) -> Result<Self, ValidationError> {
        let mut property_definitions = IndexMap::new();
        for definition in definitions {
            if property_definitions.contains_key(&definition.id) {
                return Err(ValidationError::DuplicatePropertyDefinition {
                    type_id: id.as_str().to_string(),
                    property_id: definition.id.as_str().to_string(),
                });
            }
            property_definitions.insert(definition.id.clone(), definition);
        }

        Ok(Self {
            id,
            base_type,
            parent_type_id,
            property_definitions,
        })
    }

    pub fn id(&self) -> &ObjectTypeId {
        &self.id
    }

    pub fn base_type(&self) -> &BaseType {
        &self.base_type
    }

    pub fn parent_type_id(&self) -> Option<&ObjectTypeId> {
        self.parent_type_id.as_ref()
    }

    /// Looks up a property definition by id.
    pub fn property(&self, id: &str) -> Option<&PropertyDefinition> {
        self.property_definitions.get(id)
    }

    pub fn contains_property(&self, id: &str) -> bool {
        self.property_definitions.contains_key(id)
    }

    /// Property definitions in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.property_definitions.values()
    }

    pub fn len(&self) -> usize {
        self.property_definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.property_definitions.is_empty()
    }
}

/// Wire shape used when definitions are loaded from JSON.
#[derive(Deserialize)]
struct TypeDefinitionRepr {
    id: ObjectTypeId,
    #[serde(rename = "baseTypeId")]
    base_type_id: String,
    #[serde(rename = "parentTypeId", default)]
    parent_type_id: Option<ObjectTypeId>,
    #[serde(rename = "propertyDefinitions", default)]
    property_definitions: Vec<PropertyDefinition>,
}

#[derive(Serialize)]
struct TypeDefinitionReprRef<'a> {
    id: &'a ObjectTypeId,
    #[serde(rename = "baseTypeId")]
    base_type_id: &'a str,
    #[serde(rename = "parentTypeId", skip_serializing_if = "Option::is_none")]
    parent_type_id: Option<&'a ObjectTypeId>,
    #[serde(rename = "propertyDefinitions")]
    property_definitions: Vec<&'a PropertyDefinition>,
}

impl Serialize for TypeDefinition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        TypeDefinitionReprRef {
            id: &self.id,
            base_type_id: self.base_type.as_base_type_id(),
            parent_type_id: self.parent_type_id.as_ref(),
            property_definitions: self.property_definitions.values().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TypeDefinition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = TypeDefinitionRepr::deserialize(deserializer)?;
        TypeDefinition::new(
            repr.id,
            BaseType::from_base_type_id(&repr.base_type_id),
            repr.parent_type_id,
            repr.property_definitions,
        )
        .map_err(serde::de::Error::custom)
    }
}

mod common;
mod objects;
mod property_value;
mod raw;

pub use common::ObjectCommon;
pub use objects::{Document, Folder, Relationship};
pub use property_value::{ConvertedProperties, PropertyData, PropertyValue, TypedValue};
pub use raw::{ExtensionBag, RawObjectData, RawPagedResult, RawProperties, RawValue};

use crate::types::{BaseType, ObjectId, ObjectTypeId};
use serde::Serialize;

/// A typed repository object, selected from its type's base type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DomainObject {
    Document(Document),
    Folder(Folder),
    Relationship(Relationship),
    /// Policies, items and anything with an unrecognised base type.
    Generic(ObjectCommon),
}

impl DomainObject {
    /// Picks the variant for `common.base_type`.
    pub fn from_common(common: ObjectCommon) -> Self {
        match common.base_type {
            BaseType::Document => Self::Document(Document::new(common)),
            BaseType::Folder => Self::Folder(Folder::new(common)),
            BaseType::Relationship => Self::Relationship(Relationship::new(common)),
            _ => Self::Generic(common),
        }
    }

    pub fn common(&self) -> &ObjectCommon {
        match self {
            Self::Document(doc) => &doc.common,
            Self::Folder(folder) => &folder.common,
            Self::Relationship(rel) => &rel.common,
            Self::Generic(common) => common,
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.common().id
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn object_type_id(&self) -> &ObjectTypeId {
        &self.common().object_type_id
    }

    pub fn properties(&self) -> &ConvertedProperties {
        &self.common().properties
    }

    /// Whether the allowable-actions set contains `action`.
    pub fn can(&self, action: &str) -> bool {
        self.common().allowable_actions.contains(action)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Folder(_) => "folder",
            Self::Relationship(_) => "relationship",
            Self::Generic(_) => "generic",
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Self::Folder(folder) => Some(folder),
            _ => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Self::Relationship(rel) => Some(rel),
            _ => None,
        }
    }
}

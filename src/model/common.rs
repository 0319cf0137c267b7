use super::ConvertedProperties;
use crate::constants::{
    PROP_CREATED_BY, PROP_CREATION_DATE, PROP_LAST_MODIFICATION_DATE, PROP_LAST_MODIFIED_BY,
    PROP_NAME,
};
use crate::types::{BaseType, ObjectId, ObjectTypeId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Common fields for all repository objects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectCommon {
    pub id: ObjectId,
    pub name: String,
    pub object_type_id: ObjectTypeId,
    pub base_type: BaseType,
    pub properties: ConvertedProperties,
    pub allowable_actions: BTreeSet<String>,
}

impl ObjectCommon {
    /// Builds the common part; `name` comes from `cmis:name`, or the object
    /// id when the server did not send one.
    pub fn new(
        id: ObjectId,
        object_type_id: ObjectTypeId,
        base_type: BaseType,
        properties: ConvertedProperties,
        allowable_actions: impl IntoIterator<Item = String>,
    ) -> Self {
        let name = properties
            .string(PROP_NAME)
            .map(str::to_string)
            .unwrap_or_else(|| id.as_str().to_string());

        Self {
            id,
            name,
            object_type_id,
            base_type,
            properties,
            allowable_actions: allowable_actions.into_iter().collect(),
        }
    }

    pub fn created_by(&self) -> Option<&str> {
        self.properties.string(PROP_CREATED_BY)
    }

    pub fn creation_date(&self) -> Option<&DateTime<Utc>> {
        self.properties.datetime(PROP_CREATION_DATE)
    }

    pub fn last_modified_by(&self) -> Option<&str> {
        self.properties.string(PROP_LAST_MODIFIED_BY)
    }

    pub fn last_modification_date(&self) -> Option<&DateTime<Utc>> {
        self.properties.datetime(PROP_LAST_MODIFICATION_DATE)
    }
}

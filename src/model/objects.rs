use super::common::ObjectCommon;
use crate::constants::{
    PROP_CONTENT_STREAM_FILE_NAME, PROP_CONTENT_STREAM_LENGTH, PROP_CONTENT_STREAM_MIME_TYPE,
    PROP_IS_LATEST_VERSION, PROP_PARENT_ID, PROP_PATH, PROP_SOURCE_ID, PROP_TARGET_ID,
    PROP_VERSION_LABEL,
};
use serde::Serialize;

/// Document object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub common: ObjectCommon,
    pub content_stream_length: Option<i64>,
    pub content_stream_mime_type: Option<String>,
    pub content_stream_file_name: Option<String>,
    pub version_label: Option<String>,
    pub is_latest_version: Option<bool>,
}

impl Document {
    pub fn new(common: ObjectCommon) -> Self {
        let props = &common.properties;
        Self {
            content_stream_length: props.integer(PROP_CONTENT_STREAM_LENGTH),
            content_stream_mime_type: props.string(PROP_CONTENT_STREAM_MIME_TYPE).map(String::from),
            content_stream_file_name: props.string(PROP_CONTENT_STREAM_FILE_NAME).map(String::from),
            version_label: props.string(PROP_VERSION_LABEL).map(String::from),
            is_latest_version: props.boolean(PROP_IS_LATEST_VERSION),
            common,
        }
    }

    pub fn has_content(&self) -> bool {
        self.content_stream_length.is_some_and(|len| len > 0)
    }
}

/// Folder object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Folder {
    pub common: ObjectCommon,
    pub path: Option<String>,
    pub parent_id: Option<String>,
}

impl Folder {
    pub fn new(common: ObjectCommon) -> Self {
        let props = &common.properties;
        Self {
            path: props.string(PROP_PATH).map(String::from),
            parent_id: props.string(PROP_PARENT_ID).map(String::from),
            common,
        }
    }

    /// The repository root is the only folder without a parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Relationship object linking a source to a target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub common: ObjectCommon,
    pub source_id: Option<String>,
    pub target_id: Option<String>,
}

impl Relationship {
    pub fn new(common: ObjectCommon) -> Self {
        let props = &common.properties;
        Self {
            source_id: props.string(PROP_SOURCE_ID).map(String::from),
            target_id: props.string(PROP_TARGET_ID).map(String::from),
            common,
        }
    }
}

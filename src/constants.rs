// src/constants.rs
//! Protocol vocabulary and operational defaults.
//!
//! Property and base-type ids are the protocol's own names; reading them
//! here tells you which parts of an object the converter gives meaning to.

// ---------------------------------------------------------------------------
// Base-type ids
// ---------------------------------------------------------------------------

pub const BASE_TYPE_DOCUMENT: &str = "cmis:document";
pub const BASE_TYPE_FOLDER: &str = "cmis:folder";
pub const BASE_TYPE_RELATIONSHIP: &str = "cmis:relationship";
pub const BASE_TYPE_POLICY: &str = "cmis:policy";
pub const BASE_TYPE_ITEM: &str = "cmis:item";
pub const BASE_TYPE_SECONDARY: &str = "cmis:secondary";

// ---------------------------------------------------------------------------
// Property ids the converter reads
// ---------------------------------------------------------------------------

pub const PROP_NAME: &str = "cmis:name";
pub const PROP_CREATED_BY: &str = "cmis:createdBy";
pub const PROP_CREATION_DATE: &str = "cmis:creationDate";
pub const PROP_LAST_MODIFIED_BY: &str = "cmis:lastModifiedBy";
pub const PROP_LAST_MODIFICATION_DATE: &str = "cmis:lastModificationDate";

/// Multi-valued id listing secondary types (aspects) applied to an object.
pub const PROP_SECONDARY_OBJECT_TYPE_IDS: &str = "cmis:secondaryObjectTypeIds";

pub const PROP_CONTENT_STREAM_LENGTH: &str = "cmis:contentStreamLength";
pub const PROP_CONTENT_STREAM_MIME_TYPE: &str = "cmis:contentStreamMimeType";
pub const PROP_CONTENT_STREAM_FILE_NAME: &str = "cmis:contentStreamFileName";
pub const PROP_VERSION_LABEL: &str = "cmis:versionLabel";
pub const PROP_IS_LATEST_VERSION: &str = "cmis:isLatestVersion";

pub const PROP_PATH: &str = "cmis:path";
pub const PROP_PARENT_ID: &str = "cmis:parentId";

pub const PROP_SOURCE_ID: &str = "cmis:sourceId";
pub const PROP_TARGET_ID: &str = "cmis:targetId";

// ---------------------------------------------------------------------------
// Value vocabulary
// ---------------------------------------------------------------------------

pub const BOOLEAN_TRUE: &str = "true";
pub const BOOLEAN_FALSE: &str = "false";

// ---------------------------------------------------------------------------
// Listing defaults
// ---------------------------------------------------------------------------

/// `max_items` value meaning "no client-side bound; let the server decide".
pub const UNBOUNDED_MAX_ITEMS: u32 = 0;

/// Largest page the CLI accepts, so a typo cannot request millions of rows.
pub const MAX_ITEMS_CEILING: u32 = 10_000;

/// Environment variable overriding the default page size.
pub const MAX_ITEMS_ENV_VAR: &str = "CMIS_OBJECTS_MAX_ITEMS";

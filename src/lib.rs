// src/lib.rs
//! cmis-objects library: turns raw repository objects into typed domain objects.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `FailureStage`, `ValidationError`
//! - **Configuration**: `ClientConfig`
//! - **Identifiers and definitions**: `ObjectId`, `ObjectTypeId`, `PropertyId`,
//!   `TypeDefinition`, `PropertyDefinition`
//! - **Domain model**: `DomainObject`, `Document`, `Folder`, `Relationship`,
//!   `ConvertedProperties`, and the raw shapes they are converted from
//! - **Conversion**: `ObjectConverter`, `convert_value`, `convert_extensions`
//! - **Repository access**: `PropertyTypeRegistry`, `RepositoryClient`,
//!   `RequestHandle`, `ListingContext`, `PagingResult`
//! - **Collaborator traits**: `TypeDefinitionSource`, `ObjectTransport`

pub mod algebras;
pub mod api;
pub mod config;
pub mod constants;
pub mod convert;
pub mod error;
pub mod model;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, FailureStage};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::ClientConfig;

// --- Identifiers and Definitions ---
pub use crate::types::{
    BaseType, Cardinality, ObjectId, ObjectTypeId, PropertyDefinition, PropertyId, PropertyType,
    TypeDefinition,
};

// --- Domain Model ---
pub use crate::model::{
    ConvertedProperties, Document, DomainObject, ExtensionBag, Folder, ObjectCommon, PropertyData,
    PropertyValue, RawObjectData, RawPagedResult, RawProperties, RawValue, Relationship,
    TypedValue,
};

// --- Conversion ---
pub use crate::convert::{convert_extensions, convert_value, ObjectConverter};

// --- Repository Access ---
pub use crate::api::{
    apply_paging, issue, issue_with, Completion, FixtureRepository, ListingContext, PagingResult,
    PropertyTypeRegistry, RepositoryClient, RequestHandle, RequestState, TotalItems,
};

// --- Algebras (Capability Traits) ---
pub use crate::algebras::{
    ObjectTransport, ObjectTransportExt, ResourceDescriptor, TransportResponse,
    TypeDefinitionSource,
};

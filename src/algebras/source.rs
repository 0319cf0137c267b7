//! Collaborator algebras: where type definitions and raw objects come from.
//!
//! The engine never performs HTTP, authentication or response parsing
//! itself. It is handed implementations of these two traits and only
//! relies on the laws documented below.

use crate::api::ListingContext;
use crate::error::AppError;
use crate::model::{RawObjectData, RawPagedResult};
use crate::types::{ObjectTypeId, TypeDefinition};
use async_trait::async_trait;
use serde::Serialize;

/// Type-definition retrieval capability.
///
/// # Laws
///
/// - **L1 (Identity)**: a returned definition's id equals the requested id.
///   ```text
///   fetch_type_definition(id) == def
///   assert_eq!(def.id(), id)
///   ```
///
/// - **L2 (No caching required)**: implementations may hit the network on
///   every call. Caching and coalescing are the registry's job.
#[async_trait]
pub trait TypeDefinitionSource: Send + Sync {
    async fn fetch_type_definition(
        &self,
        type_id: &ObjectTypeId,
    ) -> Result<TypeDefinition, AppError>;
}

/// Identifies what a transport fetch should retrieve.
///
/// `listing` carries request shaping (skip, max, sort, keyword) that the
/// transport forwards to the server. The engine never re-sorts or
/// re-filters locally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    pub path: String,
    pub listing: Option<ListingContext>,
}

impl ResourceDescriptor {
    /// A descriptor for a single object.
    pub fn object(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            listing: None,
        }
    }

    /// A descriptor for one window of a listing.
    pub fn listing(path: impl Into<String>, listing: ListingContext) -> Self {
        Self {
            path: path.into(),
            listing: Some(listing),
        }
    }
}

/// What a transport fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportResponse {
    Object(RawObjectData),
    Page(RawPagedResult),
}

/// Raw-object retrieval capability.
///
/// # Laws
///
/// - **L1 (Shape)**: a descriptor without `listing` yields
///   [`TransportResponse::Object`]; one with `listing` yields
///   [`TransportResponse::Page`].
///
/// - **L2 (Window)**: a page holds at most `max_items` items when
///   `max_items > 0`, and `has_more_items == false` means a request with a
///   larger skip returns nothing.
///
/// - **L3 (Cancellation)**: dropping the returned future aborts the fetch.
#[async_trait]
pub trait ObjectTransport: Send + Sync {
    async fn fetch(&self, descriptor: &ResourceDescriptor) -> Result<TransportResponse, AppError>;
}

/// Shape-checked helpers over [`ObjectTransport`].
#[async_trait]
pub trait ObjectTransportExt: ObjectTransport {
    /// Fetches a descriptor that must produce a single object.
    async fn fetch_object(&self, descriptor: &ResourceDescriptor) -> Result<RawObjectData, AppError> {
        match self.fetch(descriptor).await? {
            TransportResponse::Object(raw) => Ok(raw),
            TransportResponse::Page(_) => Err(AppError::transport(format!(
                "expected an object at '{}' but the transport returned a listing",
                descriptor.path
            ))),
        }
    }

    /// Fetches a descriptor that must produce a listing window.
    async fn fetch_page(&self, descriptor: &ResourceDescriptor) -> Result<RawPagedResult, AppError> {
        match self.fetch(descriptor).await? {
            TransportResponse::Page(page) => Ok(page),
            TransportResponse::Object(_) => Err(AppError::transport(format!(
                "expected a listing at '{}' but the transport returned an object",
                descriptor.path
            ))),
        }
    }
}

// Blanket implementation for all ObjectTransport
#[async_trait]
impl<T: ObjectTransport + ?Sized> ObjectTransportExt for T {}

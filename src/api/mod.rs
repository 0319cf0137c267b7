// src/api/mod.rs
//! Repository access: the type registry, request handles, listing windows
//! and the client that ties them to a transport.
//!
//! Every `retrieve_*` call returns a [`RequestHandle`] immediately. The
//! work runs on the tokio runtime and its result is delivered exactly once,
//! unless the handle is cancelled first.

pub mod fixture;
pub mod paging;
pub mod registry;
pub mod request;

use crate::algebras::{ObjectTransport, ObjectTransportExt, ResourceDescriptor, TypeDefinitionSource};
use crate::config::ClientConfig;
use crate::convert::ObjectConverter;
use crate::error::AppError;
use crate::model::DomainObject;
use std::future::Future;
use std::sync::Arc;

pub use fixture::FixtureRepository;
pub use paging::{apply_paging, ListingContext, PagingResult, TotalItems};
pub use registry::PropertyTypeRegistry;
pub use request::{issue, issue_with, Completion, RequestHandle, RequestState};

/// A session against one repository.
///
/// Owns the type registry for its lifetime; dropping the client drops the
/// cache. Cloning shares the registry.
#[derive(Clone)]
pub struct RepositoryClient {
    transport: Arc<dyn ObjectTransport>,
    converter: ObjectConverter,
    config: ClientConfig,
}

impl RepositoryClient {
    pub fn new(
        types: Arc<dyn TypeDefinitionSource>,
        transport: Arc<dyn ObjectTransport>,
        config: ClientConfig,
    ) -> Self {
        let registry = PropertyTypeRegistry::new(types).with_cache_enabled(config.cache_enabled);
        Self {
            transport,
            converter: ObjectConverter::new(registry),
            config,
        }
    }

    pub fn registry(&self) -> &PropertyTypeRegistry {
        self.converter.registry()
    }

    pub fn converter(&self) -> &ObjectConverter {
        &self.converter
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Forgets every cached type definition, e.g. after a schema change.
    pub fn clear(&self) {
        self.registry().clear();
    }

    /// Applies the configured page size to an unbounded listing.
    fn effective_listing(&self, listing: ListingContext) -> ListingContext {
        if listing.is_bounded() || self.config.default_max_items == 0 {
            listing
        } else {
            listing.with_max_items(self.config.default_max_items)
        }
    }

    // -----------------------------------------------------------------------
    // Callback form
    // -----------------------------------------------------------------------

    /// Fetches and converts the object at `path`.
    pub fn retrieve_object<F>(&self, path: impl Into<String>, completion: F) -> RequestHandle
    where
        F: FnOnce(Result<DomainObject, AppError>) + Send + 'static,
    {
        issue_with(self.object_operation(path.into()), completion)
    }

    /// Fetches and converts one window of the listing at `path`.
    pub fn retrieve_children<F>(
        &self,
        path: impl Into<String>,
        listing: ListingContext,
        completion: F,
    ) -> RequestHandle
    where
        F: FnOnce(Result<PagingResult<DomainObject>, AppError>) + Send + 'static,
    {
        issue_with(self.children_operation(path.into(), listing), completion)
    }

    /// Fetches every item of the listing at `path`, following windows until
    /// the server reports no more.
    pub fn retrieve_all_children<F>(&self, path: impl Into<String>, completion: F) -> RequestHandle
    where
        F: FnOnce(Result<Vec<DomainObject>, AppError>) + Send + 'static,
    {
        issue_with(self.all_children_operation(path.into()), completion)
    }

    // -----------------------------------------------------------------------
    // Awaitable form
    // -----------------------------------------------------------------------

    pub fn object(&self, path: impl Into<String>) -> (RequestHandle, Completion<DomainObject>) {
        issue(self.object_operation(path.into()))
    }

    pub fn children(
        &self,
        path: impl Into<String>,
        listing: ListingContext,
    ) -> (RequestHandle, Completion<PagingResult<DomainObject>>) {
        issue(self.children_operation(path.into(), listing))
    }

    pub fn all_children(
        &self,
        path: impl Into<String>,
    ) -> (RequestHandle, Completion<Vec<DomainObject>>) {
        issue(self.all_children_operation(path.into()))
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    fn object_operation(
        &self,
        path: String,
    ) -> impl Future<Output = Result<DomainObject, AppError>> + Send + 'static {
        let transport = Arc::clone(&self.transport);
        let converter = self.converter.clone();

        async move {
            log::info!("Retrieving object at '{}'", path);
            let raw = transport
                .fetch_object(&ResourceDescriptor::object(path))
                .await?;
            converter.convert_one(&raw).await
        }
    }

    fn children_operation(
        &self,
        path: String,
        listing: ListingContext,
    ) -> impl Future<Output = Result<PagingResult<DomainObject>, AppError>> + Send + 'static {
        let transport = Arc::clone(&self.transport);
        let converter = self.converter.clone();
        let listing = self.effective_listing(listing);

        async move {
            log::info!(
                "Retrieving children of '{}' (skip {}, max {})",
                path,
                listing.skip_count,
                listing.max_items
            );
            let descriptor = ResourceDescriptor::listing(path, listing.clone());
            let raw = transport.fetch_page(&descriptor).await?;
            apply_paging(&converter, raw, &listing).await
        }
    }

    fn all_children_operation(
        &self,
        path: String,
    ) -> impl Future<Output = Result<Vec<DomainObject>, AppError>> + Send + 'static {
        let transport = Arc::clone(&self.transport);
        let converter = self.converter.clone();
        let first = self.effective_listing(ListingContext::default());

        async move {
            let mut raws = Vec::new();
            let mut listing = first;

            loop {
                let descriptor = ResourceDescriptor::listing(path.clone(), listing.clone());
                let page = transport.fetch_page(&descriptor).await?;
                let received = page.items.len();
                raws.extend(page.items);

                if !page.has_more_items {
                    break;
                }
                if received == 0 {
                    log::warn!(
                        "Listing '{}' reported more items but returned an empty window; stopping",
                        path
                    );
                    break;
                }
                listing = advance_window(&path, listing, received)?;
            }

            log::info!("Retrieved {} children of '{}'", raws.len(), path);
            converter.convert_many(&raws).await
        }
    }
}

/// The listing for the window after one that returned `received` items.
fn advance_window(path: &str, listing: ListingContext, received: usize) -> Result<ListingContext, AppError> {
    let skip = u32::try_from(received)
        .ok()
        .and_then(|received| listing.skip_count.checked_add(received))
        .ok_or_else(|| {
            AppError::transport(format!(
                "Listing '{}' kept reporting more items past skip {} (+{})",
                path, listing.skip_count, received
            ))
        })?;
    Ok(listing.with_skip(skip))
}

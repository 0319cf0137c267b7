// src/api/fixture.rs
//! In-memory repository loaded from a JSON document.
//!
//! Stands in for a real server in the CLI and in integration tests. It
//! plays both collaborator roles and honours the listing window the way a
//! server would: keyword filter, sort, then skip/max.
//!
//! ```json
//! {
//!   "types":    [ { "id": "cmis:document", "baseTypeId": "cmis:document", "propertyDefinitions": [] } ],
//!   "objects":  { "/path": { "id": "...", "objectTypeId": "...", "properties": {} } },
//!   "children": { "/path": [ { "id": "...", "objectTypeId": "..." } ] }
//! }
//! ```

use super::ListingContext;
use crate::algebras::{ObjectTransport, ResourceDescriptor, TransportResponse, TypeDefinitionSource};
use crate::constants::PROP_NAME;
use crate::error::AppError;
use crate::model::{RawObjectData, RawPagedResult, RawValue};
use crate::types::{ObjectTypeId, TypeDefinition};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Deserialize)]
struct FixtureDocument {
    #[serde(default)]
    types: Vec<TypeDefinition>,
    #[serde(default)]
    objects: IndexMap<String, RawObjectData>,
    #[serde(default)]
    children: IndexMap<String, Vec<RawObjectData>>,
}

/// A repository backed by a parsed fixture document.
pub struct FixtureRepository {
    types: HashMap<ObjectTypeId, TypeDefinition>,
    objects: IndexMap<String, RawObjectData>,
    children: IndexMap<String, Vec<RawObjectData>>,
    latency: Option<Duration>,
    type_fetches: AtomicUsize,
}

impl FixtureRepository {
    /// Parses a fixture document. `origin` only labels parse errors.
    pub fn parse(json: &str, origin: impl Into<PathBuf>) -> Result<Self, AppError> {
        let document: FixtureDocument =
            serde_json::from_str(json).map_err(|source| AppError::JsonParseError {
                path: origin.into(),
                source,
            })?;

        Ok(Self {
            types: document
                .types
                .into_iter()
                .map(|def| (def.id().clone(), def))
                .collect(),
            objects: document.objects,
            children: document.children,
            latency: None,
            type_fetches: AtomicUsize::new(0),
        })
    }

    /// Reads and parses a fixture file.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        log::info!("Loading fixture repository from {}", path.display());
        let json = tokio::fs::read_to_string(path).await?;
        Self::parse(&json, path)
    }

    /// Delays every fetch, to simulate a network round-trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// How many type definitions have been fetched so far.
    pub fn type_fetch_count(&self) -> usize {
        self.type_fetches.load(Ordering::SeqCst)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    async fn round_trip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn window(&self, path: &str, listing: &ListingContext) -> Result<RawPagedResult, AppError> {
        let all = self
            .children
            .get(path)
            .ok_or_else(|| AppError::transport(format!("no listing at '{}'", path)))?;

        let mut matching: Vec<&RawObjectData> = match &listing.keyword {
            Some(keyword) => {
                let needle = keyword.to_lowercase();
                all.iter()
                    .filter(|raw| sort_key(raw, PROP_NAME).to_lowercase().contains(&needle))
                    .collect()
            }
            None => all.iter().collect(),
        };

        if let Some(property) = &listing.sort_property {
            matching.sort_by(|a, b| sort_key(a, property).cmp(&sort_key(b, property)));
            if !listing.ascending {
                matching.reverse();
            }
        }

        let total = matching.len();
        let skip = (listing.skip_count as usize).min(total);
        let take = if listing.is_bounded() {
            listing.max_items as usize
        } else {
            total
        };
        let items: Vec<RawObjectData> = matching
            .into_iter()
            .skip(skip)
            .take(take)
            .cloned()
            .collect();
        let has_more_items = skip + items.len() < total;

        Ok(RawPagedResult {
            items,
            has_more_items,
            total_items: Some(total as u64),
        })
    }
}

/// First raw text of a property, or "" when the object does not carry it.
fn sort_key<'a>(raw: &'a RawObjectData, property: &str) -> &'a str {
    match raw.properties.get(property) {
        Some(RawValue::Scalar(text)) => text,
        Some(RawValue::Multi(values)) => values.first().map(String::as_str).unwrap_or(""),
        _ => "",
    }
}

#[async_trait]
impl TypeDefinitionSource for FixtureRepository {
    async fn fetch_type_definition(
        &self,
        type_id: &ObjectTypeId,
    ) -> Result<TypeDefinition, AppError> {
        self.type_fetches.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await;
        self.types
            .get(type_id)
            .cloned()
            .ok_or_else(|| AppError::transport(format!("unknown object type '{}'", type_id)))
    }
}

#[async_trait]
impl ObjectTransport for FixtureRepository {
    async fn fetch(&self, descriptor: &ResourceDescriptor) -> Result<TransportResponse, AppError> {
        self.round_trip().await;
        match &descriptor.listing {
            None => self
                .objects
                .get(&descriptor.path)
                .cloned()
                .map(TransportResponse::Object)
                .ok_or_else(|| AppError::transport(format!("no object at '{}'", descriptor.path))),
            Some(listing) => self
                .window(&descriptor.path, listing)
                .map(TransportResponse::Page),
        }
    }
}

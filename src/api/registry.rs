// src/api/registry.rs
//! Property type registry: resolves object-type ids to their definitions.
//!
//! Definitions are cached in memory for the lifetime of the owning client.
//! Concurrent misses for the same type id are coalesced onto one fetch
//! whose outcome fans out to every waiter.
//!
//! The fetch runs inside a [`Shared`] future. The in-flight index only keeps
//! a [`WeakShared`] handle, so the fetch lives exactly as long as somebody
//! is still waiting on it: when the last waiter is dropped the fetch is
//! dropped with it, and the next resolve starts a fresh one.

use crate::algebras::TypeDefinitionSource;
use crate::error::AppError;
use crate::types::{ObjectTypeId, TypeDefinition};
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type ResolveOutcome = Result<Arc<TypeDefinition>, Arc<AppError>>;
type PendingResolve = BoxFuture<'static, ResolveOutcome>;

struct InFlight {
    generation: u64,
    fetch: WeakShared<PendingResolve>,
}

#[derive(Default)]
struct RegistryState {
    /// Bumped by `clear`; fetches from an older generation never write.
    generation: u64,
    cache: HashMap<ObjectTypeId, Arc<TypeDefinition>>,
    in_flight: HashMap<ObjectTypeId, InFlight>,
}

/// Cached, coalescing resolver for type definitions.
///
/// Cloning is cheap and every clone shares the same cache.
#[derive(Clone)]
pub struct PropertyTypeRegistry {
    source: Arc<dyn TypeDefinitionSource>,
    state: Arc<Mutex<RegistryState>>,
    cache_enabled: bool,
}

impl PropertyTypeRegistry {
    /// Creates an empty registry backed by `source`.
    pub fn new(source: Arc<dyn TypeDefinitionSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(RegistryState::default())),
            cache_enabled: true,
        }
    }

    /// With the cache disabled every resolve goes to the source, though
    /// concurrent resolves are still coalesced.
    pub fn with_cache_enabled(self, cache_enabled: bool) -> Self {
        Self {
            cache_enabled,
            ..self
        }
    }

    /// Resolves `type_id`, fetching it at most once however many callers
    /// ask concurrently.
    pub async fn resolve(&self, type_id: &ObjectTypeId) -> Result<Arc<TypeDefinition>, AppError> {
        let pending = {
            let mut state = self.state.lock();

            if let Some(definition) = state.cache.get(type_id) {
                log::debug!("Type cache hit: {}", type_id);
                return Ok(Arc::clone(definition));
            }

            let joined = state
                .in_flight
                .get(type_id)
                .and_then(|entry| entry.fetch.upgrade());

            match joined {
                Some(pending) => {
                    log::debug!("Joining in-flight fetch for type {}", type_id);
                    pending
                }
                None => {
                    log::debug!("Type cache miss: {}", type_id);
                    // Fetches abandoned by every waiter leave dead entries behind.
                    state
                        .in_flight
                        .retain(|_, entry| entry.fetch.upgrade().is_some());
                    let generation = state.generation;
                    let pending = self.start_fetch(type_id.clone(), generation);
                    if let Some(fetch) = pending.downgrade() {
                        state
                            .in_flight
                            .insert(type_id.clone(), InFlight { generation, fetch });
                    }
                    pending
                }
            }
        };

        pending
            .await
            .map_err(|cause| AppError::TypeResolutionFailed {
                type_id: type_id.clone(),
                cause,
            })
    }

    /// Builds the single shared fetch for `type_id`. Only this future ever
    /// writes the result into the cache.
    fn start_fetch(&self, type_id: ObjectTypeId, generation: u64) -> Shared<PendingResolve> {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let cache_enabled = self.cache_enabled;

        async move {
            log::info!("Fetching type definition {}", type_id);
            let outcome = source
                .fetch_type_definition(&type_id)
                .await
                .and_then(|definition| {
                    if definition.id() == &type_id {
                        Ok(definition)
                    } else {
                        Err(AppError::transport(format!(
                            "requested type '{}' but the source returned '{}'",
                            type_id,
                            definition.id()
                        )))
                    }
                });

            let mut state = state.lock();
            let owns_entry = state
                .in_flight
                .get(&type_id)
                .is_some_and(|entry| entry.generation == generation);
            if owns_entry {
                state.in_flight.remove(&type_id);
            }

            match outcome {
                Ok(definition) => {
                    let definition = Arc::new(definition);
                    if cache_enabled && state.generation == generation {
                        state.cache.insert(type_id, Arc::clone(&definition));
                    }
                    Ok(definition)
                }
                Err(e) => {
                    log::warn!("Type definition fetch for {} failed: {}", type_id, e);
                    Err(Arc::new(e))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Evicts every cached definition. Fetches already in flight finish for
    /// their current waiters but do not repopulate the cache.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let evicted = state.cache.len();
        state.generation += 1;
        state.cache = HashMap::new();
        state.in_flight = HashMap::new();
        log::info!("Type cache cleared ({} definitions evicted)", evicted);
    }

    /// Returns a cached definition without fetching.
    pub fn cached(&self, type_id: &ObjectTypeId) -> Option<Arc<TypeDefinition>> {
        self.state.lock().cache.get(type_id).cloned()
    }

    /// Number of cached definitions.
    pub fn len(&self) -> usize {
        self.state.lock().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebras::testing::{document_type, folder_type, ScriptedTypeSource};
    use crate::error::FailureStage;
    use std::time::Duration;

    fn type_id(id: &str) -> ObjectTypeId {
        ObjectTypeId::parse(id).unwrap()
    }

    /// Lets spawned tasks on the current-thread runtime reach their await points.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_cache_hit_skips_source() {
        let source = Arc::new(ScriptedTypeSource::new(vec![document_type()]));
        let registry = PropertyTypeRegistry::new(source.clone());

        let first = registry.resolve(&type_id("cmis:document")).await.unwrap();
        let second = registry.resolve(&type_id("cmis:document")).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.fetch_count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_coalesce_into_one_fetch() {
        let (source, gate) = ScriptedTypeSource::new(vec![document_type()]).gated();
        let source = Arc::new(source);
        let registry = PropertyTypeRegistry::new(source.clone());

        let waiters: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.resolve(&type_id("cmis:document")).await })
            })
            .collect();

        settle().await;
        assert_eq!(source.fetch_count(), 1);
        gate.open();

        let mut results = Vec::new();
        for waiter in waiters {
            results.push(waiter.await.unwrap().unwrap());
        }

        assert_eq!(source.fetch_count(), 1);
        assert!(results.iter().all(|def| Arc::ptr_eq(def, &results[0])));
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter_and_does_not_poison() {
        let (source, gate) = ScriptedTypeSource::new(vec![document_type()])
            .failing("cmis:document", 1)
            .gated();
        let source = Arc::new(source);
        let registry = PropertyTypeRegistry::new(source.clone());

        let first = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve(&type_id("cmis:document")).await })
        };
        let second = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve(&type_id("cmis:document")).await })
        };
        settle().await;
        gate.open();

        let causes: Vec<Arc<AppError>> = [first.await.unwrap(), second.await.unwrap()]
            .into_iter()
            .map(|result| match result {
                Err(AppError::TypeResolutionFailed { type_id, cause }) => {
                    assert_eq!(type_id.as_str(), "cmis:document");
                    cause
                }
                other => panic!("expected TypeResolutionFailed, got {:?}", other),
            })
            .collect();
        assert!(Arc::ptr_eq(&causes[0], &causes[1]));
        assert_eq!(source.fetch_count(), 1);
        assert!(registry.is_empty());

        let retried = registry.resolve(&type_id("cmis:document")).await;
        assert!(retried.is_ok());
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let source = Arc::new(ScriptedTypeSource::new(vec![document_type()]));
        let registry = PropertyTypeRegistry::new(source.clone());

        registry.resolve(&type_id("cmis:document")).await.unwrap();
        registry.clear();
        assert!(registry.cached(&type_id("cmis:document")).is_none());

        registry.resolve(&type_id("cmis:document")).await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_during_flight_completes_without_repopulating() {
        let (source, gate) = ScriptedTypeSource::new(vec![folder_type()]).gated();
        let source = Arc::new(source);
        let registry = PropertyTypeRegistry::new(source.clone());

        let waiter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve(&type_id("cmis:folder")).await })
        };
        settle().await;
        registry.clear();
        gate.open();

        let definition = waiter.await.unwrap().unwrap();
        assert_eq!(definition.id().as_str(), "cmis:folder");
        assert!(registry.is_empty());

        registry.resolve(&type_id("cmis:folder")).await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_dropping_one_waiter_keeps_shared_fetch_alive() {
        let (source, gate) = ScriptedTypeSource::new(vec![document_type()]).gated();
        let source = Arc::new(source);
        let registry = PropertyTypeRegistry::new(source.clone());

        let abandoned = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve(&type_id("cmis:document")).await })
        };
        let kept = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve(&type_id("cmis:document")).await })
        };
        settle().await;
        abandoned.abort();
        settle().await;
        gate.open();

        assert!(kept.await.unwrap().is_ok());
        assert_eq!(source.fetch_count(), 1);
        assert!(registry.cached(&type_id("cmis:document")).is_some());
    }

    #[tokio::test]
    async fn test_fetch_abandoned_by_every_waiter_is_restarted() {
        let (source, gate) = ScriptedTypeSource::new(vec![document_type()]).gated();
        let source = Arc::new(source);
        let registry = PropertyTypeRegistry::new(source.clone());

        let only_waiter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve(&type_id("cmis:document")).await })
        };
        settle().await;
        only_waiter.abort();
        settle().await;

        gate.open();
        registry.resolve(&type_id("cmis:document")).await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_entries_are_pruned_on_next_miss() {
        let (source, gate) = ScriptedTypeSource::new(vec![document_type(), folder_type()]).gated();
        let registry = PropertyTypeRegistry::new(Arc::new(source));

        let only_waiter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve(&type_id("cmis:document")).await })
        };
        settle().await;
        only_waiter.abort();
        settle().await;
        assert_eq!(registry.state.lock().in_flight.len(), 1);

        gate.open();
        registry.resolve(&type_id("cmis:folder")).await.unwrap();

        assert!(registry.state.lock().in_flight.is_empty());
        assert!(registry.cached(&type_id("cmis:document")).is_none());
    }

    #[tokio::test]
    async fn test_unknown_type_is_type_resolution_failure() {
        let source = Arc::new(ScriptedTypeSource::new(vec![]));
        let registry = PropertyTypeRegistry::new(source);

        let err = registry.resolve(&type_id("D:missing")).await.unwrap_err();
        assert_eq!(err.stage(), FailureStage::TypeResolution);
    }

    #[tokio::test]
    async fn test_disabled_cache_fetches_every_time() {
        let source = Arc::new(ScriptedTypeSource::new(vec![document_type()]));
        let registry = PropertyTypeRegistry::new(source.clone()).with_cache_enabled(false);

        registry.resolve(&type_id("cmis:document")).await.unwrap();
        registry.resolve(&type_id("cmis:document")).await.unwrap();

        assert_eq!(source.fetch_count(), 2);
        assert!(registry.is_empty());
    }
}

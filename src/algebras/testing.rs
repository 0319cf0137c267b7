//! Scripted collaborators for unit tests.

use super::TypeDefinitionSource;
use crate::error::AppError;
use crate::types::{
    BaseType, Cardinality, ObjectTypeId, PropertyDefinition, PropertyId, PropertyType,
    TypeDefinition,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Builds a type definition from `(id, type, cardinality)` triples.
pub(crate) fn type_def(
    id: &str,
    base: BaseType,
    props: &[(&str, PropertyType, Cardinality)],
) -> TypeDefinition {
    TypeDefinition::new(
        ObjectTypeId::parse(id).unwrap(),
        base,
        None,
        props.iter().map(|(prop, ty, card)| {
            PropertyDefinition::new(PropertyId::parse(prop).unwrap(), *ty, *card)
        }),
    )
    .unwrap()
}

/// The document type most tests convert against.
pub(crate) fn document_type() -> TypeDefinition {
    use Cardinality::*;
    use PropertyType as T;
    type_def(
        "cmis:document",
        BaseType::Document,
        &[
            ("cmis:name", T::String, Single),
            ("cmis:objectId", T::Id, Single),
            ("cmis:contentStreamLength", T::Integer, Single),
            ("cmis:contentStreamMimeType", T::String, Single),
            ("cmis:versionLabel", T::String, Single),
            ("cmis:isLatestVersion", T::Boolean, Single),
            ("cmis:creationDate", T::DateTime, Single),
            ("cmis:secondaryObjectTypeIds", T::Id, Multi),
        ],
    )
}

pub(crate) fn folder_type() -> TypeDefinition {
    use Cardinality::*;
    use PropertyType as T;
    type_def(
        "cmis:folder",
        BaseType::Folder,
        &[
            ("cmis:name", T::String, Single),
            ("cmis:path", T::String, Single),
            ("cmis:parentId", T::Id, Single),
        ],
    )
}

/// Opens a gate that every gated fetch waits on.
pub(crate) struct Gate(watch::Sender<bool>);

impl Gate {
    pub(crate) fn open(&self) {
        let _ = self.0.send(true);
    }
}

/// An in-memory [`TypeDefinitionSource`] that counts fetches and can be
/// told to delay, fail, or wait for a gate.
pub(crate) struct ScriptedTypeSource {
    definitions: HashMap<String, TypeDefinition>,
    delays: HashMap<String, Duration>,
    failures_remaining: Mutex<HashMap<String, usize>>,
    gate: Option<watch::Receiver<bool>>,
    fetches: AtomicUsize,
    fetches_by_type: Mutex<HashMap<String, usize>>,
}

impl ScriptedTypeSource {
    pub(crate) fn new(definitions: Vec<TypeDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|def| (def.id().as_str().to_string(), def))
                .collect(),
            delays: HashMap::new(),
            failures_remaining: Mutex::new(HashMap::new()),
            gate: None,
            fetches: AtomicUsize::new(0),
            fetches_by_type: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn with_delay(mut self, type_id: &str, delay: Duration) -> Self {
        self.delays.insert(type_id.to_string(), delay);
        self
    }

    /// The next `times` fetches of `type_id` fail with a transport error.
    pub(crate) fn failing(self, type_id: &str, times: usize) -> Self {
        self.failures_remaining
            .lock()
            .insert(type_id.to_string(), times);
        self
    }

    /// Every fetch blocks until the returned gate is opened.
    pub(crate) fn gated(mut self) -> (Self, Gate) {
        let (tx, rx) = watch::channel(false);
        self.gate = Some(rx);
        (self, Gate(tx))
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_count_for(&self, type_id: &str) -> usize {
        self.fetches_by_type
            .lock()
            .get(type_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl TypeDefinitionSource for ScriptedTypeSource {
    async fn fetch_type_definition(
        &self,
        type_id: &ObjectTypeId,
    ) -> Result<TypeDefinition, AppError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        *self
            .fetches_by_type
            .lock()
            .entry(type_id.as_str().to_string())
            .or_default() += 1;

        if let Some(mut gate) = self.gate.clone() {
            let _ = gate.wait_for(|open| *open).await;
        }
        if let Some(delay) = self.delays.get(type_id.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        let should_fail = {
            let mut failures = self.failures_remaining.lock();
            match failures.get_mut(type_id.as_str()) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if should_fail {
            return Err(AppError::transport(format!(
                "scripted failure for {}",
                type_id
            )));
        }

        self.definitions
            .get(type_id.as_str())
            .cloned()
            .ok_or_else(|| AppError::transport(format!("no such type: {}", type_id)))
    }
}

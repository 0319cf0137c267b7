// src/convert/object.rs
//! Raw objects to typed domain objects.

use super::extensions::{convert_extensions, merge_extensions};
use super::property::convert_value;
use crate::api::PropertyTypeRegistry;
use crate::constants::PROP_SECONDARY_OBJECT_TYPE_IDS;
use crate::error::AppError;
use crate::model::{
    ConvertedProperties, DomainObject, ExtensionBag, ObjectCommon, PropertyData, RawObjectData,
    RawProperties,
};
use crate::types::{ObjectTypeId, PropertyDefinition, PropertyId, TypeDefinition};
use futures::future::try_join_all;
use indexmap::IndexMap;
use std::sync::Arc;

/// The primary definition followed by any secondary ones. Lookups consult
/// them in that order, so the primary type wins on a shared property id.
struct ResolvedTypes {
    primary: Arc<TypeDefinition>,
    secondary: Vec<Arc<TypeDefinition>>,
}

impl ResolvedTypes {
    fn property(&self, id: &str) -> Option<&PropertyDefinition> {
        std::iter::once(&self.primary)
            .chain(self.secondary.iter())
            .find_map(|definition| definition.property(id))
    }
}

/// Converts raw objects against definitions from a shared registry.
#[derive(Clone)]
pub struct ObjectConverter {
    registry: PropertyTypeRegistry,
}

impl ObjectConverter {
    pub fn new(registry: PropertyTypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PropertyTypeRegistry {
        &self.registry
    }

    /// Converts a bare property map against `object_type_id`.
    ///
    /// Property errors carry no object id here; [`convert_one`] adds it.
    ///
    /// [`convert_one`]: Self::convert_one
    pub async fn convert_properties(
        &self,
        raw: &RawProperties,
        object_type_id: &ObjectTypeId,
    ) -> Result<ConvertedProperties, AppError> {
        let types = self.resolve_types(raw, object_type_id).await?;
        let (properties, undefined) = split_and_convert(raw, &types)?;
        Ok(ConvertedProperties::from_parts(properties, undefined))
    }

    /// Converts one object, selecting its variant from the resolved type.
    pub async fn convert_one(&self, raw: &RawObjectData) -> Result<DomainObject, AppError> {
        let types = self
            .resolve_types(&raw.properties, &raw.object_type_id)
            .await
            .map_err(|e| e.for_object(&raw.id))?;
        let (properties, undefined) =
            split_and_convert(&raw.properties, &types).map_err(|e| e.for_object(&raw.id))?;

        let extensions = merge_extensions(raw.extensions.clone(), undefined);
        let common = ObjectCommon::new(
            raw.id.clone(),
            raw.object_type_id.clone(),
            types.primary.base_type().clone(),
            ConvertedProperties::from_parts(properties, extensions),
            raw.allowable_actions.iter().cloned(),
        );

        let object = DomainObject::from_common(common);
        log::debug!(
            "Converted {} '{}' ({})",
            object.kind_name(),
            object.id(),
            object.object_type_id()
        );
        Ok(object)
    }

    /// Converts every object concurrently, preserving input order.
    ///
    /// All or nothing: the first failure is returned and the remaining
    /// conversions are dropped.
    pub async fn convert_many(&self, raws: &[RawObjectData]) -> Result<Vec<DomainObject>, AppError> {
        try_join_all(raws.iter().map(|raw| self.convert_one(raw))).await
    }

    async fn resolve_types(
        &self,
        raw: &RawProperties,
        object_type_id: &ObjectTypeId,
    ) -> Result<ResolvedTypes, AppError> {
        let secondary_ids = secondary_type_ids(raw, object_type_id)?;

        let primary = self.registry.resolve(object_type_id);
        let secondary = try_join_all(secondary_ids.iter().map(|id| self.registry.resolve(id)));
        let (primary, secondary) = futures::try_join!(primary, secondary)?;

        Ok(ResolvedTypes { primary, secondary })
    }
}

/// Reads the secondary type ids an object declares, dropping duplicates and
/// the primary type itself.
fn secondary_type_ids(
    raw: &RawProperties,
    object_type_id: &ObjectTypeId,
) -> Result<Vec<ObjectTypeId>, AppError> {
    let Some(value) = raw.get(PROP_SECONDARY_OBJECT_TYPE_IDS) else {
        return Ok(Vec::new());
    };

    let mut ids: Vec<ObjectTypeId> = Vec::new();
    for text in value.texts() {
        let id = ObjectTypeId::parse(text).map_err(|e| {
            AppError::malformed(
                &PropertyId::from_trusted(PROP_SECONDARY_OBJECT_TYPE_IDS.to_string()),
                e.to_string(),
            )
        })?;
        if &id != object_type_id && !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Converts defined properties in server order and collects the rest.
fn split_and_convert(
    raw: &RawProperties,
    types: &ResolvedTypes,
) -> Result<(IndexMap<PropertyId, PropertyData>, ExtensionBag), AppError> {
    let mut properties = IndexMap::with_capacity(raw.len());

    for (key, raw_value) in raw {
        let Some(definition) = types.property(key) else {
            continue;
        };
        let value = convert_value(raw_value, definition)?;
        properties.insert(
            definition.id.clone(),
            PropertyData {
                id: definition.id.clone(),
                property_type: definition.property_type,
                cardinality: definition.cardinality,
                value,
            },
        );
    }

    let undefined = convert_extensions(raw, properties.keys().map(PropertyId::as_str));
    if !undefined.is_empty() {
        log::debug!(
            "{} undefined properties routed to the extension bag for type {}",
            undefined.len(),
            types.primary.id()
        );
    }
    Ok((properties, undefined))
}

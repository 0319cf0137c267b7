// src/convert/extensions.rs
//! Splitting unrecognised entries into the passthrough extension bag.

use crate::model::{ExtensionBag, RawValue};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Returns the entries of `source` whose keys are not recognised, in order.
pub fn convert_extensions<'a, I>(source: &IndexMap<String, RawValue>, recognized_keys: I) -> ExtensionBag
where
    I: IntoIterator<Item = &'a str>,
{
    let recognized: HashSet<&str> = recognized_keys.into_iter().collect();
    source
        .iter()
        .filter(|(key, _)| !recognized.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Adds the undefined properties in `extra` to the object's own extension
/// entries. An undefined property replaces an extension entry with the same
/// key, keeping that entry's position.
pub fn merge_extensions(mut base: ExtensionBag, extra: ExtensionBag) -> ExtensionBag {
    for (key, value) in extra {
        if let Some(displaced) = base.insert(key.clone(), value) {
            log::warn!(
                "Undefined property '{}' replaces extension entry {:?}",
                key,
                displaced
            );
        }
    }
    base
}

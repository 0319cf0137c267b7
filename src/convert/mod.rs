// src/convert/mod.rs
//! The conversion engine: raw protocol objects in, typed domain objects out.
//!
//! - [`property`]: one raw value plus its definition to a typed value
//! - [`extensions`]: routing undefined entries into the extension bag
//! - [`object`]: whole objects and ordered lists, resolving types through
//!   the registry

pub mod extensions;
pub mod object;
pub mod property;

pub use extensions::{convert_extensions, merge_extensions};
pub use object::ObjectConverter;
pub use property::{convert_value, parse_typed};

//! Capability algebras for the conversion engine.
//!
//! The engine depends on two collaborators it does not implement:
//!
//! - [`TypeDefinitionSource`]: fetches an object type's definition
//! - [`ObjectTransport`]: fetches raw objects and raw listing windows
//!
//! Both are **object-safe** and async via `async_trait`, so sessions hold
//! them as `Arc<dyn Trait>`.
//!
//! # Laws
//!
//! Each trait documents the laws the engine relies on. Law tests live in
//! the module's test suite.

pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use source::{
    ObjectTransport, ObjectTransportExt, ResourceDescriptor, TransportResponse,
    TypeDefinitionSource,
};

// src/error.rs
//! Application error types with structured error handling.
//!
//! Each variant names the stage that failed (transport, type resolution,
//! property conversion) so callers can react without string matching.
//! Cancellation has no variant: a cancelled request delivers nothing at
//! all, error or otherwise.

use crate::types::{ObjectId, ObjectTypeId, PropertyId, ValidationError};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Transport,
    TypeResolution,
    PropertyConversion,
    Other,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::TypeResolution => write!(f, "type resolution"),
            Self::PropertyConversion => write!(f, "property conversion"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Raised by a transport collaborator and passed through untouched.
    #[error("Transport failure: {message}")]
    TransportFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A type-definition fetch failed. Every waiter coalesced on the fetch
    /// receives the same shared `cause`.
    #[error("Type resolution failed for '{type_id}': {cause}")]
    TypeResolutionFailed {
        type_id: ObjectTypeId,
        #[source]
        cause: Arc<AppError>,
    },

    #[error("Malformed property '{property_id}' {}: {reason}", describe_object(.object_id))]
    MalformedProperty {
        object_id: Option<ObjectId>,
        property_id: PropertyId,
        reason: String,
    },

    #[error("Invalid listing context: {0}")]
    InvalidListing(String),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error for {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn describe_object(object_id: &Option<ObjectId>) -> String {
    match object_id {
        Some(id) => format!("on object '{}'", id),
        None => "in unattached property set".to_string(),
    }
}

impl AppError {
    /// Builds a transport failure from a plain message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a transport failure that keeps the collaborator's own error.
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TransportFailure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn malformed(property_id: &PropertyId, reason: impl Into<String>) -> Self {
        Self::MalformedProperty {
            object_id: None,
            property_id: property_id.clone(),
            reason: reason.into(),
        }
    }

    /// Attaches the owning object's id to a property error raised while
    /// converting a bare property map. Other errors pass through.
    pub(crate) fn for_object(self, id: &ObjectId) -> Self {
        match self {
            Self::MalformedProperty {
                object_id: None,
                property_id,
                reason,
            } => Self::MalformedProperty {
                object_id: Some(id.clone()),
                property_id,
                reason,
            },
            other => other,
        }
    }

    /// Which stage of the pipeline produced this error.
    pub fn stage(&self) -> FailureStage {
        match self {
            Self::TransportFailure { .. } => FailureStage::Transport,
            Self::TypeResolutionFailed { .. } => FailureStage::TypeResolution,
            Self::MalformedProperty { .. } => FailureStage::PropertyConversion,
            _ => FailureStage::Other,
        }
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_property_names_object_and_property() {
        let property = PropertyId::parse("cmis:contentStreamLength").unwrap();
        let err = AppError::malformed(&property, "not an integer: \"abc\"")
            .for_object(&ObjectId::parse("doc-1").unwrap());

        assert_eq!(
            err.to_string(),
            "Malformed property 'cmis:contentStreamLength' on object 'doc-1': not an integer: \"abc\""
        );
        assert_eq!(err.stage(), FailureStage::PropertyConversion);
    }

    #[test]
    fn test_for_object_keeps_existing_object_id() {
        let property = PropertyId::parse("cmis:name").unwrap();
        let err = AppError::malformed(&property, "bad")
            .for_object(&ObjectId::parse("first").unwrap())
            .for_object(&ObjectId::parse("second").unwrap());

        match err {
            AppError::MalformedProperty { object_id, .. } => {
                assert_eq!(object_id.unwrap().as_str(), "first");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_type_resolution_failure_exposes_cause() {
        use std::error::Error;

        let cause = Arc::new(AppError::transport("connection reset"));
        let err = AppError::TypeResolutionFailed {
            type_id: ObjectTypeId::parse("D:inv:invoice").unwrap(),
            cause: Arc::clone(&cause),
        };

        assert_eq!(err.stage(), FailureStage::TypeResolution);
        assert!(err.to_string().contains("D:inv:invoice"));
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("Transport failure: connection reset".to_string())
        );
    }

    #[test]
    fn test_unattached_property_error_message() {
        let property = PropertyId::parse("my:flag").unwrap();
        let err = AppError::malformed(&property, "expected 'true' or 'false'");
        assert_eq!(
            err.to_string(),
            "Malformed property 'my:flag' in unattached property set: expected 'true' or 'false'"
        );
    }
}

use thiserror::Error;

mod definitions;
mod ids;

pub use definitions::*;
pub use ids::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Type '{type_id}' declares property '{property_id}' more than once")]
    DuplicatePropertyDefinition {
        type_id: String,
        property_id: String,
    },
}

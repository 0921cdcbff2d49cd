//! Error types for search construction.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Failures raised while turning caller arguments into SQL conditions.
///
/// Both kinds are caller bugs: nothing is retried and no partial condition
/// is ever applied to the query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Malformed options, empty field/term lists or a malformed field path.
    #[error("invalid search: {0}")]
    InvalidSpec(String),

    /// The field path names a column or relation the entity does not expose.
    #[error("unknown field '{field}' on entity '{entity}'")]
    UnknownField { entity: String, field: String },
}

impl SearchError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SearchError::InvalidSpec(message.into())
    }

    pub(crate) fn unknown_field(entity: &str, field: impl Into<String>) -> Self {
        SearchError::UnknownField {
            entity: entity.to_string(),
            field: field.into(),
        }
    }
}

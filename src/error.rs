//! Error types for the meta-schema registry

use thiserror::Error;

/// Result type for validator construction
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while assembling a [`MetaSchema`](crate::MetaSchema).
///
/// These are fatal and never retried; the caller has to fix the configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("uri must not be blank")]
    BlankUri,

    #[error("id keyword must not be blank")]
    BlankIdKeyword,

    #[error("Overriding the keyword 'format' is not supported: use a format keyword factory or add formats instead")]
    FormatOverride,

    #[error("Meta-schema {uri} has no format keyword, it cannot be used as a blueprint")]
    InvalidBlueprint { uri: String },
}

/// Errors raised while turning a keyword occurrence into a validator
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid value for keyword '{keyword}': {message}")]
    InvalidSchema { keyword: String, message: String },

    #[error("Could not load validator for keyword '{keyword}': {source}")]
    Construction {
        keyword: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SchemaError {
    /// Shorthand for [`SchemaError::InvalidSchema`]
    pub fn invalid_schema(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            keyword: keyword.into(),
            message: message.into(),
        }
    }
}

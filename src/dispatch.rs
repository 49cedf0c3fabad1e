//! Turning keyword occurrences into validators
//!
//! [`KeywordDispatcher::new_validator`] is called once per keyword while a
//! schema is compiled. Unknown keywords are ignored, with one warning per
//! name for as long as the [`UnknownKeywords`] set lives. Share one set
//! between dispatchers to keep that promise across meta-schemas.

use std::sync::Arc;

use dashmap::DashSet;
use serde_json::Value;
use tracing::{error, warn};

use crate::config::SchemaValidatorsConfig;
use crate::error::{Result, SchemaError};
use crate::keyword::{KeywordContext, DISCRIMINATOR, MESSAGE};
use crate::meta_schema::MetaSchema;
use crate::path::{JsonNodePath, SchemaLocation};
use crate::validator::{DiscriminatorValidator, JsonValidator};

/// Keyword names already reported as unknown
#[derive(Debug, Default)]
pub struct UnknownKeywords {
    names: DashSet<String>,
}

impl UnknownKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `name`; true only for the call that inserted it
    pub fn record(&self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Compilation-wide state visible to keywords
#[derive(Debug, Clone)]
pub struct ValidationContext {
    config: Arc<SchemaValidatorsConfig>,
    meta_schema: Arc<MetaSchema>,
}

impl ValidationContext {
    pub fn new(config: Arc<SchemaValidatorsConfig>, meta_schema: Arc<MetaSchema>) -> Self {
        Self { config, meta_schema }
    }

    pub fn config(&self) -> &SchemaValidatorsConfig {
        &self.config
    }

    pub fn meta_schema(&self) -> &Arc<MetaSchema> {
        &self.meta_schema
    }
}

/// Resolves keyword names against a meta-schema and builds their validators
#[derive(Debug, Clone)]
pub struct KeywordDispatcher {
    meta_schema: Arc<MetaSchema>,
    unknown_keywords: Arc<UnknownKeywords>,
}

impl KeywordDispatcher {
    /// A dispatcher with its own unknown-keyword set
    pub fn new(meta_schema: Arc<MetaSchema>) -> Self {
        Self::with_unknown_keywords(meta_schema, Arc::new(UnknownKeywords::new()))
    }

    pub fn with_unknown_keywords(meta_schema: Arc<MetaSchema>, unknown_keywords: Arc<UnknownKeywords>) -> Self {
        Self {
            meta_schema,
            unknown_keywords,
        }
    }

    pub fn meta_schema(&self) -> &Arc<MetaSchema> {
        &self.meta_schema
    }

    pub fn unknown_keywords(&self) -> &Arc<UnknownKeywords> {
        &self.unknown_keywords
    }

    /// Build the validator for `keyword` at this schema position.
    ///
    /// `Ok(None)` means the name is not a validation keyword here.
    pub fn new_validator(
        &self,
        validation_context: &ValidationContext,
        schema_location: &SchemaLocation,
        evaluation_path: &JsonNodePath,
        keyword: &str,
        schema_node: &Value,
        parent_schema: &Value,
    ) -> Result<Option<Box<dyn JsonValidator>>> {
        let ctx = KeywordContext {
            schema_location,
            evaluation_path,
            schema_node,
            parent_schema,
            validation_context,
        };
        let config = validation_context.config();

        // custom messages win over the registry
        if keyword == MESSAGE && config.custom_message_supported {
            return Ok(None);
        }

        let Some(registered) = self.meta_schema.keyword(keyword) else {
            if keyword == DISCRIMINATOR && config.openapi3_style_discriminators {
                return Ok(Some(Box::new(DiscriminatorValidator::new(&ctx)?)));
            }
            if self.unknown_keywords.record(keyword) && config.dispatch.warn_unknown_keywords {
                warn!(
                    keyword,
                    meta_schema = %self.meta_schema,
                    "Unknown keyword {} - you should define your own meta-schema. If the keyword is irrelevant for validation, just use a NonValidationKeyword",
                    keyword
                );
            }
            return Ok(None);
        };

        match registered.new_validator(&ctx) {
            Ok(validator) => Ok(Some(validator)),
            Err(err) => match err.downcast::<SchemaError>() {
                Ok(schema_error) => {
                    error!(keyword, error = %schema_error, "validator construction rejected the schema");
                    Err(schema_error)
                }
                Err(source) => {
                    warn!(keyword, error = %source, "Could not load validator {}", keyword);
                    Err(SchemaError::Construction {
                        keyword: keyword.to_string(),
                        source,
                    })
                }
            },
        }
    }
}

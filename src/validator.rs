//! Validators produced by keywords
//!
//! Assertion and applicator keywords live outside this crate and bring their
//! own [`JsonValidator`] implementations. Only the validators behind the
//! reserved keywords (`format`, annotation keywords, the OpenAPI 3
//! `discriminator`) are defined here.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::format::Format;
use crate::keyword::{KeywordContext, DISCRIMINATOR};
use crate::path::{JsonNodePath, SchemaLocation};

/// A failed assertion reported by a validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    /// Keyword that produced the message
    pub keyword: String,
    /// Message key for localisation (e.g. `format.email`)
    pub message_key: String,
    /// JSON pointer of the offending instance value
    pub instance_location: String,
    /// Evaluation path of the keyword
    pub evaluation_path: String,
    /// Values substituted into the message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.instance_location, self.message_key)?;
        if !self.arguments.is_empty() {
            write!(f, " ({})", self.arguments.join(", "))?;
        }
        Ok(())
    }
}

/// An executable check built from one keyword occurrence
pub trait JsonValidator: Send + Sync + fmt::Debug {
    fn keyword(&self) -> &str;

    fn schema_location(&self) -> &SchemaLocation;

    fn evaluation_path(&self) -> &JsonNodePath;

    /// Check `instance`, returning one message per failure
    fn validate(&self, instance: &Value, instance_location: &JsonNodePath) -> Vec<ValidationMessage>;
}

/// Validator for keywords that only annotate and never fail
#[derive(Debug, Clone)]
pub struct AnnotationValidator {
    keyword: String,
    schema_location: SchemaLocation,
    evaluation_path: JsonNodePath,
}

impl AnnotationValidator {
    pub fn new(keyword: impl Into<String>, ctx: &KeywordContext<'_>) -> Self {
        Self {
            keyword: keyword.into(),
            schema_location: ctx.schema_location.clone(),
            evaluation_path: ctx.evaluation_path.clone(),
        }
    }
}

impl JsonValidator for AnnotationValidator {
    fn keyword(&self) -> &str {
        &self.keyword
    }

    fn schema_location(&self) -> &SchemaLocation {
        &self.schema_location
    }

    fn evaluation_path(&self) -> &JsonNodePath {
        &self.evaluation_path
    }

    fn validate(&self, _instance: &Value, _instance_location: &JsonNodePath) -> Vec<ValidationMessage> {
        Vec::new()
    }
}

/// Validator for one occurrence of the `format` keyword.
///
/// An unknown format name leaves `format` empty and the validator only
/// annotates. Non-string instances are ignored.
#[derive(Debug, Clone)]
pub struct FormatValidator {
    format_name: String,
    format: Option<Arc<dyn Format>>,
    schema_location: SchemaLocation,
    evaluation_path: JsonNodePath,
}

impl FormatValidator {
    pub fn new(
        format_name: impl Into<String>,
        format: Option<Arc<dyn Format>>,
        ctx: &KeywordContext<'_>,
    ) -> Self {
        Self {
            format_name: format_name.into(),
            format,
            schema_location: ctx.schema_location.clone(),
            evaluation_path: ctx.evaluation_path.clone(),
        }
    }

    pub fn format_name(&self) -> &str {
        &self.format_name
    }

    /// Whether a checker was found for the format name
    pub fn is_asserting(&self) -> bool {
        self.format.is_some()
    }
}

impl JsonValidator for FormatValidator {
    fn keyword(&self) -> &str {
        crate::keyword::FORMAT
    }

    fn schema_location(&self) -> &SchemaLocation {
        &self.schema_location
    }

    fn evaluation_path(&self) -> &JsonNodePath {
        &self.evaluation_path
    }

    fn validate(&self, instance: &Value, instance_location: &JsonNodePath) -> Vec<ValidationMessage> {
        let (Some(format), Some(text)) = (&self.format, instance.as_str()) else {
            return Vec::new();
        };
        if format.matches(text) {
            return Vec::new();
        }
        vec![ValidationMessage {
            keyword: self.keyword().to_string(),
            message_key: format.message_key().to_string(),
            instance_location: instance_location.to_string(),
            evaluation_path: self.evaluation_path.to_string(),
            arguments: vec![self.format_name.clone(), text.to_string()],
        }]
    }
}

/// Validator for the OpenAPI 3 `discriminator` keyword.
///
/// Object instances must carry the discriminating property as a string.
#[derive(Debug, Clone)]
pub struct DiscriminatorValidator {
    property_name: String,
    mapping: Vec<(String, String)>,
    schema_location: SchemaLocation,
    evaluation_path: JsonNodePath,
}

impl DiscriminatorValidator {
    pub fn new(ctx: &KeywordContext<'_>) -> Result<Self> {
        let node = ctx
            .schema_node
            .as_object()
            .ok_or_else(|| SchemaError::invalid_schema(DISCRIMINATOR, "expected an object"))?;
        let property_name = node
            .get("propertyName")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::invalid_schema(DISCRIMINATOR, "'propertyName' must be a string"))?;

        let mut mapping = Vec::new();
        if let Some(entries) = node.get("mapping") {
            let entries = entries
                .as_object()
                .ok_or_else(|| SchemaError::invalid_schema(DISCRIMINATOR, "'mapping' must be an object"))?;
            for (value, reference) in entries {
                let reference = reference.as_str().ok_or_else(|| {
                    SchemaError::invalid_schema(DISCRIMINATOR, format!("mapping for '{}' must be a string", value))
                })?;
                mapping.push((value.clone(), reference.to_string()));
            }
        }

        Ok(Self {
            property_name: property_name.to_string(),
            mapping,
            schema_location: ctx.schema_location.clone(),
            evaluation_path: ctx.evaluation_path.clone(),
        })
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Schema reference for a discriminator value, if mapped explicitly
    pub fn mapped_reference(&self, value: &str) -> Option<&str> {
        self.mapping
            .iter()
            .find(|(candidate, _)| candidate == value)
            .map(|(_, reference)| reference.as_str())
    }
}

impl JsonValidator for DiscriminatorValidator {
    fn keyword(&self) -> &str {
        DISCRIMINATOR
    }

    fn schema_location(&self) -> &SchemaLocation {
        &self.schema_location
    }

    fn evaluation_path(&self) -> &JsonNodePath {
        &self.evaluation_path
    }

    fn validate(&self, instance: &Value, instance_location: &JsonNodePath) -> Vec<ValidationMessage> {
        let Some(object) = instance.as_object() else {
            return Vec::new();
        };
        let message_key = match object.get(&self.property_name) {
            Some(Value::String(_)) => return Vec::new(),
            Some(_) => "discriminator.type",
            None => "discriminator.missing",
        };
        vec![ValidationMessage {
            keyword: DISCRIMINATOR.to_string(),
            message_key: message_key.to_string(),
            instance_location: instance_location.to_string(),
            evaluation_path: self.evaluation_path.to_string(),
            arguments: vec![self.property_name.clone()],
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaValidatorsConfig;
    use crate::dispatch::ValidationContext;
    use crate::meta_schema::MetaSchema;
    use serde_json::json;

    fn context() -> ValidationContext {
        ValidationContext::new(
            Arc::new(SchemaValidatorsConfig::default()),
            Arc::new(MetaSchema::v202012()),
        )
    }

    fn keyword_context<'a>(
        schema_node: &'a Value,
        location: &'a SchemaLocation,
        path: &'a JsonNodePath,
        validation_context: &'a ValidationContext,
    ) -> KeywordContext<'a> {
        KeywordContext {
            schema_location: location,
            evaluation_path: path,
            schema_node,
            parent_schema: schema_node,
            validation_context,
        }
    }

    #[test]
    fn test_discriminator_requires_property_name() {
        let ctx = context();
        let location = SchemaLocation::anonymous();
        let path = JsonNodePath::root().append_property(DISCRIMINATOR);

        let node = json!({"mapping": {}});
        let err = DiscriminatorValidator::new(&keyword_context(&node, &location, &path, &ctx)).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchema { ref keyword, .. } if keyword == DISCRIMINATOR));

        let node = json!({"propertyName": "petType", "mapping": {"dog": "#/components/schemas/Dog"}});
        let validator = DiscriminatorValidator::new(&keyword_context(&node, &location, &path, &ctx)).unwrap();
        assert_eq!(validator.property_name(), "petType");
        assert_eq!(validator.mapped_reference("dog"), Some("#/components/schemas/Dog"));
        assert_eq!(validator.mapped_reference("cat"), None);
    }

    #[test]
    fn test_discriminator_validation() {
        let ctx = context();
        let location = SchemaLocation::anonymous();
        let path = JsonNodePath::root();
        let node = json!({"propertyName": "petType"});
        let validator = DiscriminatorValidator::new(&keyword_context(&node, &location, &path, &ctx)).unwrap();

        assert!(validator.validate(&json!({"petType": "dog"}), &path).is_empty());
        assert!(validator.validate(&json!("not an object"), &path).is_empty());

        let messages = validator.validate(&json!({"name": "Rex"}), &path.append_index(3));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_key, "discriminator.missing");
        assert_eq!(messages[0].instance_location, "/3");

        let messages = validator.validate(&json!({"petType": 7}), &path);
        assert_eq!(messages[0].message_key, "discriminator.type");
    }

    #[test]
    fn test_message_display() {
        let message = ValidationMessage {
            keyword: "format".to_string(),
            message_key: "format.email".to_string(),
            instance_location: "/email".to_string(),
            evaluation_path: "/properties/email/format".to_string(),
            arguments: vec!["email".to_string(), "nope".to_string()],
        };
        assert_eq!(message.to_string(), "/email: format.email (email, nope)");
    }
}

//! Meta-schemas
//!
//! A [`MetaSchema`] is the immutable result of assembling keywords, formats
//! and vocabulary toggles for one dialect. It is built once, wrapped in an
//! `Arc` and shared by every schema compilation that uses the dialect.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::builder::MetaSchemaBuilder;
use crate::error::ConfigError;
use crate::format::{builtin_formats, format_map};
use crate::keyword::{FormatKeyword, Keyword, KeywordMap, NonValidationKeyword, StandardFormatKeyword, FORMAT};
use crate::version::SpecVersion;
use crate::vocabulary::{default_vocabularies, VocabularyMap};

/// The annotation-only keywords of each draft
fn annotation_keywords(spec: SpecVersion) -> &'static [&'static str] {
    match spec {
        SpecVersion::V4 => &["$schema", "id", "title", "description", "default", "definitions"],
        SpecVersion::V6 => &[
            "$schema",
            "$id",
            "title",
            "description",
            "default",
            "definitions",
            "examples",
        ],
        SpecVersion::V7 => &[
            "$schema",
            "$id",
            "title",
            "description",
            "default",
            "definitions",
            "$comment",
            "examples",
            "then",
            "else",
            "readOnly",
            "writeOnly",
            "contentMediaType",
            "contentEncoding",
        ],
        SpecVersion::V201909 => &[
            "$schema",
            "$id",
            "title",
            "description",
            "default",
            "definitions",
            "$comment",
            "$defs",
            "$anchor",
            "$vocabulary",
            "$recursiveAnchor",
            "deprecated",
            "examples",
            "then",
            "else",
            "readOnly",
            "writeOnly",
            "contentMediaType",
            "contentEncoding",
            "contentSchema",
        ],
        SpecVersion::V202012 => &[
            "$schema",
            "$id",
            "title",
            "description",
            "default",
            "definitions",
            "$comment",
            "$defs",
            "$anchor",
            "$dynamicAnchor",
            "$vocabulary",
            "deprecated",
            "examples",
            "then",
            "else",
            "readOnly",
            "writeOnly",
            "contentMediaType",
            "contentEncoding",
            "contentSchema",
        ],
    }
}

/// An immutable keyword registry for one dialect
#[derive(Debug, Clone)]
pub struct MetaSchema {
    uri: String,
    id_keyword: String,
    keywords: KeywordMap,
    vocabularies: VocabularyMap,
    specification: Option<SpecVersion>,
}

impl MetaSchema {
    pub(crate) fn from_parts(
        uri: String,
        id_keyword: String,
        keywords: KeywordMap,
        vocabularies: VocabularyMap,
        specification: Option<SpecVersion>,
    ) -> Self {
        Self {
            uri,
            id_keyword,
            keywords,
            vocabularies,
            specification,
        }
    }

    /// The stock meta-schema of a specification version.
    ///
    /// It registers the draft's annotation keywords and the `format`
    /// keyword over the built-in formats. Assertion and applicator keywords
    /// come from the validator implementations, added through
    /// [`MetaSchema::builder_from`].
    pub fn for_version(spec: SpecVersion) -> Self {
        let mut keywords = KeywordMap::new();
        for name in annotation_keywords(spec) {
            keywords.insert(name.to_string(), Arc::new(NonValidationKeyword::new(*name)));
        }
        let format = StandardFormatKeyword::new(format_map(builtin_formats().iter().cloned()));
        keywords.insert(FORMAT.to_string(), Arc::new(format));

        Self::from_parts(
            spec.id().to_string(),
            spec.id_keyword().to_string(),
            keywords,
            default_vocabularies(spec),
            Some(spec),
        )
    }

    pub fn v4() -> Self {
        Self::for_version(SpecVersion::V4)
    }

    pub fn v6() -> Self {
        Self::for_version(SpecVersion::V6)
    }

    pub fn v7() -> Self {
        Self::for_version(SpecVersion::V7)
    }

    pub fn v201909() -> Self {
        Self::for_version(SpecVersion::V201909)
    }

    pub fn v202012() -> Self {
        Self::for_version(SpecVersion::V202012)
    }

    /// A builder without keywords or formats
    pub fn builder(uri: impl Into<String>) -> MetaSchemaBuilder {
        MetaSchemaBuilder::new(uri)
    }

    /// A builder preloaded with everything from `blueprint` except its uri.
    ///
    /// Fails if `blueprint` has no format keyword, which only happens when it
    /// was itself pruned of its format vocabulary.
    pub fn builder_from(uri: impl Into<String>, blueprint: &MetaSchema) -> Result<MetaSchemaBuilder, ConfigError> {
        let format_keyword = blueprint.format_keyword().ok_or_else(|| ConfigError::InvalidBlueprint {
            uri: blueprint.uri.clone(),
        })?;

        Ok(MetaSchemaBuilder::new(uri)
            .id_keyword(blueprint.id_keyword.clone())
            .add_keywords(blueprint.keywords.values().cloned())
            .add_formats(format_keyword.formats().values().cloned())
            .specification_opt(blueprint.specification)
            .vocabularies(blueprint.vocabularies.clone()))
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn id_keyword(&self) -> &str {
        &self.id_keyword
    }

    pub fn keywords(&self) -> &KeywordMap {
        &self.keywords
    }

    pub fn vocabularies(&self) -> &VocabularyMap {
        &self.vocabularies
    }

    pub fn specification(&self) -> Option<SpecVersion> {
        self.specification
    }

    pub fn keyword(&self, name: &str) -> Option<&Arc<dyn Keyword>> {
        self.keywords.get(name)
    }

    pub fn has_keyword(&self, name: &str) -> bool {
        self.keywords.contains_key(name)
    }

    /// The capability in the reserved `format` slot
    pub fn format_keyword(&self) -> Option<&dyn FormatKeyword> {
        self.keywords.get(FORMAT).and_then(|keyword| keyword.as_format_keyword())
    }

    /// The schema's own identifier
    pub fn read_id<'a>(&self, schema_node: &'a Value) -> Option<&'a str> {
        read_text(schema_node, &self.id_keyword)
    }

    /// `$anchor`, if this dialect knows the keyword
    pub fn read_anchor<'a>(&self, schema_node: &'a Value) -> Option<&'a str> {
        if !self.has_keyword("$anchor") {
            return None;
        }
        read_text(schema_node, "$anchor")
    }

    /// `$dynamicAnchor`, if this dialect knows the keyword
    pub fn read_dynamic_anchor<'a>(&self, schema_node: &'a Value) -> Option<&'a str> {
        if !self.has_keyword("$dynamicAnchor") {
            return None;
        }
        read_text(schema_node, "$dynamicAnchor")
    }
}

fn read_text<'a>(node: &'a Value, field: &str) -> Option<&'a str> {
    node.get(field).and_then(Value::as_str)
}

impl fmt::Display for MetaSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stock_meta_schemas() {
        for spec in SpecVersion::ALL {
            let meta_schema = MetaSchema::for_version(spec);
            assert_eq!(meta_schema.uri(), spec.id());
            assert_eq!(meta_schema.to_string(), spec.id());
            assert_eq!(meta_schema.id_keyword(), spec.id_keyword());
            assert_eq!(meta_schema.specification(), Some(spec));
            assert_eq!(meta_schema.vocabularies(), &default_vocabularies(spec));
            assert!(meta_schema.format_keyword().is_some());
            assert!(meta_schema.has_keyword("$schema"));
        }
        assert!(MetaSchema::v4().has_keyword("id"));
        assert!(!MetaSchema::v4().has_keyword("$id"));
    }

    #[test]
    fn test_stock_formats_are_builtin() {
        let meta_schema = MetaSchema::v7();
        let formats = meta_schema.format_keyword().unwrap().formats();
        assert_eq!(formats.len(), builtin_formats().len());
        assert!(formats.contains_key("uuid"));
    }

    #[test]
    fn test_read_id() {
        let schema = json!({"$id": "https://example.com/a", "id": "legacy", "$anchor": "top"});
        assert_eq!(MetaSchema::v202012().read_id(&schema), Some("https://example.com/a"));
        assert_eq!(MetaSchema::v4().read_id(&schema), Some("legacy"));
        assert_eq!(MetaSchema::v7().read_id(&json!({"$id": 5})), None);
    }

    #[test]
    fn test_read_anchor_requires_keyword() {
        let schema = json!({"$anchor": "top", "$dynamicAnchor": "meta"});
        assert_eq!(MetaSchema::v202012().read_anchor(&schema), Some("top"));
        assert_eq!(MetaSchema::v202012().read_dynamic_anchor(&schema), Some("meta"));
        assert_eq!(MetaSchema::v201909().read_dynamic_anchor(&schema), None);
        assert_eq!(MetaSchema::v7().read_anchor(&schema), None);
    }

    #[test]
    fn test_blueprint_requires_format_keyword() {
        let pruned = MetaSchema::from_parts(
            "https://example.com/no-format".to_string(),
            "$id".to_string(),
            KeywordMap::new(),
            VocabularyMap::new(),
            None,
        );
        let err = MetaSchema::builder_from("https://example.com/derived", &pruned).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidBlueprint {
                uri: "https://example.com/no-format".to_string()
            }
        );
    }
}

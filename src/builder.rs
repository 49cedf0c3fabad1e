//! Staged assembly of a [`MetaSchema`]

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::ConfigError;
use crate::format::{Format, FormatMap};
use crate::keyword::{
    FormatKeyword, Keyword, KeywordContext, KeywordMap, StandardFormatKeyword, FORMAT,
};
use crate::meta_schema::MetaSchema;
use crate::validator::JsonValidator;
use crate::version::SpecVersion;
use crate::vocabulary::{prune_keywords, VocabularyMap};

type FormatKeywordFactory = Arc<dyn Fn(&FormatMap) -> Arc<dyn Keyword> + Send + Sync>;

/// Mutable staging area for a [`MetaSchema`].
///
/// Every setter consumes and returns the builder. [`build`](Self::build)
/// consumes it for good; clone the builder first to derive several
/// meta-schemas from the same staging.
#[derive(Clone)]
pub struct MetaSchemaBuilder {
    uri: String,
    id_keyword: String,
    specification: Option<SpecVersion>,
    keywords: KeywordMap,
    formats: FormatMap,
    vocabularies: VocabularyMap,
    format_keyword_factory: Option<FormatKeywordFactory>,
}

impl MetaSchemaBuilder {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            id_keyword: "id".to_string(),
            specification: None,
            keywords: KeywordMap::new(),
            formats: FormatMap::new(),
            vocabularies: VocabularyMap::new(),
            format_keyword_factory: None,
        }
    }

    /// Name of the field holding a schema's own identifier
    pub fn id_keyword(mut self, id_keyword: impl Into<String>) -> Self {
        self.id_keyword = id_keyword.into();
        self
    }

    pub fn specification(mut self, specification: SpecVersion) -> Self {
        self.specification = Some(specification);
        self
    }

    /// Set or clear the specification version
    pub fn specification_opt(mut self, specification: Option<SpecVersion>) -> Self {
        self.specification = specification;
        self
    }

    /// Replace the whole vocabulary map
    pub fn vocabularies(mut self, vocabularies: VocabularyMap) -> Self {
        self.vocabularies = vocabularies;
        self
    }

    /// Request a vocabulary
    pub fn vocabulary(self, vocabulary: impl Into<String>) -> Self {
        self.vocabulary_enabled(vocabulary, true)
    }

    pub fn vocabulary_enabled(mut self, vocabulary: impl Into<String>, enabled: bool) -> Self {
        self.vocabularies.insert(vocabulary.into(), enabled);
        self
    }

    /// Add a keyword under its own name, replacing any previous one.
    ///
    /// A keyword named `format` is only accepted if it is a
    /// [`FormatKeyword`]; anything else makes [`build`](Self::build) fail.
    pub fn add_keyword(mut self, keyword: Arc<dyn Keyword>) -> Self {
        self.keywords.insert(keyword.name().to_string(), keyword);
        self
    }

    pub fn add_keywords<I>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Keyword>>,
    {
        for keyword in keywords {
            self.keywords.insert(keyword.name().to_string(), keyword);
        }
        self
    }

    /// Edit the staged keywords in place
    pub fn keywords<F>(mut self, customizer: F) -> Self
    where
        F: FnOnce(&mut KeywordMap),
    {
        customizer(&mut self.keywords);
        self
    }

    pub fn add_format(mut self, format: Arc<dyn Format>) -> Self {
        self.formats.insert(format.name().to_string(), format);
        self
    }

    pub fn add_formats<I>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Format>>,
    {
        for format in formats {
            self.formats.insert(format.name().to_string(), format);
        }
        self
    }

    /// Edit the staged formats in place
    pub fn formats<F>(mut self, customizer: F) -> Self
    where
        F: FnOnce(&mut FormatMap),
    {
        customizer(&mut self.formats);
        self
    }

    /// Build the reserved `format` keyword with `factory` instead of
    /// [`StandardFormatKeyword`]. The factory receives the staged formats.
    pub fn format_keyword_factory<F, K>(mut self, factory: F) -> Self
    where
        F: Fn(&FormatMap) -> K + Send + Sync + 'static,
        K: FormatKeyword + 'static,
    {
        self.format_keyword_factory = Some(Arc::new(move |formats: &FormatMap| {
            Arc::new(FactoryFormatKeyword(factory(formats))) as Arc<dyn Keyword>
        }));
        self
    }

    /// Staged keywords with the format slot rebuilt from the staged formats
    fn materialize_keywords(&self) -> Result<KeywordMap, ConfigError> {
        let mut keywords = KeywordMap::with_capacity(self.keywords.len() + 1);
        for (name, keyword) in &self.keywords {
            if name == FORMAT {
                if keyword.as_format_keyword().is_none() {
                    return Err(ConfigError::FormatOverride);
                }
                // rebuilt below from the staged formats
                continue;
            }
            keywords.insert(keyword.name().to_string(), Arc::clone(keyword));
        }

        let format_keyword: Arc<dyn Keyword> = match &self.format_keyword_factory {
            Some(factory) => factory(&self.formats),
            None => Arc::new(StandardFormatKeyword::new(self.formats.clone())),
        };
        keywords.insert(FORMAT.to_string(), format_keyword);
        Ok(keywords)
    }

    /// Finalize into an immutable [`MetaSchema`]
    pub fn build(self) -> Result<MetaSchema, ConfigError> {
        let mut keywords = self.materialize_keywords()?;

        if let Some(spec) = self.specification {
            prune_keywords(spec, &self.uri, &self.vocabularies, &mut keywords);
        }

        if self.uri.trim().is_empty() {
            return Err(ConfigError::BlankUri);
        }
        if self.id_keyword.trim().is_empty() {
            return Err(ConfigError::BlankIdKeyword);
        }

        debug!(
            uri = %self.uri,
            keywords = keywords.len(),
            formats = self.formats.len(),
            "built meta-schema"
        );
        Ok(MetaSchema::from_parts(
            self.uri,
            self.id_keyword,
            keywords,
            self.vocabularies,
            self.specification,
        ))
    }
}

/// Factory product, always reachable through [`Keyword::as_format_keyword`]
#[derive(Debug)]
struct FactoryFormatKeyword<K>(K);

impl<K: FormatKeyword> Keyword for FactoryFormatKeyword<K> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn new_validator(&self, ctx: &KeywordContext<'_>) -> anyhow::Result<Box<dyn JsonValidator>> {
        self.0.new_validator(ctx)
    }

    fn as_format_keyword(&self) -> Option<&dyn FormatKeyword> {
        Some(self)
    }
}

impl<K: FormatKeyword> FormatKeyword for FactoryFormatKeyword<K> {
    fn formats(&self) -> &FormatMap {
        self.0.formats()
    }
}

impl fmt::Debug for MetaSchemaBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaSchemaBuilder")
            .field("uri", &self.uri)
            .field("id_keyword", &self.id_keyword)
            .field("specification", &self.specification)
            .field("keywords", &self.keywords.keys().collect::<Vec<_>>())
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .field("vocabularies", &self.vocabularies)
            .field("custom_format_keyword", &self.format_keyword_factory.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{builtin_formats, FnFormat};
    use crate::keyword::{FnKeyword, NonValidationKeyword};

    const URI: &str = "https://example.com/meta";

    #[test]
    fn test_default_id_keyword() {
        let meta_schema = MetaSchemaBuilder::new(URI).build().unwrap();
        assert_eq!(meta_schema.id_keyword(), "id");
        assert_eq!(meta_schema.specification(), None);
    }

    #[test]
    fn test_build_always_has_one_format_keyword() {
        let meta_schema = MetaSchemaBuilder::new(URI)
            .add_keyword(Arc::new(NonValidationKeyword::new("title")))
            .build()
            .unwrap();
        assert_eq!(meta_schema.keywords().len(), 2);
        let format = meta_schema.format_keyword().unwrap();
        assert!(format.formats().is_empty());
    }

    #[test]
    fn test_blank_uri_and_id_keyword_are_rejected() {
        assert_eq!(MetaSchemaBuilder::new("  ").build().unwrap_err(), ConfigError::BlankUri);
        assert_eq!(
            MetaSchemaBuilder::new(URI).id_keyword("").build().unwrap_err(),
            ConfigError::BlankIdKeyword
        );
    }

    #[test]
    fn test_direct_format_override_is_rejected() {
        let impostor = FnKeyword::new(FORMAT, |_ctx| anyhow::bail!("never built"));
        let err = MetaSchemaBuilder::new(URI)
            .add_keyword(Arc::new(impostor))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::FormatOverride);
    }

    #[test]
    fn test_staged_format_keyword_is_rebuilt_from_formats() {
        let stale = StandardFormatKeyword::new(crate::format::format_map(builtin_formats().iter().cloned()));
        let meta_schema = MetaSchemaBuilder::new(URI)
            .add_keyword(Arc::new(stale))
            .add_format(Arc::new(FnFormat::new("even", |v| v.len() % 2 == 0)))
            .build()
            .unwrap();
        let formats = meta_schema.format_keyword().unwrap().formats();
        assert_eq!(formats.len(), 1);
        assert!(formats.contains_key("even"));
    }

    #[test]
    fn test_custom_format_keyword_factory() {
        #[derive(Debug)]
        struct UppercaseFormats(FormatMap);

        impl Keyword for UppercaseFormats {
            fn name(&self) -> &str {
                FORMAT
            }

            fn new_validator(
                &self,
                _ctx: &crate::keyword::KeywordContext<'_>,
            ) -> anyhow::Result<Box<dyn crate::validator::JsonValidator>> {
                anyhow::bail!("not needed here")
            }

            fn as_format_keyword(&self) -> Option<&dyn FormatKeyword> {
                Some(self)
            }
        }

        impl FormatKeyword for UppercaseFormats {
            fn formats(&self) -> &FormatMap {
                &self.0
            }
        }

        let meta_schema = MetaSchemaBuilder::new(URI)
            .add_formats(builtin_formats().iter().cloned())
            .format_keyword_factory(|formats| {
                UppercaseFormats(
                    formats
                        .iter()
                        .map(|(name, format)| (name.to_uppercase(), Arc::clone(format)))
                        .collect(),
                )
            })
            .build()
            .unwrap();

        let formats = meta_schema.format_keyword().unwrap().formats();
        assert!(formats.contains_key("EMAIL"));
        assert!(!formats.contains_key("email"));
    }

    #[test]
    fn test_customizers_and_vocabulary_toggles() {
        let meta_schema = MetaSchemaBuilder::new(URI)
            .keywords(|map| {
                map.insert("title".to_string(), Arc::new(NonValidationKeyword::new("title")));
            })
            .formats(|map| {
                map.insert("odd".to_string(), Arc::new(FnFormat::new("odd", |v| v.len() % 2 == 1)));
            })
            .vocabulary("https://example.com/vocab/a")
            .vocabulary_enabled("https://example.com/vocab/b", false)
            .build()
            .unwrap();

        assert!(meta_schema.has_keyword("title"));
        assert!(meta_schema.format_keyword().unwrap().formats().contains_key("odd"));
        assert_eq!(meta_schema.vocabularies().get("https://example.com/vocab/a"), Some(&true));
        assert_eq!(meta_schema.vocabularies().get("https://example.com/vocab/b"), Some(&false));
    }

    #[test]
    fn test_later_mutation_does_not_touch_built_result() {
        let staged = MetaSchemaBuilder::new(URI).add_keyword(Arc::new(NonValidationKeyword::new("title")));
        let first = staged.clone().build().unwrap();
        let second = staged
            .add_keyword(Arc::new(NonValidationKeyword::new("description")))
            .build()
            .unwrap();
        assert!(!first.has_keyword("description"));
        assert!(second.has_keyword("description"));
    }

    #[test]
    fn test_factory_keyword_keeps_format_capability() {
        // relies on the default `as_format_keyword`
        #[derive(Debug)]
        struct PlainFormats(FormatMap);

        impl Keyword for PlainFormats {
            fn name(&self) -> &str {
                FORMAT
            }

            fn new_validator(&self, ctx: &KeywordContext<'_>) -> anyhow::Result<Box<dyn JsonValidator>> {
                StandardFormatKeyword::new(self.0.clone()).new_validator(ctx)
            }
        }

        impl FormatKeyword for PlainFormats {
            fn formats(&self) -> &FormatMap {
                &self.0
            }
        }

        let meta_schema = MetaSchemaBuilder::new(URI)
            .add_format(Arc::new(FnFormat::new("sku", |v| v.starts_with("SKU-"))))
            .format_keyword_factory(|formats| PlainFormats(formats.clone()))
            .build()
            .unwrap();

        let formats = meta_schema.format_keyword().unwrap().formats();
        assert!(formats.contains_key("sku"));

        let derived = MetaSchema::builder_from("https://example.com/meta/derived", &meta_schema)
            .unwrap()
            .build()
            .unwrap();
        assert!(derived.format_keyword().unwrap().formats().contains_key("sku"));
    }
}

//! Keywords: named validator constructors
//!
//! A [`Keyword`] turns one occurrence of its name in a schema into a
//! [`JsonValidator`]. Construction failures travel through a single
//! `anyhow::Result`; a [`SchemaError`](crate::SchemaError) anywhere in that
//! error is handed back to the caller unchanged by the dispatcher.
//!
//! The `format` keyword is reserved. It is always built from a
//! [`FormatMap`] through [`StandardFormatKeyword`] or a custom factory, see
//! [`MetaSchemaBuilder::format_keyword_factory`](crate::MetaSchemaBuilder::format_keyword_factory).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::dispatch::ValidationContext;
use crate::error::SchemaError;
use crate::format::FormatMap;
use crate::path::{JsonNodePath, SchemaLocation};
use crate::validator::{AnnotationValidator, FormatValidator, JsonValidator};

/// The reserved format keyword
pub const FORMAT: &str = "format";

/// Custom error message keyword, ignored when custom messages are enabled
pub const MESSAGE: &str = "message";

/// OpenAPI 3 discriminator keyword
pub const DISCRIMINATOR: &str = "discriminator";

/// Keywords keyed by name
pub type KeywordMap = HashMap<String, Arc<dyn Keyword>>;

/// Everything a keyword may look at while building its validator
#[derive(Debug, Clone, Copy)]
pub struct KeywordContext<'a> {
    pub schema_location: &'a SchemaLocation,
    pub evaluation_path: &'a JsonNodePath,
    /// Value of the keyword in the schema
    pub schema_node: &'a Value,
    /// The schema object that contains the keyword
    pub parent_schema: &'a Value,
    pub validation_context: &'a ValidationContext,
}

/// A named validator constructor
pub trait Keyword: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn new_validator(&self, ctx: &KeywordContext<'_>) -> anyhow::Result<Box<dyn JsonValidator>>;

    /// `Some` only for implementations of the reserved format capability
    fn as_format_keyword(&self) -> Option<&dyn FormatKeyword> {
        None
    }
}

/// The capability occupying the reserved `format` slot.
///
/// Keywords handed out by a
/// [`format_keyword_factory`](crate::MetaSchemaBuilder::format_keyword_factory)
/// are always recognised. A keyword staged directly under `format` must
/// override [`Keyword::as_format_keyword`], otherwise the build fails with
/// [`ConfigError::FormatOverride`](crate::ConfigError::FormatOverride):
///
/// ```rust
/// # use familiar_metaschema::{FormatKeyword, FormatMap, JsonValidator, Keyword, KeywordContext};
/// #[derive(Debug)]
/// struct LenientFormats(FormatMap);
///
/// impl Keyword for LenientFormats {
///     fn name(&self) -> &str {
///         "format"
///     }
///
///     fn new_validator(&self, _ctx: &KeywordContext<'_>) -> anyhow::Result<Box<dyn JsonValidator>> {
///         anyhow::bail!("lenient formats never validate")
///     }
///
///     fn as_format_keyword(&self) -> Option<&dyn FormatKeyword> {
///         Some(self)
///     }
/// }
///
/// impl FormatKeyword for LenientFormats {
///     fn formats(&self) -> &FormatMap {
///         &self.0
///     }
/// }
/// ```
pub trait FormatKeyword: Keyword {
    fn formats(&self) -> &FormatMap;
}

/// Default `format` keyword: looks the format name up in its map
#[derive(Debug, Clone, Default)]
pub struct StandardFormatKeyword {
    formats: FormatMap,
}

impl StandardFormatKeyword {
    pub fn new(formats: FormatMap) -> Self {
        Self { formats }
    }
}

impl Keyword for StandardFormatKeyword {
    fn name(&self) -> &str {
        FORMAT
    }

    fn new_validator(&self, ctx: &KeywordContext<'_>) -> anyhow::Result<Box<dyn JsonValidator>> {
        let format_name = ctx
            .schema_node
            .as_str()
            .ok_or_else(|| SchemaError::invalid_schema(FORMAT, "expected a string"))?;
        let format = self.formats.get(format_name).cloned();
        Ok(Box::new(FormatValidator::new(format_name, format, ctx)))
    }

    fn as_format_keyword(&self) -> Option<&dyn FormatKeyword> {
        Some(self)
    }
}

impl FormatKeyword for StandardFormatKeyword {
    fn formats(&self) -> &FormatMap {
        &self.formats
    }
}

/// A keyword that is recognised but never validates anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonValidationKeyword {
    name: String,
}

impl NonValidationKeyword {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Keyword for NonValidationKeyword {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_validator(&self, ctx: &KeywordContext<'_>) -> anyhow::Result<Box<dyn JsonValidator>> {
        Ok(Box::new(AnnotationValidator::new(self.name.clone(), ctx)))
    }
}

type Constructor =
    dyn Fn(&KeywordContext<'_>) -> anyhow::Result<Box<dyn JsonValidator>> + Send + Sync;

/// A keyword backed by a closure
#[derive(Clone)]
pub struct FnKeyword {
    name: String,
    constructor: Arc<Constructor>,
}

impl FnKeyword {
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&KeywordContext<'_>) -> anyhow::Result<Box<dyn JsonValidator>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: Arc::new(constructor),
        }
    }
}

impl fmt::Debug for FnKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnKeyword").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Keyword for FnKeyword {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_validator(&self, ctx: &KeywordContext<'_>) -> anyhow::Result<Box<dyn JsonValidator>> {
        (self.constructor)(ctx)
    }
}

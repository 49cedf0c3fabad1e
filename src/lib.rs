//! Familiar Meta-Schema Registry
//!
//! Keyword resolution and validator dispatch for JSON Schema dialects.
//!
//! ## Features
//!
//! - **Versioned Dialects**: Stock meta-schemas for drafts 4, 6, 7, 2019-09 and 2020-12
//! - **Vocabularies**: Derived meta-schemas drop the keywords of vocabularies they omit
//! - **Pluggable Formats**: Built-in format checkers plus regex or closure based ones
//! - **Blueprints**: Clone a meta-schema under a new URI and customise it
//! - **Dispatch**: Map a keyword occurrence to a validator, ignoring unknown keywords
//!
//! ## Architecture
//!
//! ```text
//! MetaSchemaBuilder ──build()──▶ MetaSchema (immutable, Arc-shared)
//!        │                          │
//!        ├─ keywords               ├─ KeywordDispatcher::new_validator
//!        ├─ formats ─▶ format keyword      │
//!        └─ vocabularies ─▶ prune_keywords └─▶ Box<dyn JsonValidator>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use familiar_metaschema::{FnFormat, MetaSchema};
//!
//! let custom = MetaSchema::builder_from("https://example.com/meta", &MetaSchema::v202012())
//!     .unwrap()
//!     .add_format(Arc::new(FnFormat::new("even", |v| v.len() % 2 == 0)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(custom.to_string(), "https://example.com/meta");
//! assert!(custom.format_keyword().unwrap().formats().contains_key("even"));
//! ```

pub mod builder;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod keyword;
pub mod meta_schema;
pub mod path;
pub mod validator;
pub mod version;
pub mod vocabulary;

pub use builder::MetaSchemaBuilder;
pub use config::{DispatchConfig, SchemaValidatorsConfig};
pub use dispatch::{KeywordDispatcher, UnknownKeywords, ValidationContext};
pub use error::{ConfigError, Result, SchemaError};
pub use format::{builtin_formats, FnFormat, Format, FormatMap, PatternFormat};
pub use keyword::{
    FnKeyword, FormatKeyword, Keyword, KeywordContext, KeywordMap, NonValidationKeyword,
    StandardFormatKeyword,
};
pub use meta_schema::MetaSchema;
pub use path::{JsonNodePath, PathSegment, SchemaLocation};
pub use validator::{JsonValidator, ValidationMessage};
pub use version::SpecVersion;
pub use vocabulary::{Vocabulary, VocabularyMap};

//! Vocabulary catalog and keyword pruning
//!
//! From draft 2019-09 onward a meta-schema declares which vocabularies it
//! uses through `$vocabulary`. Each vocabulary contributes a fixed set of
//! keywords. A derived meta-schema that leaves out a vocabulary loses the
//! keywords of that vocabulary.
//!
//! The two 2020-12 format vocabularies are alternatives: requesting either
//! one keeps the `format` keyword alive.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::version::SpecVersion;

/// Requested vocabulary toggles, keyed by vocabulary URI
pub type VocabularyMap = BTreeMap<String, bool>;

/// A named bundle of keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
    id: &'static str,
    keywords: &'static [&'static str],
}

impl Vocabulary {
    pub const V201909_CORE: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2019-09/vocab/core",
        keywords: &[
            "$id",
            "$schema",
            "$anchor",
            "$ref",
            "$recursiveRef",
            "$recursiveAnchor",
            "$vocabulary",
            "$comment",
            "$defs",
        ],
    };

    pub const V201909_APPLICATOR: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2019-09/vocab/applicator",
        keywords: &[
            "additionalItems",
            "unevaluatedItems",
            "items",
            "contains",
            "additionalProperties",
            "unevaluatedProperties",
            "properties",
            "patternProperties",
            "dependentSchemas",
            "propertyNames",
            "if",
            "then",
            "else",
            "allOf",
            "anyOf",
            "oneOf",
            "not",
        ],
    };

    pub const V201909_VALIDATION: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2019-09/vocab/validation",
        keywords: &[
            "multipleOf",
            "maximum",
            "exclusiveMaximum",
            "minimum",
            "exclusiveMinimum",
            "maxLength",
            "minLength",
            "pattern",
            "maxItems",
            "minItems",
            "uniqueItems",
            "maxContains",
            "minContains",
            "maxProperties",
            "minProperties",
            "required",
            "dependentRequired",
            "const",
            "enum",
            "type",
        ],
    };

    pub const V201909_META_DATA: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2019-09/vocab/meta-data",
        keywords: &[
            "title",
            "description",
            "default",
            "deprecated",
            "readOnly",
            "writeOnly",
            "examples",
        ],
    };

    pub const V201909_FORMAT: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2019-09/vocab/format",
        keywords: &["format"],
    };

    pub const V201909_CONTENT: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2019-09/vocab/content",
        keywords: &["contentMediaType", "contentEncoding", "contentSchema"],
    };

    pub const V202012_CORE: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2020-12/vocab/core",
        keywords: &[
            "$id",
            "$schema",
            "$ref",
            "$anchor",
            "$dynamicRef",
            "$dynamicAnchor",
            "$vocabulary",
            "$comment",
            "$defs",
        ],
    };

    pub const V202012_APPLICATOR: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2020-12/vocab/applicator",
        keywords: &[
            "prefixItems",
            "items",
            "contains",
            "additionalProperties",
            "properties",
            "patternProperties",
            "dependentSchemas",
            "propertyNames",
            "if",
            "then",
            "else",
            "allOf",
            "anyOf",
            "oneOf",
            "not",
        ],
    };

    pub const V202012_UNEVALUATED: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2020-12/vocab/unevaluated",
        keywords: &["unevaluatedItems", "unevaluatedProperties"],
    };

    pub const V202012_VALIDATION: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2020-12/vocab/validation",
        keywords: &[
            "type",
            "const",
            "enum",
            "multipleOf",
            "maximum",
            "exclusiveMaximum",
            "minimum",
            "exclusiveMinimum",
            "maxLength",
            "minLength",
            "pattern",
            "maxItems",
            "minItems",
            "uniqueItems",
            "maxContains",
            "minContains",
            "maxProperties",
            "minProperties",
            "required",
            "dependentRequired",
        ],
    };

    pub const V202012_META_DATA: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2020-12/vocab/meta-data",
        keywords: &[
            "title",
            "description",
            "default",
            "deprecated",
            "readOnly",
            "writeOnly",
            "examples",
        ],
    };

    pub const V202012_FORMAT_ANNOTATION: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2020-12/vocab/format-annotation",
        keywords: &["format"],
    };

    pub const V202012_FORMAT_ASSERTION: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2020-12/vocab/format-assertion",
        keywords: &["format"],
    };

    pub const V202012_CONTENT: Vocabulary = Vocabulary {
        id: "https://json-schema.org/draft/2020-12/vocab/content",
        keywords: &["contentEncoding", "contentMediaType", "contentSchema"],
    };

    /// Every vocabulary in the catalog
    pub const ALL: [Vocabulary; 14] = [
        Vocabulary::V201909_CORE,
        Vocabulary::V201909_APPLICATOR,
        Vocabulary::V201909_VALIDATION,
        Vocabulary::V201909_META_DATA,
        Vocabulary::V201909_FORMAT,
        Vocabulary::V201909_CONTENT,
        Vocabulary::V202012_CORE,
        Vocabulary::V202012_APPLICATOR,
        Vocabulary::V202012_UNEVALUATED,
        Vocabulary::V202012_VALIDATION,
        Vocabulary::V202012_META_DATA,
        Vocabulary::V202012_FORMAT_ANNOTATION,
        Vocabulary::V202012_FORMAT_ASSERTION,
        Vocabulary::V202012_CONTENT,
    ];

    /// Vocabulary URI
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Keywords contributed by this vocabulary
    pub fn keywords(&self) -> &'static [&'static str] {
        self.keywords
    }

    /// Find a vocabulary by URI
    pub fn by_id(id: &str) -> Option<Vocabulary> {
        Self::ALL.into_iter().find(|v| v.id == id)
    }
}

/// The `$vocabulary` map of a version's own meta-schema.
///
/// Empty for drafts that predate vocabularies.
pub fn default_vocabularies(spec: SpecVersion) -> VocabularyMap {
    let entries: &[(Vocabulary, bool)] = match spec {
        SpecVersion::V4 | SpecVersion::V6 | SpecVersion::V7 => &[],
        SpecVersion::V201909 => &[
            (Vocabulary::V201909_CORE, true),
            (Vocabulary::V201909_APPLICATOR, true),
            (Vocabulary::V201909_VALIDATION, true),
            (Vocabulary::V201909_META_DATA, true),
            (Vocabulary::V201909_FORMAT, false),
            (Vocabulary::V201909_CONTENT, true),
        ],
        SpecVersion::V202012 => &[
            (Vocabulary::V202012_CORE, true),
            (Vocabulary::V202012_APPLICATOR, true),
            (Vocabulary::V202012_UNEVALUATED, true),
            (Vocabulary::V202012_VALIDATION, true),
            (Vocabulary::V202012_META_DATA, true),
            (Vocabulary::V202012_FORMAT_ANNOTATION, true),
            (Vocabulary::V202012_CONTENT, true),
        ],
    };
    entries
        .iter()
        .map(|(vocabulary, enabled)| (vocabulary.id.to_string(), *enabled))
        .collect()
}

/// The alternative format vocabulary for `id`, if it has one
pub fn format_counterpart(id: &str) -> Option<&'static str> {
    if id == Vocabulary::V202012_FORMAT_ANNOTATION.id {
        Some(Vocabulary::V202012_FORMAT_ASSERTION.id)
    } else if id == Vocabulary::V202012_FORMAT_ASSERTION.id {
        Some(Vocabulary::V202012_FORMAT_ANNOTATION.id)
    } else {
        None
    }
}

/// Remove the keywords of every default vocabulary that `requested` leaves out.
///
/// Only a derived meta-schema of a vocabulary-aware version is pruned; the
/// version's own meta-schema (`uri == spec.id()`) keeps everything. Presence
/// of a key in `requested` counts, not its value. Keywords are only ever
/// removed.
pub fn prune_keywords<V>(
    spec: SpecVersion,
    uri: &str,
    requested: &VocabularyMap,
    keywords: &mut HashMap<String, V>,
) {
    if !spec.is_vocabulary_aware() || uri == spec.id() {
        return;
    }

    for vocabulary_id in default_vocabularies(spec).keys() {
        if requested.contains_key(vocabulary_id) {
            continue;
        }
        if let Some(counterpart) = format_counterpart(vocabulary_id) {
            if requested.contains_key(counterpart) {
                // either format vocabulary enables the same keyword
                continue;
            }
        }
        let Some(vocabulary) = Vocabulary::by_id(vocabulary_id) else {
            continue;
        };
        debug!(%uri, vocabulary = vocabulary_id.as_str(), "pruning keywords of omitted vocabulary");
        for keyword in vocabulary.keywords {
            keywords.remove(*keyword);
        }
    }
}

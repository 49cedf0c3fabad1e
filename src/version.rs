//! Specification versions (JSON Schema drafts)

use serde::{Deserialize, Serialize};
use std::fmt;

/// A generation of the schema language.
///
/// Variants are declared oldest first, so the derived ordering compares
/// generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpecVersion {
    #[serde(rename = "draft4")]
    V4,
    #[serde(rename = "draft6")]
    V6,
    #[serde(rename = "draft7")]
    V7,
    #[serde(rename = "draft2019-09")]
    V201909,
    #[serde(rename = "draft2020-12")]
    V202012,
}

impl SpecVersion {
    /// All known versions, oldest first
    pub const ALL: [SpecVersion; 5] = [
        SpecVersion::V4,
        SpecVersion::V6,
        SpecVersion::V7,
        SpecVersion::V201909,
        SpecVersion::V202012,
    ];

    /// Canonical meta-schema URI of this version
    pub fn id(&self) -> &'static str {
        match self {
            SpecVersion::V4 => "http://json-schema.org/draft-04/schema#",
            SpecVersion::V6 => "http://json-schema.org/draft-06/schema#",
            SpecVersion::V7 => "http://json-schema.org/draft-07/schema#",
            SpecVersion::V201909 => "https://json-schema.org/draft/2019-09/schema",
            SpecVersion::V202012 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// Numeric generation flag
    pub fn flag(&self) -> u32 {
        match self {
            SpecVersion::V4 => 1,
            SpecVersion::V6 => 1 << 1,
            SpecVersion::V7 => 1 << 2,
            SpecVersion::V201909 => 1 << 3,
            SpecVersion::V202012 => 1 << 4,
        }
    }

    /// Name of the field holding a schema's own identifier
    pub fn id_keyword(&self) -> &'static str {
        match self {
            SpecVersion::V4 => "id",
            _ => "$id",
        }
    }

    /// Whether keywords of this version are grouped into toggleable vocabularies
    pub fn is_vocabulary_aware(&self) -> bool {
        *self >= SpecVersion::V201909
    }

    /// Look up a version by its meta-schema URI.
    ///
    /// An empty fragment (`#`) is ignored on both sides.
    pub fn from_id(uri: &str) -> Option<Self> {
        let wanted = uri.trim().trim_end_matches('#');
        Self::ALL
            .into_iter()
            .find(|v| v.id().trim_end_matches('#') == wanted)
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpecVersion::V4 => "draft4",
            SpecVersion::V6 => "draft6",
            SpecVersion::V7 => "draft7",
            SpecVersion::V201909 => "draft2019-09",
            SpecVersion::V202012 => "draft2020-12",
        };
        f.write_str(name)
    }
}

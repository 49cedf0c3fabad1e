//! String format checkers
//!
//! A [`Format`] decides whether a string has a named shape (`email`,
//! `date-time`, ...). Formats are collected into a [`FormatMap`] which the
//! reserved `format` keyword wraps.
//!
//! [`builtin_formats`] is the baseline shared by every specification version.
//! It also carries a few conveniences that no draft defines (`alpha`,
//! `color`, `phone`, ...).

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv6Addr;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use url::Url;

/// Formats keyed by name
pub type FormatMap = HashMap<String, Arc<dyn Format>>;

/// A named string-shape checker
pub trait Format: Send + Sync + fmt::Debug {
    /// Name used as the value of the `format` keyword
    fn name(&self) -> &str;

    /// Whether `value` has this format
    fn matches(&self, value: &str) -> bool;

    /// Message key reported when a value does not match
    fn message_key(&self) -> &str {
        "format"
    }
}

/// Collect formats into a map keyed by name; later entries win
pub fn format_map<I>(formats: I) -> FormatMap
where
    I: IntoIterator<Item = Arc<dyn Format>>,
{
    formats
        .into_iter()
        .map(|format| (format.name().to_string(), format))
        .collect()
}

/// A format backed by a regular expression that must match the whole value
#[derive(Debug, Clone)]
pub struct PatternFormat {
    name: String,
    pattern: Regex,
    message_key: Option<String>,
}

impl PatternFormat {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(&format!("^(?:{})$", pattern))?,
            message_key: None,
        })
    }

    pub fn with_message_key(mut self, message_key: impl Into<String>) -> Self {
        self.message_key = Some(message_key.into());
        self
    }
}

impl Format for PatternFormat {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }

    fn message_key(&self) -> &str {
        self.message_key.as_deref().unwrap_or("format")
    }
}

/// A format backed by an arbitrary predicate
#[derive(Clone)]
pub struct FnFormat {
    name: String,
    predicate: Arc<dyn Fn(&str) -> bool + Send + Sync>,
    message_key: Option<String>,
}

impl FnFormat {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            message_key: None,
        }
    }

    pub fn with_message_key(mut self, message_key: impl Into<String>) -> Self {
        self.message_key = Some(message_key.into());
        self
    }
}

impl fmt::Debug for FnFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFormat")
            .field("name", &self.name)
            .field("message_key", &self.message_key)
            .finish_non_exhaustive()
    }
}

impl Format for FnFormat {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, value: &str) -> bool {
        (self.predicate)(value)
    }

    fn message_key(&self) -> &str {
        self.message_key.as_deref().unwrap_or("format")
    }
}

fn pattern(name: &str, regex: &str, message_key: Option<&str>) -> Arc<dyn Format> {
    let format = PatternFormat::new(name, regex).expect("built-in format pattern compiles");
    match message_key {
        Some(key) => Arc::new(format.with_message_key(key)),
        None => Arc::new(format),
    }
}

fn predicate<F>(name: &str, check: F) -> Arc<dyn Format>
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    Arc::new(FnFormat::new(name, check).with_message_key(format!("format.{}", name)))
}

const REFERENCE_BASE: &str = "http://example.invalid/";

fn is_iri_reference(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    Url::parse(value).is_ok() || Url::parse(REFERENCE_BASE).and_then(|base| base.join(value)).is_ok()
}

fn is_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn is_time(value: &str) -> bool {
    // RFC 3339 full-time, checked by borrowing the date-time grammar
    !value.contains('T')
        && !value.contains('t')
        && DateTime::parse_from_rfc3339(&format!("1970-01-01T{}", value)).is_ok()
}

/// The baseline formats shared by every specification version
pub fn builtin_formats() -> &'static [Arc<dyn Format>] {
    static FORMATS: OnceLock<Vec<Arc<dyn Format>>> = OnceLock::new();
    FORMATS.get_or_init(|| {
        vec![
            pattern(
                "hostname",
                r"([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])(\.([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]{0,61}[a-zA-Z0-9]))*",
                Some("format.hostname"),
            ),
            pattern(
                "ipv4",
                r"(([0-9]|[1-9][0-9]|1[0-9][0-9]|2[0-4][0-9]|25[0-5])\.){3}([0-9]|[1-9][0-9]|1[0-9][0-9]|2[0-4][0-9]|25[0-5])",
                Some("format.ipv4"),
            ),
            predicate("ipv6", |v| v.parse::<Ipv6Addr>().is_ok()),
            pattern("json-pointer", r"(/([^/#~]|~[01])*)*", Some("format.json-pointer")),
            pattern(
                "relative-json-pointer",
                r"(0|[1-9][0-9]*)(#|(/([^/#~]|~[01])*)*)",
                Some("format.relative-json-pointer"),
            ),
            pattern(
                "uri-template",
                r#"([^\p{Cc}"'%<>\^`\{|\}]|%[0-9A-Fa-f]{2}|\{[+#./;?&=,!@|]?((\w|%[0-9A-Fa-f]{2})(\.?(\w|%[0-9A-Fa-f]{2}))*(:[1-9][0-9]{0,3}|\*)?)(,((\w|%[0-9A-Fa-f]{2})(\.?(\w|%[0-9A-Fa-f]{2}))*(:[1-9][0-9]{0,3}|\*)?))*\})*"#,
                Some("format.uri-template"),
            ),
            pattern(
                "uuid",
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                Some("format.uuid"),
            ),
            predicate("date", is_date),
            predicate("date-time", |v| DateTime::parse_from_rfc3339(v).is_ok()),
            predicate("time", is_time),
            pattern(
                "duration",
                r"P(?:[0-9]+W|(?:[0-9]+Y(?:[0-9]+M)?(?:[0-9]+D)?|[0-9]+M(?:[0-9]+D)?|[0-9]+D)(?:T(?:[0-9]+H(?:[0-9]+M)?(?:[0-9]+S)?|[0-9]+M(?:[0-9]+S)?|[0-9]+S))?|T(?:[0-9]+H(?:[0-9]+M)?(?:[0-9]+S)?|[0-9]+M(?:[0-9]+S)?|[0-9]+S))",
                Some("format.duration"),
            ),
            pattern(
                "email",
                r"[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*",
                Some("format.email"),
            ),
            pattern(
                "idn-email",
                r#"[^\s@"(),:;<>\[\\\]]+@[^\s@.]+(\.[^\s@.]+)*"#,
                Some("format.idn-email"),
            ),
            pattern(
                "idn-hostname",
                r"[\p{L}\p{N}\p{M}](?:[\p{L}\p{N}\p{M}\-]{0,61}[\p{L}\p{N}\p{M}])?(\.[\p{L}\p{N}\p{M}](?:[\p{L}\p{N}\p{M}\-]{0,61}[\p{L}\p{N}\p{M}])?)*",
                Some("format.idn-hostname"),
            ),
            predicate("iri", |v| Url::parse(v).is_ok()),
            predicate("iri-reference", is_iri_reference),
            predicate("regex", |v| Regex::new(v).is_ok()),
            predicate("uri", |v| v.is_ascii() && Url::parse(v).is_ok()),
            predicate("uri-reference", |v| v.is_ascii() && is_iri_reference(v)),
            // not defined by any draft
            pattern("alpha", r"[a-zA-Z]+", None),
            pattern("alphanumeric", r"[a-zA-Z0-9]+", None),
            pattern(
                "color",
                r"(#?([0-9A-Fa-f]{3,6})\b)|(aqua)|(black)|(blue)|(fuchsia)|(gray)|(green)|(lime)|(maroon)|(navy)|(olive)|(orange)|(purple)|(red)|(silver)|(teal)|(white)|(yellow)|(rgb\(\s*\b([0-9]|[1-9][0-9]|1[0-9][0-9]|2[0-4][0-9]|25[0-5])\b\s*,\s*\b([0-9]|[1-9][0-9]|1[0-9][0-9]|2[0-4][0-9]|25[0-5])\b\s*,\s*\b([0-9]|[1-9][0-9]|1[0-9][0-9]|2[0-4][0-9]|25[0-5])\b\s*\))|(rgb\(\s*([0-9]?[0-9]%|100%)+\s*,\s*([0-9]?[0-9]%|100%)+\s*,\s*([0-9]?[0-9]%|100%)+\s*\))",
                None,
            ),
            pattern(
                "ip-address",
                r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)",
                None,
            ),
            pattern("phone", r"\+(?:[0-9] ?){6,14}[0-9]", None),
            pattern("style", r"\s*(.+?):\s*([^;]+);?", None),
            pattern("utc-millisec", r"[0-9]+(\.?[0-9]+)?", None),
        ]
    })
}

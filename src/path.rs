//! Structural locations handed to constructed validators

use std::fmt;

/// One step of a [`JsonNodePath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Property(String),
    Index(usize),
}

/// A path into a JSON document, rendered as a JSON pointer.
///
/// Used both for evaluation paths (how a schema was reached) and for
/// instance locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonNodePath {
    segments: Vec<PathSegment>,
}

impl JsonNodePath {
    /// The document root
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path with `name` appended
    pub fn append_property(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Property(name.into()));
        Self { segments }
    }

    /// A new path with `index` appended
    pub fn append_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment, if any
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

impl fmt::Display for JsonNodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                PathSegment::Property(name) => {
                    write!(f, "/{}", name.replace('~', "~0").replace('/', "~1"))?
                }
                PathSegment::Index(index) => write!(f, "/{}", index)?,
            }
        }
        Ok(())
    }
}

/// Where a schema fragment lives: the absolute IRI of its resource plus a
/// pointer into that resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaLocation {
    absolute_iri: Option<String>,
    fragment: JsonNodePath,
}

impl SchemaLocation {
    pub fn new(absolute_iri: impl Into<String>) -> Self {
        Self {
            absolute_iri: Some(absolute_iri.into()),
            fragment: JsonNodePath::root(),
        }
    }

    /// A location in an anonymous (unidentified) schema
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn absolute_iri(&self) -> Option<&str> {
        self.absolute_iri.as_deref()
    }

    pub fn fragment(&self) -> &JsonNodePath {
        &self.fragment
    }

    /// A new location one property deeper
    pub fn append_property(&self, name: impl Into<String>) -> Self {
        Self {
            absolute_iri: self.absolute_iri.clone(),
            fragment: self.fragment.append_property(name),
        }
    }

    /// A new location one array element deeper
    pub fn append_index(&self, index: usize) -> Self {
        Self {
            absolute_iri: self.absolute_iri.clone(),
            fragment: self.fragment.append_index(index),
        }
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(iri) = &self.absolute_iri {
            f.write_str(iri)?;
        }
        write!(f, "#{}", self.fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_rendering() {
        let path = JsonNodePath::root()
            .append_property("properties")
            .append_property("a/b~c")
            .append_index(2);
        assert_eq!(path.to_string(), "/properties/a~1b~0c/2");
        assert_eq!(path.last(), Some(&PathSegment::Index(2)));
        assert!(JsonNodePath::root().is_root());
        assert_eq!(JsonNodePath::root().to_string(), "");
    }

    #[test]
    fn test_schema_location() {
        let location = SchemaLocation::new("https://example.com/person.json")
            .append_property("properties")
            .append_property("email");
        assert_eq!(location.to_string(), "https://example.com/person.json#/properties/email");
        assert_eq!(SchemaLocation::anonymous().append_index(0).to_string(), "#/0");
    }
}

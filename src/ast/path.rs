use std::fmt;

/// Attribute reference such as `@.roles.client-roles.kafka`.
///
/// Segments are resolved one at a time from the document root. Deep scan,
/// array indexing and bracket notation are rejected by the parser, so every
/// segment is a plain, non-empty key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    pub segments: Vec<String>,
}

impl AttributePath {
    pub fn new(segments: Vec<String>) -> Self {
        AttributePath { segments }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("@")?;
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

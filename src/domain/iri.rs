use crate::utils::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// GeoNames "Earth" entry, the spatial context used when a demand names none.
pub const GLOBAL_REGION_IRI: &str = "https://sws.geonames.org/6295630/";

/// Opaque reference to an external resource (a product, a location, ...).
///
/// The text must parse as an absolute IRI but is otherwise kept exactly as
/// given, so two identifiers are equal only when their text is. Descriptive
/// information is obtained through an [`IriResolver`](crate::domain::ports::IriResolver).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri(String);

impl Iri {
    pub fn parse(value: &str) -> Result<Self> {
        if value.trim().is_empty() {
            return Err(ModelError::InvalidIri {
                value: value.to_string(),
                reason: "IRI cannot be empty".to_string(),
            });
        }

        if value.chars().any(char::is_whitespace) {
            return Err(ModelError::InvalidIri {
                value: value.to_string(),
                reason: "IRI cannot contain whitespace".to_string(),
            });
        }

        Url::parse(value).map_err(|e| ModelError::InvalidIri {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self(value.to_string()))
    }

    pub fn global() -> Self {
        Self(GLOBAL_REGION_IRI.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Iri {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Iri {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Iri {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Iri> for String {
    fn from(iri: Iri) -> Self {
        iri.0
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_text_verbatim() {
        let iri = Iri::parse("https://example.org/Product/Steel").unwrap();
        assert_eq!(iri.as_str(), "https://example.org/Product/Steel");
        assert_eq!(iri.to_string(), "https://example.org/Product/Steel");
    }

    #[test]
    fn test_parse_accepts_urn() {
        let iri: Iri = "urn:uuid:6e8bc430-9c3a-11d9-9669-0800200c9a66".parse().unwrap();
        assert!(iri.as_str().starts_with("urn:uuid:"));
    }

    #[test]
    fn test_parse_rejects_relative_and_empty() {
        assert!(matches!(Iri::parse(""), Err(ModelError::InvalidIri { .. })));
        assert!(matches!(
            Iri::parse("products/steel"),
            Err(ModelError::InvalidIri { .. })
        ));
        assert!(matches!(
            Iri::parse("https://example.org/a b"),
            Err(ModelError::InvalidIri { .. })
        ));
    }

    #[test]
    fn test_default_is_global_region() {
        assert_eq!(Iri::default().as_str(), GLOBAL_REGION_IRI);
    }

    #[test]
    fn test_serde_as_plain_string() {
        let iri = Iri::global();
        let json = serde_json::to_string(&iri).unwrap();
        assert_eq!(json, format!("\"{}\"", GLOBAL_REGION_IRI));

        let back: Iri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, iri);

        let bad: std::result::Result<Iri, _> = serde_json::from_str("\"not an iri\"");
        assert!(bad.is_err());
    }
}

//! Content kinds and attribution.
//!
//! Content kinds are an open-ended set: a handful ship built in and more can be
//! registered at startup through [`ContentTypeRegistry::register`]. Anything
//! coming in over the wire goes through [`ContentTypeRegistry::parse`], which is
//! the only place a kind is validated.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::owner::OwnerId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub enum ContentType {
    Documents,
    Youtube,
    X,
    Links,
    Videos,
    Images,
    /// A kind registered at runtime.
    Custom(String),
}

impl ContentType {
    pub const BUILTIN: [ContentType; 6] = [
        ContentType::Documents,
        ContentType::Youtube,
        ContentType::X,
        ContentType::Links,
        ContentType::Videos,
        ContentType::Images,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Documents => "Documents",
            ContentType::Youtube => "Youtube",
            ContentType::X => "X",
            ContentType::Links => "Links",
            ContentType::Videos => "Videos",
            ContentType::Images => "Images",
            ContentType::Custom(name) => name,
        }
    }

    /// Map a stored name back to a kind without validating it.
    pub fn from_name(name: &str) -> Self {
        Self::BUILTIN
            .iter()
            .find(|builtin| builtin.as_str() == name)
            .cloned()
            .unwrap_or_else(|| ContentType::Custom(name.to_string()))
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ContentTypeError {
    #[error("unknown content type: {0}")]
    Unknown(String),
    #[error("content type name cannot be empty")]
    Empty,
}

/// The set of content kinds this deployment accepts.
#[derive(Debug, Clone)]
pub struct ContentTypeRegistry {
    custom: BTreeSet<String>,
}

impl ContentTypeRegistry {
    /// A registry holding only the built-in kinds.
    pub fn new() -> Self {
        Self {
            custom: BTreeSet::new(),
        }
    }

    pub fn with_custom<I, S>(names: I) -> Result<Self, ContentTypeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name.as_ref())?;
        }
        Ok(registry)
    }

    /// Register an additional kind. Registering a built-in name is a no-op.
    pub fn register(&mut self, name: &str) -> Result<ContentType, ContentTypeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContentTypeError::Empty);
        }
        let kind = ContentType::from_name(name);
        if let ContentType::Custom(custom) = &kind {
            tracing::debug!(content_type = %custom, "registered content type");
            self.custom.insert(custom.clone());
        }
        Ok(kind)
    }

    pub fn parse(&self, name: &str) -> Result<ContentType, ContentTypeError> {
        match ContentType::from_name(name) {
            ContentType::Custom(custom) if !self.custom.contains(&custom) => {
                Err(ContentTypeError::Unknown(custom))
            }
            kind => Ok(kind),
        }
    }

    pub fn kinds(&self) -> Vec<ContentType> {
        ContentType::BUILTIN
            .iter()
            .cloned()
            .chain(self.custom.iter().cloned().map(ContentType::Custom))
            .collect()
    }
}

impl Default for ContentTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub const ANONYMOUS: &str = "anonymous";

/// Who performed a create or update on a content item.
///
/// Stored and serialized as either `anonymous` or the owner's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Attribution {
    Anonymous,
    ByOwner(OwnerId),
}

impl Attribution {
    pub fn from_authenticated(authenticated: Option<OwnerId>) -> Self {
        authenticated.map_or(Attribution::Anonymous, Attribution::ByOwner)
    }

    pub fn owner(&self) -> Option<OwnerId> {
        match self {
            Attribution::Anonymous => None,
            Attribution::ByOwner(owner) => Some(*owner),
        }
    }
}

impl Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribution::Anonymous => f.write_str(ANONYMOUS),
            Attribution::ByOwner(owner) => write!(f, "{}", owner),
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("attribution must be 'anonymous' or an owner id, got '{0}'")]
pub struct AttributionError(String);

impl FromStr for Attribution {
    type Err = AttributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ANONYMOUS {
            return Ok(Attribution::Anonymous);
        }
        s.parse::<OwnerId>()
            .map(Attribution::ByOwner)
            .map_err(|_| AttributionError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds_parse_without_registration() {
        let registry = ContentTypeRegistry::new();
        assert_eq!(registry.parse("Youtube").unwrap(), ContentType::Youtube);
        assert_eq!(registry.parse("X").unwrap(), ContentType::X);
        assert_eq!(
            registry.parse("Podcasts"),
            Err(ContentTypeError::Unknown("Podcasts".to_string()))
        );
        // kinds are case sensitive
        assert!(registry.parse("youtube").is_err());
    }

    #[test]
    fn test_registered_kind_is_accepted() {
        let mut registry = ContentTypeRegistry::new();
        let kind = registry.register("Podcasts").unwrap();
        assert_eq!(kind, ContentType::Custom("Podcasts".to_string()));
        assert_eq!(registry.parse("Podcasts").unwrap(), kind);
        assert_eq!(registry.kinds().len(), 7);

        // re-registering a builtin does not duplicate it
        registry.register("Links").unwrap();
        assert_eq!(registry.kinds().len(), 7);
        assert_eq!(registry.register("   "), Err(ContentTypeError::Empty));
    }

    #[test]
    fn test_content_type_serializes_as_name() {
        let json = serde_json::to_string(&ContentType::Documents).unwrap();
        assert_eq!(json, "\"Documents\"");
        let custom: ContentType = serde_json::from_str("\"Recipes\"").unwrap();
        assert_eq!(custom, ContentType::Custom("Recipes".to_string()));
    }

    #[test]
    fn test_attribution_parse() {
        assert_eq!(
            "anonymous".parse::<Attribution>().unwrap(),
            Attribution::Anonymous
        );

        let owner = OwnerId::new();
        let parsed: Attribution = owner.to_string().parse().unwrap();
        assert_eq!(parsed, Attribution::ByOwner(owner));
        assert_eq!(parsed.owner(), Some(owner));

        assert!("no updation happend".parse::<Attribution>().is_err());
    }

    #[test]
    fn test_attribution_from_authenticated() {
        let owner = OwnerId::new();
        assert_eq!(
            Attribution::from_authenticated(Some(owner)),
            Attribution::ByOwner(owner)
        );
        assert_eq!(Attribution::from_authenticated(None), Attribution::Anonymous);
        assert_eq!(
            serde_json::to_string(&Attribution::Anonymous).unwrap(),
            "\"anonymous\""
        );
    }
}

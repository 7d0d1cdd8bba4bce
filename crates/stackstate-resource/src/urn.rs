//! Resource identifiers
//!
//! Provides [`Urn`], the unique name of a resource within a stack.

use crate::token::ResourceType;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Unique resource name within a stack
///
/// Opaque to the editing engine: two URNs are the same resource name iff
/// their strings are equal. The structured accessors exist for display and
/// for recognising provider resources.
///
/// # Format
/// `urn:stackstate:<stack>::<project>::<qualified-type>::<name>`
///
/// The qualified type is `<parent-type>$<type>` for resources created under
/// a parent, otherwise just `<type>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Urn(String);

impl Urn {
    /// Scheme prefix shared by every URN
    pub const PREFIX: &'static str = "urn:stackstate:";

    /// Separator between URN components
    pub const DELIMITER: &'static str = "::";

    /// Separator between parent type and type in a qualified type
    pub const TYPE_DELIMITER: char = '$';

    /// Build a URN from its components
    #[must_use]
    pub fn new(
        stack: &str,
        project: &str,
        parent_type: &str,
        ty: &ResourceType,
        name: &str,
    ) -> Self {
        let qualified = if parent_type.is_empty() {
            ty.as_str().to_string()
        } else {
            format!("{parent_type}{}{}", Self::TYPE_DELIMITER, ty.as_str())
        };
        let d = Self::DELIMITER;
        Self(format!("{}{stack}{d}{project}{d}{qualified}{d}{name}", Self::PREFIX))
    }

    /// Wrap a string as loaded, without checking its shape
    pub(crate) fn from_raw(raw: String) -> Self {
        Self(raw)
    }

    /// Raw string form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the string has the shape of a URN
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.components().is_some()
    }

    fn components(&self) -> Option<[&str; 4]> {
        let rest = self.0.strip_prefix(Self::PREFIX)?;
        let mut parts = rest.splitn(4, Self::DELIMITER);
        let stack = parts.next()?;
        let project = parts.next()?;
        let qualified = parts.next()?;
        let name = parts.next()?;
        if qualified.is_empty() || name.is_empty() {
            return None;
        }
        Some([stack, project, qualified, name])
    }

    /// Stack component
    #[inline]
    #[must_use]
    pub fn stack(&self) -> Option<&str> {
        self.components().map(|c| c[0])
    }

    /// Project component
    #[inline]
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.components().map(|c| c[1])
    }

    /// Qualified type (parent types included)
    #[inline]
    #[must_use]
    pub fn qualified_type(&self) -> Option<&str> {
        self.components().map(|c| c[2])
    }

    /// Type token of the resource itself
    #[must_use]
    pub fn resource_type(&self) -> Option<&str> {
        self.qualified_type()
            .and_then(|q| q.rsplit(Self::TYPE_DELIMITER).next())
    }

    /// Resource name (last component)
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.components().map(|c| c[3])
    }

    /// Whether this URN names a provider resource
    #[must_use]
    pub fn is_provider(&self) -> bool {
        self.resource_type()
            .is_some_and(|t| t.starts_with(ResourceType::PROVIDER_PREFIX))
    }
}

impl Display for Urn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Urn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with(Self::PREFIX) {
            return Err(UrnError::MissingPrefix(s.to_string()));
        }
        let urn = Self(s.to_string());
        if urn.is_valid() {
            Ok(urn)
        } else {
            Err(UrnError::Malformed(s.to_string()))
        }
    }
}

impl Borrow<str> for Urn {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Urn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Urn> for String {
    fn from(urn: Urn) -> Self {
        urn.0
    }
}

/// Errors parsing a URN
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrnError {
    /// String does not start with the URN scheme
    #[error("'{0}' is not a URN: missing '{prefix}' prefix", prefix = Urn::PREFIX)]
    MissingPrefix(String),

    /// Wrong number of components, or an empty type or name
    #[error("malformed URN '{0}': expected <stack>::<project>::<type>::<name>")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket_type() -> ResourceType {
        ResourceType::new("aws:s3:Bucket")
    }

    #[test]
    fn urn_new_without_parent_type() {
        let urn = Urn::new("dev", "site", "", &bucket_type(), "logs");
        assert_eq!(urn.as_str(), "urn:stackstate:dev::site::aws:s3:Bucket::logs");
        assert_eq!(urn.stack(), Some("dev"));
        assert_eq!(urn.project(), Some("site"));
        assert_eq!(urn.qualified_type(), Some("aws:s3:Bucket"));
        assert_eq!(urn.resource_type(), Some("aws:s3:Bucket"));
        assert_eq!(urn.name(), Some("logs"));
    }

    #[test]
    fn urn_new_with_parent_type() {
        let urn = Urn::new("dev", "site", "my:component:Site", &bucket_type(), "logs");
        assert_eq!(urn.qualified_type(), Some("my:component:Site$aws:s3:Bucket"));
        assert_eq!(urn.resource_type(), Some("aws:s3:Bucket"));
    }

    #[test]
    fn urn_name_may_contain_delimiter() {
        let urn: Urn = "urn:stackstate:dev::site::a:b:c::odd::name".parse().unwrap();
        assert_eq!(urn.name(), Some("odd::name"));
    }

    #[test]
    fn urn_from_str_missing_prefix() {
        let result: Result<Urn, _> = "dev::site::a:b:c::x".parse();
        assert!(matches!(result, Err(UrnError::MissingPrefix(_))));
    }

    #[test]
    fn urn_from_str_too_few_components() {
        let result: Result<Urn, _> = "urn:stackstate:dev::site::a:b:c".parse();
        assert!(matches!(result, Err(UrnError::Malformed(_))));
    }

    #[test]
    fn urn_equality_is_string_equality() {
        let a = Urn::new("dev", "site", "", &bucket_type(), "logs");
        let b: Urn = "urn:stackstate:dev::site::aws:s3:Bucket::logs".parse().unwrap();
        let c = Urn::new("dev", "site", "", &bucket_type(), "Logs");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn provider_urn_is_recognised() {
        let urn = Urn::new("dev", "site", "", &ResourceType::provider("aws"), "default");
        assert!(urn.is_provider());
        assert!(!Urn::new("dev", "site", "", &bucket_type(), "logs").is_provider());
    }

    #[test]
    fn deserialized_urn_is_not_validated() {
        let urn: Urn = serde_json::from_str("\"not a urn\"").unwrap();
        assert!(!urn.is_valid());
        assert_eq!(urn.name(), None);
    }
}

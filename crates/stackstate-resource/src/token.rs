//! Type tokens and physical identifiers

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Resource type token, e.g. `aws:s3:Bucket`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(String);

impl ResourceType {
    /// Prefix of every provider type token
    pub const PROVIDER_PREFIX: &'static str = "stackstate:providers:";

    /// Create from a raw token
    #[inline]
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Provider type for a package, e.g. `stackstate:providers:aws`
    #[inline]
    #[must_use]
    pub fn provider(package: &str) -> Self {
        Self(format!("{}{package}", Self::PROVIDER_PREFIX))
    }

    /// Raw token
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a provider type
    #[inline]
    #[must_use]
    pub fn is_provider(&self) -> bool {
        self.0.starts_with(Self::PROVIDER_PREFIX)
    }

    /// Package component (first segment of the token)
    ///
    /// For provider types this is the package the provider serves.
    #[must_use]
    pub fn package(&self) -> &str {
        match self.0.strip_prefix(Self::PROVIDER_PREFIX) {
            Some(pkg) => pkg,
            None => self.0.split(':').next().unwrap_or_default(),
        }
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceType {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Provider-assigned physical identifier
///
/// Empty for component resources, which have no physical counterpart.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create from a raw identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the resource has no physical identifier
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

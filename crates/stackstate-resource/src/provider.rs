//! Provider references
//!
//! Provides [`ProviderReference`], the pointer from a resource to the
//! provider instance that manages it.

use crate::token::ResourceId;
use crate::urn::{Urn, UrnError};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Reference to a provider resource instance
///
/// Names the provider by URN and physical ID. Encoded as `<urn>::<id>`;
/// since the URN itself contains `::`, decoding splits at the last one.
///
/// Parsing (`FromStr`) validates the URN and its provider type. Loading
/// from a snapshot only requires the separator, like [`Urn`] itself, so
/// unusual stored references stay loadable and repairable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderReference {
    urn: Urn,
    id: ResourceId,
}

impl ProviderReference {
    /// Create a reference to a provider resource
    ///
    /// # Errors
    /// Returns [`ProviderReferenceError::NotAProvider`] if `urn` does not
    /// name a provider type.
    pub fn new(urn: Urn, id: ResourceId) -> Result<Self, ProviderReferenceError> {
        if !urn.is_provider() {
            return Err(ProviderReferenceError::NotAProvider(urn));
        }
        Ok(Self { urn, id })
    }

    /// URN of the referenced provider
    #[inline]
    #[must_use]
    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    /// Physical ID of the referenced provider
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Whether this reference names the given provider instance exactly
    #[inline]
    #[must_use]
    pub fn refers_to(&self, urn: &Urn, id: &ResourceId) -> bool {
        &self.urn == urn && &self.id == id
    }
}

impl Display for ProviderReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.urn, Urn::DELIMITER, self.id)
    }
}

impl FromStr for ProviderReference {
    type Err = ProviderReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (urn, id) = s
            .rsplit_once(Urn::DELIMITER)
            .ok_or_else(|| ProviderReferenceError::MissingSeparator(s.to_string()))?;
        let urn = Urn::from_str(urn)?;
        Self::new(urn, ResourceId::new(id))
    }
}

impl TryFrom<String> for ProviderReference {
    type Error = ProviderReferenceError;

    fn try_from(mut s: String) -> Result<Self, Self::Error> {
        let Some((urn, id)) = s.rsplit_once(Urn::DELIMITER) else {
            return Err(ProviderReferenceError::MissingSeparator(s));
        };
        let id = ResourceId::new(id);
        let urn_len = urn.len();
        s.truncate(urn_len);
        Ok(Self {
            urn: Urn::from_raw(s),
            id,
        })
    }
}

impl From<ProviderReference> for String {
    fn from(reference: ProviderReference) -> Self {
        reference.to_string()
    }
}

/// Errors decoding a provider reference
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderReferenceError {
    /// No `::` separating URN and ID
    #[error("malformed provider reference '{0}': missing URN/ID separator")]
    MissingSeparator(String),

    /// URN part does not parse
    #[error("malformed provider reference: {0}")]
    InvalidUrn(#[from] UrnError),

    /// URN does not name a provider resource
    #[error("'{0}' is not a provider resource")]
    NotAProvider(Urn),
}

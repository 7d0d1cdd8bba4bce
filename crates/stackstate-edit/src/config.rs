//! Edit configuration

/// How a provider reference is matched against provider instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderMatch {
    /// URN only; the physical ID recorded in the reference is ignored.
    ///
    /// After a provider is replaced, references still carrying the old ID
    /// keep counting as dependents of both instances.
    #[default]
    Urn,

    /// URN and physical ID must both match
    UrnAndId,
}

/// Configuration for dependency computation and edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditConfig {
    /// Provider reference matching policy
    pub provider_match: ProviderMatch,
}

impl EditConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With provider matching policy
    #[inline]
    #[must_use]
    pub fn with_provider_match(mut self, provider_match: ProviderMatch) -> Self {
        self.provider_match = provider_match;
        self
    }
}

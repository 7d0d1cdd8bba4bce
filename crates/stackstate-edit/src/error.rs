//! Error types for snapshot edits
//!
//! Every failure here is a structural precondition the operator has to
//! resolve with a different action; none of them is retryable.

use stackstate_resource::{ResourceIndex, ResourceState, Urn};

/// Errors from locating or mutating resources in a snapshot
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// More than one resource carries the URN
    #[error("URN {urn} is ambiguous among {} resources in the snapshot", .matches.len())]
    Ambiguous {
        /// The URN that was looked up
        urn: Urn,
        /// Every matching resource with its handle, in snapshot order
        matches: Vec<(ResourceIndex, ResourceState)>,
    },

    /// Resources still depend, directly or transitively, on the condemned one
    #[error("can't delete resource {} due to {} dependent resources", .condemned.urn, .dependents.len())]
    HasDependencies {
        /// The resource deletion was requested for
        condemned: Box<ResourceState>,
        /// Full transitive dependent set, in snapshot order
        dependents: Vec<ResourceState>,
    },

    /// Handle does not name a resource in the snapshot
    #[error("resource handle {0} does not name a resource in the snapshot")]
    UnknownResource(ResourceIndex),
}

impl EditError {
    /// Create ambiguity error
    #[inline]
    pub fn ambiguous(urn: Urn, matches: Vec<(ResourceIndex, ResourceState)>) -> Self {
        Self::Ambiguous { urn, matches }
    }

    /// Create dependency error
    #[inline]
    pub fn has_dependencies(condemned: ResourceState, dependents: Vec<ResourceState>) -> Self {
        Self::HasDependencies {
            condemned: Box::new(condemned),
            dependents,
        }
    }

    /// Check if error is an ambiguous lookup
    #[inline]
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous { .. })
    }

    /// Check if error is a refused deletion
    #[inline]
    #[must_use]
    pub fn has_dependents(&self) -> bool {
        matches!(self, Self::HasDependencies { .. })
    }

    /// Resources the error is about, for rendering
    ///
    /// Ambiguous matches or dependents; empty for an unknown handle.
    #[must_use]
    pub fn resources(&self) -> Vec<&ResourceState> {
        match self {
            Self::Ambiguous { matches, .. } => matches.iter().map(|(_, r)| r).collect(),
            Self::HasDependencies { dependents, .. } => dependents.iter().collect(),
            Self::UnknownResource(_) => Vec::new(),
        }
    }
}

//! Resource state records
//!
//! Provides [`ResourceState`], one provisioned resource as recorded in a
//! snapshot, and [`ResourceState::references`], the single place where a
//! resource's outgoing structural edges are decoded.

use crate::provider::ProviderReference;
use crate::token::{ResourceId, ResourceType};
use crate::urn::Urn;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Property bag (inputs or outputs); opaque to the editing engine
pub type PropertyMap = IndexMap<String, serde_json::Value>;

/// One provisioned resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    /// Unique name; never reassigned
    pub urn: Urn,
    /// Physical identifier; empty for components
    #[serde(default, skip_serializing_if = "ResourceId::is_empty")]
    pub id: ResourceId,
    /// Type token
    #[serde(rename = "type")]
    pub ty: ResourceType,
    /// Whether a provider manages a physical counterpart
    #[serde(default)]
    pub custom: bool,
    /// Resource inputs
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub inputs: PropertyMap,
    /// Resource outputs
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub outputs: PropertyMap,
    /// Resources whose values this resource depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Urn>,
    /// Enclosing resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Urn>,
    /// Provider instance managing this resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderReference>,
    /// Deletion is refused while set
    #[serde(default)]
    pub protect: bool,
    /// Stale copy kept during a create-before-delete replacement
    #[serde(default)]
    pub delete: bool,
}

/// Kind of structural edge from one resource to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Listed in `dependencies`
    Dependency,
    /// Named as `parent`
    Parent,
    /// Named by the `provider` reference
    Provider,
}

/// A decoded outgoing edge of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Edge kind
    pub kind: ReferenceKind,
    /// Referenced URN
    pub urn: &'a Urn,
    /// Referenced physical ID; only known for provider references
    pub id: Option<&'a ResourceId>,
}

impl ResourceState {
    /// Create a resource with no edges and empty properties
    #[must_use]
    pub fn new(urn: Urn, ty: ResourceType) -> Self {
        Self {
            urn,
            id: ResourceId::default(),
            ty,
            custom: false,
            inputs: PropertyMap::new(),
            outputs: PropertyMap::new(),
            dependencies: Vec::new(),
            parent: None,
            provider: None,
            protect: false,
            delete: false,
        }
    }

    /// With physical ID (marks the resource custom)
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: ResourceId) -> Self {
        self.id = id;
        self.custom = true;
        self
    }

    /// With parent
    #[inline]
    #[must_use]
    pub fn with_parent(mut self, parent: Urn) -> Self {
        self.parent = Some(parent);
        self
    }

    /// With provider
    #[inline]
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderReference) -> Self {
        self.provider = Some(provider);
        self
    }

    /// With dependencies
    #[inline]
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<Urn>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// With protect flag
    #[inline]
    #[must_use]
    pub fn with_protect(mut self, protect: bool) -> Self {
        self.protect = protect;
        self
    }

    /// With pending-delete flag
    #[inline]
    #[must_use]
    pub fn with_pending_delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    /// Every resource this one structurally points at
    ///
    /// Yields dependencies first, then the parent, then the provider. A URN
    /// may appear more than once (e.g. both parent and dependency).
    pub fn references(&self) -> impl Iterator<Item = Reference<'_>> + '_ {
        let dependencies = self.dependencies.iter().map(|urn| Reference {
            kind: ReferenceKind::Dependency,
            urn,
            id: None,
        });
        let parent = self.parent.iter().map(|urn| Reference {
            kind: ReferenceKind::Parent,
            urn,
            id: None,
        });
        let provider = self.provider.iter().map(|p| Reference {
            kind: ReferenceKind::Provider,
            urn: p.urn(),
            id: Some(p.id()),
        });
        dependencies.chain(parent).chain(provider)
    }
}

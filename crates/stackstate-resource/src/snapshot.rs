//! Ordered state snapshots
//!
//! A [`Snapshot`] is the ordered record of every resource in a stack. Order
//! is load-bearing: anything a resource references (dependency, parent or
//! provider) sits strictly earlier in the sequence.

use crate::state::{ReferenceKind, ResourceState};
use crate::urn::Urn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};

/// Snapshot metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// When the snapshot was taken
    pub time: DateTime<Utc>,
    /// Version of the tool that wrote it
    pub version: String,
    /// Plugins used to produce it
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginInfo>,
}

impl Manifest {
    /// Manifest stamped with the current time
    #[must_use]
    pub fn now(version: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            version: version.into(),
            plugins: Vec::new(),
        }
    }
}

/// A plugin recorded in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Plugin name
    pub name: String,
    /// Plugin kind
    pub kind: PluginKind,
    /// Plugin version, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Plugin kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// Policy analyzer
    Analyzer,
    /// Language host
    Language,
    /// Resource provider
    Resource,
}

/// Positional handle to a resource in a [`Snapshot`]
///
/// Valid until the next removal from the snapshot it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceIndex(usize);

impl ResourceIndex {
    /// Create from a raw position
    #[inline]
    #[must_use]
    pub const fn new(position: usize) -> Self {
        Self(position)
    }

    /// Raw position
    #[inline]
    #[must_use]
    pub const fn position(self) -> usize {
        self.0
    }
}

impl Display for ResourceIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered record of resource states plus manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot metadata
    pub manifest: Manifest,
    #[serde(default)]
    resources: Vec<ResourceState>,
}

impl Snapshot {
    /// Create a snapshot from resources in dependency order
    #[inline]
    #[must_use]
    pub fn new(manifest: Manifest, resources: Vec<ResourceState>) -> Self {
        Self {
            manifest,
            resources,
        }
    }

    /// Number of resources
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True if the snapshot holds no resources
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources in order
    #[inline]
    #[must_use]
    pub fn resources(&self) -> &[ResourceState] {
        &self.resources
    }

    /// Resource at `index`, if the handle is in range
    #[inline]
    #[must_use]
    pub fn get(&self, index: ResourceIndex) -> Option<&ResourceState> {
        self.resources.get(index.0)
    }

    /// Mutable resource at `index`, if the handle is in range
    #[inline]
    pub fn get_mut(&mut self, index: ResourceIndex) -> Option<&mut ResourceState> {
        self.resources.get_mut(index.0)
    }

    /// Iterate resources in order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceState> {
        self.resources.iter()
    }

    /// Iterate resources mutably in order
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ResourceState> {
        self.resources.iter_mut()
    }

    /// Iterate resources with their handles
    pub fn indexed(&self) -> impl Iterator<Item = (ResourceIndex, &ResourceState)> + '_ {
        self.resources
            .iter()
            .enumerate()
            .map(|(i, r)| (ResourceIndex(i), r))
    }

    /// Remove the resource at `index`, keeping the order of the rest
    ///
    /// This is a raw positional removal; it does not look at dependents.
    /// Handles at or after `index` are invalidated.
    pub fn remove(&mut self, index: ResourceIndex) -> Option<ResourceState> {
        (index.0 < self.resources.len()).then(|| self.resources.remove(index.0))
    }

    /// Check the structural invariants of the snapshot
    ///
    /// - every dependency, parent and provider referent appears strictly
    ///   earlier than the resource referencing it
    /// - provider referents carry a provider type
    /// - at most one instance per URN is not pending deletion
    ///
    /// # Errors
    /// Returns the first violation found, scanning in order.
    pub fn verify_integrity(&self) -> Result<(), IntegrityError> {
        match self.integrity_violations().into_iter().next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    /// Every violation of the invariants checked by
    /// [`Snapshot::verify_integrity`], in scan order
    #[must_use]
    pub fn integrity_violations(&self) -> Vec<IntegrityError> {
        let mut seen: HashMap<&Urn, &ResourceState> = HashMap::new();
        let mut live: HashSet<&Urn> = HashSet::new();
        let mut violations = Vec::new();

        for (index, resource) in self.indexed() {
            for reference in resource.references() {
                match seen.get(reference.urn) {
                    None => violations.push(IntegrityError::ReferenceNotEarlier {
                        urn: resource.urn.clone(),
                        index,
                        kind: reference.kind,
                        referent: reference.urn.clone(),
                    }),
                    Some(referent)
                        if reference.kind == ReferenceKind::Provider && !referent.ty.is_provider() =>
                    {
                        violations.push(IntegrityError::NotAProvider {
                            urn: resource.urn.clone(),
                            provider: reference.urn.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }

            if !resource.delete && !live.insert(&resource.urn) {
                violations.push(IntegrityError::DuplicateUrn(resource.urn.clone()));
            }
            seen.insert(&resource.urn, resource);
        }

        violations
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a ResourceState;
    type IntoIter = std::slice::Iter<'a, ResourceState>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

/// Snapshot invariant violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// A referent is missing or does not precede its referrer
    #[error("resource {urn} at {index} refers to {referent} ({kind:?}) which does not appear earlier in the snapshot")]
    ReferenceNotEarlier {
        urn: Urn,
        index: ResourceIndex,
        kind: ReferenceKind,
        referent: Urn,
    },

    /// A provider reference names a non-provider resource
    #[error("resource {urn} names {provider} as its provider, but it is not a provider resource")]
    NotAProvider { urn: Urn, provider: Urn },

    /// Two live (not pending-delete) instances share a URN
    #[error("duplicate resource {0}: more than one instance is not pending deletion")]
    DuplicateUrn(Urn),
}

impl IntegrityError {
    /// Whether both describe the same broken relation, ignoring positions
    ///
    /// Positions shift when resources are removed, so violations found
    /// before and after an edit are compared by the resources involved.
    #[must_use]
    pub fn same_violation(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::ReferenceNotEarlier { urn, kind, referent, .. },
                Self::ReferenceNotEarlier {
                    urn: other_urn,
                    kind: other_kind,
                    referent: other_referent,
                    ..
                },
            ) => urn == other_urn && kind == other_kind && referent == other_referent,
            _ => self == other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderReference;
    use crate::token::{ResourceId, ResourceType};
    use pretty_assertions::assert_eq;

    fn urn(name: &str) -> Urn {
        Urn::new("dev", "site", "", &ResourceType::new("a:b:c"), name)
    }

    fn resource(name: &str) -> ResourceState {
        ResourceState::new(urn(name), ResourceType::new("a:b:c"))
    }

    fn provider(name: &str) -> ResourceState {
        let ty = ResourceType::provider("a");
        ResourceState::new(Urn::new("dev", "site", "", &ty, name), ty).with_id(ResourceId::new("0"))
    }

    fn reference_to(provider: &ResourceState) -> ProviderReference {
        ProviderReference::new(provider.urn.clone(), provider.id.clone()).unwrap()
    }

    fn snapshot(resources: Vec<ResourceState>) -> Snapshot {
        Snapshot::new(Manifest::now("test"), resources)
    }

    #[test]
    fn remove_keeps_order() {
        let mut snap = snapshot(vec![resource("a"), resource("b"), resource("c")]);
        let removed = snap.remove(ResourceIndex::new(1)).unwrap();

        assert_eq!(removed.urn, urn("b"));
        let names: Vec<_> = snap.iter().map(|r| r.urn.clone()).collect();
        assert_eq!(names, vec![urn("a"), urn("c")]);
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut snap = snapshot(vec![resource("a")]);
        assert!(snap.remove(ResourceIndex::new(1)).is_none());
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn well_ordered_snapshot_verifies() {
        let p = provider("p");
        let a = resource("a").with_provider(reference_to(&p));
        let b = resource("b")
            .with_parent(urn("a"))
            .with_dependencies(vec![urn("a")]);
        assert_eq!(snapshot(vec![p, a, b]).verify_integrity(), Ok(()));
    }

    #[test]
    fn dependency_after_dependent_fails() {
        let b = resource("b").with_dependencies(vec![urn("a")]);
        let err = snapshot(vec![b, resource("a")]).verify_integrity().unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::ReferenceNotEarlier { kind: ReferenceKind::Dependency, .. }
        ));
    }

    #[test]
    fn missing_parent_fails() {
        let b = resource("b").with_parent(urn("gone"));
        let err = snapshot(vec![b]).verify_integrity().unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::ReferenceNotEarlier { kind: ReferenceKind::Parent, .. }
        ));
    }

    #[test]
    fn provider_after_dependent_fails() {
        let p = provider("p");
        let a = resource("a").with_provider(reference_to(&p));
        let err = snapshot(vec![a, p]).verify_integrity().unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::ReferenceNotEarlier { kind: ReferenceKind::Provider, .. }
        ));
    }

    #[test]
    fn pending_delete_duplicate_is_allowed() {
        let a = resource("a");
        let stale = resource("a").with_pending_delete(true);
        assert_eq!(snapshot(vec![a, stale]).verify_integrity(), Ok(()));
    }

    #[test]
    fn live_duplicate_fails() {
        let err = snapshot(vec![resource("a"), resource("a")])
            .verify_integrity()
            .unwrap_err();
        assert_eq!(err, IntegrityError::DuplicateUrn(urn("a")));
    }

    #[test]
    fn all_violations_are_collected() {
        let b = resource("b").with_parent(urn("gone"));
        let c = resource("c").with_dependencies(vec![urn("also-gone")]);
        let snap = snapshot(vec![b, c, resource("d"), resource("d")]);

        let violations = snap.integrity_violations();
        assert_eq!(violations.len(), 3);
        assert_eq!(snap.verify_integrity(), Err(violations[0].clone()));
        assert_eq!(violations[2], IntegrityError::DuplicateUrn(urn("d")));
    }

    #[test]
    fn same_violation_ignores_position() {
        let at = |position| IntegrityError::ReferenceNotEarlier {
            urn: urn("b"),
            index: ResourceIndex::new(position),
            kind: ReferenceKind::Parent,
            referent: urn("gone"),
        };
        assert!(at(3).same_violation(&at(1)));
        assert!(!at(3).same_violation(&IntegrityError::DuplicateUrn(urn("b"))));
    }

    #[test]
    fn snapshot_json_roundtrip_preserves_order() {
        let p = provider("p");
        let a = resource("a").with_provider(reference_to(&p)).with_protect(true);
        let snap = snapshot(vec![p, a, resource("b")]);

        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}

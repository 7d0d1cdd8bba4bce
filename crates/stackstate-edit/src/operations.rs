//! Snapshot mutations: delete and unprotect
//!
//! Each mutation is all-or-nothing: on error the snapshot is untouched.

use crate::config::EditConfig;
use crate::error::EditError;
use crate::graph::DependencyGraph;
use stackstate_resource::{ResourceIndex, ResourceState, Snapshot};

/// Delete a resource nothing depends on
///
/// Uses the default [`EditConfig`]. See [`delete_resource_with`].
///
/// # Errors
/// - [`EditError::HasDependencies`] if any resource depends on the target
/// - [`EditError::UnknownResource`] if the handle is out of range
pub fn delete_resource(snapshot: &mut Snapshot, target: ResourceIndex) -> Result<ResourceState, EditError> {
    delete_resource_with(snapshot, target, &EditConfig::default())
}

/// Delete a resource nothing depends on, with explicit configuration
///
/// Removal is the only change: every other resource keeps its fields and
/// relative order. The protect flag is not consulted; refusing protected
/// resources is the caller's policy.
///
/// # Returns
/// The removed resource state
///
/// # Errors
/// - [`EditError::HasDependencies`] carrying the full transitive dependent
///   set if any resource depends on the target
/// - [`EditError::UnknownResource`] if the handle is out of range
pub fn delete_resource_with(
    snapshot: &mut Snapshot,
    target: ResourceIndex,
    config: &EditConfig,
) -> Result<ResourceState, EditError> {
    let condemned = snapshot
        .get(target)
        .ok_or(EditError::UnknownResource(target))?;

    let dependents = DependencyGraph::with_config(snapshot, config).dependents_of(target);
    if !dependents.is_empty() {
        tracing::debug!(urn = %condemned.urn, dependents = dependents.len(), "deletion refused");
        let dependents = dependents
            .into_iter()
            .filter_map(|i| snapshot.get(i))
            .cloned()
            .collect();
        return Err(EditError::has_dependencies(condemned.clone(), dependents));
    }

    tracing::debug!(urn = %condemned.urn, index = %target, "deleting resource");
    snapshot
        .remove(target)
        .ok_or(EditError::UnknownResource(target))
}

/// Clear the protect flag of one resource
///
/// Nothing else changes. Idempotent.
///
/// # Errors
/// [`EditError::UnknownResource`] if the handle is out of range
pub fn unprotect_resource(snapshot: &mut Snapshot, target: ResourceIndex) -> Result<(), EditError> {
    let resource = snapshot
        .get_mut(target)
        .ok_or(EditError::UnknownResource(target))?;
    resource.protect = false;
    tracing::debug!(urn = %resource.urn, "cleared protect flag");
    Ok(())
}

/// Clear the protect flag of every resource, in order
///
/// # Returns
/// How many resources were protected before the call
pub fn unprotect_all(snapshot: &mut Snapshot) -> usize {
    let mut cleared = 0;
    for resource in snapshot.iter_mut() {
        if std::mem::take(&mut resource.protect) {
            cleared += 1;
        }
    }
    tracing::debug!(cleared, "cleared protect flags");
    cleared
}

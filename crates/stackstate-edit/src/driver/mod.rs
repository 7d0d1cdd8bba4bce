//! Transactional snapshot edits
//!
//! Load a snapshot, run one edit against it, check it introduced no new
//! integrity violation, and persist it. Any failure along the way leaves
//! the store untouched. Violations already present when loading do not
//! block edits, so an inconsistent snapshot can still be repaired.

mod store;

pub use store::{FileStore, MemoryStore, SnapshotStore, StoreError};

use crate::error::EditError;
use crate::locate::locate_resource;
use stackstate_resource::{IntegrityError, ResourceIndex, Snapshot, Urn};

/// Errors from a driven edit
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// No resource carries the URN
    #[error("no resource found with URN {0}")]
    NotFound(Urn),

    /// Caller policy refused to touch a protected resource
    #[error("resource {0} is protected; unprotect it first")]
    Protected(Urn),

    /// The edit itself failed
    #[error(transparent)]
    Edit(#[from] EditError),

    /// The edit would introduce an integrity violation
    #[error("edit would leave an invalid snapshot: {0}")]
    Integrity(#[from] IntegrityError),

    /// Loading or persisting failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DriverError {
    /// The underlying edit error, if that is what failed
    #[inline]
    #[must_use]
    pub fn as_edit(&self) -> Option<&EditError> {
        match self {
            Self::Edit(err) => Some(err),
            _ => None,
        }
    }
}

/// Run an edit against the single resource carrying `urn`
///
/// # Errors
/// - [`DriverError::NotFound`] if no resource carries the URN
/// - [`DriverError::Edit`] with [`EditError::Ambiguous`] if several do
/// - whatever `edit` returns, or integrity and store failures
pub fn run_state_edit<S, F>(store: &S, urn: &Urn, edit: F) -> Result<(), DriverError>
where
    S: SnapshotStore + ?Sized,
    F: FnOnce(&mut Snapshot, ResourceIndex) -> Result<(), DriverError>,
{
    run_total_state_edit(store, |snapshot| {
        let target = locate_resource(snapshot, urn)?.ok_or_else(|| DriverError::NotFound(urn.clone()))?;
        edit(snapshot, target)
    })
}

/// Run an edit against the whole snapshot
///
/// # Errors
/// Whatever `edit` returns, or integrity and store failures
pub fn run_total_state_edit<S, F>(store: &S, edit: F) -> Result<(), DriverError>
where
    S: SnapshotStore + ?Sized,
    F: FnOnce(&mut Snapshot) -> Result<(), DriverError>,
{
    let mut snapshot = store.load()?;
    tracing::info!(resources = snapshot.len(), "loaded snapshot");

    let existing = snapshot.integrity_violations();
    if !existing.is_empty() {
        tracing::warn!(violations = existing.len(), "loaded snapshot is already inconsistent");
    }

    edit(&mut snapshot)?;
    let introduced = snapshot
        .integrity_violations()
        .into_iter()
        .find(|v| !existing.iter().any(|e| e.same_violation(v)));
    if let Some(violation) = introduced {
        return Err(violation.into());
    }

    store.persist(&snapshot)?;
    tracing::info!(resources = snapshot.len(), "persisted snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{delete_resource, unprotect_all, unprotect_resource};
    use stackstate_test_utils::{new_resource, new_snapshot, provider_fleet, test_urn, urns};

    #[test]
    fn successful_edit_is_persisted() {
        let store = MemoryStore::new(provider_fleet());

        run_state_edit(&store, &test_urn("c"), |snap, target| {
            delete_resource(snap, target)?;
            Ok(())
        })
        .unwrap();

        assert_eq!(store.persist_count(), 1);
        let after = store.snapshot().unwrap();
        assert_eq!(after.len(), 3);
        assert!(!urns(&after).contains(&test_urn("c")));
    }

    #[test]
    fn missing_urn_persists_nothing() {
        let store = MemoryStore::new(provider_fleet());

        let err = run_state_edit(&store, &test_urn("nope"), |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, DriverError::NotFound(urn) if urn == test_urn("nope")));
        assert_eq!(store.persist_count(), 0);
    }

    #[test]
    fn ambiguity_is_surfaced() {
        let a = new_resource("a", None, &[]);
        let stale = new_resource("a", None, &[]).with_pending_delete(true);
        let store = MemoryStore::new(new_snapshot(vec![a, stale]));

        let err = run_state_edit(&store, &test_urn("a"), |_, _| Ok(())).unwrap_err();
        assert!(err.as_edit().is_some_and(EditError::is_ambiguous));
        assert_eq!(store.persist_count(), 0);
    }

    #[test]
    fn failed_edit_persists_nothing() {
        let store = MemoryStore::new(provider_fleet());
        let provider = store.snapshot().unwrap().resources()[0].urn.clone();
        let err = run_state_edit(&store, &provider, |snap, target| {
            delete_resource(snap, target)?;
            Ok(())
        })
        .unwrap_err();
        assert!(err.as_edit().is_some_and(EditError::has_dependents));
        assert_eq!(store.persist_count(), 0);
        assert_eq!(store.snapshot().unwrap().len(), 4);
    }

    #[test]
    fn integrity_violation_persists_nothing() {
        let store = MemoryStore::new(provider_fleet());

        let err = run_total_state_edit(&store, |snap| {
            // Remove the provider behind the operations' back.
            snap.remove(ResourceIndex::new(0));
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, DriverError::Integrity(_)));
        assert_eq!(store.persist_count(), 0);
    }

    #[test]
    fn inconsistent_snapshot_can_still_be_repaired() {
        // b's parent is missing; that predates any edit.
        let a = new_resource("a", None, &[]).with_protect(true);
        let b = new_resource("b", None, &[]).with_parent(test_urn("gone"));
        let c = new_resource("c", None, &[]);
        let store = MemoryStore::new(new_snapshot(vec![a, b, c]));

        run_state_edit(&store, &test_urn("a"), |snap, target| {
            unprotect_resource(snap, target)?;
            Ok(())
        })
        .unwrap();
        // Removing an earlier resource shifts b's position, not its violation.
        run_state_edit(&store, &test_urn("a"), |snap, target| {
            delete_resource(snap, target)?;
            Ok(())
        })
        .unwrap();

        let after = store.snapshot().unwrap();
        assert_eq!(urns(&after), vec![test_urn("b"), test_urn("c")]);
        assert_eq!(store.persist_count(), 2);
    }

    #[test]
    fn new_violation_on_inconsistent_snapshot_is_refused() {
        let a = new_resource("a", None, &[]);
        let b = new_resource("b", None, &[]).with_parent(test_urn("gone"));
        let c = new_resource("c", None, &[a.urn.clone()]);
        let store = MemoryStore::new(new_snapshot(vec![a, b, c]));

        let err = run_total_state_edit(&store, |snap| {
            snap.remove(ResourceIndex::new(0));
            Ok(())
        })
        .unwrap_err();

        match err {
            DriverError::Integrity(IntegrityError::ReferenceNotEarlier { urn, referent, .. }) => {
                assert_eq!(urn, test_urn("c"));
                assert_eq!(referent, test_urn("a"));
            }
            other => panic!("expected integrity error, got {other:?}"),
        }
        assert_eq!(store.persist_count(), 0);
    }

    #[test]
    fn total_edit() {
        let a = new_resource("a", None, &[]).with_protect(true);
        let store = MemoryStore::new(new_snapshot(vec![a]));

        run_total_state_edit(&store, |snap| {
            unprotect_all(snap);
            Ok(())
        })
        .unwrap();

        assert!(store.snapshot().unwrap().iter().all(|r| !r.protect));
    }

    #[test]
    fn empty_store() {
        let store = MemoryStore::default();
        let err = run_total_state_edit(&store, |_| Ok(())).unwrap_err();
        assert!(matches!(err, DriverError::Store(StoreError::Empty)));
    }
}

//! `state` subcommands

use stackstate_edit::driver::{run_state_edit, run_total_state_edit, DriverError, SnapshotStore};
use stackstate_edit::{delete_resource_with, unprotect_all, unprotect_resource, EditConfig};
use stackstate_resource::Urn;

/// What `state unprotect` applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnprotectTarget {
    One(Urn),
    All,
}

/// Clear protect flags and report what was done
///
/// # Errors
/// Lookup, integrity and store failures from the driver
pub fn unprotect(store: &dyn SnapshotStore, target: &UnprotectTarget) -> Result<String, DriverError> {
    match target {
        UnprotectTarget::One(urn) => {
            run_state_edit(store, urn, |snapshot, index| {
                unprotect_resource(snapshot, index)?;
                Ok(())
            })?;
            Ok(format!("Unprotected resource \"{urn}\""))
        }
        UnprotectTarget::All => {
            run_total_state_edit(store, |snapshot| {
                let cleared = unprotect_all(snapshot);
                tracing::info!(cleared, "unprotected all resources");
                Ok(())
            })?;
            Ok("Unprotected all resources".to_string())
        }
    }
}

/// Delete one resource, refusing protected ones
///
/// # Errors
/// - [`DriverError::Protected`] if the resource is protected
/// - dependency, lookup, integrity and store failures from the driver
pub fn delete(store: &dyn SnapshotStore, urn: &Urn, config: &EditConfig) -> Result<String, DriverError> {
    run_state_edit(store, urn, |snapshot, index| {
        if snapshot.get(index).is_some_and(|r| r.protect) {
            return Err(DriverError::Protected(urn.clone()));
        }
        delete_resource_with(snapshot, index, config)?;
        Ok(())
    })?;
    Ok("Resource deleted".to_string())
}

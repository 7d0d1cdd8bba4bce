//! Resource lookup by URN

use crate::error::EditError;
use stackstate_resource::{ResourceIndex, Snapshot, Urn};

/// Find the single resource carrying `urn`
///
/// # Returns
/// - `Ok(None)` if no resource matches; absence is for the caller to judge
/// - `Ok(Some(index))` for exactly one match
///
/// # Errors
/// [`EditError::Ambiguous`] with every match when more than one resource
/// carries the URN, as happens mid-replacement (one live instance plus one
/// pending deletion). The locator never picks one.
pub fn locate_resource(snapshot: &Snapshot, urn: &Urn) -> Result<Option<ResourceIndex>, EditError> {
    let mut matches = snapshot.indexed().filter(|(_, r)| &r.urn == urn);

    let Some((first, _)) = matches.next() else {
        tracing::debug!(%urn, "no resource matches");
        return Ok(None);
    };
    if matches.next().is_none() {
        tracing::debug!(%urn, index = %first, "located resource");
        return Ok(Some(first));
    }

    let all = snapshot
        .indexed()
        .filter(|(_, r)| &r.urn == urn)
        .map(|(i, r)| (i, r.clone()))
        .collect();
    Err(EditError::ambiguous(urn.clone(), all))
}

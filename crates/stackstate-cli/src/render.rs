//! Operator-facing error rendering
//!
//! Refusals list every resource involved so the operator can choose the
//! next action without inspecting the snapshot.

use stackstate_edit::driver::DriverError;
use stackstate_edit::EditError;
use stackstate_resource::ResourceState;
use std::fmt::Write;

/// Render any command failure
#[must_use]
pub fn report(err: &anyhow::Error) -> String {
    match err.downcast_ref::<DriverError>() {
        Some(driver) => driver_error(driver),
        None => format!("{err:#}"),
    }
}

/// Render a driver failure: a headline, then one line per resource
#[must_use]
pub fn driver_error(err: &DriverError) -> String {
    let Some(edit) = err.as_edit() else {
        return err.to_string();
    };

    let mut out = edit.to_string();
    match edit {
        EditError::Ambiguous { .. } => out.push_str("; matching resources:"),
        EditError::HasDependencies { .. } => out.push_str("; delete these first:"),
        EditError::UnknownResource(_) => return out,
    }
    for resource in edit.resources() {
        let _ = write!(out, "\n  - {}", resource_line(resource));
    }
    out
}

fn resource_line(resource: &ResourceState) -> String {
    if resource.delete {
        format!("{} [pending delete]", resource.urn)
    } else {
        resource.urn.to_string()
    }
}

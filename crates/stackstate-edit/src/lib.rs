//! stackstate Edit - safe structural edits of state snapshots
//!
//! The operations an operator uses to repair a snapshot by hand:
//! - Locate the single resource carrying a URN, refusing to guess between
//!   instances of a pending replacement
//! - Compute everything that depends on a resource through dependencies,
//!   parent containment or provider management
//! - Delete a resource only when nothing depends on it
//! - Clear protect flags on one or every resource
//!
//! # Core Concepts
//!
//! - [`DependencyGraph`]: Reverse-edge index answering "what breaks if this goes"
//! - [`EditError`]: Structural refusals, each carrying the resources involved
//! - [`driver`]: Load, edit, verify and persist as one unit
//!
//! # Example
//!
//! ```rust
//! use stackstate_edit::{delete_resource, locate_resource};
//! use stackstate_resource::{Manifest, ResourceState, ResourceType, Snapshot, Urn};
//!
//! let ty = ResourceType::new("aws:s3:Bucket");
//! let logs = ResourceState::new(Urn::new("dev", "site", "", &ty, "logs"), ty.clone());
//! let site = ResourceState::new(Urn::new("dev", "site", "", &ty, "site"), ty)
//!     .with_dependencies(vec![logs.urn.clone()]);
//! let mut snapshot = Snapshot::new(Manifest::now("0.1.0"), vec![logs.clone(), site]);
//!
//! let target = locate_resource(&snapshot, &logs.urn)?.expect("present");
//! let err = delete_resource(&mut snapshot, target).unwrap_err();
//! assert!(err.has_dependents());
//! assert_eq!(snapshot.len(), 2);
//! # Ok::<(), stackstate_edit::EditError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod graph;
mod locate;
mod operations;

pub mod driver;

pub use config::{EditConfig, ProviderMatch};
pub use error::EditError;
pub use graph::{dependents_of, DependencyGraph};
pub use locate::locate_resource;
pub use operations::{delete_resource, delete_resource_with, unprotect_all, unprotect_resource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

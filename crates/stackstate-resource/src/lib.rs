//! stackstate Resource Model
//!
//! Identifiers and records for provisioned infrastructure state.
//!
//! # Core Concepts
//!
//! - [`Urn`]: Unique resource name within a stack
//! - [`ProviderReference`]: Pointer from a resource to its managing provider
//! - [`ResourceState`]: One provisioned resource and its structural edges
//! - [`Snapshot`]: Ordered record of every resource, addressed by [`ResourceIndex`]
//!
//! # Example
//!
//! ```rust
//! use stackstate_resource::{Manifest, ResourceState, ResourceType, Snapshot, Urn};
//!
//! let ty = ResourceType::new("aws:s3:Bucket");
//! let bucket = ResourceState::new(Urn::new("dev", "site", "", &ty, "logs"), ty);
//!
//! let snapshot = Snapshot::new(Manifest::now("0.1.0"), vec![bucket]);
//! assert!(snapshot.verify_integrity().is_ok());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod provider;
mod snapshot;
mod state;
mod token;
mod urn;

pub use provider::{ProviderReference, ProviderReferenceError};
pub use snapshot::{IntegrityError, Manifest, PluginInfo, PluginKind, ResourceIndex, Snapshot};
pub use state::{PropertyMap, Reference, ReferenceKind, ResourceState};
pub use token::{ResourceId, ResourceType};
pub use urn::{Urn, UrnError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

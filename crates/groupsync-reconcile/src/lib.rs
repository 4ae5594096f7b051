//! # groupsync-reconcile
//!
//! Adds members of a Microsoft Entra ID group to a SCIM group (Netskope)
//! when they are missing there. Additive only: nothing is ever removed.
//!
//! [`Reconciler`] is generic over [`SourceDirectory`] and [`TargetDirectory`];
//! [`groupsync_entra::DirectoryClient`] and [`ScimTarget`] are the production
//! implementations.

mod adapters;
mod diff;
mod error;
mod reconciler;
mod report;
mod traits;

pub use adapters::ScimTarget;
pub use diff::{missing_members, SourceSnapshot};
pub use error::{ReconcileError, ReconcileResult};
pub use reconciler::{GroupPair, ReconcileOptions, Reconciler};
pub use report::{Outcome, ResolvedUser, RunReport, Unresolved};
pub use traits::{AlwaysConfirm, Confirm, SourceDirectory, TargetDirectory};

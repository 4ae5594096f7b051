//! One-way membership reconciliation: source group → target group.
//!
//! Runs strictly in order: read source, read target, diff, resolve the
//! missing users, then submit a single PATCH. Membership is only ever added.

use groupsync_scim::{PatchOutcome, ScimUserId};
use tracing::{info, instrument, warn};

use crate::diff::{missing_members, SourceSnapshot};
use crate::error::ReconcileResult;
use crate::report::{Outcome, ResolvedUser, RunReport, Unresolved};
use crate::traits::{Confirm, SourceDirectory, TargetDirectory};

/// Run options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Resolve everything but submit nothing.
    pub dry_run: bool,
}

/// Group pair to reconcile.
#[derive(Debug, Clone)]
pub struct GroupPair {
    pub source_group: String,
    pub target_group: String,
}

pub struct Reconciler<S, T> {
    source: S,
    target: T,
    options: ReconcileOptions,
}

impl<S, T> Reconciler<S, T>
where
    S: SourceDirectory,
    T: TargetDirectory,
{
    pub fn new(source: S, target: T, options: ReconcileOptions) -> Self {
        Self {
            source,
            target,
            options,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Add every source member missing from the target group.
    ///
    /// Group lookups and member listings abort the run on error. A missing
    /// group does not: it reads as an empty membership and is reported. A
    /// user that cannot be resolved is recorded and skipped.
    #[instrument(skip_all, fields(source = %groups.source_group, target = %groups.target_group, dry_run = self.options.dry_run))]
    pub async fn run(&self, groups: &GroupPair, confirm: &dyn Confirm) -> ReconcileResult<RunReport> {
        // Source
        let source_group_id = self.source.resolve_group(&groups.source_group).await?;
        let source_members = match &source_group_id {
            Some(id) => self.source.list_members(id).await?,
            None => {
                warn!("Source group not found, treating it as empty");
                Vec::new()
            }
        };
        let snapshot = SourceSnapshot::from_members(source_members);
        info!(count = snapshot.len(), "Source members loaded");

        // Target
        let target_group_id = self.target.resolve_group(&groups.target_group).await?;
        let target_names = match &target_group_id {
            Some(id) => self.target.list_member_names(id).await?,
            None => {
                warn!("Target group not found, treating it as empty");
                Vec::new()
            }
        };
        info!(count = target_names.len(), "Target members loaded");

        let missing: Vec<String> = missing_members(&snapshot, &target_names)
            .into_iter()
            .collect();

        let mut report = RunReport {
            source_group: groups.source_group.clone(),
            target_group: groups.target_group.clone(),
            source_group_id: source_group_id.as_ref().map(|id| id.as_str().to_string()),
            target_group_id: target_group_id.as_ref().map(|id| id.as_str().to_string()),
            source_member_count: snapshot.len(),
            target_member_count: target_names.len(),
            missing,
            resolved: Vec::new(),
            unresolved: Vec::new(),
            dry_run: self.options.dry_run,
            outcome: Outcome::AllPresent,
        };

        if report.missing.is_empty() {
            info!("All source members are present in the target group");
            return Ok(report);
        }
        info!(count = report.missing.len(), "Members missing from target group");

        // Resolve
        let mut ids: Vec<ScimUserId> = Vec::with_capacity(report.missing.len());
        for display_name in &report.missing {
            let Some(principal_name) = snapshot.principal_for(display_name) else {
                continue;
            };

            match self.target.resolve_user(principal_name).await {
                Ok(Some(id)) => {
                    report.resolved.push(ResolvedUser {
                        display_name: display_name.clone(),
                        principal_name: principal_name.to_string(),
                        target_id: id.as_str().to_string(),
                    });
                    ids.push(id);
                }
                Ok(None) => {
                    warn!(%display_name, %principal_name, "User not found in target, skipping");
                    report.unresolved.push(Unresolved {
                        display_name: display_name.clone(),
                        principal_name: principal_name.to_string(),
                        reason: "not found in target directory".to_string(),
                    });
                }
                Err(e) => {
                    warn!(%display_name, %principal_name, error = %e, "User lookup failed, skipping");
                    report.unresolved.push(Unresolved {
                        display_name: display_name.clone(),
                        principal_name: principal_name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.outcome = if ids.is_empty() {
            warn!("No missing member could be resolved in the target directory");
            Outcome::NothingResolved
        } else if target_group_id.is_none() {
            warn!(resolved = ids.len(), "Target group not found, nothing to patch");
            Outcome::TargetGroupMissing
        } else if self.options.dry_run {
            info!(resolved = ids.len(), "Dry run, PATCH not submitted");
            Outcome::DryRun
        } else if !confirm.confirm(&groups.target_group, ids.len()) {
            info!("Change declined");
            Outcome::Declined
        } else {
            match self.target.add_members(target_group_id.as_ref(), &ids).await {
                PatchOutcome::Applied { status, added } => Outcome::Patched { status, added },
                PatchOutcome::Rejected { status, body } => Outcome::PatchRejected { status, body },
                PatchOutcome::Failed { error } => Outcome::PatchFailed { error },
                PatchOutcome::Skipped { reason } => Outcome::PatchFailed { error: reason },
            }
        };

        Ok(report)
    }
}

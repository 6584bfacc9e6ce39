//! Sequential deploy driver and the deploy state machine.
//!
//! ## Apply order
//!
//! 1. Updates and inserts, strictly in draft order, one remote call at a time.
//!    An insert is followed by an order-only update using the returned id.
//! 2. The first failing update or insert aborts the pass. Nothing after it
//!    runs, including deletions.
//! 3. Stale ids are deleted best-effort: a failed delete is logged and
//!    recorded, and the loop moves on.
//!
//! The pass is not transactional. A retry starts again from a fresh remote
//! snapshot; items inserted before the failure already carry their assigned
//! ids in the draft, so they are updated rather than inserted twice.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use gallery_core::{
    config::Mode, DraftError, DraftSlot, DraftStore, ItemId, RemoteStore, RemoteUpdate,
};

use crate::error::DeployError;
use crate::plan::{plan, DeployPlan, PlanStep};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inserted {
    pub position: usize,
    pub placeholder: ItemId,
    pub assigned: ItemId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFailure {
    pub id: ItemId,
    pub message: String,
}

/// What [`apply`] did to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ApplyReport {
    pub updated: Vec<ItemId>,
    pub inserted: Vec<Inserted>,
    pub deleted: Vec<ItemId>,
    pub delete_failures: Vec<DeleteFailure>,
}

/// Outcome of a successful deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    #[serde(flatten)]
    pub applied: ApplyReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Execute `plan` against `remote`.
///
/// `on_inserted(position, assigned_id)` runs right after each successful
/// insert, before the follow-up order update. An error from it aborts the
/// pass with [`DeployError::IdNotRecorded`]. The inserted row then stays
/// published with `display_order = 0` and no draft item carries its id, so
/// the next deploy deletes it as stale and inserts the item again under a
/// new id.
pub fn apply<F>(
    plan: &DeployPlan,
    remote: &dyn RemoteStore,
    mut on_inserted: F,
) -> Result<ApplyReport, DeployError>
where
    F: FnMut(usize, ItemId) -> Result<(), DraftError>,
{
    let mut report = ApplyReport::default();

    for step in &plan.steps {
        match step {
            PlanStep::Update {
                id,
                fields,
                display_order,
                ..
            } => {
                remote
                    .update(*id, &RemoteUpdate::full(fields.clone(), *display_order))
                    .map_err(|e| {
                        tracing::error!("update failed for '{}' ({}): {e}", fields.title, id);
                        DeployError::item(&fields.title, &e)
                    })?;
                tracing::debug!("updated {} '{}' at {}", id, fields.title, display_order);
                report.updated.push(*id);
            }
            PlanStep::Insert {
                position,
                placeholder,
                fields,
                display_order,
            } => {
                let assigned = remote.insert(fields).map_err(|e| {
                    tracing::error!("insert failed for '{}': {e}", fields.title);
                    DeployError::item(&fields.title, &e)
                })?;
                on_inserted(*position, assigned).map_err(|source| {
                    tracing::error!(
                        "could not record id {} for '{}' in the draft: {source}",
                        assigned,
                        fields.title
                    );
                    DeployError::IdNotRecorded {
                        title: fields.title.clone(),
                        assigned,
                        source,
                    }
                })?;
                remote
                    .update(assigned, &RemoteUpdate::order_only(*display_order))
                    .map_err(|e| {
                        tracing::error!("ranking failed for '{}' ({}): {e}", fields.title, assigned);
                        DeployError::item(&fields.title, &e)
                    })?;
                tracing::debug!(
                    "inserted '{}' as {} (placeholder {}) at {}",
                    fields.title,
                    assigned,
                    placeholder,
                    display_order
                );
                report.inserted.push(Inserted {
                    position: *position,
                    placeholder: *placeholder,
                    assigned,
                });
            }
        }
    }

    for id in &plan.to_delete {
        match remote.delete(*id) {
            Ok(()) => {
                tracing::debug!("deleted stale item {id}");
                report.deleted.push(*id);
            }
            Err(e) => {
                tracing::warn!("failed to delete stale item {id}: {e}");
                report.delete_failures.push(DeleteFailure {
                    id: *id,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Deployer
// ---------------------------------------------------------------------------

/// Externally visible deploy state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeployState {
    #[default]
    Idle,
    InProgress,
    Succeeded,
    Failed(String),
}

/// Runs deploys one at a time and remembers how the last one ended.
#[derive(Debug, Default)]
pub struct Deployer {
    state: Mutex<DeployState>,
}

impl Deployer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DeployState {
        self.lock().clone()
    }

    /// Compute what a deploy would do right now, without writing anything.
    pub fn preview<S: DraftSlot>(
        draft: &DraftStore<S>,
        remote: &dyn RemoteStore,
    ) -> Result<DeployPlan, DeployError> {
        let current = remote.fetch_all().map_err(DeployError::Fetch)?;
        Ok(plan(draft.items(), &current))
    }

    /// Make the remote store match `draft`.
    ///
    /// Refused with [`DeployError::NotAdmin`] outside [`Mode::Admin`] and with
    /// [`DeployError::AlreadyRunning`] while another deploy is in progress;
    /// neither refusal touches the remote store or the recorded state.
    pub fn deploy<S: DraftSlot>(
        &self,
        mode: Mode,
        draft: &mut DraftStore<S>,
        remote: &dyn RemoteStore,
    ) -> Result<DeployReport, DeployError> {
        if mode != Mode::Admin {
            return Err(DeployError::NotAdmin { mode });
        }
        {
            let mut state = self.lock();
            if *state == DeployState::InProgress {
                return Err(DeployError::AlreadyRunning);
            }
            *state = DeployState::InProgress;
        }

        let result = run(draft, remote);
        *self.lock() = match &result {
            Ok(report) => {
                tracing::info!(
                    "deploy succeeded: {} updated, {} inserted, {} deleted, {} delete failures",
                    report.applied.updated.len(),
                    report.applied.inserted.len(),
                    report.applied.deleted.len(),
                    report.applied.delete_failures.len()
                );
                DeployState::Succeeded
            }
            Err(err) => {
                tracing::error!("deploy failed: {err}");
                DeployState::Failed(err.to_string())
            }
        };
        result
    }

    fn lock(&self) -> MutexGuard<'_, DeployState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn run<S: DraftSlot>(
    draft: &mut DraftStore<S>,
    remote: &dyn RemoteStore,
) -> Result<DeployReport, DeployError> {
    let started_at = Utc::now();
    let current = remote.fetch_all().map_err(DeployError::Fetch)?;
    let plan = plan(draft.items(), &current);
    tracing::info!(
        "deploying {} items: {} updates, {} inserts, {} stale",
        plan.steps.len(),
        plan.to_update().count(),
        plan.to_insert().count(),
        plan.to_delete.len()
    );

    let applied = apply(&plan, remote, |position, assigned| {
        draft.reassign_id(position, assigned)
    })?;

    Ok(DeployReport {
        applied,
        started_at,
        finished_at: Utc::now(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

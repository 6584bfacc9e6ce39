//! Deploy planning: a pure three-way diff by identity.
//!
//! [`plan`] compares the desired (draft) list with the current (published)
//! set and returns the ordered steps that make the published set match.
//! It performs no I/O; [`crate::reconciler::apply`] executes the result.

use std::collections::{BTreeSet, HashMap, HashSet};

use gallery_core::{Item, ItemFields, ItemId};

/// One write against the remote store, in desired list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// The id exists remotely: overwrite its fields and rank.
    Update {
        position: usize,
        id: ItemId,
        fields: ItemFields,
        display_order: u32,
    },
    /// The id is unknown remotely: insert, then rank with the returned id.
    Insert {
        position: usize,
        placeholder: ItemId,
        fields: ItemFields,
        display_order: u32,
    },
}

impl PlanStep {
    /// 0-based index in the draft list.
    pub fn position(&self) -> usize {
        match self {
            PlanStep::Update { position, .. } | PlanStep::Insert { position, .. } => *position,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            PlanStep::Update { fields, .. } | PlanStep::Insert { fields, .. } => &fields.title,
        }
    }

    pub fn display_order(&self) -> u32 {
        match self {
            PlanStep::Update { display_order, .. } | PlanStep::Insert { display_order, .. } => {
                *display_order
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeployPlan {
    pub steps: Vec<PlanStep>,
    /// Stale remote ids, ascending.
    pub to_delete: Vec<ItemId>,
}

impl DeployPlan {
    pub fn to_update(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps
            .iter()
            .filter(|s| matches!(s, PlanStep::Update { .. }))
    }

    pub fn to_insert(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps
            .iter()
            .filter(|s| matches!(s, PlanStep::Insert { .. }))
    }

    /// True when applying the plan would leave `current` exactly as it is.
    pub fn is_noop_against(&self, current: &[Item]) -> bool {
        if !self.to_delete.is_empty() {
            return false;
        }
        let by_id: HashMap<ItemId, &Item> = current.iter().map(|i| (i.id, i)).collect();
        self.steps.iter().all(|step| match step {
            PlanStep::Update {
                id,
                fields,
                display_order,
                ..
            } => by_id
                .get(id)
                .is_some_and(|item| item.fields == *fields && item.display_order == *display_order),
            PlanStep::Insert { .. } => false,
        })
    }
}

/// Compute the steps that make `current` match `desired`.
///
/// Each desired item at 0-based index `i` gets `display_order = i + 1`.
/// An id present in `current` is updated, anything else is inserted, and
/// every current id not claimed by the desired list is deleted. When the
/// desired list repeats an id, only the first occurrence keeps it.
pub fn plan(desired: &[Item], current: &[Item]) -> DeployPlan {
    let mut pending_removal: BTreeSet<ItemId> = current.iter().map(|i| i.id).collect();
    let known: HashSet<ItemId> = pending_removal.iter().copied().collect();
    let mut claimed: HashSet<ItemId> = HashSet::new();

    let steps = desired
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let display_order = position as u32 + 1;
            if known.contains(&item.id) && claimed.insert(item.id) {
                pending_removal.remove(&item.id);
                PlanStep::Update {
                    position,
                    id: item.id,
                    fields: item.fields.clone(),
                    display_order,
                }
            } else {
                PlanStep::Insert {
                    position,
                    placeholder: item.id,
                    fields: item.fields.clone(),
                    display_order,
                }
            }
        })
        .collect();

    DeployPlan {
        steps,
        to_delete: pending_removal.into_iter().collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

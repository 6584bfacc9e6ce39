//! Unified diff of what a deploy would change, for `gallery diff`.

use std::collections::HashMap;

use serde::Serialize;
use similar::TextDiff;

use gallery_core::{Item, ItemFields, ItemId};

use crate::plan::{plan, PlanStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Updated,
    Inserted,
    Deleted,
}

/// A single item diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDiff {
    pub id: ItemId,
    pub title: String,
    pub kind: ChangeKind,
    pub unified_diff: String,
}

/// The published shape of an item, as rendered for diffing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Rendered<'a> {
    #[serde(flatten)]
    fields: &'a ItemFields,
    display_order: u32,
}

/// Compare the draft with the published set.
///
/// Items a deploy would leave untouched are omitted. New items diff against
/// an empty file and stale items diff to one.
pub fn diff_items(draft: &[Item], published: &[Item]) -> Vec<ItemDiff> {
    let by_id: HashMap<ItemId, &Item> = published.iter().map(|i| (i.id, i)).collect();
    let plan = plan(draft, published);
    let mut diffs = Vec::new();

    for step in &plan.steps {
        match step {
            PlanStep::Update {
                id,
                fields,
                display_order,
                ..
            } => {
                let Some(current) = by_id.get(id) else {
                    continue;
                };
                let old = render(&current.fields, current.display_order);
                let new = render(fields, *display_order);
                if old == new {
                    continue;
                }
                diffs.push(ItemDiff {
                    id: *id,
                    title: fields.title.clone(),
                    kind: ChangeKind::Updated,
                    unified_diff: unified(&old, &new, &id.to_string(), &id.to_string()),
                });
            }
            PlanStep::Insert {
                placeholder,
                fields,
                display_order,
                ..
            } => {
                let new = render(fields, *display_order);
                diffs.push(ItemDiff {
                    id: *placeholder,
                    title: fields.title.clone(),
                    kind: ChangeKind::Inserted,
                    unified_diff: unified("", &new, "/dev/null", &format!("new-{placeholder}")),
                });
            }
        }
    }

    for id in &plan.to_delete {
        if let Some(current) = by_id.get(id) {
            let old = render(&current.fields, current.display_order);
            diffs.push(ItemDiff {
                id: *id,
                title: current.fields.title.clone(),
                kind: ChangeKind::Deleted,
                unified_diff: unified(&old, "", &id.to_string(), "/dev/null"),
            });
        }
    }

    diffs
}

fn render(fields: &ItemFields, display_order: u32) -> String {
    let rendered = Rendered {
        fields,
        display_order,
    };
    // Serializing plain strings and integers cannot fail.
    let mut text = serde_json::to_string_pretty(&rendered).unwrap_or_default();
    text.push('\n');
    text
}

fn unified(old: &str, new: &str, old_name: &str, new_name: &str) -> String {
    let old_header = if old_name == "/dev/null" {
        old_name.to_owned()
    } else {
        format!("a/{old_name}")
    };
    let new_header = if new_name == "/dev/null" {
        new_name.to_owned()
    } else {
        format!("b/{new_name}")
    };
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

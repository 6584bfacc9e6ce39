//! Draft editing: `gallery add | edit | remove | move | reset`.
//!
//! None of these write to the published store.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use gallery_core::{Category, ItemFields, ItemId, ItemPatch};

use super::Session;

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub creator: String,

    /// Cover image URL.
    #[arg(long)]
    pub cover: Option<String>,

    /// Audio URL.
    #[arg(long)]
    pub audio: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// File holding the rich-text story markup.
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,
}

impl AddArgs {
    pub fn run(self) -> Result<()> {
        let mut session = Session::open()?;
        let rich_content = read_content(self.content_file.as_ref())?;
        let fields = ItemFields {
            title: self.title,
            creator: self.creator,
            cover_image_ref: self.cover,
            audio_ref: self.audio,
            description: self.description,
            rich_content,
            category: Category::from(self.category),
            year: self.year,
        };
        let title = fields.title.clone();
        let id = session.draft.add(fields).context("failed to save draft")?;
        println!("✓ Added '{title}' to the draft (id {id})");

        // Identity is by id, so a deploy would overwrite the published row.
        if let Ok(published) = session.remote.fetch_all() {
            if let Some(existing) = published.iter().find(|item| item.id == id) {
                println!(
                    "  {} id {id} is still published as '{}'; deploying will replace it with '{title}'",
                    "!".yellow(),
                    existing.title()
                );
            }
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Draft item id.
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub creator: Option<String>,

    #[arg(long, conflicts_with = "clear_cover")]
    pub cover: Option<String>,

    #[arg(long, conflicts_with = "clear_audio")]
    pub audio: Option<String>,

    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    #[arg(long, conflicts_with = "clear_content")]
    pub content_file: Option<PathBuf>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, conflicts_with = "clear_year")]
    pub year: Option<i32>,

    #[arg(long)]
    pub clear_cover: bool,

    #[arg(long)]
    pub clear_audio: bool,

    #[arg(long)]
    pub clear_description: bool,

    #[arg(long)]
    pub clear_content: bool,

    #[arg(long)]
    pub clear_year: bool,
}

impl EditArgs {
    pub fn run(self) -> Result<()> {
        let patch = self.to_patch()?;
        if patch.is_empty() {
            bail!("nothing to change; pass at least one field flag");
        }
        let mut session = Session::open()?;
        let id = ItemId(self.id);
        if !session.draft.update(id, &patch).context("failed to save draft")? {
            bail!("no draft item with id {id}");
        }
        println!("✓ Updated draft item {id}");
        Ok(())
    }

    fn to_patch(&self) -> Result<ItemPatch> {
        let content = match (&self.content_file, self.clear_content) {
            (_, true) => Some(None),
            (Some(path), false) => Some(read_content(Some(path))?),
            (None, false) => None,
        };
        Ok(ItemPatch {
            title: self.title.clone(),
            creator: self.creator.clone(),
            cover_image_ref: set_or_clear(&self.cover, self.clear_cover),
            audio_ref: set_or_clear(&self.audio, self.clear_audio),
            description: set_or_clear(&self.description, self.clear_description),
            rich_content: content,
            category: self.category.clone().map(Category::from),
            year: set_or_clear(&self.year, self.clear_year),
        })
    }
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Draft item id.
    pub id: i64,
}

impl RemoveArgs {
    pub fn run(self) -> Result<()> {
        let mut session = Session::open()?;
        let id = ItemId(self.id);
        if !session.draft.delete(id).context("failed to save draft")? {
            bail!("no draft item with id {id}");
        }
        println!("✓ Removed draft item {id}");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Draft item id.
    pub id: i64,

    /// New 1-based position; values past the end move the item last.
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub position: u32,
}

impl MoveArgs {
    pub fn run(self) -> Result<()> {
        let mut session = Session::open()?;
        let id = ItemId(self.id);
        let index = self.position as usize - 1;
        if !session
            .draft
            .move_item(id, index)
            .context("failed to save draft")?
        {
            bail!("no draft item with id {id}");
        }
        println!("✓ Moved draft item {id} to position {}", self.position);
        Ok(())
    }
}

/// `gallery reset`
pub fn reset() -> Result<()> {
    let mut session = Session::open()?;
    session
        .draft
        .reset_to_default()
        .context("failed to save draft")?;
    println!(
        "✓ Draft reset to the {} built-in items",
        session.draft.items().len()
    );
    Ok(())
}

fn set_or_clear<T: Clone>(value: &Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.clone().map(Some)
    }
}

fn read_content(path: Option<&PathBuf>) -> Result<Option<String>> {
    path.map(|p| {
        std::fs::read_to_string(p).with_context(|| format!("cannot read '{}'", p.display()))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(id: i64) -> EditArgs {
        EditArgs {
            id,
            title: None,
            creator: None,
            cover: None,
            audio: None,
            description: None,
            content_file: None,
            category: None,
            year: None,
            clear_cover: false,
            clear_audio: false,
            clear_description: false,
            clear_content: false,
            clear_year: false,
        }
    }

    #[test]
    fn empty_edit_builds_empty_patch() {
        assert!(edit(1).to_patch().unwrap().is_empty());
    }

    #[test]
    fn clear_flags_produce_some_none() {
        let mut args = edit(1);
        args.clear_audio = true;
        args.year = Some(2025);
        let patch = args.to_patch().unwrap();
        assert_eq!(patch.audio_ref, Some(None));
        assert_eq!(patch.year, Some(Some(2025)));
        assert_eq!(patch.cover_image_ref, None);
    }
}

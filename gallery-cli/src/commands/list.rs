//! `gallery list`: show the draft or the published set.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use gallery_core::Item;

use super::Session;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List what is currently published instead of the draft.
    #[arg(long)]
    pub published: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "id")]
    id: i64,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "creator")]
    creator: String,
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "year")]
    year: String,
    #[tabled(rename = "media")]
    media: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::open()?;
        let items: Vec<Item> = if self.published {
            session
                .remote
                .fetch_all()
                .context("failed to fetch published items")?
        } else {
            session.draft.items().to_vec()
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&items).context("failed to serialize items")?
            );
            return Ok(());
        }

        let label = if self.published { "Published" } else { "Draft" };
        println!("{} | {} items", label.bold(), items.len());
        if items.is_empty() {
            println!("Nothing here yet. Add one with `gallery add` or run `gallery reset`.");
            return Ok(());
        }

        let rows: Vec<ItemRow> = items
            .iter()
            .enumerate()
            .map(|(i, item)| ItemRow {
                position: i + 1,
                id: item.id.0,
                title: item.fields.title.clone(),
                creator: item.fields.creator.clone(),
                category: item.fields.category.to_string(),
                year: item.fields.year.map(|y| y.to_string()).unwrap_or_default(),
                media: media_flags(item),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn media_flags(item: &Item) -> String {
    let flag = |present: bool, name: &str| {
        if present {
            name.green().to_string()
        } else {
            name.bright_black().to_string()
        }
    };
    [
        flag(item.fields.cover_image_ref.is_some(), "img"),
        flag(item.fields.audio_ref.is_some(), "audio"),
        flag(item.fields.rich_content.is_some(), "story"),
    ]
    .join(" ")
}

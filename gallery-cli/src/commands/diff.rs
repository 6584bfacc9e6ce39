//! `gallery diff`: show unified diffs for what deploy would write.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gallery_deploy::{diff_items, ChangeKind};

use super::Session;

/// Arguments for `gallery diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Only print the changed titles.
    #[arg(long)]
    pub stat: bool,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::open()?;
        let published = session
            .remote
            .fetch_all()
            .context("failed to fetch published items")?;

        let diffs = diff_items(session.draft.items(), &published);
        if diffs.is_empty() {
            println!("No differences; the published gallery matches the draft.");
            return Ok(());
        }

        for diff in diffs {
            if self.stat {
                let marker = match diff.kind {
                    ChangeKind::Updated => "~".yellow(),
                    ChangeKind::Inserted => "+".green(),
                    ChangeKind::Deleted => "-".red(),
                };
                println!("{marker} {} ({})", diff.title, diff.id);
                continue;
            }
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}

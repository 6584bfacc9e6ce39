//! `gallery deploy [--dry-run]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gallery_deploy::{Deployer, PlanStep};

use super::Session;

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Print the plan without writing to the remote store.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the deploy report as JSON.
    #[arg(long, conflicts_with = "dry_run")]
    pub json: bool,
}

impl DeployArgs {
    pub fn run(self) -> Result<()> {
        let mut session = Session::open()?;

        if self.dry_run {
            let plan = Deployer::preview(&session.draft, session.remote.as_ref())
                .context("failed to plan deploy")?;
            println!(
                "Would update {}, insert {}, delete {}",
                plan.to_update().count(),
                plan.to_insert().count(),
                plan.to_delete.len()
            );
            for step in &plan.steps {
                match step {
                    PlanStep::Update { id, fields, .. } => {
                        println!("  {} {} ({id})", "~".yellow(), fields.title)
                    }
                    PlanStep::Insert { fields, .. } => {
                        println!("  {} {}", "+".green(), fields.title)
                    }
                }
            }
            for id in &plan.to_delete {
                println!("  {} id {id}", "-".red());
            }
            return Ok(());
        }

        let report = Deployer::new()
            .deploy(
                session.config.mode,
                &mut session.draft,
                session.remote.as_ref(),
            )
            .context("deploy failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
            return Ok(());
        }

        let applied = &report.applied;
        println!(
            "{} Deployed {} items ({} updated, {} inserted, {} deleted)",
            "✓".green(),
            applied.updated.len() + applied.inserted.len(),
            applied.updated.len(),
            applied.inserted.len(),
            applied.deleted.len()
        );
        for failure in &applied.delete_failures {
            println!(
                "  {} could not delete id {}: {}",
                "!".yellow(),
                failure.id,
                failure.message
            );
        }
        Ok(())
    }
}

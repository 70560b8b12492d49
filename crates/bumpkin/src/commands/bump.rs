//! Bump command — thin CLI layer over `bumpkin_core::bump`.

use anyhow::Context;
use camino::Utf8Path;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use bumpkin_core::bump;
use bumpkin_core::config::Config;
use bumpkin_core::scm::ScmInfo;

/// Arguments for the `bump` subcommand.
#[derive(Args, Debug, Default)]
pub struct BumpArgs {
    /// Version component to increment (e.g. "patch")
    #[arg(value_name = "COMPONENT")]
    pub component: Option<String>,

    /// Set the next version explicitly instead of bumping a component
    #[arg(long, value_name = "VERSION")]
    pub new_version: Option<String>,

    /// Show what would change without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Bump even when the working tree has uncommitted changes
    #[arg(long)]
    pub allow_dirty: bool,
}

/// Execute the bump command.
#[instrument(name = "cmd_bump", skip_all)]
pub fn cmd_bump(
    args: BumpArgs,
    global_json: bool,
    config: &Config,
    config_file: Option<&Utf8Path>,
    cwd: &Utf8Path,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    config.scm_info = ScmInfo::detect(cwd);
    debug!(tool = ?config.scm_info.tool, "SCM detection");

    if let Some(tool) = config.scm_info.tool
        && !(args.allow_dirty || config.allow_dirty || args.dry_run)
    {
        tool.assert_nondirty()
            .context("working tree must be clean (use --allow-dirty to override)")?;
    }

    let outcome = bump::do_bump(
        args.component.as_deref(),
        args.new_version.as_deref(),
        &config,
        config_file,
        args.dry_run,
    )
    .context("bump failed")?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if outcome.skipped {
        println!(
            "{}",
            format!("Version is already {}, nothing to do.", outcome.new).yellow()
        );
        return Ok(());
    }

    println!(
        "{}: {} → {}",
        "Version".bold(),
        outcome.previous.dimmed(),
        outcome.new.green().bold()
    );
    for file in &outcome.modified_files {
        println!("  {} {}", "→".dimmed(), file.as_str().cyan());
    }

    if args.dry_run {
        println!();
        println!("{}", "Dry run — no changes were made.".yellow());
    }

    Ok(())
}

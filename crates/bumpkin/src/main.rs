//! bumpkin CLI
#![deny(unsafe_code)]

use anyhow::Context;
use bumpkin::{Cli, Commands, commands};
use bumpkin_core::config::{self, ConfigLoader};
use clap::Parser;
use tracing::debug;

mod observability;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = camino::Utf8PathBuf::try_from(cwd).map_err(|e| {
        anyhow::anyhow!(
            "current directory is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })?;

    // The config file path doubles as the store do_bump rewrites, so
    // resolve it explicitly instead of leaving discovery to the loader.
    let config_file = match cli.config {
        Some(ref path) => Some(
            camino::Utf8PathBuf::try_from(path.clone()).map_err(|e| {
                anyhow::anyhow!(
                    "config path is not valid UTF-8: {}",
                    e.into_path_buf().display()
                )
            })?,
        ),
        None => config::find_project_config(&cwd),
    };

    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    if cli.config.is_some()
        && let Some(ref path) = config_file
    {
        loader = loader.with_file(path);
    }
    let config = loader.load().context("failed to load configuration")?;

    let filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
    observability::init(filter);

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        json = cli.json,
        config_file = ?config_file,
        "CLI initialized"
    );

    let result = match cli.command {
        Commands::Bump(args) => {
            commands::bump::cmd_bump(args, cli.json, &config, config_file.as_deref(), &cwd)
        }
        Commands::Show(args) => {
            commands::show::cmd_show(args, cli.json, &config, config_file.as_deref(), &cwd)
        }
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}

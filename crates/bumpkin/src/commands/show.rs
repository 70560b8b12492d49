//! Show command — print the resolved version configuration.

use camino::Utf8Path;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use bumpkin_core::config::Config;
use bumpkin_core::scm::ScmInfo;

/// Arguments for the `show` subcommand.
#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct ShowInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_version: Option<String>,
    components: Vec<String>,
    files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scm_tool: Option<String>,
}

/// Print the resolved configuration and detected SCM tool.
#[instrument(name = "cmd_show", skip_all, fields(json_output))]
pub fn cmd_show(
    _args: ShowArgs,
    global_json: bool,
    config: &Config,
    config_file: Option<&Utf8Path>,
    cwd: &Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing show command");

    let scm_info = ScmInfo::detect(cwd);
    let info = ShowInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        config_file: config_file.map(Utf8Path::to_string),
        current_version: config.current_version.clone(),
        components: config.parts.clone(),
        files: config
            .file
            .iter()
            .map(|file| file.path.to_string())
            .collect(),
        scm_tool: scm_info.tool.map(|tool| tool.to_string()),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{} {}", info.name.bold(), info.version.green());
    println!();
    println!("{}", "Configuration".bold().underline());
    match info.config_file {
        Some(ref path) => println!("{}: {}", "Config file".dimmed(), path.cyan()),
        None => println!("{}: {}", "Config file".dimmed(), "none loaded".yellow()),
    }
    match info.current_version {
        Some(ref version) => {
            println!("{}: {}", "Current version".dimmed(), version.green());
        }
        None => println!("{}: {}", "Current version".dimmed(), "not set".yellow()),
    }
    println!("{}: {}", "Components".dimmed(), info.components.join(", "));

    println!();
    println!("{}", "Files".bold().underline());
    if info.files.is_empty() {
        println!("  {} {}", "○".yellow(), "no files configured".yellow());
    } else {
        for file in &info.files {
            println!("  {} {}", "→".dimmed(), file.cyan());
        }
    }

    println!();
    match info.scm_tool {
        Some(ref tool) => println!("{}: {}", "SCM tool".dimmed(), tool.cyan()),
        None => println!("{}: {}", "SCM tool".dimmed(), "none detected".dimmed()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn test_cwd() -> Utf8PathBuf {
        Utf8PathBuf::from("/tmp")
    }

    #[test]
    fn show_text_succeeds() {
        let config = Config::default();
        assert!(cmd_show(ShowArgs::default(), false, &config, None, &test_cwd()).is_ok());
    }

    #[test]
    fn show_json_succeeds() {
        let config = Config::default();
        assert!(cmd_show(ShowArgs::default(), true, &config, None, &test_cwd()).is_ok());
    }
}

//! Version bump orchestration.
//!
//! All sequencing logic lives here. The CLI is purely a display layer.
//!
//! # Sequence
//!
//! 1. Parse the recorded current version and resolve the next one
//!    ([`get_next_version`]) — any failure here aborts before a single
//!    byte is written.
//! 2. Short-circuit when the next version serializes to the exact string
//!    already recorded: a no-op bump touches nothing.
//! 3. Rewrite the configured files, then the configuration store, then
//!    commit and tag ([`commit_and_tag`]).
//!
//! There is no rollback. A failure during file rewriting leaves earlier
//! rewrites in place and skips config persistence and SCM steps; an SCM
//! failure leaves the repository with modified, uncommitted files for the
//! operator to resolve.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::{self, Config};
use crate::context::{RenderContext, render_context};
use crate::error::ConfigError;
use crate::files::{ConfiguredFile, FileError, modify_files, resolve_file_config};
use crate::scm::{ScmError, split_args};
use crate::version::{Version, VersionError};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors from bump operations.
#[derive(Error, Debug)]
pub enum BumpError {
    /// Neither a component to bump nor an explicit version was given.
    #[error("unable to determine the next version: no component to bump and no explicit version given")]
    NoNextVersion,

    /// Version parsing or computation failed.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// A file substitution failed.
    #[error(transparent)]
    File(#[from] FileError),

    /// The configuration store could not be read or rewritten.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The SCM tool failed.
    #[error(transparent)]
    Scm(#[from] ScmError),
}

/// Result alias for bump operations.
pub type BumpResult<T> = Result<T, BumpError>;

// ──────────────────────────────────────────────
// Version resolution
// ──────────────────────────────────────────────

/// Compute the next version.
///
/// A non-empty `new_version` literal wins: it is parsed and returned,
/// `version_part` ignored. Otherwise `version_part` names the component to
/// increment. With neither, the call fails immediately — this is a usage
/// error, not a runtime fault.
#[instrument(skip(current_version, config))]
pub fn get_next_version(
    current_version: &Version,
    config: &Config,
    version_part: Option<&str>,
    new_version: Option<&str>,
) -> BumpResult<Version> {
    let spec = config.version_spec()?;

    let next = if let Some(target) = new_version.filter(|v| !v.is_empty()) {
        spec.parse(target)?
    } else if let Some(part) = version_part {
        info!(%part, "incrementing version component");
        current_version.bump(part, spec.order())?
    } else {
        return Err(BumpError::NoNextVersion);
    };

    info!(values = %next, "next version computed");
    Ok(next)
}

// ──────────────────────────────────────────────
// Orchestration
// ──────────────────────────────────────────────

/// Result of a bump run.
#[derive(Debug, Clone, Serialize)]
pub struct BumpOutcome {
    /// The version recorded before the run.
    pub previous: String,
    /// The serialized next version.
    pub new: String,
    /// Paths that were (or, under dry run, would be) rewritten.
    pub modified_files: Vec<Utf8PathBuf>,
    /// True when the next version equals the current one and nothing ran.
    pub skipped: bool,
}

/// Run the full bump sequence.
///
/// The ordering is a correctness requirement: version resolution happens
/// before any mutation, file rewrites before config persistence, and
/// commit/tag last against a context carrying `new_version`. Under
/// `dry_run` every collaborator is still invoked — each one simulates its
/// effect instead of being skipped, so planned changes are still logged.
#[instrument(skip(config))]
pub fn do_bump(
    version_part: Option<&str>,
    new_version: Option<&str>,
    config: &Config,
    config_file: Option<&Utf8Path>,
    dry_run: bool,
) -> BumpResult<BumpOutcome> {
    let current_version_str = config
        .current_version
        .as_deref()
        .ok_or(ConfigError::MissingCurrentVersion)?;
    let spec = config.version_spec()?;

    let ctx = render_context(config, None, None);
    let version = spec.parse(current_version_str)?;
    let next_version = get_next_version(&version, config, version_part, new_version)?;
    let next_version_str = spec.serialize(&next_version, &ctx);
    info!(%next_version_str, "new version resolved");

    if current_version_str == next_version_str {
        info!(%next_version_str, "version is already current, nothing to do");
        return Ok(BumpOutcome {
            previous: current_version_str.to_string(),
            new: next_version_str,
            modified_files: Vec::new(),
            skipped: true,
        });
    }

    if dry_run {
        info!("dry run active, no files will be touched");
    }

    let ctx = render_context(config, Some(&version), Some(&next_version));

    let configured_files = resolve_file_config(&config.file, &spec);
    modify_files(&configured_files, &version, &next_version, &ctx, dry_run)?;
    config::update_config_file(config_file, current_version_str, &next_version_str, dry_run)?;

    let mut ctx = render_context(config, Some(&version), Some(&next_version));
    ctx.push_layer(
        [("new_version".to_string(), next_version_str.clone())]
            .into_iter()
            .collect(),
    );
    commit_and_tag(config, config_file, &configured_files, &ctx, dry_run)?;

    Ok(BumpOutcome {
        previous: current_version_str.to_string(),
        new: next_version_str,
        modified_files: configured_files.iter().map(|f| f.path.clone()).collect(),
        skipped: false,
    })
}

/// Commit and tag the rewritten files, if an SCM tool is available.
///
/// The staged set is the union of the configured-file paths and the config
/// file, deduplicated. Commit always runs before tag; both are invoked
/// whenever a tool is configured and each honors `dry_run` itself.
#[instrument(skip_all, fields(dry_run))]
pub fn commit_and_tag(
    config: &Config,
    config_file: Option<&Utf8Path>,
    configured_files: &[ConfiguredFile],
    ctx: &RenderContext,
    dry_run: bool,
) -> BumpResult<()> {
    let Some(tool) = config.scm_info.tool else {
        debug!("no SCM tool detected, skipping commit and tag");
        return Ok(());
    };

    let extra_args = match config.commit_args.as_deref() {
        Some(args) => split_args(args)?,
        None => Vec::new(),
    };

    let mut commit_files: BTreeSet<Utf8PathBuf> = configured_files
        .iter()
        .map(|file| file.path.clone())
        .collect();
    if let Some(path) = config_file {
        commit_files.insert(path.to_path_buf());
    }
    let commit_files: Vec<Utf8PathBuf> = commit_files.into_iter().collect();

    tool.commit_to_scm(&commit_files, config, ctx, &extra_args, dry_run)?;
    tool.tag_in_scm(config, ctx, dry_run)?;
    Ok(())
}

//! Configured-file resolution and multi-file version substitution.
//!
//! Each `[[file]]` entry in the configuration names a file containing the
//! version string plus optional search/replace template overrides.
//! [`resolve_file_config`] turns the raw entries into concrete
//! [`ConfiguredFile`] instructions; [`modify_files`] applies them.
//!
//! There is no rollback: if one file fails mid-run, files rewritten before
//! it keep their new contents.

use std::collections::BTreeMap;
use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::context::RenderContext;
use crate::version::{Version, VersionSpec};

/// Errors from file substitution.
#[derive(Error, Debug)]
pub enum FileError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file that failed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The file that failed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The rendered search text does not occur in the file.
    #[error("search text {search:?} not found in {path}")]
    SearchNotFound {
        /// The file that was searched.
        path: Utf8PathBuf,
        /// The rendered search text.
        search: String,
    },
}

/// Result alias for file operations.
pub type FileResult<T> = Result<T, FileError>;

/// Default search template when a file entry gives none.
pub const DEFAULT_SEARCH: &str = "{current_version}";

/// Default replace template when a file entry gives none.
pub const DEFAULT_REPLACE: &str = "{new_version}";

/// A raw `[[file]]` entry as written in the configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileChange {
    /// Path of the file to rewrite, relative to the working directory.
    pub path: Utf8PathBuf,
    /// Search template override (default `"{current_version}"`).
    pub search: Option<String>,
    /// Replace template override (default `"{new_version}"`).
    pub replace: Option<String>,
    /// Per-file serialize template override.
    pub serialize: Option<String>,
}

/// A resolved file-update instruction.
#[derive(Debug, Clone)]
pub struct ConfiguredFile {
    /// The file to rewrite.
    pub path: Utf8PathBuf,
    /// Rendered-at-use search template.
    pub search: String,
    /// Rendered-at-use replace template.
    pub replace: String,
    /// The version spec for this file, with any serialize override applied.
    pub spec: VersionSpec,
}

/// Resolve raw file entries against the version spec.
///
/// Pure transformation; performs no I/O.
pub fn resolve_file_config(files: &[FileChange], spec: &VersionSpec) -> Vec<ConfiguredFile> {
    files
        .iter()
        .map(|file| ConfiguredFile {
            path: file.path.clone(),
            search: file
                .search
                .clone()
                .unwrap_or_else(|| DEFAULT_SEARCH.to_string()),
            replace: file
                .replace
                .clone()
                .unwrap_or_else(|| DEFAULT_REPLACE.to_string()),
            spec: file
                .serialize
                .as_deref()
                .map_or_else(|| spec.clone(), |fmt| spec.with_serialize(fmt)),
        })
        .collect()
}

/// Apply the version substitution across all configured files.
///
/// Files are processed in order; the first failure aborts the run and
/// leaves earlier rewrites in place.
#[instrument(skip_all, fields(count = files.len(), dry_run))]
pub fn modify_files(
    files: &[ConfiguredFile],
    current: &Version,
    new: &Version,
    ctx: &RenderContext,
    dry_run: bool,
) -> FileResult<()> {
    for file in files {
        file.replace_version(current, new, ctx, dry_run)?;
    }
    Ok(())
}

impl ConfiguredFile {
    /// Substitute the rendered search text with the rendered replacement,
    /// replacing every occurrence in the file.
    fn replace_version(
        &self,
        current: &Version,
        new: &Version,
        ctx: &RenderContext,
        dry_run: bool,
    ) -> FileResult<()> {
        let current_str = self.spec.serialize(current, ctx);
        let new_str = self.spec.serialize(new, ctx);

        let mut layer = BTreeMap::new();
        layer.insert("current_version".to_string(), current_str);
        layer.insert("new_version".to_string(), new_str);
        let ctx = ctx.clone().layered(layer);

        let search = ctx.render(&self.search);
        let replace = ctx.render(&self.replace);

        let contents = fs::read_to_string(&self.path).map_err(|source| FileError::Read {
            path: self.path.clone(),
            source,
        })?;

        if !contents.contains(&search) {
            return Err(FileError::SearchNotFound {
                path: self.path.clone(),
                search,
            });
        }

        if dry_run {
            info!(path = %self.path, %search, %replace, "dry run: file left untouched");
            return Ok(());
        }

        debug!(path = %self.path, %search, %replace, "rewriting");
        let updated = contents.replace(&search, &replace);
        fs::write(&self.path, updated).map_err(|source| FileError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path, "file updated");
        Ok(())
    }
}

//! Source-control integration for the bump workflow.
//!
//! Shells out to `git` or `hg` for all operations so the user's hooks,
//! signing keys and tool configuration apply. Absence of a tool is a typed
//! state ([`ScmInfo::tool`] is `None`), not an error: a project without
//! source control simply skips the commit and tag steps.

use std::fmt;
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::context::RenderContext;

/// Errors from SCM operations.
#[derive(Error, Debug)]
pub enum ScmError {
    /// Failed to spawn the SCM binary.
    #[error("failed to run the SCM tool: {0}")]
    Exec(#[from] std::io::Error),

    /// The SCM command returned a non-zero exit code.
    #[error("{tool} {command} failed: {stderr}")]
    Command {
        /// The binary that failed.
        tool: &'static str,
        /// The subcommand that failed (e.g. "commit").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// The working tree has uncommitted changes.
    #[error("working tree has uncommitted changes:\n{files}")]
    Dirty {
        /// The dirty paths, one per line as reported by the tool.
        files: String,
    },

    /// The tool cannot produce signed tags.
    #[error("{tool} does not support signed tags")]
    SigningUnsupported {
        /// The tool that was asked to sign.
        tool: &'static str,
    },

    /// The configured commit arguments are not valid shell quoting.
    #[error("cannot parse commit arguments {args:?}")]
    CommitArgs {
        /// The argument string that failed to split.
        args: String,
    },
}

/// Result alias for SCM operations.
pub type ScmResult<T> = Result<T, ScmError>;

/// The source-control tool driving commit and tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmTool {
    /// Git, driven through the `git` binary.
    Git,
    /// Mercurial, driven through the `hg` binary.
    Mercurial,
}

/// Detected SCM capability for the working directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScmInfo {
    /// The detected tool; `None` means no SCM integration.
    pub tool: Option<ScmTool>,
}

impl ScmInfo {
    /// Detect the SCM tool for `dir`.
    ///
    /// Requires both the tool's metadata directory (`.git` / `.hg`) in
    /// `dir` and the binary on `PATH`. Deliberately does not walk up: the
    /// bump runs against the directory it was invoked in.
    pub fn detect(dir: &Utf8Path) -> Self {
        let tool = if dir.join(".git").exists() && which::which("git").is_ok() {
            Some(ScmTool::Git)
        } else if dir.join(".hg").exists() && which::which("hg").is_ok() {
            Some(ScmTool::Mercurial)
        } else {
            None
        };
        debug!(?tool, %dir, "SCM detection");
        Self { tool }
    }
}

impl fmt::Display for ScmTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Mercurial => write!(f, "mercurial"),
        }
    }
}

impl ScmTool {
    /// The binary this tool shells out to.
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Mercurial => "hg",
        }
    }

    /// Stage the given files and commit with the rendered message.
    ///
    /// Skips when `config.commit` is false. Under `dry_run` the would-be
    /// commit is logged and nothing runs; `dry_run` is never an error.
    #[instrument(skip_all, fields(tool = %self, dry_run))]
    pub fn commit_to_scm(
        self,
        files: &[Utf8PathBuf],
        config: &Config,
        ctx: &RenderContext,
        extra_args: &[String],
        dry_run: bool,
    ) -> ScmResult<()> {
        if !config.commit {
            debug!("commit disabled in configuration");
            return Ok(());
        }

        let message = ctx.render(&config.message);
        if dry_run {
            info!(%message, ?files, "dry run: would commit");
            return Ok(());
        }

        // Mercurial commits tracked files without a staging step.
        if self == Self::Git {
            let mut add = vec!["add".to_string(), "--update".to_string()];
            add.extend(files.iter().map(Utf8PathBuf::to_string));
            self.run(&add)?;
        }

        let mut commit = vec!["commit".to_string(), "--message".to_string(), message.clone()];
        commit.extend(extra_args.iter().cloned());

        info!(%message, "committing changes");
        self.run(&commit)?;
        Ok(())
    }

    /// Create an annotated tag from the rendered tag name and message.
    ///
    /// Skips when `config.tag` is false. Under `dry_run` the would-be tag
    /// is logged and nothing runs.
    #[instrument(skip_all, fields(tool = %self, dry_run))]
    pub fn tag_in_scm(self, config: &Config, ctx: &RenderContext, dry_run: bool) -> ScmResult<()> {
        if !config.tag {
            debug!("tagging disabled in configuration");
            return Ok(());
        }

        let tag_name = ctx.render(&config.tag_name);
        let tag_message = ctx.render(&config.tag_message);
        if dry_run {
            info!(%tag_name, "dry run: would tag");
            return Ok(());
        }

        info!(%tag_name, "tagging");
        match self {
            Self::Git => {
                let sign_or_annotate = if config.sign_tags { "--sign" } else { "--annotate" };
                self.run(&[
                    "tag".to_string(),
                    sign_or_annotate.to_string(),
                    tag_name,
                    "--message".to_string(),
                    tag_message,
                ])?;
            }
            Self::Mercurial => {
                if config.sign_tags {
                    return Err(ScmError::SigningUnsupported { tool: "mercurial" });
                }
                self.run(&[
                    "tag".to_string(),
                    "--message".to_string(),
                    tag_message,
                    tag_name,
                ])?;
            }
        }
        Ok(())
    }

    /// Fail unless the working tree is clean.
    pub fn assert_nondirty(self) -> ScmResult<()> {
        let args: &[&str] = match self {
            Self::Git => &["status", "--porcelain"],
            Self::Mercurial => &["status", "-mard"],
        };
        let output = self.run(&args.iter().map(ToString::to_string).collect::<Vec<_>>())?;
        let dirty = output.trim();
        if dirty.is_empty() {
            Ok(())
        } else {
            Err(ScmError::Dirty {
                files: dirty.to_string(),
            })
        }
    }

    /// Run a subcommand and return its stdout.
    fn run(self, args: &[String]) -> ScmResult<String> {
        debug!(tool = %self, ?args, "running SCM command");
        let output = Command::new(self.binary()).args(args).output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(ScmError::Command {
                tool: self.binary(),
                command: args.first().cloned().unwrap_or_default(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Split a shell-quoted argument string into tokens.
///
/// Quotes group tokens and backslashes escape, so arguments containing
/// spaces survive intact. Fails on unbalanced quoting.
pub fn split_args(args: &str) -> ScmResult<Vec<String>> {
    shlex::split(args).ok_or_else(|| ScmError::CommitArgs {
        args: args.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn split_respects_quotes() {
        let tokens = split_args("--no-verify 'multi word'").unwrap();
        assert_eq!(tokens, vec!["--no-verify", "multi word"]);
    }

    #[test]
    fn split_respects_escapes() {
        let tokens = split_args(r"--trailer Signed\ off").unwrap();
        assert_eq!(tokens, vec!["--trailer", "Signed off"]);
    }

    #[test]
    fn split_empty_string() {
        assert!(split_args("").unwrap().is_empty());
    }

    #[test]
    fn split_rejects_unbalanced_quotes() {
        assert!(matches!(
            split_args("--message 'unterminated"),
            Err(ScmError::CommitArgs { .. })
        ));
    }

    #[test]
    fn detect_without_metadata_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();
        assert_eq!(ScmInfo::detect(dir), ScmInfo { tool: None });
    }

    #[test]
    fn detect_git_directory() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();
        let info = ScmInfo::detect(dir);
        // Only asserted when git is installed; detection requires the binary.
        if which::which("git").is_ok() {
            assert_eq!(info.tool, Some(ScmTool::Git));
        } else {
            assert_eq!(info.tool, None);
        }
    }

    #[test]
    fn commit_skips_when_disabled() {
        let config = Config::default();
        let ctx = RenderContext::default();
        // config.commit defaults to false, so no process is spawned.
        ScmTool::Git
            .commit_to_scm(&[], &config, &ctx, &[], false)
            .unwrap();
    }

    #[test]
    fn tag_skips_when_disabled() {
        let config = Config::default();
        let ctx = RenderContext::default();
        ScmTool::Git.tag_in_scm(&config, &ctx, false).unwrap();
    }

    #[test]
    fn dry_run_commit_never_fails() {
        let mut config = Config::default();
        config.commit = true;
        let ctx = RenderContext::default();
        ScmTool::Git
            .commit_to_scm(&[], &config, &ctx, &[], true)
            .unwrap();
        ScmTool::Mercurial
            .commit_to_scm(&[], &config, &ctx, &[], true)
            .unwrap();
    }

    #[test]
    fn dry_run_tag_never_fails() {
        let mut config = Config::default();
        config.tag = true;
        config.sign_tags = true;
        let ctx = RenderContext::default();
        ScmTool::Git.tag_in_scm(&config, &ctx, true).unwrap();
        // Even mercurial with sign_tags set: dry run short-circuits first.
        ScmTool::Mercurial.tag_in_scm(&config, &ctx, true).unwrap();
    }

    #[test]
    fn tool_display_names() {
        assert_eq!(ScmTool::Git.to_string(), "git");
        assert_eq!(ScmTool::Mercurial.to_string(), "mercurial");
    }
}

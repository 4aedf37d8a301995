//! Local git operations for pushing the generated artifacts.
//!
//! Shells out to the `git` binary; every step is best-effort except the
//! final push, whose failure is fatal to the git phase (but not to the
//! provisioning run).

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use skylift_core::error::{SkyliftError, SkyliftResult};

/// Snapshot of the local repository state for the verify report.
#[derive(Debug, Clone, Default)]
pub struct GitStatus {
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub last_commit: Option<String>,
}

fn run_git(dir: &Path, args: &[&str]) -> SkyliftResult<String> {
    debug!(?args, "Running git");
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .map_err(|e| SkyliftError::git(format!("failed to spawn git: {}", e)))?;
    if !output.status.success() {
        return Err(SkyliftError::git(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or(""),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Initialize the repository if needed, point `origin` at `remote_url`,
/// commit everything, and push (main first, master as fallback).
pub fn sync_repo(dir: &Path, remote_url: &str) -> SkyliftResult<()> {
    if run_git(dir, &["rev-parse", "--git-dir"]).is_err() {
        run_git(dir, &["init"])?;
    }

    // Re-pointing an existing origin is fine; removing a missing one is not
    // an error worth surfacing.
    let _ = run_git(dir, &["remote", "remove", "origin"]);
    run_git(dir, &["remote", "add", "origin", remote_url])?;

    run_git(dir, &["add", "."])?;
    if let Err(e) = run_git(dir, &["commit", "-m", "Deployment configuration"]) {
        // Nothing staged is the common case on re-runs.
        warn!(error = %e, "git commit skipped");
    }

    if run_git(dir, &["push", "-u", "origin", "main", "--force"]).is_ok() {
        return Ok(());
    }
    if run_git(dir, &["push", "-u", "origin", "master", "--force"]).is_ok() {
        return Ok(());
    }
    Err(SkyliftError::git(
        "push failed on both main and master".to_string(),
    ))
}

/// Collect remote, branch, and last commit, leaving fields unset when the
/// directory is not a repository.
pub fn status(dir: &Path) -> GitStatus {
    GitStatus {
        remote: run_git(dir, &["remote", "get-url", "origin"]).ok(),
        branch: run_git(dir, &["rev-parse", "--abbrev-ref", "HEAD"]).ok(),
        last_commit: run_git(dir, &["log", "-1", "--format=%h %s"]).ok(),
    }
}

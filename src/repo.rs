// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version-control collaborator.
//!
//! Symdot keeps no history of its own: the dotfiles tree is expected to be a
//! Git repository, and everything version-control shaped is delegated here.
//! Cloning goes through libgit2 so that credentials can be prompted for and
//! progress displayed. Commit, push, and pull shell out to the Git binary
//! directly, since those are exactly the commands the user would type
//! themselves, and their exit status is propagated on failure.

use crate::inspect;

use auth_git2::{GitAuthenticator, Prompter};
use git2::{build::RepoBuilder, Config, FetchOptions, RemoteCallbacks};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{path::Path, process::Command, time};
use tracing::{debug, info, instrument};

/// Clone dotfiles repository into `base_dir` unless one is already there.
///
/// An existing entry at `base_dir` of any kind counts as "already there";
/// no freshness or validity check is made beyond existence.
///
/// # Errors
///
/// - Return [`RepoError::Git2`] if libgit2 operations fail.
#[instrument(skip(url, base_dir), level = "debug")]
pub fn clone_if_absent(url: impl AsRef<str>, base_dir: &Path, dry_run: bool) -> Result<()> {
    if inspect::exists(base_dir) {
        debug!("dotfiles tree already present at {}", base_dir.display());
        return Ok(());
    }

    info!("git clone {} {}", url.as_ref(), base_dir.display());
    if dry_run {
        return Ok(());
    }

    clone(url.as_ref(), base_dir)
}

fn clone(url: &str, base_dir: &Path) -> Result<()> {
    let bar = ProgressBar::no_length();
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);
    bar.set_message(url.to_string());
    bar.enable_steady_tick(time::Duration::from_millis(100));

    let prompter = BarPrompter::new(bar);
    let authenticator = GitAuthenticator::default().set_prompter(prompter.clone());
    let config = Config::open_default()?;

    let mut throttle = time::Instant::now();
    let mut rc = RemoteCallbacks::new();
    rc.credentials(authenticator.credentials(&config));
    rc.transfer_progress(|progress| {
        let stats = progress.to_owned();
        let bar_size = stats.total_objects() as u64;
        let bar_pos = stats.received_objects() as u64;
        if throttle.elapsed() > time::Duration::from_millis(10) {
            throttle = time::Instant::now();
            prompter.bar.set_length(bar_size);
            prompter.bar.set_position(bar_pos);
        }
        true
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(rc);
    RepoBuilder::new().fetch_options(fo).clone(url, base_dir)?;
    prompter.bar.finish_and_clear();

    Ok(())
}

/// Stage and commit every local change, then push.
///
/// The commit is skipped outright when the work tree is clean; the push
/// still runs so that a previously unpushed commit gets through.
///
/// # Errors
///
/// - Return [`RepoError::GitFailure`] if any Git command exits non-zero.
/// - Return [`RepoError::Syscall`] if the Git binary cannot be spawned.
#[instrument(skip(base_dir), level = "debug")]
pub fn commit_and_push(base_dir: &Path, dry_run: bool) -> Result<()> {
    let status = git_non_interactive(base_dir, &["status", "--porcelain"])?;
    if has_changes(&status) {
        git_interactive(base_dir, &["add", "--all"], dry_run)?;
        git_interactive(
            base_dir,
            &["commit", "--message", "chore: sync dotfiles"],
            dry_run,
        )?;
    } else {
        info!("nothing to commit at {}", base_dir.display());
    }

    git_interactive(base_dir, &["push"], dry_run)
}

/// Pull remote changes into the dotfiles tree.
///
/// # Errors
///
/// - Return [`RepoError::GitFailure`] if the pull exits non-zero.
/// - Return [`RepoError::Syscall`] if the Git binary cannot be spawned.
#[instrument(skip(base_dir), level = "debug")]
pub fn pull(base_dir: &Path, dry_run: bool) -> Result<()> {
    git_interactive(base_dir, &["pull"], dry_run)
}

fn has_changes(porcelain: &str) -> bool {
    porcelain.lines().any(|line| !line.trim().is_empty())
}

fn git_interactive(base_dir: &Path, args: &[&str], dry_run: bool) -> Result<()> {
    info!("git -C {} {}", base_dir.display(), args.join(" "));
    if dry_run {
        return Ok(());
    }

    let status = Command::new("git")
        .arg("-C")
        .arg(base_dir)
        .args(args)
        .spawn()?
        .wait()?;
    if !status.success() {
        return Err(RepoError::GitFailure {
            status: status.code(),
            message: format!("git {} failed", args.join(" ")),
        });
    }

    Ok(())
}

fn git_non_interactive(base_dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(base_dir)
        .args(args)
        .output()?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();

    if !output.status.success() {
        return Err(RepoError::GitFailure {
            status: output.status.code(),
            message: format!("{stdout}{stderr}").trim_end().to_owned(),
        });
    }

    Ok(stdout)
}

/// Credential prompter that plays nice with an active progress bar.
#[derive(Debug, Clone)]
struct BarPrompter {
    bar: ProgressBar,
}

impl BarPrompter {
    fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for BarPrompter {
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| -> Option<(String, String)> {
            let username = Text::new("username").prompt().ok()?;
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
    }

    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("authentication required at {url} for user {username}");
        self.bar.suspend(|| -> Option<String> {
            Password::new("password").without_confirmation().prompt().ok()
        })
    }

    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!(
            "authentication required with ssh key at {}",
            ssh_key_path.display()
        );
        self.bar.suspend(|| -> Option<String> {
            Password::new("password").without_confirmation().prompt().ok()
        })
    }
}

/// Version-control collaborator error types.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A Git command exited non-zero.
    #[error("git command failed: {message}")]
    GitFailure {
        status: Option<i32>,
        message: String,
    },

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),

    /// The Git binary cannot be spawned or waited on.
    #[error(transparent)]
    Syscall(#[from] std::io::Error),

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    BarTemplate(#[from] indicatif::style::TemplateError),
}

impl RepoError {
    /// Process exit code to terminate with for this failure.
    ///
    /// A failed Git command surfaces its own exit status; everything else
    /// collapses to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::GitFailure { status, .. } => status.unwrap_or(1),
            _ => 1,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = RepoError> = std::result::Result<T, E>;

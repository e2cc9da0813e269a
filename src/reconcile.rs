// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Tree reconciliation engine.
//!
//! The heart of symdot: a recursive walk over the dotfiles tree that
//! decides, entry by entry, whether to link, skip, create, or remove. Three
//! operations share one traversal shape:
//!
//! - [`apply`] mirrors the dotfiles tree into the target tree by creating
//!   symbolic links, never overwriting anything that already occupies a
//!   target path.
//! - [`ls`] reports, read-only, which mirrored targets are links symdot owns
//!   and which are unmanaged entries blocking management.
//! - [`restore`] removes managed links and prunes mirrored directories that
//!   end up empty, bottom-up, conservatively.
//!
//! # Traversal Shape
//!
//! Every operation visits the entries of the current source directory in
//! name order, recursing into subdirectories. Order between siblings carries
//! no semantics; what matters is that a parent's target directory exists
//! before its children are linked, and that a directory's children are fully
//! processed before the directory's own cleanup check runs during restore.
//!
//! # Intentional Asymmetry
//!
//! Apply skips ignored entries. Restore does not: it walks into ignored
//! entries as well, so links created before those entries became ignored are
//! still found and removed.

use crate::{
    fsops,
    ignore::IgnoreSet,
    inspect::{self, LinkState},
    path,
};

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Per-command execution context.
///
/// Carries the resolved tree roots, the compiled ignore rule set, and the
/// dry-run flag. Built once at command start, threaded by reference through
/// the recursive walk, and discarded at command end. Read-only after
/// construction, so repeated invocations within one process stay isolated.
#[derive(Clone, Debug)]
pub struct Context {
    base_dir: PathBuf,
    home_dir: PathBuf,
    ignores: IgnoreSet,
    dry_run: bool,
}

impl Context {
    /// Construct new execution context.
    ///
    /// Both roots are canonicalized when they exist so that the link values
    /// apply records, and the prefix checks ls/restore perform, agree across
    /// invocations regardless of the form the caller passed them in.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        home_dir: impl Into<PathBuf>,
        ignores: IgnoreSet,
        dry_run: bool,
    ) -> Self {
        Self {
            base_dir: path::canonicalized(base_dir),
            home_dir: path::canonicalized(home_dir),
            ignores,
            dry_run,
        }
    }

    /// Construct new execution context, compiling ignore rules from disk.
    ///
    /// Reads the ignore file at `excludes_file`, defaulting to
    /// `.symdotignore` at the top-level of `base_dir`. A missing ignore file
    /// is a normal negative lookup: the built-in default rule set is used
    /// instead.
    ///
    /// # Errors
    ///
    /// - Return [`ReconcileError::Ignore`] if any ignore rule fails to
    ///   compile.
    pub fn load(
        base_dir: impl Into<PathBuf>,
        home_dir: impl Into<PathBuf>,
        excludes: impl IntoIterator<Item = impl Into<String>>,
        excludes_file: Option<PathBuf>,
        dry_run: bool,
    ) -> Result<Self> {
        let base_dir = path::canonicalized(base_dir);
        let ignore_path = excludes_file.unwrap_or_else(|| base_dir.join(".symdotignore"));
        let content = fs::read_to_string(ignore_path).ok();
        let ignores = IgnoreSet::compile(excludes, content.as_deref())?;

        Ok(Self::new(base_dir, home_dir, ignores, dry_run))
    }

    /// Root of the managed dotfiles tree.
    pub fn base_dir(&self) -> &Path {
        self.base_dir.as_path()
    }

    /// Root of the target tree.
    pub fn home_dir(&self) -> &Path {
        self.home_dir.as_path()
    }

    /// Whether mutations are withheld this command.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    fn target_of(&self, source: &Path) -> Result<PathBuf> {
        Ok(path::mirrored(source, &self.base_dir, &self.home_dir)?)
    }
}

/// Mirror the dotfiles tree into the target tree.
///
/// Creates the target root if absent, then links every non-ignored file to
/// its mirrored path, creating mirrored directories along the way. An entry
/// already occupying a target path always wins: it is never overwritten,
/// whatever it is. Running apply twice in a row performs zero mutations on
/// the second run.
///
/// # Errors
///
/// - Return [`ReconcileError::ReadDir`] if a source directory cannot be
///   listed.
/// - Return [`ReconcileError::FsOps`] if a mutation fails.
#[instrument(skip(ctx), level = "debug")]
pub fn apply(ctx: &Context) -> Result<()> {
    debug!(
        "apply {} into {}",
        ctx.base_dir().display(),
        ctx.home_dir().display()
    );

    if !inspect::exists(ctx.home_dir()) {
        fsops::make_dir(ctx, ctx.home_dir())?;
    }

    link_tree(ctx, ctx.base_dir())
}

fn link_tree(ctx: &Context, dir: &Path) -> Result<()> {
    for entry in sorted_entries(dir)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if ctx.ignores.is_ignored(&name) {
            debug!("ignore {}", entry.path().display());
            continue;
        }

        let source = entry.path();
        let target = ctx.target_of(&source)?;
        if entry_is_dir(&entry)? {
            if !inspect::exists(&target) {
                fsops::make_dir(ctx, &target)?;
            }
            link_tree(ctx, &source)?;
        } else if inspect::exists(&target) {
            // First writer wins: whatever occupies the path blocks
            // management of it.
            debug!("skip {}: already occupied", target.display());
        } else {
            fsops::make_symlink(ctx, &source, &target)?;
        }
    }

    Ok(())
}

/// Entry reported by [`ls`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListEntry {
    /// Mirrored target path of the source file.
    pub target: PathBuf,

    /// What occupies the target path.
    pub state: ListState,
}

/// Management state of an occupied target path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListState {
    /// Target is a symbolic link symdot owns.
    Linked,

    /// Target exists but is not a managed link, e.g., a pre-existing user
    /// file.
    Unmanaged,
}

/// Report the management state of every mirrored target that exists.
///
/// Read-only twin of [`apply`]'s traversal. Directories are recursed into,
/// never reported. A missing source or target root makes the whole
/// operation a no-op.
///
/// # Errors
///
/// - Return [`ReconcileError::ReadDir`] if a source directory cannot be
///   listed.
#[instrument(skip(ctx), level = "debug")]
pub fn ls(ctx: &Context) -> Result<Vec<ListEntry>> {
    let mut report = Vec::new();
    if !inspect::exists(ctx.base_dir()) || !inspect::exists(ctx.home_dir()) {
        debug!("nothing to list: one of the tree roots is absent");
        return Ok(report);
    }

    list_tree(ctx, ctx.base_dir(), &mut report)?;

    Ok(report)
}

fn list_tree(ctx: &Context, dir: &Path, report: &mut Vec<ListEntry>) -> Result<()> {
    for entry in sorted_entries(dir)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if ctx.ignores.is_ignored(&name) {
            continue;
        }

        let source = entry.path();
        if entry_is_dir(&entry)? {
            list_tree(ctx, &source, report)?;
            continue;
        }

        let target = ctx.target_of(&source)?;
        if !inspect::exists(&target) {
            continue;
        }

        let state = match inspect::classify(&target, ctx.base_dir()) {
            LinkState::Managed => ListState::Linked,
            LinkState::NotALink | LinkState::ForeignLink => ListState::Unmanaged,
        };
        report.push(ListEntry { target, state });
    }

    Ok(())
}

/// Remove managed links from the target tree.
///
/// In single-path mode a symbolic link argument is removed unconditionally,
/// with no ownership check, and the operation returns; a plain file
/// argument is a no-op; a directory argument becomes the traversal root in
/// place of the dotfiles root.
///
/// In tree mode the source tree is walked WITHOUT ignore filtering, every
/// mirrored target that is a managed link is removed, and after a
/// directory's children are processed its mirrored directory is pruned iff
/// it exists, is empty, and is not the target root itself.
///
/// # Errors
///
/// - Return [`ReconcileError::ReadDir`] if a source directory cannot be
///   listed.
/// - Return [`ReconcileError::FsOps`] if a removal fails.
#[instrument(skip(ctx), level = "debug")]
pub fn restore(ctx: &Context, single: Option<&Path>) -> Result<()> {
    let root = match single {
        Some(target) => {
            if fs::read_link(target).is_ok() {
                // Explicit removal shortcut: the caller named the link, so
                // no ownership check applies.
                return Ok(fsops::remove_file(ctx, target)?);
            }

            match fs::metadata(target) {
                Ok(meta) if meta.is_dir() => target.to_path_buf(),
                _ => {
                    debug!("nothing to restore at {}", target.display());
                    return Ok(());
                }
            }
        }
        None => ctx.base_dir().to_path_buf(),
    };

    unlink_tree(ctx, &root)
}

fn unlink_tree(ctx: &Context, dir: &Path) -> Result<()> {
    // No ignore filtering here: links created before an entry became
    // ignored must still be found and removed.
    for entry in sorted_entries(dir)? {
        let source = entry.path();
        if entry_is_dir(&entry)? {
            unlink_tree(ctx, &source)?;
        } else {
            let target = ctx.target_of(&source)?;
            if inspect::classify(&target, ctx.base_dir()) == LinkState::Managed {
                fsops::remove_file(ctx, &target)?;
            }
        }
    }

    // Children are done; prune the mirrored directory if nothing is left in
    // it. The target root itself and directories holding unmanaged entries
    // are always kept.
    let target_dir = ctx.target_of(dir)?;
    if target_dir.as_path() != ctx.home_dir()
        && inspect::exists(&target_dir)
        && is_empty_dir(&target_dir)?
    {
        fsops::remove_dir(ctx, &target_dir)?;
    }

    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|source| ReconcileError::ReadDir {
            source,
            path: dir.to_path_buf(),
        })?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|source| ReconcileError::ReadDir {
            source,
            path: dir.to_path_buf(),
        })?;
    entries.sort_by_key(|entry| entry.file_name());

    Ok(entries)
}

fn entry_is_dir(entry: &fs::DirEntry) -> Result<bool> {
    entry
        .file_type()
        .map(|kind| kind.is_dir())
        .map_err(|source| ReconcileError::ReadDir {
            source,
            path: entry.path(),
        })
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(path).map_err(|source| ReconcileError::ReadDir {
        source,
        path: path.to_path_buf(),
    })?;

    Ok(entries.next().is_none())
}

/// Tree reconciliation error types.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Source directory cannot be listed.
    #[error("failed to read directory {:?}", path.display())]
    ReadDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Ignore rule compilation fails.
    #[error(transparent)]
    Ignore(#[from] crate::ignore::IgnoreError),

    /// Mirrored target path cannot be computed.
    #[error(transparent)]
    Path(#[from] crate::path::PathError),

    /// Filesystem mutation fails.
    #[error(transparent)]
    FsOps(#[from] crate::fsops::FsOpsError),
}

/// Friendly result alias :3
pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn load_uses_defaults_when_ignore_file_is_missing() -> anyhow::Result<()> {
        let root = tempdir()?;
        let base_dir = root.path().join("dotfiles");
        fs::create_dir(&base_dir)?;

        let ctx = Context::load(
            &base_dir,
            root.path().join("home"),
            Vec::<String>::new(),
            None,
            false,
        )?;

        assert!(ctx.ignores.is_ignored(".DS_Store"));
        assert!(!ctx.ignores.is_ignored("bootstrap.sh"));

        Ok(())
    }

    #[test]
    fn load_replaces_defaults_with_ignore_file() -> anyhow::Result<()> {
        let root = tempdir()?;
        let base_dir = root.path().join("dotfiles");
        fs::create_dir(&base_dir)?;
        fs::write(base_dir.join(".symdotignore"), "bootstrap.sh\n")?;

        let ctx = Context::load(
            &base_dir,
            root.path().join("home"),
            Vec::<String>::new(),
            None,
            false,
        )?;

        assert!(ctx.ignores.is_ignored("bootstrap.sh"));
        assert!(!ctx.ignores.is_ignored(".DS_Store"));
        // Mandatory entries survive replacement.
        assert!(ctx.ignores.is_ignored(".git"));

        Ok(())
    }

    #[test]
    fn context_canonicalizes_roots() -> anyhow::Result<()> {
        let root = tempdir()?;
        let base_dir = root.path().join("dotfiles");
        fs::create_dir(&base_dir)?;

        // A dot component disappears under canonicalization.
        let sloppy = base_dir.join(".");
        let ctx = Context::new(
            sloppy,
            root.path().join("home"),
            crate::ignore::IgnoreSet::compile(Vec::<String>::new(), None)?,
            false,
        );

        assert_eq!(ctx.base_dir(), fs::canonicalize(&base_dir)?.as_path());

        Ok(())
    }

    #[test]
    fn target_of_mirrors_relative_structure() -> anyhow::Result<()> {
        let root = tempdir()?;
        let base_dir = root.path().join("dotfiles");
        let home_dir = root.path().join("home");
        fs::create_dir(&base_dir)?;
        fs::create_dir(&home_dir)?;
        fs::create_dir(base_dir.join("dir1"))?;
        fs::write(base_dir.join("dir1/file1.txt"), "blah")?;

        let ctx = Context::new(
            &base_dir,
            &home_dir,
            crate::ignore::IgnoreSet::compile(Vec::<String>::new(), None)?,
            false,
        );
        let result = ctx.target_of(&ctx.base_dir().join("dir1/file1.txt"))?;

        assert_eq!(result, ctx.home_dir().join("dir1/file1.txt"));

        Ok(())
    }
}

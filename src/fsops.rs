// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Gated filesystem mutation primitives.
//!
//! Every state-changing primitive of the reconciliation engine funnels
//! through here. Each primitive logs exactly one line before it executes,
//! and consults the execution context's dry-run flag at call time: under
//! dry-run the log line is still emitted, but the underlying operation is
//! never invoked. Dry-run output is therefore a faithful preview of what a
//! real run would do.

use crate::reconcile::Context;

use std::{fs, io, path::{Path, PathBuf}};
use tracing::info;

/// Create directory at target path, parents included.
///
/// # Errors
///
/// - Return [`FsOpsError::MakeDir`] if directory creation fails.
pub fn make_dir(ctx: &Context, path: &Path) -> Result<()> {
    info!("mkdir {}", path.display());
    if ctx.dry_run() {
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|source| FsOpsError::MakeDir {
        source,
        path: path.to_path_buf(),
    })
}

/// Create symbolic link at `link` pointing to `original`.
///
/// # Errors
///
/// - Return [`FsOpsError::MakeSymlink`] if link creation fails, e.g., an
///   entry appeared at `link` after the caller's existence check.
pub fn make_symlink(ctx: &Context, original: &Path, link: &Path) -> Result<()> {
    info!("+ {} -> {}", link.display(), original.display());
    if ctx.dry_run() {
        return Ok(());
    }

    symlink(original, link).map_err(|source| FsOpsError::MakeSymlink {
        source,
        link_path: link.to_path_buf(),
    })
}

/// Remove file or symbolic link at target path.
///
/// # Errors
///
/// - Return [`FsOpsError::RemoveFile`] if removal fails.
pub fn remove_file(ctx: &Context, path: &Path) -> Result<()> {
    info!("- {}", path.display());
    if ctx.dry_run() {
        return Ok(());
    }

    fs::remove_file(path).map_err(|source| FsOpsError::RemoveFile {
        source,
        path: path.to_path_buf(),
    })
}

/// Remove empty directory at target path.
///
/// Callers check emptiness beforehand; a directory that gained an entry in
/// between simply fails here and propagates.
///
/// # Errors
///
/// - Return [`FsOpsError::RemoveDir`] if removal fails.
pub fn remove_dir(ctx: &Context, path: &Path) -> Result<()> {
    info!("rmdir {}", path.display());
    if ctx.dry_run() {
        return Ok(());
    }

    fs::remove_dir(path).map_err(|source| FsOpsError::RemoveDir {
        source,
        path: path.to_path_buf(),
    })
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}
#[cfg(windows)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(original, link)
}

/// Filesystem mutation error types.
#[derive(Debug, thiserror::Error)]
pub enum FsOpsError {
    /// Directory cannot be created.
    #[error("failed to create directory at {:?}", path.display())]
    MakeDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Symbolic link cannot be created.
    #[error("failed to create symbolic link at {:?}", link_path.display())]
    MakeSymlink {
        #[source]
        source: io::Error,
        link_path: PathBuf,
    },

    /// File or symbolic link cannot be removed.
    #[error("failed to remove file at {:?}", path.display())]
    RemoveFile {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Directory cannot be removed.
    #[error("failed to remove directory at {:?}", path.display())]
    RemoveDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = FsOpsError> = std::result::Result<T, E>;

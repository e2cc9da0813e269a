// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, or managed in some way.

use std::path::{Path, PathBuf};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(PathError::NoWayHome)
}

/// Determine default absolute path to dotfiles directory.
///
/// Uses `$HOME/.dotfiles` as the default location of the managed dotfiles
/// tree. Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn default_dotfiles_dir() -> Result<PathBuf> {
    home_dir().map(|path| path.join(".dotfiles"))
}

/// Expand tilde prefix and environment variables in user-supplied path.
///
/// # Errors
///
/// - Return [`PathError::Expansion`] if shell expansion fails, e.g., an
///   undefined environment variable appears in the path.
pub fn expand(input: impl AsRef<str>) -> Result<PathBuf> {
    let expanded = shellexpand::full(input.as_ref())?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Resolve path to canonical absolute form when possible.
///
/// Falls back to the path as given whenever canonicalization fails, e.g.,
/// the path does not exist yet. Link ownership checks rely on every caller
/// passing roots through here so that prefix comparison stays stable across
/// invocations.
pub fn canonicalized(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    std::fs::canonicalize(&path).unwrap_or(path)
}

/// Compute mirrored target path for a source entry.
///
/// The target is `home_dir` joined with the source path relative to
/// `base_dir`.
///
/// # Errors
///
/// - Return [`PathError::OutsideBase`] if `source` is not rooted under
///   `base_dir`.
pub fn mirrored(source: &Path, base_dir: &Path, home_dir: &Path) -> Result<PathBuf> {
    let relative = source
        .strip_prefix(base_dir)
        .map_err(|_| PathError::OutsideBase {
            source_path: source.to_path_buf(),
            base_dir: base_dir.to_path_buf(),
        })?;

    Ok(home_dir.join(relative))
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's home directory.
    #[error("cannot determine absolute path to user's home directory")]
    NoWayHome,

    /// Shell expansion of user-supplied path fails.
    #[error(transparent)]
    Expansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Source entry falls outside of the managed dotfiles tree.
    #[error("path {:?} is not under base directory {:?}", source_path.display(), base_dir.display())]
    OutsideBase {
        source_path: PathBuf,
        base_dir: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn expand_tilde_prefix() -> anyhow::Result<()> {
        let result = expand("~/.config/foo")?;
        assert_eq!(result, PathBuf::from("/home/blah/.config/foo"));

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn default_dotfiles_dir_under_home() -> anyhow::Result<()> {
        let result = default_dotfiles_dir()?;
        assert_eq!(result, PathBuf::from("/home/blah/.dotfiles"));

        Ok(())
    }

    #[test]
    fn mirrored_preserves_relative_structure() -> anyhow::Result<()> {
        let result = mirrored(
            Path::new("/tmp/dotfiles/dir1/file1.txt"),
            Path::new("/tmp/dotfiles"),
            Path::new("/home/blah"),
        )?;
        assert_eq!(result, PathBuf::from("/home/blah/dir1/file1.txt"));

        Ok(())
    }

    #[test]
    fn mirrored_rejects_stray_source() {
        let result = mirrored(
            Path::new("/elsewhere/file1.txt"),
            Path::new("/tmp/dotfiles"),
            Path::new("/home/blah"),
        );
        assert!(matches!(result, Err(PathError::OutsideBase { .. })));
    }
}

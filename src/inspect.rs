// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Target tree inspection.
//!
//! Classify what currently occupies a path in the target tree. The only
//! ownership marker symdot has is the link value itself: a symbolic link
//! whose raw value is rooted under the dotfiles tree was created by symdot,
//! anything else was not. No manifest or database backs this up.

use std::{fs, path::Path};

/// Classification of whatever occupies a target path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkState {
    /// Path is absent, a plain file, or a directory.
    NotALink,

    /// Path is a symbolic link pointing outside the dotfiles tree.
    ForeignLink,

    /// Path is a symbolic link whose value is rooted under the dotfiles
    /// tree, i.e., a link symdot created.
    Managed,
}

/// Check if anything occupies the given path.
///
/// True for any entry kind, including dangling symbolic links. Lookup
/// failures resolve to false, never an error.
pub fn exists(path: impl AsRef<Path>) -> bool {
    fs::symlink_metadata(path.as_ref()).is_ok()
}

/// Classify the entry at `path` against the managing dotfiles tree.
///
/// The raw link value is compared against `base_dir` without resolving it.
/// Callers are expected to hand in a canonicalized `base_dir` so that the
/// prefix comparison does not depend on the form a previous invocation used
/// (see [`crate::path::canonicalized`]).
pub fn classify(path: impl AsRef<Path>, base_dir: impl AsRef<Path>) -> LinkState {
    let Ok(value) = fs::read_link(path.as_ref()) else {
        return LinkState::NotALink;
    };

    if value.starts_with(base_dir.as_ref()) {
        LinkState::Managed
    } else {
        LinkState::ForeignLink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::symlink;
    use tempfile::tempdir;

    #[test]
    fn exists_sees_files_directories_and_dangling_links() -> anyhow::Result<()> {
        let root = tempdir()?;
        let file = root.path().join("file1.txt");
        let dir = root.path().join("dir1");
        let dangling = root.path().join("dangling");
        fs::write(&file, "blah")?;
        fs::create_dir(&dir)?;
        symlink(root.path().join("nowhere"), &dangling)?;

        assert!(exists(&file));
        assert!(exists(&dir));
        assert!(exists(&dangling));
        assert!(!exists(root.path().join("absent")));

        Ok(())
    }

    #[test]
    fn classify_recognizes_own_links() -> anyhow::Result<()> {
        let root = tempdir()?;
        let base_dir = root.path().join("dotfiles");
        fs::create_dir(&base_dir)?;
        fs::write(base_dir.join("file1.txt"), "blah")?;

        let target = root.path().join("file1.txt");
        symlink(base_dir.join("file1.txt"), &target)?;

        assert_eq!(classify(&target, &base_dir), LinkState::Managed);

        Ok(())
    }

    #[test]
    fn classify_rejects_foreign_links() -> anyhow::Result<()> {
        let root = tempdir()?;
        let base_dir = root.path().join("dotfiles");
        fs::create_dir(&base_dir)?;

        let target = root.path().join("file1.txt");
        symlink("/etc/hostname", &target)?;

        assert_eq!(classify(&target, &base_dir), LinkState::ForeignLink);

        Ok(())
    }

    #[test]
    fn classify_rejects_plain_files_and_absent_paths() -> anyhow::Result<()> {
        let root = tempdir()?;
        let base_dir = root.path().join("dotfiles");
        fs::create_dir(&base_dir)?;

        let plain = root.path().join("file1.txt");
        fs::write(&plain, "blah")?;

        assert_eq!(classify(&plain, &base_dir), LinkState::NotALink);
        assert_eq!(classify(root.path().join("absent"), &base_dir), LinkState::NotALink);

        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use simple_txtar::Archive;
use std::{
    fs,
    path::{Path, PathBuf},
};
use symdot::reconcile::Context;
use tempfile::TempDir;

/// Side-by-side dotfiles tree and home tree rooted in one temp directory.
///
/// The dotfiles side is populated from a txtar archive, one archive file per
/// dotfile, with directories created along the way.
pub(crate) struct TreeFixture {
    root: TempDir,
}

impl TreeFixture {
    pub(crate) fn new(archive: &str) -> Result<Self> {
        let root = tempfile::tempdir()?;
        let fixture = Self { root };
        fs::create_dir(fixture.base_dir())?;
        fs::create_dir(fixture.home_dir())?;

        let archive = Archive::from(archive);
        for file in archive.iter() {
            fixture.write_dotfile(&file.name, &file.content)?;
        }

        Ok(fixture)
    }

    pub(crate) fn base_dir(&self) -> PathBuf {
        self.root.path().join("dotfiles")
    }

    pub(crate) fn home_dir(&self) -> PathBuf {
        self.root.path().join("home")
    }

    pub(crate) fn write_dotfile(&self, name: impl AsRef<Path>, content: &str) -> Result<()> {
        write_under(&self.base_dir(), name, content)
    }

    pub(crate) fn write_homefile(&self, name: impl AsRef<Path>, content: &str) -> Result<()> {
        write_under(&self.home_dir(), name, content)
    }

    /// Build a fresh execution context the way the CLI would.
    ///
    /// Ignore rules are re-read from the dotfiles tree on every call, so a
    /// fixture can grow an ignore file between commands.
    pub(crate) fn context(&self) -> Result<Context> {
        Ok(Context::load(
            self.base_dir(),
            self.home_dir(),
            Vec::<String>::new(),
            None,
            false,
        )?)
    }

    pub(crate) fn dry_context(&self) -> Result<Context> {
        Ok(Context::load(
            self.base_dir(),
            self.home_dir(),
            Vec::<String>::new(),
            None,
            true,
        )?)
    }

    /// Count every entry left under the home tree, recursively.
    pub(crate) fn home_entry_count(&self) -> Result<usize> {
        count_entries(&self.home_dir())
    }
}

fn write_under(root: &Path, name: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = root.join(name.as_ref());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    Ok(())
}

fn count_entries(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        count += 1;
        if entry.file_type()?.is_dir() {
            count += count_entries(&entry.path())?;
        }
    }

    Ok(count)
}

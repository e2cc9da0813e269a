// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Mirror a dotfiles directory into your home through symlinks.
//!
//! Symdot manages a plain directory tree of dotfiles (by default
//! `~/.dotfiles`, typically a Git repository) by mirroring it into a target
//! tree (by default the user's home) as symbolic links, preserving relative
//! structure and leaving unmanaged files alone.
//!
//! # Ownership Without a Manifest
//!
//! Symdot keeps no registry of what it has created. A symbolic link whose
//! value is rooted under the dotfiles tree is considered owned by symdot;
//! everything else is not. This single criterion drives listing and
//! restoration, and means the filesystem itself is the only persisted state.
//!
//! # Module Map
//!
//! - [`reconcile`]: the tree reconciliation engine (apply, ls, restore).
//! - [`ignore`]: which entries of the dotfiles tree are managed at all.
//! - [`inspect`]: classify what occupies a target path.
//! - [`fsops`]: filesystem mutations behind the dry-run gate.
//! - [`repo`]: the Git collaborator (clone, commit, push, pull).
//! - [`install`]: self-installation via download.
//! - [`path`]: tilde expansion and default tree locations.

pub mod fsops;
pub mod ignore;
pub mod inspect;
pub mod install;
pub mod path;
pub mod reconcile;
pub mod repo;

pub use ignore::IgnoreSet;
pub use inspect::LinkState;
pub use reconcile::{Context, ListEntry, ListState};

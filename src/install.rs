// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Self-installation.
//!
//! Replace the running executable with a freshly downloaded build. The new
//! binary is streamed into a staging file next to the current executable,
//! marked executable, and renamed into place. Renaming sidesteps the
//! restriction on writing into a busy text file, and leaves the old binary
//! untouched when the download dies halfway.

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    env, io,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::info;

/// Release URL the executable is fetched from by default.
pub const DEFAULT_MODULE_URL: &str =
    "https://github.com/awkless/symdot/releases/latest/download/symdot";

/// Download new build and overwrite the running executable with it.
///
/// # Errors
///
/// - Return [`InstallError::NoExePath`] if the running executable cannot be
///   located.
/// - Return [`InstallError::Download`] if the fetch fails or the server
///   answers with an error status.
/// - Return [`InstallError::Stage`] or [`InstallError::Replace`] if the
///   staging file cannot be written or moved into place.
pub async fn install(module_url: Option<String>, dry_run: bool) -> Result<()> {
    let url = module_url.unwrap_or_else(|| DEFAULT_MODULE_URL.to_owned());
    let exe = env::current_exe().map_err(InstallError::NoExePath)?;
    info!("install {} from {}", exe.display(), url);
    if dry_run {
        return Ok(());
    }

    let response = reqwest::get(url.as_str()).await?.error_for_status()?;
    let bar = match response.content_length() {
        Some(length) => ProgressBar::new(length),
        None => ProgressBar::no_length(),
    };
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);
    bar.set_message(url.clone());

    let staging = exe.with_extension("download");
    let mut file = fs::File::create(&staging)
        .await
        .map_err(|source| InstallError::Stage {
            source,
            path: staging.clone(),
        })?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|source| InstallError::Stage {
                source,
                path: staging.clone(),
            })?;
        bar.inc(chunk.len() as u64);
    }
    file.flush().await.map_err(|source| InstallError::Stage {
        source,
        path: staging.clone(),
    })?;
    drop(file);
    bar.finish_and_clear();

    set_executable(&staging).await?;
    fs::rename(&staging, &exe)
        .await
        .map_err(|source| InstallError::Replace {
            source,
            path: exe.clone(),
        })?;
    info!("installed {}", exe.display());

    Ok(())
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .await
        .map_err(|source| InstallError::Stage {
            source,
            path: path.to_path_buf(),
        })?;
    let mut permissions = metadata.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
        .await
        .map_err(|source| InstallError::Stage {
            source,
            path: path.to_path_buf(),
        })
}

#[cfg(windows)]
async fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Self-installation error types.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Running executable cannot be located.
    #[error("cannot determine path of running executable")]
    NoExePath(#[source] io::Error),

    /// Download fails or the server answers with an error status.
    #[error(transparent)]
    Download(#[from] reqwest::Error),

    /// Staging file cannot be created, written, or marked executable.
    #[error("failed to stage download at {:?}", path.display())]
    Stage {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Staging file cannot be renamed over the running executable.
    #[error("failed to replace executable at {:?}", path.display())]
    Replace {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    BarTemplate(#[from] indicatif::style::TemplateError),
}

/// Friendly result alias :3
pub type Result<T, E = InstallError> = std::result::Result<T, E>;

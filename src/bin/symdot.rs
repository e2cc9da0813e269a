// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use symdot::{
    install, path,
    reconcile::{self, Context, ListState},
    repo,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  symdot <command> [options]",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        match self.command {
            Command::Apply(opts) => run_apply(opts),
            Command::Ls(opts) => run_ls(opts),
            Command::Restore(opts) => run_restore(opts),
            Command::Use(opts) => run_use(opts),
            Command::Update(opts) => run_update(opts),
            Command::Install(opts) => run_install(opts).await,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Mirror dotfiles tree into home through symbolic links.
    #[command(override_usage = "symdot apply [options]")]
    Apply(ApplyOptions),

    /// Report management state of mirrored targets.
    #[command(override_usage = "symdot ls [options]")]
    Ls(LsOptions),

    /// Remove managed links, pruning mirrored directories left empty.
    #[command(override_usage = "symdot restore [options] [<path>]")]
    Restore(RestoreOptions),

    /// Clone dotfiles repository when absent, then apply.
    #[command(name = "use", override_usage = "symdot use [options] <url>")]
    Use(UseOptions),

    /// Commit and push local changes, pull remote ones, then apply.
    #[command(override_usage = "symdot update [options]")]
    Update(UpdateOptions),

    /// Overwrite the running executable with a freshly downloaded build.
    #[command(override_usage = "symdot install [options]")]
    Install(InstallOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ApplyOptions {
    /// Path to managed dotfiles tree.
    #[arg(short, long, value_name = "path")]
    pub base_dir: Option<String>,

    /// Path to target tree.
    #[arg(long, value_name = "path")]
    pub home_dir: Option<String>,

    /// Pattern to exclude from management, repeatable.
    #[arg(short = 'e', long = "exclude", value_name = "pattern")]
    pub excludes: Vec<String>,

    /// Ignore file to use instead of .symdotignore in the dotfiles tree.
    #[arg(long, value_name = "path")]
    pub excludes_file: Option<String>,

    /// Report mutations without performing them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct LsOptions {
    /// Path to managed dotfiles tree.
    #[arg(short, long, value_name = "path")]
    pub base_dir: Option<String>,

    /// Path to target tree.
    #[arg(long, value_name = "path")]
    pub home_dir: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct RestoreOptions {
    /// Single link to remove, or dotfiles subdirectory to restore.
    #[arg(value_name = "path")]
    pub path: Option<String>,

    /// Path to managed dotfiles tree.
    #[arg(short, long, value_name = "path")]
    pub base_dir: Option<String>,

    /// Path to target tree.
    #[arg(long, value_name = "path")]
    pub home_dir: Option<String>,

    /// Report mutations without performing them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct UseOptions {
    /// URL of dotfiles repository to clone.
    #[arg(required = true, value_name = "url")]
    pub url: String,

    /// Path to managed dotfiles tree.
    #[arg(short, long, value_name = "path")]
    pub base_dir: Option<String>,

    /// Path to target tree.
    #[arg(long, value_name = "path")]
    pub home_dir: Option<String>,

    /// Report mutations without performing them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct UpdateOptions {
    /// Path to managed dotfiles tree.
    #[arg(short, long, value_name = "path")]
    pub base_dir: Option<String>,

    /// Path to target tree.
    #[arg(long, value_name = "path")]
    pub home_dir: Option<String>,

    /// Report mutations without performing them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InstallOptions {
    /// URL to download the executable from.
    #[arg(short, long, value_name = "url")]
    pub module_url: Option<String>,

    /// Report mutations without performing them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer().compact().with_target(false).without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(exit_code(&error));
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<repo::RepoError>() {
        Some(failure) => failure.exit_code(),
        None => 1,
    }
}

fn resolve_roots(base_dir: Option<String>, home_dir: Option<String>) -> Result<(PathBuf, PathBuf)> {
    let base_dir = match base_dir {
        Some(input) => path::expand(input)?,
        None => path::default_dotfiles_dir()?,
    };
    let home_dir = match home_dir {
        Some(input) => path::expand(input)?,
        None => path::home_dir()?,
    };

    Ok((base_dir, home_dir))
}

fn run_apply(opts: ApplyOptions) -> Result<()> {
    let (base_dir, home_dir) = resolve_roots(opts.base_dir, opts.home_dir)?;
    let excludes_file = opts.excludes_file.map(path::expand).transpose()?;
    let ctx = Context::load(base_dir, home_dir, opts.excludes, excludes_file, opts.dry_run)?;
    reconcile::apply(&ctx)?;

    Ok(())
}

fn run_ls(opts: LsOptions) -> Result<()> {
    let (base_dir, home_dir) = resolve_roots(opts.base_dir, opts.home_dir)?;
    let ctx = Context::load(base_dir, home_dir, Vec::<String>::new(), None, false)?;
    for entry in reconcile::ls(&ctx)? {
        match entry.state {
            ListState::Linked => println!("linked    {}", entry.target.display()),
            ListState::Unmanaged => println!("unmanaged {}", entry.target.display()),
        }
    }

    Ok(())
}

fn run_restore(opts: RestoreOptions) -> Result<()> {
    let (base_dir, home_dir) = resolve_roots(opts.base_dir, opts.home_dir)?;
    let single = opts.path.map(path::expand).transpose()?;
    let ctx = Context::load(base_dir, home_dir, Vec::<String>::new(), None, opts.dry_run)?;
    reconcile::restore(&ctx, single.as_deref())?;

    Ok(())
}

fn run_use(opts: UseOptions) -> Result<()> {
    let (base_dir, home_dir) = resolve_roots(opts.base_dir, opts.home_dir)?;
    repo::clone_if_absent(&opts.url, &base_dir, opts.dry_run)?;

    let ctx = Context::load(base_dir, home_dir, Vec::<String>::new(), None, opts.dry_run)?;
    reconcile::apply(&ctx)?;

    Ok(())
}

fn run_update(opts: UpdateOptions) -> Result<()> {
    let (base_dir, home_dir) = resolve_roots(opts.base_dir, opts.home_dir)?;
    repo::commit_and_push(&base_dir, opts.dry_run)?;
    repo::pull(&base_dir, opts.dry_run)?;

    let ctx = Context::load(base_dir, home_dir, Vec::<String>::new(), None, opts.dry_run)?;
    reconcile::apply(&ctx)?;

    Ok(())
}

async fn run_install(opts: InstallOptions) -> Result<()> {
    install::install(opts.module_url, opts.dry_run).await?;

    Ok(())
}

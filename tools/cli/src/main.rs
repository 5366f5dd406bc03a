//! snipsync CLI - keep a snippet file in sync with a hosted snippet.
//!
//! This tool fetches, pushes and automatically syncs one local snippet file
//! against a GitLab snippet or a GitHub gist.

mod config;
mod spinner;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use snipsync_common::{Error, ErrorKind};
use snipsync_storage::{create_default_registry, ClientContext, PushOutcome, SyncClient};
use snipsync_sync::{SyncDirection, SyncEngine};

use crate::config::Config;
use crate::spinner::Spinner;

#[derive(Parser)]
#[command(name = "snipsync")]
#[command(about = "snipsync - Sync a snippet file with GitLab snippets or GitHub gists")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the backend from the config file ("gitlab", "gist").
    #[arg(short, long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the remote snippet file.
    Fetch {
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a local file, creating the remote snippet on first use.
    Push {
        /// File to upload (default: the configured snippet file).
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Sync the snippet file in whichever direction is newer.
    Sync {
        /// Always upload the local file.
        #[arg(long, conflicts_with = "download")]
        upload: bool,

        /// Always overwrite the local file with the remote copy.
        #[arg(long)]
        download: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = hint_for(&e) {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "snipsync", &mut std::io::stdout());
        return Ok(());
    }

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load(&config_path)?;
    if let Some(backend) = cli.backend {
        config.general.backend = backend;
    }

    let client = build_client(&config)?;

    match cli.command {
        Commands::Fetch { output } => cmd_fetch(client.as_ref(), output.as_deref()).await,
        Commands::Push { file } => {
            let file = file.unwrap_or_else(|| config.snippet_file());
            cmd_push(client, &file, &config, &config_path).await
        }
        Commands::Sync { upload, download } => {
            cmd_sync(client, &config, &config_path, upload, download).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Resolve the configured backend into a client.
fn build_client(config: &Config) -> Result<Box<dyn SyncClient>> {
    let ctx = ClientContext::new().with_progress(Arc::new(Spinner::default()));
    let registry = create_default_registry();

    let client = registry
        .resolve(&config.general.backend, config.remote(), &ctx)
        .context("Failed to initialize sync client")?;

    info!("Using {} backend", client.name());
    Ok(client)
}

/// Print or save the remote snippet file.
async fn cmd_fetch(client: &dyn SyncClient, output: Option<&Path>) -> Result<()> {
    let snippet = client.fetch().await?;

    if snippet.is_empty() {
        println!("No remote snippet yet. Run `snipsync push` first.");
        return Ok(());
    }

    match output {
        Some(path) => {
            tokio::fs::write(path, &snippet.content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved remote snippet to {}", path.display());
        }
        None => print!("{}", snippet.content),
    }

    if let Some(updated_at) = snippet.updated_at {
        info!("Remote last updated at {}", updated_at);
    }

    Ok(())
}

/// Upload a local file.
async fn cmd_push(
    mut client: Box<dyn SyncClient>,
    file: &Path,
    config: &Config,
    config_path: &Path,
) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if content.is_empty() {
        anyhow::bail!("{} is empty, nothing to upload", file.display());
    }

    match client.push(&content).await? {
        PushOutcome::Created { id } => print_created(&id, config, config_path),
        PushOutcome::Updated { id } => println!("Updated remote snippet {}", id),
    }

    Ok(())
}

/// Sync the configured snippet file.
async fn cmd_sync(
    client: Box<dyn SyncClient>,
    config: &Config,
    config_path: &Path,
    upload: bool,
    download: bool,
) -> Result<()> {
    let mut engine = SyncEngine::new(client, config.snippet_file());

    let report = if upload {
        engine.upload().await?
    } else if download {
        engine.download().await?
    } else {
        engine.sync().await?
    };

    match report.direction {
        SyncDirection::Upload => println!("Uploaded {}", engine.snippet_file().display()),
        SyncDirection::Download => println!("Downloaded to {}", engine.snippet_file().display()),
        SyncDirection::None => println!("Already up to date"),
    }

    if let Some(id) = report.created_id {
        print_created(&id, config, config_path);
    }

    Ok(())
}

fn print_created(id: &str, config: &Config, config_path: &Path) {
    println!("Created remote snippet. ID: {}", id);
    println!(
        "Add `id = \"{}\"` to the [{}] section of {} so later pushes update it.",
        id,
        config.remote_section(),
        config_path.display()
    );
}

/// Suggest a fix for configuration-related failures.
fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map(Error::kind)?;

    match kind {
        ErrorKind::NotFound => {
            Some("check the `id` in your config file, or remove it to create a new snippet")
        }
        ErrorKind::Mismatch => Some(
            "the configured `id` may point at an unrelated snippet; check `id` and `file_name`",
        ),
        ErrorKind::Configuration => Some("run with --verbose and check your config file"),
        _ => None,
    }
}

use anyhow::{Context as _, anyhow, bail};
use clap::{ArgAction, Parser, Subcommand};
use gorky_viewer::projection::{render_view, view_snapshot};
use gorky_viewer::{GroupRef, Viewer, ViewerConfig, open_database, print_json_file, run_browse};
use std::io::Write as _;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gorky", version, about = "Inspect story pipeline artifact databases")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the artifact view of a database once.
    View {
        db: PathBuf,
        /// Select this step instead of the first one.
        #[arg(long)]
        step: Option<String>,
        /// Select this version of the selected step.
        #[arg(long)]
        version: Option<u32>,
        /// Print the view model as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Browse a database interactively from stdin.
    Browse {
        /// Database to open first. Defaults to GORKY_DB_PATH.
        db: Option<PathBuf>,
    },
    /// Pretty-print a JSON file.
    Json { file: PathBuf },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ViewerConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Command::View {
            db,
            step,
            version,
            json,
        } => view(config, db, step, version, json),
        Command::Browse { db } => browse(config, db),
        Command::Json { file } => print_json_file(&file, std::io::stdout().lock()),
    }
}

fn view(
    config: ViewerConfig,
    db: PathBuf,
    step: Option<String>,
    version: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let preview_chars = config.preview_chars;
    let mut viewer = Viewer::new(config)?;

    viewer.open(db);
    if let Some(message) = viewer.take_error() {
        bail!(message);
    }
    if let Some(step) = step {
        viewer
            .select_group(&GroupRef::Step(step))
            .map_err(|message| anyhow!(message))?;
    }
    if let Some(index) = version {
        viewer
            .select_version(None, index)
            .map_err(|message| anyhow!(message))?;
    }

    let mut out = std::io::stdout().lock();
    if json {
        let db = viewer
            .state()
            .database
            .as_ref()
            .context("no database loaded")?;
        serde_json::to_writer_pretty(&mut out, &view_snapshot(db))
            .context("failed to encode view")?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render_view(viewer.state(), preview_chars))?;
    }
    Ok(())
}

fn browse(config: ViewerConfig, db: Option<PathBuf>) -> anyhow::Result<()> {
    let initial = db.or_else(|| config.default_db.clone());
    let mut viewer = Viewer::new(config)?;

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    if let Some(path) = initial {
        open_database(&mut viewer, path, &mut stdout.lock(), &mut stderr.lock())?;
    }

    run_browse(
        &mut viewer,
        std::io::stdin().lock(),
        stdout.lock(),
        stderr.lock(),
    )
}

//! Command-line entry point: argument parsing, logging setup and run modes.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use authsim_app::{ConfigError, Driver, Runtime, RuntimeConfig};
use authsim_core::{CodecError, SimulationSnapshot, StepCatalog};
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{LineDriver, TerminalDriver, TerminalError};

/// Step-by-step IoMT authentication flow simulator.
#[derive(Debug, Clone, Parser)]
#[command(name = "authsim-tui", version, about, long_about = None)]
pub struct Args {
    /// Playback speed multiplier (2.0 plays twice as fast)
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,

    /// Load the step catalog from a CBOR file instead of the built-in flow
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Read text commands from stdin and log progress instead of drawing
    #[arg(long)]
    pub headless: bool,

    /// Start playing immediately
    #[arg(long)]
    pub autostart: bool,

    /// Write the final snapshot as CBOR on exit
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Write logs to this file (the only log output in TUI mode)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Write the built-in catalog as CBOR and exit
    #[arg(long, value_name = "FILE")]
    pub write_catalog: Option<PathBuf>,
}

impl Args {
    /// Runtime configuration from the flags.
    pub fn config(&self) -> Result<RuntimeConfig, ConfigError> {
        RuntimeConfig::with_speed(self.speed)
    }
}

/// Errors surfaced by the binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid runtime configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A catalog or snapshot could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A file could not be opened or written.
    #[error("{}: {source}", .path.display())]
    File {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Reading commands from stdin failed.
    #[error("stdin: {0}")]
    Io(#[from] io::Error),

    /// Terminal setup, input or drawing failed.
    #[error(transparent)]
    Terminal(#[from] TerminalError),

    /// A global tracing subscriber was already installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

fn file_error(path: &Path) -> impl FnOnce(io::Error) -> CliError + '_ {
    move |source| CliError::File { path: path.to_path_buf(), source }
}

/// Install the global tracing subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Logs go to
/// `--log-file` when given, otherwise to stderr in headless mode. The
/// full-screen UI owns the terminal, so without a log file nothing is
/// installed.
pub fn init_logging(args: &Args) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match (&args.log_file, args.headless) {
        (Some(path), _) => {
            let file = File::create(path).map_err(file_error(path))?;
            registry.with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))).try_init()
        },
        (None, true) => registry.with(fmt::layer().with_writer(io::stderr)).try_init(),
        (None, false) => return Ok(()),
    };

    installed.map_err(|e| CliError::Logging(e.to_string()))
}

/// The catalog at `path`, or the built-in IoMT flow.
pub fn load_catalog(path: Option<&Path>) -> Result<StepCatalog, CliError> {
    let Some(path) = path else {
        return Ok(StepCatalog::iomt_authentication());
    };

    let file = File::open(path).map_err(file_error(path))?;
    let catalog = StepCatalog::from_cbor(BufReader::new(file))?;
    tracing::info!(path = %path.display(), steps = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Save `catalog` as CBOR.
pub fn write_catalog(path: &Path, catalog: &StepCatalog) -> Result<(), CliError> {
    let mut writer = BufWriter::new(File::create(path).map_err(file_error(path))?);
    catalog.to_cbor(&mut writer)?;
    writer.flush().map_err(file_error(path))
}

/// Save `snapshot` as CBOR.
pub fn export_snapshot(path: &Path, snapshot: &SimulationSnapshot) -> Result<(), CliError> {
    let mut writer = BufWriter::new(File::create(path).map_err(file_error(path))?);
    snapshot.to_cbor(&mut writer)?;
    writer.flush().map_err(file_error(path))
}

async fn run_with<D: Driver>(
    driver: D,
    catalog: StepCatalog,
    config: RuntimeConfig,
) -> Result<SimulationSnapshot, D::Error> {
    let mut runtime = Runtime::new(driver, catalog, config);
    runtime.run().await?;
    Ok(runtime.engine().snapshot())
}

/// Run the binary with parsed arguments.
///
/// Headless runs quit when input ends, or once the run finishes if it is
/// still playing at that point.
pub async fn run(args: Args) -> Result<(), CliError> {
    if let Some(path) = &args.write_catalog {
        write_catalog(path, &StepCatalog::iomt_authentication())?;
        tracing::info!(path = %path.display(), "built-in catalog written");
        return Ok(());
    }

    let config = args.config()?;
    let catalog = load_catalog(args.catalog.as_deref())?;

    let snapshot = if args.headless {
        let mut driver = LineDriver::stdin().with_quit_when_finished();
        if args.autostart {
            driver = driver.with_autostart();
        }
        run_with(driver, catalog, config).await?
    } else {
        let mut driver = TerminalDriver::new()?;
        if args.autostart {
            driver = driver.with_autostart();
        }
        run_with(driver, catalog, config).await?
    };

    if let Some(path) = &args.export {
        export_snapshot(path, &snapshot)?;
        tracing::info!(
            path = %path.display(),
            progress = %snapshot.progress_label(),
            "snapshot exported"
        );
    }
    Ok(())
}

//! # GPIO Setup Binary
//!
//! One-shot reconciliation of sysfs GPIO pins against `gpio.conf`.
//!
//! # Usage
//!
//! ```bash
//! # Reconcile using ./gpio.conf
//! sudo gpio_setup
//!
//! # Explicit config, step-by-step progress
//! sudo gpio_setup -c /etc/gpio.conf -v
//!
//! # Show what would change without writing (no root required)
//! gpio_setup -c /etc/gpio.conf --dry-run
//! ```
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0  | Success |
//! | 69 | Export written but pin never appeared |
//! | 74 | sysfs I/O or ownership failure |
//! | 77 | Not running as root |
//! | 78 | Configuration error |

#![deny(warnings)]

use clap::{CommandFactory, Parser};
use gpio_common::config::GpioConfig;
use gpio_common::consts::{DEFAULT_CONFIG_PATH, DEFAULT_GROUP_DATABASE};
use gpio_setup::backend::LinuxSysfs;
use gpio_setup::error::SetupError;
use gpio_setup::reconciler::{PinState, Reconciler};
use nix::unistd::geteuid;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// GPIO setup - reconcile sysfs GPIO pins with a config file
#[derive(Parser, Debug)]
#[command(name = "gpio_setup")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "GPIO setup script")]
#[command(after_help = "Must be run as root")]
struct Args {
    /// Path to config file
    #[arg(short, long, value_name = "config", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Turn on verbosity (step-by-step progress on stdout)
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Check and report planned changes without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Path to the system group database
    #[arg(long, value_name = "FILE", default_value = DEFAULT_GROUP_DATABASE)]
    group_file: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    setup_tracing(&args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(args: &Args) -> Result<(), SetupError> {
    if !args.dry_run && !geteuid().is_root() {
        // Not root: show help and do nothing else.
        if let Err(e) = Args::command().print_help() {
            warn!("Could not print help: {}", e);
        }
        println!();
        return Err(SetupError::NotRoot);
    }

    let config = GpioConfig::load(&args.config)?;
    let mut reconciler =
        Reconciler::prepare_with_group_file(config, &args.group_file, LinuxSysfs::new())?;

    if args.dry_run {
        for plan in reconciler.plan()? {
            match plan.state {
                PinState::Unexported => info!(
                    "[dry-run] pin {}: export, then fix {:?}",
                    plan.spec.pin, plan.fixes
                ),
                PinState::Exported { ref name } if plan.fixes.is_empty() => {
                    info!("[dry-run] pin {} ({}): OK", plan.spec.pin, name)
                }
                PinState::Exported { ref name } => info!(
                    "[dry-run] pin {} ({}): fix {:?}",
                    plan.spec.pin, name, plan.fixes
                ),
            }
        }
        return Ok(());
    }

    let report = reconciler.run()?;
    debug!("Run report: {:?}", report);
    info!("Done");
    Ok(())
}

fn report_error(err: &SetupError) {
    match err {
        SetupError::Config(config_err) => {
            for issue in config_err.issues() {
                error!("E: {}", issue);
            }
            error!("Errors occurred. Check your config file.");
        }
        other => error!("E: {}", other),
    }
}

/// Log level for the given flags.
///
/// Progress is silent unless `-v` is given. A dry run always shows its plan.
fn log_level(verbose: bool, dry_run: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else if dry_run {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// Setup tracing subscriber based on CLI arguments.
///
/// Warnings and errors go to stderr, progress to stdout.
fn setup_tracing(args: &Args) {
    let level = log_level(args.verbose, args.dry_run);
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .init();
    }
}

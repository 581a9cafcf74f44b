//! Error types for a reconciliation run.

use crate::backend::SysfsError;
use gpio_common::config::ConfigError;
use gpio_common::consts::{EXIT_CONFIG_ERROR, EXIT_EXPORT_FAILED, EXIT_IO_ERROR, EXIT_NOT_ROOT};
use std::path::PathBuf;
use thiserror::Error;

/// Failure while driving pins to their configured state.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Sysfs read, write or ownership change failed.
    #[error(transparent)]
    Sysfs(#[from] SysfsError),

    /// The export write was accepted but no `gpio<pin>_*` entry appeared.
    #[error("Pin {pin} was exported but did not appear under {}", base.display())]
    ExportNotEffective {
        /// Pin number written to the export file.
        pin: u32,
        /// Directory that was searched.
        base: PathBuf,
    },
}

/// Top-level error for the `gpio_setup` binary.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Not running as the superuser.
    #[error("Must be run as root")]
    NotRoot,

    /// Configuration, path or group validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Runtime failure while reconciling pins.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl SetupError {
    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            SetupError::NotRoot => EXIT_NOT_ROOT,
            SetupError::Config(_) => EXIT_CONFIG_ERROR,
            SetupError::Reconcile(ReconcileError::Sysfs(_)) => EXIT_IO_ERROR,
            SetupError::Reconcile(ReconcileError::ExportNotEffective { .. }) => EXIT_EXPORT_FAILED,
        }
    }
}

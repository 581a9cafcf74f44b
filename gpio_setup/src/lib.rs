//! # GPIO Setup Library
//!
//! Reconciles Linux sysfs GPIO pin state against a declarative
//! configuration file: every configured pin ends the run exported, with
//! the configured direction, the configured value (output pins) and its
//! sysfs entries owned by the configured group.
//!
//! # Module Structure
//!
//! - [`backend`] - `SysfsBackend` trait with Linux and simulated backends
//! - [`error`] - Run and process-level error types
//! - [`reconciler`] - Per-pin planning and corrective writes
//! - [`resolver`] - `gpio<pin>_*` directory name resolution
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    gpio_setup (single crate)                 │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────┐  │
//! │  │ GpioConfig  │───►│  Reconciler  │◄──►│    Resolver     │  │
//! │  │(gpio_common)│    │ plan → apply │    │                 │  │
//! │  └─────────────┘    └──────┬───────┘    └─────────────────┘  │
//! │                            │                                 │
//! │                            ▼                                 │
//! │                   ┌────────────────┐                         │
//! │                   │  SysfsBackend  │ (linux / simulation)    │
//! │                   └────────────────┘                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod backend;
pub mod error;
pub mod reconciler;
pub mod resolver;

// Re-export key types for convenience
pub use crate::backend::{LinuxSysfs, SimulatedSysfs, SysfsBackend, SysfsError};
pub use crate::error::{ReconcileError, SetupError};
pub use crate::reconciler::{PinFixes, PinPlan, PinReport, PinState, Reconciler, RunReport};
pub use crate::resolver::resolve_pin_name;

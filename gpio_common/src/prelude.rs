//! Prelude module for common re-exports.
//!
//! ```rust
//! use gpio_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, GpioConfig, PathTemplate, PathsConfig};

// ─── Pins ───────────────────────────────────────────────────────────
pub use crate::pin::{Direction, PinSpec};

// ─── Groups ─────────────────────────────────────────────────────────
pub use crate::group::{GroupDatabase, GroupEntry};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CONFIG_PATH, DEFAULT_GROUP_DATABASE};

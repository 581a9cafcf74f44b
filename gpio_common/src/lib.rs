//! GPIO Common Library
//!
//! This crate provides the configuration model, pin specification types and
//! group database parser shared by the GPIO setup tools.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration model, loader and error type
//! - [`consts`] - Default paths, section/key names and exit codes
//! - [`group`] - `/etc/group` parser with exact-name lookup
//! - [`ini`] - INI document parser
//! - [`pin`] - Pin direction and desired-state types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust,no_run
//! use gpio_common::prelude::*;
//! use std::path::Path;
//!
//! let config = GpioConfig::load(Path::new(DEFAULT_CONFIG_PATH))?;
//! let groups = GroupDatabase::load(Path::new(DEFAULT_GROUP_DATABASE))?;
//! let gid = groups.lookup(&config.group).map(|g| g.gid);
//! # Ok::<(), ConfigError>(())
//! ```

pub mod config;
pub mod consts;
pub mod group;
pub mod ini;
pub mod pin;
pub mod prelude;

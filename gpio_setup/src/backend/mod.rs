//! Sysfs backends.
//!
//! The reconciler talks to the filesystem only through [`SysfsBackend`],
//! so the same decision logic runs against the kernel's sysfs tree or an
//! in-memory simulation:
//!
//! - [`linux`] - Real filesystem access via `std::fs` and `nix` chown
//! - [`simulation`] - In-memory sysfs that models export side effects and
//!   records every write

pub mod linux;
pub mod simulation;

pub use linux::LinuxSysfs;
pub use simulation::SimulatedSysfs;

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for sysfs operations.
#[derive(Debug, Error)]
pub enum SysfsError {
    /// Read, write or directory listing failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Group ownership change failed.
    #[error("Failed to change group of {}: {source}", path.display())]
    Ownership {
        /// Path being changed.
        path: PathBuf,
        /// Underlying errno.
        #[source]
        source: nix::Error,
    },
}

impl SysfsError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: &Path, source: io::Error) -> Self {
        SysfsError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Interface to a sysfs GPIO tree.
///
/// All operations are blocking and hold no handles between calls.
pub trait SysfsBackend {
    /// Returns the backend's identifier (e.g., "linux", "simulation").
    fn name(&self) -> &'static str;

    /// True if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Names of the entries directly under `dir`, in no particular order.
    fn list_dir(&self, dir: &Path) -> Result<Vec<String>, SysfsError>;

    /// Read the full contents of a file.
    fn read_to_string(&self, path: &Path) -> Result<String, SysfsError>;

    /// Write `contents` to an existing control file.
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), SysfsError>;

    /// Numeric group ID owning `path`.
    fn group_of(&self, path: &Path) -> Result<u32, SysfsError>;

    /// Change the owning group of `path`, leaving the user unchanged.
    fn set_group(&mut self, path: &Path, gid: u32) -> Result<(), SysfsError>;
}

impl<B: SysfsBackend + ?Sized> SysfsBackend for &mut B {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<String>, SysfsError> {
        (**self).list_dir(dir)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, SysfsError> {
        (**self).read_to_string(path)
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<(), SysfsError> {
        (**self).write(path, contents)
    }

    fn group_of(&self, path: &Path) -> Result<u32, SysfsError> {
        (**self).group_of(path)
    }

    fn set_group(&mut self, path: &Path, gid: u32) -> Result<(), SysfsError> {
        (**self).set_group(path, gid)
    }
}

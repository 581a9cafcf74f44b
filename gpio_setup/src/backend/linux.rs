//! Linux sysfs backend.

use super::{SysfsBackend, SysfsError};
use nix::unistd::{Gid, chown};
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// Backend operating on the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxSysfs;

impl LinuxSysfs {
    /// Create a new Linux sysfs backend.
    pub fn new() -> Self {
        Self
    }
}

impl SysfsBackend for LinuxSysfs {
    fn name(&self) -> &'static str {
        "linux"
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<String>, SysfsError> {
        let entries = fs::read_dir(dir).map_err(|e| SysfsError::io(dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SysfsError::io(dir, e))?;
            // Non-UTF-8 names cannot match a `gpio<N>_` prefix.
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, SysfsError> {
        fs::read_to_string(path).map_err(|e| SysfsError::io(path, e))
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<(), SysfsError> {
        fs::write(path, contents).map_err(|e| SysfsError::io(path, e))
    }

    fn group_of(&self, path: &Path) -> Result<u32, SysfsError> {
        fs::metadata(path)
            .map(|m| m.gid())
            .map_err(|e| SysfsError::io(path, e))
    }

    fn set_group(&mut self, path: &Path, gid: u32) -> Result<(), SysfsError> {
        chown(path, None, Some(Gid::from_raw(gid))).map_err(|source| SysfsError::Ownership {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::getegid;
    use tempfile::TempDir;

    #[test]
    fn test_list_read_write() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("gpio17_pa17")).unwrap();
        fs::write(tmp.path().join("export"), "").unwrap();

        let mut backend = LinuxSysfs::new();
        let mut names = backend.list_dir(tmp.path()).unwrap();
        names.sort();
        assert_eq!(names, vec!["export".to_string(), "gpio17_pa17".to_string()]);

        let export = tmp.path().join("export");
        backend.write(&export, "17").unwrap();
        assert_eq!(backend.read_to_string(&export).unwrap(), "17");
    }

    #[test]
    fn test_write_missing_parent_fails() {
        let tmp = TempDir::new().unwrap();
        let mut backend = LinuxSysfs::new();
        let err = backend
            .write(&tmp.path().join("nope").join("value"), "1")
            .unwrap_err();
        assert!(matches!(err, SysfsError::Io { .. }));
    }

    #[test]
    fn test_set_group_to_own_group() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("direction");
        fs::write(&file, "in").unwrap();

        let mut backend = LinuxSysfs::new();
        let gid = getegid().as_raw();
        backend.set_group(&file, gid).unwrap();
        assert_eq!(backend.group_of(&file).unwrap(), gid);
    }

    #[test]
    fn test_missing_path() {
        let backend = LinuxSysfs::new();
        let path = Path::new("/nonexistent/gpio/value");
        assert!(!backend.exists(path));
        assert!(backend.read_to_string(path).is_err());
        assert!(backend.group_of(path).is_err());
    }
}

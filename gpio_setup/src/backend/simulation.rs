//! In-memory sysfs simulation.
//!
//! `SimulatedSysfs` models the parts of the kernel's GPIO sysfs interface
//! that the reconciler depends on:
//!
//! - `<base>/export` creates `<base>/gpio<N>_<suffix>/{direction,value}`
//! - `<base>/unexport` removes that directory again
//! - `direction` / `value` files hold whatever was last written
//!
//! Every write and ownership change is recorded so tests can assert exactly
//! which control files were touched.

use super::{SysfsBackend, SysfsError};
use gpio_common::consts::PIN_DIR_PREFIX;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default label appended to exported pin directories.
pub const DEFAULT_SUFFIX: &str = "sim";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Dir { gid: u32 },
    File { contents: String, gid: u32 },
}

impl Node {
    fn gid(&self) -> u32 {
        match self {
            Node::Dir { gid } | Node::File { gid, .. } => *gid,
        }
    }

    fn set_gid(&mut self, new: u32) {
        match self {
            Node::Dir { gid } | Node::File { gid, .. } => *gid = new,
        }
    }
}

/// A recorded file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    /// Target path.
    pub path: PathBuf,
    /// Written contents.
    pub contents: String,
}

/// A recorded group ownership change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipChange {
    /// Target path.
    pub path: PathBuf,
    /// New group ID.
    pub gid: u32,
}

/// In-memory sysfs GPIO tree.
#[derive(Debug, Clone)]
pub struct SimulatedSysfs {
    base: PathBuf,
    suffix: String,
    /// Group assigned to entries created by export.
    default_gid: u32,
    /// When false, export writes are accepted but create nothing.
    export_effective: bool,
    nodes: BTreeMap<PathBuf, Node>,
    writes: Vec<WriteRecord>,
    ownership_changes: Vec<OwnershipChange>,
}

impl SimulatedSysfs {
    /// Create a tree with `base`, `base/export` and `base/unexport`, all
    /// owned by group 0.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let mut nodes = BTreeMap::new();
        nodes.insert(base.clone(), Node::Dir { gid: 0 });
        nodes.insert(base.join("export"), file("", 0));
        nodes.insert(base.join("unexport"), file("", 0));

        Self {
            base,
            suffix: DEFAULT_SUFFIX.to_string(),
            default_gid: 0,
            export_effective: true,
            nodes,
            writes: Vec::new(),
            ownership_changes: Vec::new(),
        }
    }

    /// Label used for directories created by export (`gpio<N>_<suffix>`).
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    /// Make export writes silently do nothing, as when the kernel accepts
    /// the write but the pin never appears.
    pub fn with_ineffective_export(mut self) -> Self {
        self.export_effective = false;
        self
    }

    /// Add an already-exported pin and return its directory name.
    pub fn add_exported_pin(&mut self, pin: u32, direction: &str, value: &str, gid: u32) -> String {
        let name = format!("{PIN_DIR_PREFIX}{pin}_{}", self.suffix);
        self.add_pin_dir(&name, direction, value, gid);
        name
    }

    /// Add a pin directory with an arbitrary name.
    pub fn add_pin_dir(&mut self, name: &str, direction: &str, value: &str, gid: u32) {
        let dir = self.base.join(name);
        self.nodes
            .insert(dir.join("direction"), file(direction, gid));
        self.nodes.insert(dir.join("value"), file(value, gid));
        self.nodes.insert(dir, Node::Dir { gid });
    }

    /// Remove a path (and anything below it).
    pub fn remove(&mut self, path: &Path) {
        self.nodes.retain(|p, _| !p.starts_with(path));
    }

    /// Current contents of a file, if it exists.
    pub fn contents(&self, path: &Path) -> Option<&str> {
        match self.nodes.get(path) {
            Some(Node::File { contents, .. }) => Some(contents),
            _ => None,
        }
    }

    /// All writes in order.
    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }

    /// Writes to one path, in order.
    pub fn writes_to(&self, path: &Path) -> Vec<&str> {
        self.writes
            .iter()
            .filter(|w| w.path == path)
            .map(|w| w.contents.as_str())
            .collect()
    }

    /// All ownership changes in order.
    pub fn ownership_changes(&self) -> &[OwnershipChange] {
        &self.ownership_changes
    }

    /// Forget recorded writes and ownership changes, keeping the tree.
    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.ownership_changes.clear();
    }

    fn export(&mut self, contents: &str) -> Result<(), SysfsError> {
        let pin: u32 = contents
            .trim()
            .parse()
            .map_err(|_| invalid_input(&self.base.join("export"), contents))?;
        if !self.export_effective {
            debug!("simulation: export of {pin} ignored");
            return Ok(());
        }
        let name = format!("{PIN_DIR_PREFIX}{pin}_{}", self.suffix);
        if !self.nodes.contains_key(&self.base.join(&name)) {
            debug!("simulation: exported {name}");
            self.add_pin_dir(&name, "in", "0", self.default_gid);
        }
        Ok(())
    }

    fn unexport(&mut self, contents: &str) -> Result<(), SysfsError> {
        let pin: u32 = contents
            .trim()
            .parse()
            .map_err(|_| invalid_input(&self.base.join("unexport"), contents))?;
        let prefix = format!("{PIN_DIR_PREFIX}{pin}_");
        let dirs: Vec<PathBuf> = self
            .nodes
            .keys()
            .filter(|p| p.parent() == Some(self.base.as_path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .cloned()
            .collect();
        for dir in dirs {
            self.remove(&dir);
        }
        Ok(())
    }
}

impl SysfsBackend for SimulatedSysfs {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes.contains_key(path)
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<String>, SysfsError> {
        match self.nodes.get(dir) {
            Some(Node::Dir { .. }) => {}
            Some(Node::File { .. }) => {
                return Err(SysfsError::io(
                    dir,
                    io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
                ));
            }
            None => return Err(not_found(dir)),
        }

        // Reverse order so callers cannot rely on listing order.
        Ok(self
            .nodes
            .keys()
            .rev()
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> Result<String, SysfsError> {
        match self.nodes.get(path) {
            Some(Node::File { contents, .. }) => Ok(contents.clone()),
            Some(Node::Dir { .. }) => Err(SysfsError::io(
                path,
                io::Error::new(io::ErrorKind::IsADirectory, "is a directory"),
            )),
            None => Err(not_found(path)),
        }
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<(), SysfsError> {
        match self.nodes.get_mut(path) {
            Some(Node::File { contents: current, .. }) => {
                current.clear();
                current.push_str(contents);
            }
            Some(Node::Dir { .. }) => {
                return Err(SysfsError::io(
                    path,
                    io::Error::new(io::ErrorKind::IsADirectory, "is a directory"),
                ));
            }
            // sysfs does not allow creating files
            None => return Err(not_found(path)),
        }

        self.writes.push(WriteRecord {
            path: path.to_path_buf(),
            contents: contents.to_string(),
        });

        if path == self.base.join("export") {
            self.export(contents)?;
        } else if path == self.base.join("unexport") {
            self.unexport(contents)?;
        }
        Ok(())
    }

    fn group_of(&self, path: &Path) -> Result<u32, SysfsError> {
        self.nodes
            .get(path)
            .map(Node::gid)
            .ok_or_else(|| not_found(path))
    }

    fn set_group(&mut self, path: &Path, gid: u32) -> Result<(), SysfsError> {
        let node = self.nodes.get_mut(path).ok_or_else(|| SysfsError::Ownership {
            path: path.to_path_buf(),
            source: nix::Error::ENOENT,
        })?;
        node.set_gid(gid);
        self.ownership_changes.push(OwnershipChange {
            path: path.to_path_buf(),
            gid,
        });
        Ok(())
    }
}

fn file(contents: &str, gid: u32) -> Node {
    Node::File {
        contents: contents.to_string(),
        gid,
    }
}

fn not_found(path: &Path) -> SysfsError {
    SysfsError::io(
        path,
        io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
    )
}

fn invalid_input(path: &Path, contents: &str) -> SysfsError {
    SysfsError::io(
        path,
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid pin number '{contents}'"),
        ),
    )
}

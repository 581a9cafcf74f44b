//! Unix group database (`/etc/group`) parser.
//!
//! Each line has the form `name:password:gid:member,member,...`; only the
//! name and gid are kept.
//! Lookups compare the name field exactly; a group name that only occurs
//! as a substring of another line (e.g. `gpio` inside `gpio-admin` or in a
//! member list) does not match.

use crate::config::ConfigError;
use crate::consts::DEFAULT_GROUP_DATABASE;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One parsed group entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    /// Group name.
    pub name: String,
    /// Numeric group ID.
    pub gid: u32,
}

impl GroupEntry {
    /// Parse one database line. Returns `None` for malformed lines.
    fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split(':');
        let name = fields.next()?.trim();
        let _password = fields.next()?;
        let gid = fields.next()?.trim().parse().ok()?;

        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            gid,
        })
    }
}

/// Parsed group database.
#[derive(Debug, Clone)]
pub struct GroupDatabase {
    source: PathBuf,
    entries: Vec<GroupEntry>,
}

impl GroupDatabase {
    /// Load and parse a group database file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::GroupDatabase` if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::GroupDatabase {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut db = Self::parse(&content);
        db.source = path.to_path_buf();
        debug!("Loaded {} groups from {}", db.len(), path.display());
        Ok(db)
    }

    /// Parse group database text.
    ///
    /// Blank lines, `#` comments and NIS compat lines (`+`/`-`) are skipped,
    /// as are malformed lines. The source is reported as
    /// [`DEFAULT_GROUP_DATABASE`].
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with(['#', '+', '-']))
            .filter_map(|l| {
                let entry = GroupEntry::parse_line(l);
                if entry.is_none() {
                    debug!("Skipping malformed group line: {l}");
                }
                entry
            })
            .collect();
        Self {
            source: PathBuf::from(DEFAULT_GROUP_DATABASE),
            entries,
        }
    }

    /// File the entries were read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Find a group by exact name.
    pub fn lookup(&self, name: &str) -> Option<&GroupEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of parsed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries were parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

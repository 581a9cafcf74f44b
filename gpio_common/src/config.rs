//! Configuration file model and loader.
//!
//! The configuration is an INI file with three required sections:
//!
//! ```ini
//! [Paths]
//! GPIO_Path=/sys/class/gpio
//! GPIO_Export=/sys/class/gpio/export
//! GPIO_Unexport=/sys/class/gpio/unexport
//! GPIO_Directory=/sys/class/gpio/{}
//! GPIO_Direction=/sys/class/gpio/{}/direction
//! GPIO_Value=/sys/class/gpio/{}/value
//!
//! [Permissions]
//! GPIO_Group=gpio
//!
//! [GPIO]
//! 17=out,0
//! 27=in,0
//! ```
//!
//! Structural validation collects every problem it finds before failing,
//! so one invocation reports all missing sections, keys and bad pin entries.
//!
//! # Usage
//!
//! ```rust,no_run
//! use gpio_common::config::{ConfigError, GpioConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = GpioConfig::load(Path::new("gpio.conf"))?;
//!     println!("{} pins configured", config.pins.len());
//!     Ok(())
//! }
//! ```

use crate::consts::{
    KEY_GPIO_DIRECTION, KEY_GPIO_DIRECTORY, KEY_GPIO_EXPORT, KEY_GPIO_GROUP, KEY_GPIO_PATH,
    KEY_GPIO_UNEXPORT, KEY_GPIO_VALUE, PIN_NAME_PLACEHOLDER, REQUIRED_SECTIONS, SECTION_GPIO,
    SECTION_PATHS, SECTION_PERMISSIONS,
};
use crate::ini::{IniDocument, IniSection};
use crate::pin::PinSpec;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for configuration loading and validation.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Can't read config file: {0} (not found)")]
    FileNotFound(PathBuf),

    /// Configuration file exists but could not be read.
    #[error("Can't read config file: {path}: {reason}")]
    ReadError {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error text.
        reason: String,
    },

    /// INI syntax error.
    #[error("Syntax error on line {line}: {message}")]
    ParseError {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// A required section is absent.
    #[error("Could not find section '{0}' in config file")]
    MissingSection(String),

    /// A required key is absent or empty.
    #[error("Could not find key '{key}' in section '{section}'")]
    MissingKey {
        /// Section name.
        section: String,
        /// Key name.
        key: String,
    },

    /// A path template does not contain exactly one `{}` placeholder.
    #[error("'{template}' is not a valid {key} template (expected exactly one '{{}}')")]
    InvalidTemplate {
        /// Key name.
        key: String,
        /// Raw template.
        template: String,
    },

    /// A `[GPIO]` entry could not be parsed.
    #[error("Invalid GPIO entry '{pin}': {reason}")]
    InvalidPin {
        /// Raw key as written.
        pin: String,
        /// What was wrong.
        reason: String,
    },

    /// A configured control path does not exist.
    #[error("'{}' is not valid {key}", path.display())]
    InvalidPath {
        /// Key name.
        key: String,
        /// Configured path.
        path: PathBuf,
    },

    /// The configured group does not exist in the group database.
    #[error("Could not find '{group}' group in '{}' file", database.display())]
    GroupNotFound {
        /// Configured group name.
        group: String,
        /// Group database path.
        database: PathBuf,
    },

    /// The group database could not be read.
    #[error("Can't read group database {}: {reason}", path.display())]
    GroupDatabase {
        /// Database path.
        path: PathBuf,
        /// Underlying I/O error text.
        reason: String,
    },

    /// Several problems found in one validation pass.
    #[error("{} configuration errors:\n{}", .0.len(), issue_list(.0))]
    Invalid(Vec<ConfigError>),
}

impl ConfigError {
    /// Collapse a list of issues: one issue is returned as-is, more are
    /// wrapped in `Invalid`.
    pub fn from_issues(mut issues: Vec<ConfigError>) -> Self {
        if issues.len() == 1 {
            issues.remove(0)
        } else {
            ConfigError::Invalid(issues)
        }
    }

    /// Flattened view of every individual issue.
    pub fn issues(&self) -> Vec<&ConfigError> {
        match self {
            ConfigError::Invalid(all) => all.iter().flat_map(ConfigError::issues).collect(),
            other => vec![other],
        }
    }
}

fn issue_list(issues: &[ConfigError]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Path template with a single `{}` placeholder for the pin directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
}

impl PathTemplate {
    /// Create a template, checking the placeholder count.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTemplate` unless `raw` contains `{}`
    /// exactly once.
    pub fn new(key: &str, raw: &str) -> Result<Self, ConfigError> {
        if raw.matches(PIN_NAME_PLACEHOLDER).count() != 1 {
            return Err(ConfigError::InvalidTemplate {
                key: key.to_string(),
                template: raw.to_string(),
            });
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// Substitute the pin directory name (e.g. `gpio17_pa17`).
    pub fn render(&self, pin_name: &str) -> PathBuf {
        PathBuf::from(self.raw.replacen(PIN_NAME_PLACEHOLDER, pin_name, 1))
    }
}

/// `[Paths]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    /// Directory containing exported pin directories.
    pub gpio_path: PathBuf,
    /// Export control file.
    pub export: PathBuf,
    /// Unexport control file.
    pub unexport: PathBuf,
    /// Per-pin directory.
    pub directory: PathTemplate,
    /// Per-pin direction file.
    pub direction: PathTemplate,
    /// Per-pin value file.
    pub value: PathTemplate,
}

impl PathsConfig {
    fn from_section(section: &IniSection, issues: &mut Vec<ConfigError>) -> Option<Self> {
        let gpio_path = required(section, KEY_GPIO_PATH, issues).map(PathBuf::from);
        let export = required(section, KEY_GPIO_EXPORT, issues).map(PathBuf::from);
        let unexport = required(section, KEY_GPIO_UNEXPORT, issues).map(PathBuf::from);
        let directory = template(section, KEY_GPIO_DIRECTORY, issues);
        let direction = template(section, KEY_GPIO_DIRECTION, issues);
        let value = template(section, KEY_GPIO_VALUE, issues);

        Some(Self {
            gpio_path: gpio_path?,
            export: export?,
            unexport: unexport?,
            directory: directory?,
            direction: direction?,
            value: value?,
        })
    }

    /// The control paths that must exist before any pin is touched, with
    /// their config key names.
    pub fn control_paths(&self) -> [(&'static str, &Path); 3] {
        [
            (KEY_GPIO_PATH, self.gpio_path.as_path()),
            (KEY_GPIO_EXPORT, self.export.as_path()),
            (KEY_GPIO_UNEXPORT, self.unexport.as_path()),
        ]
    }
}

/// Fully parsed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioConfig {
    /// sysfs paths and templates.
    pub paths: PathsConfig,
    /// Group that must own every configured pin's sysfs entries.
    pub group: String,
    /// Pins in config file order.
    pub pins: Vec<PinSpec>,
}

impl GpioConfig {
    /// Read, parse and structurally validate a configuration file.
    ///
    /// # Errors
    ///
    /// - `ConfigError::FileNotFound` / `ConfigError::ReadError` if the file cannot be read
    /// - `ConfigError::ParseError` on INI syntax errors
    /// - any structural error from [`GpioConfig::from_ini`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("config_file = {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.to_path_buf())
            } else {
                ConfigError::ReadError {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        })?;

        let doc = IniDocument::parse(&content)?;
        Self::from_ini(&doc)
    }

    /// Build the typed configuration from a parsed document.
    ///
    /// All missing sections, missing keys, bad templates and bad pin entries
    /// are collected and returned together.
    pub fn from_ini(doc: &IniDocument) -> Result<Self, ConfigError> {
        let mut issues = Vec::new();

        for name in REQUIRED_SECTIONS {
            if doc.section(name).is_none() {
                issues.push(ConfigError::MissingSection(name.to_string()));
            }
        }

        let paths = doc
            .section(SECTION_PATHS)
            .and_then(|s| PathsConfig::from_section(s, &mut issues));
        let group = doc
            .section(SECTION_PERMISSIONS)
            .and_then(|s| required(s, KEY_GPIO_GROUP, &mut issues))
            .map(str::to_string);
        let pins = doc.section(SECTION_GPIO).map(|s| parse_pins(s, &mut issues));

        match (paths, group, pins) {
            (Some(paths), Some(group), Some(pins)) if issues.is_empty() => {
                if pins.is_empty() {
                    warn!("No pins configured in [{}] section", SECTION_GPIO);
                }
                debug!("Config parsed: {} pins, group '{}'", pins.len(), group);
                Ok(Self { paths, group, pins })
            }
            _ => Err(ConfigError::from_issues(issues)),
        }
    }
}

fn required<'a>(
    section: &'a IniSection,
    key: &str,
    issues: &mut Vec<ConfigError>,
) -> Option<&'a str> {
    match section.get(key) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            issues.push(ConfigError::MissingKey {
                section: section.name().to_string(),
                key: key.to_string(),
            });
            None
        }
    }
}

fn template(
    section: &IniSection,
    key: &str,
    issues: &mut Vec<ConfigError>,
) -> Option<PathTemplate> {
    let raw = required(section, key, issues)?;
    PathTemplate::new(key, raw).map_err(|e| issues.push(e)).ok()
}

fn parse_pins(section: &IniSection, issues: &mut Vec<ConfigError>) -> Vec<PinSpec> {
    let mut pins: Vec<PinSpec> = Vec::with_capacity(section.len());
    let mut keys: HashMap<u32, &str> = HashMap::new();

    for (key, raw) in section.entries() {
        match PinSpec::parse(key, raw) {
            Ok(spec) => match keys.entry(spec.pin) {
                Entry::Occupied(first) => issues.push(ConfigError::InvalidPin {
                    pin: key.to_string(),
                    reason: format!("pin {} is already configured as '{}'", spec.pin, first.get()),
                }),
                Entry::Vacant(slot) => {
                    slot.insert(key);
                    pins.push(spec);
                }
            },
            Err(reason) => issues.push(ConfigError::InvalidPin {
                pin: key.to_string(),
                reason,
            }),
        }
    }
    pins
}

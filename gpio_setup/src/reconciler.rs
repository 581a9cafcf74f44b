//! Pin reconciliation.
//!
//! The `Reconciler` owns a validated configuration and a sysfs backend. For
//! each configured pin it first builds a read-only [`PinPlan`] (exported or
//! not, and which of direction/value/group differ from the configuration),
//! then exports the pin if needed and applies the planned fixes.
//!
//! ```text
//! UNKNOWN ──resolve──► EXPORTED ──compare──► 0-3 fixes applied
//!            │
//!            └───────► UNEXPORTED ──export──► EXPORTED ──► all fixes applied
//! ```
//!
//! A pin that fails aborts the run; pins already processed stay as written.

use crate::backend::SysfsBackend;
use crate::error::ReconcileError;
use crate::resolver::resolve_pin_name;
use bitflags::bitflags;
use gpio_common::config::{ConfigError, GpioConfig};
use gpio_common::group::GroupDatabase;
use gpio_common::pin::{Direction, PinSpec};
use std::path::Path;
use tracing::{debug, info};

bitflags! {
    /// Corrective writes needed for one pin.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PinFixes: u8 {
        /// Rewrite the `direction` file.
        const DIRECTION = 1 << 0;
        /// Rewrite the `value` file.
        const VALUE = 1 << 1;
        /// Change group of the pin directory, `direction` and `value`.
        const GROUP = 1 << 2;
    }
}

impl PinFixes {
    /// Drop fixes that do not apply to `direction`: input pins never get
    /// their value written.
    pub fn for_direction(self, direction: Direction) -> Self {
        match direction {
            Direction::In => self - PinFixes::VALUE,
            Direction::Out => self,
        }
    }
}

/// Observed export state of a pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinState {
    /// A `gpio<pin>_*` entry exists.
    Exported {
        /// Resolved directory name.
        name: String,
    },
    /// No matching entry; the pin must be exported first.
    Unexported,
}

/// Decision record for one pin, computed without writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinPlan {
    /// Desired state.
    pub spec: PinSpec,
    /// Observed export state.
    pub state: PinState,
    /// Fixes to apply (after export, for unexported pins).
    pub fixes: PinFixes,
}

impl PinPlan {
    /// True if nothing would be written for this pin.
    pub fn is_clean(&self) -> bool {
        matches!(self.state, PinState::Exported { .. }) && self.fixes.is_empty()
    }
}

/// Outcome for one reconciled pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinReport {
    /// Pin number.
    pub pin: u32,
    /// Resolved directory name.
    pub name: String,
    /// Whether the pin was exported during this run.
    pub exported: bool,
    /// Fixes that were written.
    pub applied: PinFixes,
}

impl PinReport {
    /// True if anything was written for this pin.
    pub fn changed(&self) -> bool {
        self.exported || !self.applied.is_empty()
    }
}

/// Outcome of a full run, in pin processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Per-pin outcomes.
    pub pins: Vec<PinReport>,
}

impl RunReport {
    /// Number of pins that needed at least one write.
    pub fn changed(&self) -> usize {
        self.pins.iter().filter(|p| p.changed()).count()
    }
}

/// Drives sysfs GPIO state to a validated configuration.
pub struct Reconciler<B: SysfsBackend> {
    /// Validated configuration
    config: GpioConfig,
    /// Numeric ID of the configured group
    gid: u32,
    /// Filesystem access
    backend: B,
}

impl<B: SysfsBackend> Reconciler<B> {
    /// Validate the environment and create a reconciler.
    ///
    /// Checks that `GPIO_Path`, `GPIO_Export` and `GPIO_Unexport` exist and
    /// that the configured group is present in `groups`. Every failing check
    /// is reported, and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPath` / `ConfigError::GroupNotFound`, or
    /// `ConfigError::Invalid` when more than one check fails.
    pub fn prepare(
        config: GpioConfig,
        groups: &GroupDatabase,
        backend: B,
    ) -> Result<Self, ConfigError> {
        Self::validate(config, Ok(groups), backend)
    }

    /// Like [`Reconciler::prepare`], loading the group database from
    /// `group_file`. A database that cannot be read is reported alongside
    /// any missing control paths.
    pub fn prepare_with_group_file(
        config: GpioConfig,
        group_file: &Path,
        backend: B,
    ) -> Result<Self, ConfigError> {
        match GroupDatabase::load(group_file) {
            Ok(groups) => Self::validate(config, Ok(&groups), backend),
            Err(e) => Self::validate(config, Err(e), backend),
        }
    }

    fn validate(
        config: GpioConfig,
        groups: Result<&GroupDatabase, ConfigError>,
        backend: B,
    ) -> Result<Self, ConfigError> {
        debug!("Checking config against {} backend", backend.name());
        let mut issues = Vec::new();

        for (key, path) in config.paths.control_paths() {
            if backend.exists(path) {
                debug!("{} '{}' found", key, path.display());
            } else {
                issues.push(ConfigError::InvalidPath {
                    key: key.to_string(),
                    path: path.to_path_buf(),
                });
            }
        }

        let gid = match groups {
            Ok(groups) => match groups.lookup(&config.group) {
                Some(entry) => {
                    debug!("Group '{}' found (gid {})", entry.name, entry.gid);
                    Some(entry.gid)
                }
                None => {
                    issues.push(ConfigError::GroupNotFound {
                        group: config.group.clone(),
                        database: groups.source().to_path_buf(),
                    });
                    None
                }
            },
            Err(e) => {
                issues.push(e);
                None
            }
        };

        match gid {
            Some(gid) if issues.is_empty() => {
                debug!("Config clean, {} pins to check", config.pins.len());
                Ok(Self {
                    config,
                    gid,
                    backend,
                })
            }
            _ => Err(ConfigError::from_issues(issues)),
        }
    }

    /// Validated configuration.
    pub fn config(&self) -> &GpioConfig {
        &self.config
    }

    /// Target group ID.
    pub fn gid(&self) -> u32 {
        self.gid
    }

    /// Backend reference.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the reconciler and return the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Probe one pin and decide what must change. Writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Sysfs` if the base directory cannot be listed
    /// or an exported pin's files cannot be read.
    pub fn plan_pin(&self, spec: &PinSpec) -> Result<PinPlan, ReconcileError> {
        let paths = &self.config.paths;
        debug!(
            "pin: {}, dir: {}, val: {}",
            spec.pin, spec.direction, spec.value
        );

        let Some(name) = resolve_pin_name(&self.backend, &paths.gpio_path, spec.pin)? else {
            debug!("gpio{}_* not found, export required", spec.pin);
            return Ok(PinPlan {
                spec: spec.clone(),
                state: PinState::Unexported,
                fixes: PinFixes::all().for_direction(spec.direction),
            });
        };
        debug!("Found dir '{}'", name);

        let mut fixes = PinFixes::empty();

        let current_gid = self.backend.group_of(&paths.directory.render(&name))?;
        if current_gid == self.gid {
            debug!("'{}' group is set to '{}'", name, self.config.group);
        } else {
            debug!("'{}' group is {} (want {})", name, current_gid, self.gid);
            fixes |= PinFixes::GROUP;
        }

        let direction = self
            .backend
            .read_to_string(&paths.direction.render(&name))?;
        if direction.trim() == spec.direction.as_str() {
            debug!("'{}' direction OK ({})", name, spec.direction);
        } else {
            fixes |= PinFixes::DIRECTION;
        }

        if spec.drives_value() {
            let value = self.backend.read_to_string(&paths.value.render(&name))?;
            if value.trim() == spec.value {
                debug!("'{}' value OK ({})", name, spec.value);
            } else {
                fixes |= PinFixes::VALUE;
            }
        }

        Ok(PinPlan {
            spec: spec.clone(),
            state: PinState::Exported { name },
            fixes: fixes.for_direction(spec.direction),
        })
    }

    /// Plan every configured pin without writing anything.
    pub fn plan(&self) -> Result<Vec<PinPlan>, ReconcileError> {
        self.config
            .pins
            .iter()
            .map(|spec| self.plan_pin(spec))
            .collect()
    }

    /// Write `pin` to the export file and resolve the new directory name.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::ExportNotEffective` if no `gpio<pin>_*` entry
    /// exists after the write.
    pub fn export_pin(&mut self, pin: u32) -> Result<String, ReconcileError> {
        info!("Exporting pin {}", pin);
        self.backend
            .write(&self.config.paths.export, &pin.to_string())?;

        let name = resolve_pin_name(&self.backend, &self.config.paths.gpio_path, pin)?
            .ok_or_else(|| ReconcileError::ExportNotEffective {
                pin,
                base: self.config.paths.gpio_path.clone(),
            })?;
        debug!("gpio_name: {}", name);
        Ok(name)
    }

    /// Apply `fixes` to the pin directory `name`.
    pub fn apply(
        &mut self,
        spec: &PinSpec,
        name: &str,
        fixes: PinFixes,
    ) -> Result<(), ReconcileError> {
        let paths = &self.config.paths;

        if fixes.contains(PinFixes::DIRECTION) {
            info!("Setting '{}' direction to '{}'", name, spec.direction);
            self.backend
                .write(&paths.direction.render(name), spec.direction.as_str())?;
        }

        if fixes.contains(PinFixes::VALUE) {
            info!("Setting '{}' value to '{}'", name, spec.value);
            self.backend.write(&paths.value.render(name), &spec.value)?;
        }

        if fixes.contains(PinFixes::GROUP) {
            info!("Changing '{}' group to '{}'", name, self.config.group);
            for template in [&paths.directory, &paths.direction, &paths.value] {
                self.backend.set_group(&template.render(name), self.gid)?;
            }
        }

        Ok(())
    }

    /// Plan, export if needed, and apply fixes for one pin.
    pub fn reconcile_pin(&mut self, spec: &PinSpec) -> Result<PinReport, ReconcileError> {
        let plan = self.plan_pin(spec)?;

        let (name, exported) = match plan.state {
            PinState::Exported { name } => (name, false),
            PinState::Unexported => (self.export_pin(spec.pin)?, true),
        };

        self.apply(spec, &name, plan.fixes)?;

        Ok(PinReport {
            pin: spec.pin,
            name,
            exported,
            applied: plan.fixes,
        })
    }

    /// Reconcile every configured pin in configuration order.
    ///
    /// Stops at the first failing pin.
    pub fn run(&mut self) -> Result<RunReport, ReconcileError> {
        let mut report = RunReport::default();

        for spec in self.config.pins.clone() {
            let pin_report = self.reconcile_pin(&spec)?;
            report.pins.push(pin_report);
        }

        info!(
            "{} pins checked, {} changed",
            report.pins.len(),
            report.changed()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_pins_never_fix_value() {
        assert_eq!(
            PinFixes::all().for_direction(Direction::In),
            PinFixes::DIRECTION | PinFixes::GROUP
        );
        assert_eq!(PinFixes::all().for_direction(Direction::Out), PinFixes::all());
        assert_eq!(
            PinFixes::VALUE.for_direction(Direction::In),
            PinFixes::empty()
        );
    }

    #[test]
    fn test_report_changed_counts() {
        let report = RunReport {
            pins: vec![
                PinReport {
                    pin: 17,
                    name: "gpio17_sim".into(),
                    exported: true,
                    applied: PinFixes::all(),
                },
                PinReport {
                    pin: 27,
                    name: "gpio27_sim".into(),
                    exported: false,
                    applied: PinFixes::empty(),
                },
                PinReport {
                    pin: 4,
                    name: "gpio4_sim".into(),
                    exported: false,
                    applied: PinFixes::GROUP,
                },
            ],
        };
        assert_eq!(report.changed(), 2);
    }
}

//! # Linux Backend Integration Tests
//!
//! Drives the reconciler through `LinuxSysfs` against a sysfs-shaped tree
//! in a temporary directory. Pins are pre-created since nothing in a
//! tempdir reacts to the export file. Ownership changes target the
//! process's own effective group so the tests run unprivileged.

use gpio_common::config::GpioConfig;
use gpio_common::group::GroupDatabase;
use gpio_setup::backend::LinuxSysfs;
use gpio_setup::error::ReconcileError;
use gpio_setup::reconciler::{PinFixes, Reconciler};
use nix::unistd::getegid;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use tempfile::TempDir;

// ─── Helpers ────────────────────────────────────────────────────────

/// Create `export`, `unexport` and a config file pointing at `root`.
fn write_tree(root: &Path, pins: &str) -> GpioConfig {
    fs::write(root.join("export"), "").unwrap();
    fs::write(root.join("unexport"), "").unwrap();

    let base = root.display();
    let conf = format!(
        "[Paths]
GPIO_Path={base}
GPIO_Export={base}/export
GPIO_Unexport={base}/unexport
GPIO_Directory={base}/{{}}
GPIO_Direction={base}/{{}}/direction
GPIO_Value={base}/{{}}/value

[Permissions]
GPIO_Group=testgpio

[GPIO]
{pins}"
    );
    let conf_path = root.join("gpio.conf");
    fs::write(&conf_path, conf).unwrap();
    GpioConfig::load(&conf_path).unwrap()
}

fn add_pin(root: &Path, name: &str, direction: &str, value: &str) {
    let dir = root.join(name);
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("direction"), direction).unwrap();
    fs::write(dir.join("value"), value).unwrap();
}

fn own_groups() -> GroupDatabase {
    GroupDatabase::parse(&format!("testgpio:x:{}:\n", getegid().as_raw()))
}

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn test_reconciles_exported_pins_on_disk() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let config = write_tree(root, "17=out,1\n27=in,0\n");
    add_pin(root, "gpio17_pa17", "in\n", "0\n");
    add_pin(root, "gpio27_pa27", "out\n", "1\n");

    let mut rec = Reconciler::prepare(config, &own_groups(), LinuxSysfs::new()).unwrap();
    let report = rec.run().unwrap();

    assert_eq!(fs::read_to_string(root.join("gpio17_pa17/direction")).unwrap(), "out");
    assert_eq!(fs::read_to_string(root.join("gpio17_pa17/value")).unwrap(), "1");
    assert_eq!(fs::read_to_string(root.join("gpio27_pa27/direction")).unwrap(), "in");
    // Input pin value left alone.
    assert_eq!(fs::read_to_string(root.join("gpio27_pa27/value")).unwrap(), "1\n");
    // Export never written for already-exported pins.
    assert_eq!(fs::read_to_string(root.join("export")).unwrap(), "");

    let gid = getegid().as_raw();
    assert_eq!(fs::metadata(root.join("gpio17_pa17")).unwrap().gid(), gid);
    assert_eq!(report.pins[0].applied & !PinFixes::GROUP, PinFixes::DIRECTION | PinFixes::VALUE);
    assert_eq!(report.pins[1].applied & !PinFixes::GROUP, PinFixes::DIRECTION);

    // Second pass is clean.
    let second = rec.run().unwrap();
    assert_eq!(second.changed(), 0);
}

#[test]
fn test_missing_pin_writes_export_then_fails() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let config = write_tree(root, "4=out,1\n");

    let mut rec = Reconciler::prepare(config, &own_groups(), LinuxSysfs::new()).unwrap();
    let err = rec.run().unwrap_err();

    assert_eq!(fs::read_to_string(root.join("export")).unwrap(), "4");
    assert!(matches!(err, ReconcileError::ExportNotEffective { pin: 4, .. }));
}

#[test]
fn test_missing_control_files_fail_validation() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let config = write_tree(root, "4=out,1\n");
    fs::remove_file(root.join("unexport")).unwrap();

    let err = Reconciler::prepare(config, &own_groups(), LinuxSysfs::new())
        .err()
        .expect("unexport is missing");
    assert!(err.to_string().contains("is not valid GPIO_Unexport"));
}

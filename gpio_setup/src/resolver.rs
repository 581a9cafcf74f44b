//! Pin name resolution.
//!
//! Once exported, a pin shows up under the GPIO base directory as
//! `gpio<pin>_<label>` where the label is platform-defined. Resolution finds
//! that directory name for a given pin number.

use crate::backend::{SysfsBackend, SysfsError};
use gpio_common::consts::PIN_DIR_PREFIX;
use std::path::Path;
use tracing::warn;

/// Find the directory name of an exported pin.
///
/// Matches entries of `base` against `gpio<pin>_*`. When several entries
/// match, the lexicographically smallest name wins. Returns `Ok(None)` if the
/// pin is not exported.
///
/// # Errors
///
/// Returns `SysfsError` if `base` cannot be listed.
pub fn resolve_pin_name<B: SysfsBackend + ?Sized>(
    backend: &B,
    base: &Path,
    pin: u32,
) -> Result<Option<String>, SysfsError> {
    let prefix = format!("{PIN_DIR_PREFIX}{pin}_");

    let mut matches: Vec<String> = backend
        .list_dir(base)?
        .into_iter()
        .filter(|name| name.starts_with(&prefix))
        .collect();
    matches.sort();

    if matches.len() > 1 {
        warn!(
            "Pin {} matches {} entries under {}: {:?}, using '{}'",
            pin,
            matches.len(),
            base.display(),
            matches,
            matches[0]
        );
    }

    Ok(matches.into_iter().next())
}

//! Shared constants for the GPIO setup workspace.
//!
//! Single source of truth for default paths, configuration section/key
//! names and process exit codes.

/// Default configuration file path (relative to the working directory).
pub const DEFAULT_CONFIG_PATH: &str = "gpio.conf";

/// Default location of the system group database.
pub const DEFAULT_GROUP_DATABASE: &str = "/etc/group";

/// Placeholder substituted with the resolved pin directory name in path templates.
pub const PIN_NAME_PLACEHOLDER: &str = "{}";

/// Prefix of an exported pin directory (`gpio<pin>_<label>`).
pub const PIN_DIR_PREFIX: &str = "gpio";

// ─── Configuration sections ─────────────────────────────────────────

/// Section holding sysfs paths and path templates.
pub const SECTION_PATHS: &str = "Paths";

/// Section holding the owning group name.
pub const SECTION_PERMISSIONS: &str = "Permissions";

/// Section mapping pin numbers to `direction,value` pairs.
pub const SECTION_GPIO: &str = "GPIO";

/// Required sections, in reporting order.
pub const REQUIRED_SECTIONS: [&str; 3] = [SECTION_PATHS, SECTION_PERMISSIONS, SECTION_GPIO];

// ─── Configuration keys ─────────────────────────────────────────────

pub const KEY_GPIO_PATH: &str = "GPIO_Path";
pub const KEY_GPIO_EXPORT: &str = "GPIO_Export";
pub const KEY_GPIO_UNEXPORT: &str = "GPIO_Unexport";
pub const KEY_GPIO_DIRECTORY: &str = "GPIO_Directory";
pub const KEY_GPIO_DIRECTION: &str = "GPIO_Direction";
pub const KEY_GPIO_VALUE: &str = "GPIO_Value";
pub const KEY_GPIO_GROUP: &str = "GPIO_Group";

// ─── Exit codes (sysexits.h) ────────────────────────────────────────

/// Runtime sysfs read/write/chown failure.
pub const EXIT_IO_ERROR: u8 = 74;

/// Export was written but the pin directory never appeared.
pub const EXIT_EXPORT_FAILED: u8 = 69;

/// Not running as the superuser.
pub const EXIT_NOT_ROOT: u8 = 77;

/// Configuration file, paths or group invalid.
pub const EXIT_CONFIG_ERROR: u8 = 78;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [EXIT_IO_ERROR, EXIT_EXPORT_FAILED, EXIT_NOT_ROOT, EXIT_CONFIG_ERROR];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
            assert_ne!(*a, 0);
        }
    }

    #[test]
    fn required_sections_match_names() {
        assert_eq!(REQUIRED_SECTIONS, ["Paths", "Permissions", "GPIO"]);
    }
}

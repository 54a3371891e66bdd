// system-tests/src/data.rs
// ============================================================================
// Module: Scenario Data Files
// Description: Oversized payload used by the request size limit scenario.
// Dependencies: std
// ============================================================================

//! Oversized payload used by the request size limit scenario.

use std::io;
use std::path::Path;

/// Size of the generated payload when no data file is present.
///
/// One byte over the 512 KiB Consul key-value limit.
pub const LARGE_VALUE_FALLBACK_LEN: usize = 512 * 1024 + 1;

/// Reads the large value from `path`, or generates one when the file is absent.
///
/// # Errors
///
/// Returns [`io::Error`] when the file exists but cannot be read.
pub fn load_large_value(path: &Path) -> io::Result<String> {
    if path.is_file() {
        return std::fs::read_to_string(path);
    }
    Ok("x".repeat(LARGE_VALUE_FALLBACK_LEN))
}

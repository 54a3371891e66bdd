// crates/consul-itest-core/src/testdata.rs
// ============================================================================
// Module: Scenario Test Data
// Description: Unique key/value names derived from a random id.
// Purpose: Keep concurrent or repeated runs from colliding on Consul keys.
// Dependencies: rand
// ============================================================================

//! Unique key/value names derived from a random id.

use rand::Rng;

/// Length of the random id.
const ID_LEN: usize = 3;

/// Folder used for raw HTTP writes.
pub const RAW_WRITE_FOLDER: &str = "test_folder";

/// Keys and values used by one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestData {
    /// Random lowercase id shared by every name.
    pub id: String,
    /// Plain key.
    pub test_key: String,
    /// Value for the plain key.
    pub test_value: String,
    /// Replacement value for the plain key.
    pub updated_value: String,
    /// Key under a path prefix.
    pub path_test_key: String,
    /// Value for the path key.
    pub path_value: String,
    /// Replacement value for the path key.
    pub updated_path_value: String,
}

impl TestData {
    /// Generates a data set from a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let id: String = (0..ID_LEN).map(|_| char::from(rng.gen_range(b'a'..=b'z'))).collect();
        Self::from_id(&id)
    }

    /// Builds the data set for a known id.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            test_key: format!("test_key_{id}"),
            test_value: format!("test_value_{id}"),
            updated_value: format!("update_test_value_{id}"),
            path_test_key: format!("path_test_key/test_data_{id}"),
            path_value: format!("path_test_value_{id}"),
            updated_path_value: format!("update_path_test_value_{id}"),
        }
    }

    /// Returns the key used for raw HTTP writes.
    #[must_use]
    pub fn folder_key(&self) -> String {
        format!("{RAW_WRITE_FOLDER}/{}", self.test_key)
    }
}

// crates/consul-itest-core/src/images.rs
// ============================================================================
// Module: Monitored Images
// Description: Parsing of the monitored image list and tag comparison.
// Purpose: Verify deployed container images against expected versions.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! `MONITORED_IMAGES` is a comma-separated list of records, each holding four
//! whitespace-separated fields: `kind name container expected_image`.
//! Malformed records are skipped. Every well-formed record produces one
//! [`ImageCheck`]; lookup failures become failed checks rather than errors so
//! that the final [`ImageReport::verify`] lists every problem at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Image verification failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageError {
    /// The image reference carries no `:tag`.
    #[error("image has no tag: {image}")]
    NoTag {
        /// Offending image reference.
        image: String,
    },
    /// The report holds no checks.
    #[error("no images were checked")]
    NothingChecked,
    /// One or more checks failed.
    #[error("image tag mismatches:\n{details}")]
    Mismatches {
        /// Number of failed checks.
        count: usize,
        /// One line per failed check.
        details: String,
    },
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// One `kind name container expected_image` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredResource {
    /// Workload kind as written.
    pub kind: String,
    /// Workload name.
    pub name: String,
    /// Container name.
    pub container: String,
    /// Expected image reference.
    pub expected_image: String,
}

impl MonitoredResource {
    /// Returns the `kind/name` label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

/// Result of parsing the monitored image list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitoredImages {
    /// Well-formed records in input order.
    pub resources: Vec<MonitoredResource>,
    /// Records skipped for not having exactly four fields.
    pub skipped: Vec<String>,
}

/// Parses a `MONITORED_IMAGES` value.
#[must_use]
pub fn parse_monitored_images(raw: &str) -> MonitoredImages {
    let mut parsed = MonitoredImages::default();
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);
    for record in trimmed.split(',') {
        let fields: Vec<&str> = record.split_whitespace().collect();
        match fields.as_slice() {
            [kind, name, container, expected_image] => {
                parsed.resources.push(MonitoredResource {
                    kind: (*kind).to_string(),
                    name: (*name).to_string(),
                    container: (*container).to_string(),
                    expected_image: (*expected_image).to_string(),
                });
            }
            _ => parsed.skipped.push(record.trim().to_string()),
        }
    }
    parsed
}

/// Returns the tag of an image reference: the text after its last `:`.
///
/// # Errors
///
/// Returns [`ImageError::NoTag`] when the reference has no `:`.
pub fn image_tag(image: &str) -> Result<&str, ImageError> {
    image.rsplit_once(':').map(|(_, tag)| tag).ok_or_else(|| ImageError::NoTag {
        image: image.to_string(),
    })
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Outcome of one image check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Both tags were resolved.
    Compared {
        /// Tag of the expected image.
        expected_tag: String,
        /// Tag of the deployed image.
        actual_tag: String,
    },
    /// Lookup or parsing failed.
    Failed {
        /// Failure description.
        error: String,
    },
}

/// One checked resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCheck {
    /// `kind/name` label.
    pub resource: String,
    /// Container name.
    pub container: String,
    /// Comparison outcome.
    pub outcome: ImageOutcome,
}

impl ImageCheck {
    /// Compares the expected image against the deployed one.
    #[must_use]
    pub fn compare(resource: &MonitoredResource, actual_image: &str) -> Self {
        let outcome = match (image_tag(&resource.expected_image), image_tag(actual_image)) {
            (Ok(expected), Ok(actual)) => ImageOutcome::Compared {
                expected_tag: expected.to_string(),
                actual_tag: actual.to_string(),
            },
            (Err(err), _) | (_, Err(err)) => ImageOutcome::Failed {
                error: err.to_string(),
            },
        };
        Self {
            resource: resource.label(),
            container: resource.container.clone(),
            outcome,
        }
    }

    /// Records a failed lookup.
    #[must_use]
    pub fn failed(resource: &MonitoredResource, error: impl fmt::Display) -> Self {
        Self {
            resource: resource.label(),
            container: resource.container.clone(),
            outcome: ImageOutcome::Failed {
                error: error.to_string(),
            },
        }
    }

    /// Returns true when both tags were resolved and are equal.
    #[must_use]
    pub fn matched(&self) -> bool {
        matches!(
            &self.outcome,
            ImageOutcome::Compared { expected_tag, actual_tag } if expected_tag == actual_tag
        )
    }
}

impl fmt::Display for ImageCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ImageOutcome::Compared {
                expected_tag,
                actual_tag,
            } => write!(f, "{}: expected {expected_tag}, got {actual_tag}", self.resource),
            ImageOutcome::Failed {
                error,
            } => write!(f, "{}: {error}", self.resource),
        }
    }
}

/// Collected image checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageReport {
    /// Checks in input order.
    pub checks: Vec<ImageCheck>,
}

impl ImageReport {
    /// Appends a check.
    pub fn push(&mut self, check: ImageCheck) {
        self.checks.push(check);
    }

    /// Returns the checks that did not match.
    #[must_use]
    pub fn mismatches(&self) -> Vec<&ImageCheck> {
        self.checks.iter().filter(|check| !check.matched()).collect()
    }

    /// Succeeds with the number of checks when every check matched.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::NothingChecked`] for an empty report and
    /// [`ImageError::Mismatches`] listing every failed check otherwise.
    pub fn verify(&self) -> Result<usize, ImageError> {
        if self.checks.is_empty() {
            return Err(ImageError::NothingChecked);
        }
        let mismatches = self.mismatches();
        if mismatches.is_empty() {
            return Ok(self.checks.len());
        }
        let mut details = String::new();
        for check in &mismatches {
            let _ = writeln!(details, "  - {check}");
        }
        Err(ImageError::Mismatches {
            count: mismatches.len(),
            details,
        })
    }
}

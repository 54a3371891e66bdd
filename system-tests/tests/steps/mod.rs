// system-tests/tests/steps/mod.rs
// ============================================================================
// Module: Step Library
// Description: Given/when/then functions grouped by feature.
// Dependencies: cucumber, consul-itest-core, consul-system-tests
// ============================================================================

//! Steps shared by several features live in [`common`]. Every step returns
//! `Result<(), StepError>`; an error fails the current scenario only.

mod alerts;
mod backup;
mod common;
mod ha;
mod images;
mod s3;

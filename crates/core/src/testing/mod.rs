//! Test helpers shared by unit and integration tests.

pub mod fixtures;

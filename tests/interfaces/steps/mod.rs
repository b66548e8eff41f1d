//! Cucumber step definitions for interface tests.

pub mod record_store;

//! Cucumber step definitions for acceptance tests.

pub mod activation;

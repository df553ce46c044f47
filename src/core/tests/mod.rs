//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Definition option parsing
//! - Script import (multiline blocks, error collection)
//! - Registry ordering properties

#[cfg(test)]
mod import_tests;
#[cfg(test)]
mod registry_tests;

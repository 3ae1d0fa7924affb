//! Circuits domain: providers, circuit types, circuits and their
//! terminations.
//!
//! - `models`: rows as stored and as listed
//! - `filters`: list query parameters
//! - `forms`: validation of submitted forms
//! - `import`: CSV bulk import
//! - `views`: descriptors plugging each entity into the generic views

pub mod filters;
pub mod forms;
pub mod import;
pub mod models;
pub mod views;

pub const PROVIDER_LIST_URL: &str = "/circuits/providers/";
pub const CIRCUIT_TYPE_LIST_URL: &str = "/circuits/circuit-types/";
pub const CIRCUIT_LIST_URL: &str = "/circuits/circuits/";

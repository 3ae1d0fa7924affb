// Circuits - network circuit inventory
//
// This crate provides the web views for providers, circuit types, circuits
// and their terminations.
// Architecture follows domain-driven design: domains/ holds the models and
// forms, kernel/ the storage and rendering infrastructure, server/ the HTTP
// surface.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;

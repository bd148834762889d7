//! The fact client library.
//!
//! `fact` manages key/value facts attached to assets of a fleet inventory
//! service. A command picks its asset from `--asset` or the configured
//! default, resolving names through an external inventory tool, and then
//! talks to the service's metadata API with the stored bearer token.
//!
//! # Modules
//!
//! - `actions`: command handlers and the dispatch registry
//! - `commands`: CLI command definitions
//! - `config_updater`: change tracking and safe persistence for `configure`
//! - `configuration`: the main configuration document
//! - `context`: per-invocation execution context
//! - `credentials`: the stored API token
//! - `metadata`: requests against an asset's metadata collection
//! - `resolution`: asset name to identifier resolution

pub mod actions;
pub mod commands;
pub mod config_updater;
pub mod configuration;
pub mod context;
pub mod credentials;
pub mod error;
pub mod exit_codes;
pub mod format;
pub mod http_utils;
pub mod logging;
pub mod metadata;
pub mod resolution;

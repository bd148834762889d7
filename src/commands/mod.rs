//! CLI command definitions and argument parsing.
//!
//! This module defines all the CLI commands and their arguments using the clap crate.
//! Handlers live in [`crate::actions`].

use crate::configuration::Configuration;
use clap::Command;

pub mod configure;
pub mod entries;
pub mod params;

pub use params::{
    COMMAND_CONFIGURE, COMMAND_DELETE, COMMAND_GET, COMMAND_LIST, COMMAND_SET, PARAMETER_ASSET,
    PARAMETER_ID, PARAMETER_JWT, PARAMETER_KEY, PARAMETER_KEYS_ONLY, PARAMETER_VALIDATE,
    PARAMETER_VALUE,
};

/// Create and configure all CLI commands and their arguments.
///
/// The configuration is needed because the help of `set` lists the special
/// keys of this installation.
pub fn create_cli_commands(configuration: &Configuration) -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(params::asset_parameter())
        .subcommand(configure::configure_command())
        .subcommand(entries::list_command())
        .subcommand(entries::get_command())
        .subcommand(entries::set_command(configuration))
        .subcommand(entries::delete_command())
}

//! Entry command definitions.
//!
//! The list/get/set/delete commands working on the metadata of one asset.

use crate::{
    commands::params::{
        key_parameter, keys_only_parameter, value_parameter, COMMAND_DELETE, COMMAND_GET,
        COMMAND_LIST, COMMAND_SET,
    },
    configuration::Configuration,
};
use clap::Command;

pub fn list_command() -> Command {
    Command::new(COMMAND_LIST)
        .about("List all entries of the asset")
        .visible_alias("ls")
        .arg(keys_only_parameter())
}

pub fn get_command() -> Command {
    Command::new(COMMAND_GET)
        .about("Print the value of one entry")
        .arg(key_parameter())
}

/// The long help lists the special keys of this installation.
pub fn set_command(configuration: &Configuration) -> Command {
    let command = Command::new(COMMAND_SET)
        .about("Create or replace one entry")
        .arg(key_parameter())
        .arg(value_parameter());

    match special_keys_help(configuration) {
        Some(help) => command.long_about(format!("Create or replace one entry.\n\n{}", help)),
        None => command,
    }
}

pub fn delete_command() -> Command {
    Command::new(COMMAND_DELETE)
        .about("Remove one entry")
        .visible_alias("rm")
        .arg(key_parameter())
}

fn special_keys_help(configuration: &Configuration) -> Option<String> {
    let mut sections = Vec::new();

    let allowed = configuration.allowed_special_keys();
    if !allowed.is_empty() {
        let lines: Vec<String> = allowed
            .iter()
            .map(|(key, values)| format!("  {}: {}", key, values.join(", ")))
            .collect();
        sections.push(format!("Special keys and their allowed values:\n{}", lines.join("\n")));
    }

    let disabled = configuration.disabled_special_keys();
    if !disabled.is_empty() {
        sections.push(format!("Disabled keys:\n  {}", disabled.join(", ")));
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}

//! Configure command definition.

use crate::commands::params::{
    id_parameter, jwt_parameter, validate_parameter, COMMAND_CONFIGURE,
};
use clap::Command;

/// Create the configure command.
pub fn configure_command() -> Command {
    Command::new(COMMAND_CONFIGURE)
        .about("Set the API token and the default asset")
        .long_about(
            "Set the API token and the default asset.\n\n\
             Without options and on a terminal the settings are asked for interactively.\n\
             --asset NAME sets the default asset by name, add --id to give an identifier \
             instead, --asset '' removes the default asset.",
        )
        .arg(jwt_parameter())
        .arg(id_parameter())
        .arg(validate_parameter())
}

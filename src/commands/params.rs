//! Shared command parameters for all CLI commands.
//!
//! Parameter names live here so that the command definitions and the
//! actions reading the matches agree on them.

use clap::{Arg, ArgAction};

// Commands
pub const COMMAND_CONFIGURE: &str = "configure";
pub const COMMAND_LIST: &str = "list";
pub const COMMAND_GET: &str = "get";
pub const COMMAND_SET: &str = "set";
pub const COMMAND_DELETE: &str = "delete";

// Parameter names
pub const PARAMETER_ASSET: &str = "asset";
pub const PARAMETER_JWT: &str = "jwt";
pub const PARAMETER_ID: &str = "id";
pub const PARAMETER_VALIDATE: &str = "validate";
pub const PARAMETER_KEYS_ONLY: &str = "keys-only";
pub const PARAMETER_KEY: &str = "key";
pub const PARAMETER_VALUE: &str = "value";

/// Create the global asset parameter.
///
/// Data commands use it to pick the asset for one invocation, `configure`
/// uses it to set the default asset.
pub fn asset_parameter() -> Arg {
    Arg::new(PARAMETER_ASSET)
        .short('a')
        .long(PARAMETER_ASSET)
        .num_args(1)
        .required(false)
        .global(true)
        .value_name("NAME")
        .help("Asset name, overrides the configured default asset")
}

pub fn jwt_parameter() -> Arg {
    Arg::new(PARAMETER_JWT)
        .long(PARAMETER_JWT)
        .num_args(1)
        .required(false)
        .value_name("TOKEN")
        .help("API access token, an empty value removes the stored token")
}

pub fn id_parameter() -> Arg {
    Arg::new(PARAMETER_ID)
        .long(PARAMETER_ID)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Treat the value of --asset as an asset identifier instead of a name")
}

pub fn validate_parameter() -> Arg {
    Arg::new(PARAMETER_VALIDATE)
        .long(PARAMETER_VALIDATE)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Check the new settings against the live service before saving")
}

pub fn keys_only_parameter() -> Arg {
    Arg::new(PARAMETER_KEYS_ONLY)
        .long(PARAMETER_KEYS_ONLY)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Print only the keys")
}

pub fn key_parameter() -> Arg {
    Arg::new(PARAMETER_KEY)
        .required(true)
        .value_name("KEY")
        .help("Entry key")
}

pub fn value_parameter() -> Arg {
    Arg::new(PARAMETER_VALUE)
        .required(true)
        .allow_hyphen_values(true)
        .value_name("VALUE")
        .help("Entry value")
}

//! Asset resolution.
//!
//! Commands target exactly one asset. [`AssetResolver`] picks it from the
//! `--asset` argument or the stored default, asking the external inventory
//! tool through [`AssetLookup`] whenever only a name is known.

use crate::{
    configuration::{Configuration, DefaultAsset, APP_NAME},
    error::FactError,
};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, error, trace};

/// Exit status the inventory tool uses for "no asset by that name".
pub const NOT_FOUND_EXIT_CODE: i32 = 21;
/// Zero-based column of the asset identifier in the tool's tab-separated output.
pub const ASSET_ID_FIELD: usize = 5;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Could not find asset: {name}")]
    NotFound { name: String },
    #[error("The asset lookup failed: {command}\n{detail}")]
    Internal { command: String, detail: String },
}

/// Maps an asset name onto its identifier.
pub trait AssetLookup {
    fn lookup(&self, name: &str) -> Result<String, LookupError>;

    /// The command line a user can run to reproduce the lookup.
    fn describe(&self, name: &str) -> String;
}

/// Runs `<asset_command> show <name>` without going through a shell.
#[derive(Debug, Clone)]
pub struct CommandLookup {
    program: String,
    args: Vec<String>,
}

impl CommandLookup {
    pub fn new(asset_command: &str) -> Self {
        let mut words = asset_command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_default();
        Self {
            program,
            args: words.collect(),
        }
    }

    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self::new(configuration.asset_command())
    }
}

impl AssetLookup for CommandLookup {
    fn lookup(&self, name: &str) -> Result<String, LookupError> {
        let command_line = self.describe(name);
        let internal = |detail: String| LookupError::Internal {
            command: command_line.clone(),
            detail,
        };

        if self.program.is_empty() {
            return Err(internal("asset_command is empty".to_string()));
        }

        debug!("Resolving asset: {}", command_line);
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("show")
            .arg(name)
            .output()
            .map_err(|e| internal(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        match output.status.code() {
            Some(0) => {
                trace!("Lookup output: {}", stdout);
                parse_asset_id(&stdout).ok_or_else(|| {
                    internal(format!(
                        "unexpected output, expected an identifier in column {}",
                        ASSET_ID_FIELD + 1
                    ))
                })
            }
            Some(NOT_FOUND_EXIT_CODE) => Err(LookupError::NotFound {
                name: name.to_string(),
            }),
            status => {
                debug!("Lookup stdout: {}", stdout);
                error!("Lookup stderr: {}", stderr);
                let status = match status {
                    Some(code) => format!("exit status {}", code),
                    None => "terminated by signal".to_string(),
                };
                Err(internal(status))
            }
        }
    }

    fn describe(&self, name: &str) -> String {
        let mut words = vec![self.program.clone()];
        words.extend(self.args.iter().cloned());
        words.push("show".to_string());
        words.push(quote(name));
        words.join(" ")
    }
}

/// Reads the identifier out of the first line of the tool's output.
pub fn parse_asset_id(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .next()
        .and_then(|line| line.split('\t').nth(ASSET_ID_FIELD))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn quote(word: &str) -> String {
    if !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@".contains(c))
    {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Decides which asset identifier a command operates on.
pub struct AssetResolver<'a> {
    configuration: &'a Configuration,
    lookup: &'a dyn AssetLookup,
}

impl<'a> AssetResolver<'a> {
    pub fn new(configuration: &'a Configuration, lookup: &'a dyn AssetLookup) -> Self {
        Self {
            configuration,
            lookup,
        }
    }

    /// An explicit name always wins and never falls back to the stored default.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<String, FactError> {
        if let Some(name) = explicit {
            return Ok(self.lookup.lookup(name)?);
        }

        match self.configuration.default_asset() {
            DefaultAsset::PendingName(name) => self.lookup.lookup(name).map_err(|e| {
                FactError::internal_with(
                    format!(
                        "The default asset '{}' could not be resolved. Please re-run: {} configure",
                        name, APP_NAME
                    ),
                    e,
                )
            }),
            DefaultAsset::ExplicitId(id) => Ok(id.clone()),
            DefaultAsset::NoDefault => Err(FactError::InputError(format!(
                "This installation has not been configured with a default asset.\n\
                 Please provide the asset with: --asset NAME\n\
                 Alternatively set a default with: {} configure",
                APP_NAME
            ))),
        }
    }
}

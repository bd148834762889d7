//! Handler for the configure command.
//!
//! Options given on the command line are applied as they are. Without any
//! option and on a terminal, the settings are asked for one by one.

use crate::{
    actions::Action,
    commands::{PARAMETER_ASSET, PARAMETER_ID, PARAMETER_JWT, PARAMETER_VALIDATE},
    config_updater::ConfigUpdater,
    configuration::DefaultAsset,
    context::ExecutionContext,
    credentials::mask,
    error::FactError,
};
use clap::ArgMatches;
use inquire::{Confirm, Text};
use std::{io::IsTerminal, process::Command};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureOptions {
    /// `Some("")` removes the stored token.
    pub jwt: Option<String>,
    /// `Some("")` removes the default asset.
    pub asset: Option<String>,
    pub id: bool,
    pub validate: bool,
}

impl ConfigureOptions {
    pub fn is_empty(&self) -> bool {
        self.jwt.is_none() && self.asset.is_none() && !self.id && !self.validate
    }

    /// Applies the options to `updater`, leaving whatever was not mentioned alone.
    pub fn apply(&self, updater: &mut ConfigUpdater<'_>) {
        if let Some(jwt) = &self.jwt {
            updater.set_token(Some(jwt.clone()));
        }

        match self.asset.as_deref() {
            None => {}
            Some("") => updater.clear_asset(),
            Some(id) if self.id => updater.set_asset_by_id(id),
            Some(name) => updater.set_asset_by_name(name),
        }
    }
}

pub fn from_args(matches: &ArgMatches) -> Result<Action, FactError> {
    let options = ConfigureOptions {
        jwt: matches.get_one::<String>(PARAMETER_JWT).cloned(),
        asset: matches.get_one::<String>(PARAMETER_ASSET).cloned(),
        id: matches.get_flag(PARAMETER_ID),
        validate: matches.get_flag(PARAMETER_VALIDATE),
    };

    if options.id && options.asset.is_none() {
        return Err(FactError::InputError(
            "--id needs the asset identifier given with --asset".to_string(),
        ));
    }
    Ok(Action::Configure(options))
}

pub async fn run(options: ConfigureOptions, context: &ExecutionContext) -> Result<(), FactError> {
    let mut updater = ConfigUpdater::new(
        context.configuration().clone(),
        context.credentials(),
        context.paths(),
        context.lookup(),
    );

    let validate = if options.is_empty() && std::io::stdout().is_terminal() {
        prompt(&mut updater)?
    } else {
        options.apply(&mut updater);
        options.validate
    };

    if validate {
        updater.validate().await?;
    } else {
        updater.try_resolve_pending();
    }
    updater.save()
}

/// Asks for every setting and returns whether to validate them.
fn prompt(updater: &mut ConfigUpdater<'_>) -> Result<bool, FactError> {
    let masked = mask(updater.original_token());
    let mut question = Text::new("API access token:");
    if let Some(masked) = masked.as_deref() {
        question = question.with_default(masked);
    }
    let token = question.prompt()?;
    // Accepting the masked default keeps the stored token.
    if Some(token.as_str()) != masked.as_deref() {
        updater.set_token(Some(token.trim().to_string()));
    }

    let current_id = match updater.asset() {
        DefaultAsset::ExplicitId(id) => Some(id.clone()),
        _ => None,
    };
    let by_id = Confirm::new("Define the default asset by its identifier?")
        .with_default(current_id.is_some())
        .prompt()?;

    if by_id {
        let mut question = Text::new("Asset identifier:");
        if let Some(id) = current_id.as_deref() {
            question = question.with_default(id);
        }
        let id = question.prompt()?;
        match id.trim() {
            "" => updater.clear_asset(),
            id => updater.set_asset_by_id(id),
        }
    } else if Confirm::new("Define the default asset by its name?")
        .with_default(true)
        .prompt()?
    {
        let default_name = match updater.asset() {
            DefaultAsset::PendingName(name) => Some(name.clone()),
            _ => short_hostname(),
        };
        let mut question = Text::new("Asset name:");
        if let Some(name) = default_name.as_deref() {
            question = question.with_default(name);
        }
        let name = question.prompt()?;
        match name.trim() {
            "" => updater.clear_asset(),
            name => updater.set_asset_by_name(name),
        }
    } else {
        updater.clear_asset();
    }

    Ok(Confirm::new("Validate the new settings?")
        .with_default(true)
        .prompt()?)
}

fn short_hostname() -> Option<String> {
    match Command::new("hostname").arg("--short").output() {
        Ok(output) if output.status.success() => {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if name.is_empty() {
                None
            } else {
                Some(name)
            }
        }
        Ok(output) => {
            debug!("hostname exited with {}", output.status);
            None
        }
        Err(e) => {
            debug!("hostname could not be run: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        configuration::{ConfigPaths, Configuration},
        credentials::Credentials,
        resolution::tests::StubLookup,
    };

    #[test]
    fn test_apply_options() {
        let paths = ConfigPaths::in_directory("/nonexistent");
        let configuration = Configuration::default()
            .with_default_asset(DefaultAsset::ExplicitId("42".to_string()));
        let credentials = Credentials::new(Some("old".to_string()));
        let mut updater = ConfigUpdater::new(configuration, &credentials, &paths, &StubLookup);

        ConfigureOptions {
            asset: Some("node01".to_string()),
            ..Default::default()
        }
        .apply(&mut updater);
        assert_eq!(updater.asset(), &DefaultAsset::PendingName("node01".to_string()));
        assert!(!updater.credentials_changed());

        ConfigureOptions {
            asset: Some("7".to_string()),
            id: true,
            jwt: Some(String::new()),
            ..Default::default()
        }
        .apply(&mut updater);
        assert_eq!(updater.asset(), &DefaultAsset::ExplicitId("7".to_string()));
        assert_eq!(updater.token(), None);

        ConfigureOptions {
            asset: Some(String::new()),
            ..Default::default()
        }
        .apply(&mut updater);
        assert_eq!(updater.asset(), &DefaultAsset::NoDefault);
    }

    #[test]
    fn test_is_empty() {
        assert!(ConfigureOptions::default().is_empty());
        assert!(!ConfigureOptions {
            validate: true,
            ..Default::default()
        }
        .is_empty());
    }
}

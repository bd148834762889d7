//! Command handlers.
//!
//! A parsed command line becomes an [`Action`] through an explicit registry
//! keyed by command name. Running an action logs its start and its exit code
//! and, for every command but `configure`, insists on a stored token first.

use crate::{
    commands::{COMMAND_CONFIGURE, COMMAND_DELETE, COMMAND_GET, COMMAND_LIST, COMMAND_SET},
    context::ExecutionContext,
    error::FactError,
    exit_codes::FactExitCode,
};
use clap::ArgMatches;
use tracing::{debug, error, info};

pub mod configure;
pub mod entries;

pub use configure::ConfigureOptions;

/// One command invocation with its arguments already extracted.
#[derive(Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    Configure(ConfigureOptions),
    List {
        asset: Option<String>,
        keys_only: bool,
    },
    Get {
        asset: Option<String>,
        key: String,
    },
    Set {
        asset: Option<String>,
        key: String,
        value: String,
    },
    Delete {
        asset: Option<String>,
        key: String,
    },
}

type ActionBuilder = fn(&ArgMatches) -> Result<Action, FactError>;

const REGISTRY: &[(&str, ActionBuilder)] = &[
    (COMMAND_CONFIGURE, configure::from_args),
    (COMMAND_LIST, entries::list_from_args),
    (COMMAND_GET, entries::get_from_args),
    (COMMAND_SET, entries::set_from_args),
    (COMMAND_DELETE, entries::delete_from_args),
];

/// Unknown command names fail instead of falling through to a default.
pub fn build_action(name: &str, matches: &ArgMatches) -> Result<Action, FactError> {
    match REGISTRY.iter().find(|(command, _)| *command == name) {
        Some((_, builder)) => builder(matches),
        None => Err(FactError::CommandNotFound(name.to_string())),
    }
}

impl Action {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub async fn run(self, context: &mut ExecutionContext) -> Result<(), FactError> {
        info!("Running: {}", self.name());

        let result = self.execute(context).await;
        match &result {
            Ok(()) => info!("Exited: {}", FactExitCode::Success.code()),
            Err(e) => {
                let code = e.exit_code();
                error!("Exited: {} ({})", code.code(), code.message());
                debug!("{}", e.chain());
                error!("({}) {}", e.kind(), e);
            }
        }
        result
    }

    async fn execute(self, context: &mut ExecutionContext) -> Result<(), FactError> {
        if !matches!(self, Action::Configure(_)) {
            context.require_token()?;
        }

        match self {
            Action::Configure(options) => configure::run(options, context).await,
            Action::List { asset, keys_only } => {
                entries::list(context, asset.as_deref(), keys_only).await
            }
            Action::Get { asset, key } => entries::get(context, asset.as_deref(), &key).await,
            Action::Set { asset, key, value } => {
                entries::set(context, asset.as_deref(), &key, value).await
            }
            Action::Delete { asset, key } => {
                entries::delete(context, asset.as_deref(), &key).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        commands::create_cli_commands,
        configuration::{ConfigPaths, Configuration},
        credentials::Credentials,
        resolution::tests::StubLookup,
    };

    fn action_for(args: &[&str]) -> Result<Action, FactError> {
        let matches = create_cli_commands(&Configuration::default())
            .try_get_matches_from(args)
            .unwrap();
        let (name, sub_matches) = matches.subcommand().unwrap();
        build_action(name, sub_matches)
    }

    #[test]
    fn test_registry_builds_every_command() {
        assert_eq!(
            action_for(&["fact", "set", "rack", "3", "--asset", "node01"]).unwrap(),
            Action::Set {
                asset: Some("node01".to_string()),
                key: "rack".to_string(),
                value: "3".to_string(),
            }
        );
        assert_eq!(
            action_for(&["fact", "list", "--keys-only"]).unwrap(),
            Action::List {
                asset: None,
                keys_only: true,
            }
        );
        assert_eq!(action_for(&["fact", "configure"]).unwrap().name(), "configure");
        assert_eq!(action_for(&["fact", "delete", "rack"]).unwrap().name(), "delete");
        assert_eq!(action_for(&["fact", "get", "rack"]).unwrap().name(), "get");
    }

    #[test]
    fn test_unknown_command_fails_closed() {
        let matches = clap::Command::new("fact").get_matches_from(["fact"]);
        let error = build_action("console", &matches).unwrap_err();
        assert_eq!(error.exit_code(), FactExitCode::InternalError);
        assert_eq!(error.to_string(), "Command not found: console");
    }

    #[tokio::test]
    async fn test_data_commands_require_a_token() {
        let mut context = ExecutionContext::new(
            Configuration::default(),
            Credentials::default(),
            ConfigPaths::in_directory("/nonexistent"),
            Box::new(StubLookup),
        );
        let action = Action::Get {
            asset: Some("node01".to_string()),
            key: "rack".to_string(),
        };
        let error = action.run(&mut context).await.unwrap_err();
        assert_eq!(error.exit_code(), FactExitCode::CredentialsError);
    }
}

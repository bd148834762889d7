//! Execution context for the fact client.
//!
//! Everything a command needs is loaded once in `main` and handed to the
//! action through an [`ExecutionContext`] instead of living in globals.

use crate::{
    configuration::{ConfigPaths, Configuration},
    credentials::{Credentials, CredentialsError},
    error::FactError,
    metadata::MetadataClient,
    resolution::{AssetLookup, AssetResolver, CommandLookup},
};

/// Execution context containing common resources needed by CLI commands.
pub struct ExecutionContext {
    configuration: Configuration,
    credentials: Credentials,
    paths: ConfigPaths,
    lookup: Box<dyn AssetLookup>,
    asset_id: Option<String>,
}

impl ExecutionContext {
    pub fn new(
        configuration: Configuration,
        credentials: Credentials,
        paths: ConfigPaths,
        lookup: Box<dyn AssetLookup>,
    ) -> Self {
        Self {
            configuration,
            credentials,
            paths,
            lookup,
            asset_id: None,
        }
    }

    /// Loads the credentials next to the main configuration and wires up
    /// the inventory tool named by `asset_command`.
    pub fn from_environment(
        configuration: Configuration,
        paths: ConfigPaths,
    ) -> Result<Self, FactError> {
        let credentials = Credentials::load_or_default(&paths.credentials())?;
        let lookup = Box::new(CommandLookup::from_configuration(&configuration));
        Ok(Self::new(configuration, credentials, paths, lookup))
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn lookup(&self) -> &dyn AssetLookup {
        self.lookup.as_ref()
    }

    pub fn require_token(&self) -> Result<(), FactError> {
        if self.credentials.has_token() {
            Ok(())
        } else {
            Err(CredentialsError::MissingToken.into())
        }
    }

    /// Resolved at most once per invocation.
    pub fn asset_id(&mut self, explicit: Option<&str>) -> Result<String, FactError> {
        if let Some(id) = &self.asset_id {
            return Ok(id.clone());
        }

        let id = AssetResolver::new(&self.configuration, self.lookup.as_ref()).resolve(explicit)?;
        self.asset_id = Some(id.clone());
        Ok(id)
    }

    pub fn metadata_client(&self, asset_id: &str) -> Result<MetadataClient<'_>, FactError> {
        MetadataClient::new(&self.configuration, &self.credentials, asset_id)
    }
}

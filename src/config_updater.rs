//! Reconfiguration of the token and the default asset.
//!
//! [`ConfigUpdater`] starts from what was loaded at process start, tracks
//! which of the two documents really changed and writes them back only
//! after both have passed a write check. A failed check leaves both files
//! untouched.

use crate::{
    configuration::{ConfigPaths, Configuration, DefaultAsset},
    credentials::Credentials,
    error::FactError,
    metadata::MetadataClient,
    resolution::AssetLookup,
};
use std::{fs, path::Path};
use tracing::{debug, info, warn};

pub struct ConfigUpdater<'a> {
    configuration: Configuration,
    paths: &'a ConfigPaths,
    lookup: &'a dyn AssetLookup,
    original_token: Option<String>,
    token: Option<String>,
    original_asset: DefaultAsset,
}

impl<'a> ConfigUpdater<'a> {
    pub fn new(
        configuration: Configuration,
        credentials: &Credentials,
        paths: &'a ConfigPaths,
        lookup: &'a dyn AssetLookup,
    ) -> Self {
        let original_asset = configuration.default_asset().clone();
        let original_token = credentials.jwt().map(str::to_string);
        Self {
            configuration,
            paths,
            lookup,
            token: original_token.clone(),
            original_token,
            original_asset,
        }
    }

    pub fn original_token(&self) -> Option<&str> {
        self.original_token.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn asset(&self) -> &DefaultAsset {
        self.configuration.default_asset()
    }

    pub fn main_changed(&self) -> bool {
        self.configuration.default_asset() != &self.original_asset
    }

    pub fn credentials_changed(&self) -> bool {
        self.token != self.original_token
    }

    /// `None` or an empty token removes the stored one.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    pub fn set_asset_by_id(&mut self, id: impl Into<String>) {
        self.set_asset(DefaultAsset::ExplicitId(id.into()));
    }

    /// Resolution is left to [`ConfigUpdater::validate`] or to the next run.
    pub fn set_asset_by_name(&mut self, name: impl Into<String>) {
        self.set_asset(DefaultAsset::PendingName(name.into()));
    }

    /// Switches to multi-asset mode.
    pub fn clear_asset(&mut self) {
        self.set_asset(DefaultAsset::NoDefault);
    }

    fn set_asset(&mut self, asset: DefaultAsset) {
        let configuration = std::mem::take(&mut self.configuration);
        self.configuration = configuration.with_default_asset(asset);
    }

    /// Resolves a pending name if the inventory tool knows it, keeping the name otherwise.
    pub fn try_resolve_pending(&mut self) {
        let name = match self.asset() {
            DefaultAsset::PendingName(name) => name.clone(),
            _ => return,
        };

        match self.lookup.lookup(&name) {
            Ok(id) => {
                debug!("Resolved asset {} to {}", name, id);
                self.set_asset_by_id(id);
            }
            Err(e) => {
                debug!("{}", e);
                warn!(
                    "Failed to resolve asset: {}. Continuing with an unresolved asset name",
                    name
                );
            }
        }
    }

    /// Resolves a pending name and proves the new settings against the live service.
    pub async fn validate(&mut self) -> Result<(), FactError> {
        let id = match self.asset().clone() {
            DefaultAsset::PendingName(name) => {
                let id = self.lookup.lookup(&name).map_err(|e| {
                    debug!("{}", e);
                    FactError::ValidationError(format!(
                        "Could not locate the specified asset!\n\
                         Please ensure the following executes correctly and try again:\n{}",
                        self.lookup.describe(&name)
                    ))
                })?;
                self.set_asset_by_id(id.clone());
                id
            }
            DefaultAsset::ExplicitId(id) => id,
            DefaultAsset::NoDefault => {
                return Err(FactError::InputError(
                    "Validation is not possible in multi-asset mode".to_string(),
                ))
            }
        };

        let credentials = Credentials::new(self.token.clone());
        let client = MetadataClient::new(&self.configuration, &credentials, id.as_str())
            .map_err(|e| {
                debug!("Client setup failed: {}", e.chain());
                FactError::ValidationError(format!(
                    "The metadata service can not be reached with the current configuration:\n{}",
                    e
                ))
            })?;

        client.fetch_all().await.map(|_| ()).map_err(|e| {
            debug!("Validation request failed: {}", e.chain());
            FactError::ValidationError(format!(
                "Could not access the metadata of asset: {}\n\
                 Please check the asset exists and the API token has not expired",
                id
            ))
        })
    }

    /// Writes the changed documents, after every one of them passed [`assert_writable`].
    pub fn save(&self) -> Result<(), FactError> {
        let main = self.paths.main();
        let credentials = self.paths.credentials();

        if self.main_changed() {
            assert_writable(&main)?;
        }
        if self.credentials_changed() {
            assert_writable(&credentials)?;
        }

        if self.main_changed() {
            info!("Updating: {}", main.display());
            self.configuration.save(&main)?;
        } else {
            info!("Skipping: {}", main.display());
        }

        if self.credentials_changed() {
            info!("Updating: {}", credentials.display());
            Credentials::new(self.token.clone()).save(&credentials)?;
        } else {
            info!("Skipping: {}", credentials.display());
        }
        Ok(())
    }
}

/// Proves `path` can be written without changing its content.
///
/// An existing file gets its own bytes written back, a missing one is
/// created and removed again.
pub fn assert_writable(path: &Path) -> Result<(), FactError> {
    let denied = |cause: std::io::Error| FactError::PermissionError {
        path: path.to_path_buf(),
        cause,
    };

    if path.exists() {
        let bytes = fs::read(path).map_err(denied)?;
        fs::write(path, bytes).map_err(denied)?;
    } else {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(denied)?;
        }
        fs::File::create(path).map_err(denied)?;
        fs::remove_file(path).map_err(denied)?;
    }
    Ok(())
}

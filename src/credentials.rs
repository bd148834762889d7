//! The stored API token.
//!
//! Credentials live in their own document so that the main configuration can
//! be shared between users while every user keeps a private token.

use crate::{
    configuration::{write_atomically, Configuration, ConfigurationError, APP_NAME},
    http_utils::{api_root, ApiClient, RequestError},
};
use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fs, path::Path};
use thiserror::Error;
use tracing::{debug, warn};

const MASK_VISIBLE_CHARS: usize = 8;
const MASK_PREFIX_LENGTH: usize = 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("The API access token has not been set! Please see: {} configure", APP_NAME)]
    MissingToken,
    #[error("The API access token is malformed! Please regenerate it and run: {} configure", APP_NAME)]
    MalformedToken,
    #[error("The API access token has expired! Please regenerate it and run: {} configure", APP_NAME)]
    ExpiredToken,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    jwt: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<u64>,
}

impl Credentials {
    /// An empty token is the same as no token.
    pub fn new(jwt: Option<String>) -> Self {
        Self {
            jwt: jwt.filter(|v| !v.is_empty()),
        }
    }

    pub fn jwt(&self) -> Option<&str> {
        self.jwt.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.jwt.is_some()
    }

    pub fn load_or_default(path: &Path) -> Result<Credentials, ConfigurationError> {
        if !path.exists() {
            warn!(
                "Could not locate: {}. Using blank credentials instead",
                path.display()
            );
            return Ok(Credentials::default());
        }

        let data = fs::read_to_string(path).map_err(|cause| ConfigurationError::FailedToLoadData {
            path: path.to_path_buf(),
            cause: Box::new(cause),
        })?;
        if data.trim().is_empty() {
            return Ok(Credentials::default());
        }

        serde_yaml::from_str(&data).map_err(|cause| ConfigurationError::FailedToLoadData {
            path: path.to_path_buf(),
            cause: Box::new(cause),
        })
    }

    /// An absent token is left out of the document entirely.
    pub fn save(&self, path: &Path) -> Result<(), ConfigurationError> {
        let data = serde_yaml::to_string(self).map_err(|cause| {
            ConfigurationError::FailedToWriteData {
                path: path.to_path_buf(),
                cause: Box::new(cause),
            }
        })?;
        write_atomically(path, &data)
    }

    pub fn headers(&self) -> Result<HeaderMap, RequestError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.jwt().unwrap_or("")))
            .map_err(|_| RequestError::InvalidToken)?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        Ok(headers)
    }

    /// Builds a client rooted at `base_url` + `api_prefix` carrying this token.
    pub fn build_client(&self, configuration: &Configuration) -> Result<ApiClient, RequestError> {
        let base_url = configuration
            .base_url()
            .ok_or(RequestError::MissingBaseUrl)?;
        let root = api_root(base_url, configuration.api_prefix())?;
        debug!("API root: {}", root);
        ApiClient::new(root, self.headers()?)
    }

    pub fn check_token_freshness(&self) -> Result<(), CredentialsError> {
        match self.jwt() {
            Some(token) => check_token_freshness(token),
            None => Err(CredentialsError::MissingToken),
        }
    }
}

/// Decodes the claims without verifying the signature and rejects expired tokens.
///
/// The signature can only be checked by the service, so any well-formed
/// token passes unless its `exp` claim lies in the past.
pub fn check_token_freshness(token: &str) -> Result<(), CredentialsError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.leeway = 0;

    // The key is never consulted once signature validation is off.
    let key = DecodingKey::from_secret(&[]);
    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => CredentialsError::ExpiredToken,
        _ => {
            debug!("Token could not be decoded: {}", e);
            CredentialsError::MalformedToken
        }
    })?;

    debug!("Token expires at: {:?}", data.claims.exp);
    Ok(())
}

/// Hides all but the last eight characters of a token for display.
pub fn mask(token: Option<&str>) -> Option<String> {
    let token = token?;
    let length = token.chars().count();
    if length < MASK_VISIBLE_CHARS {
        return Some("*".repeat(length));
    }

    let tail: String = token.chars().skip(length - MASK_VISIBLE_CHARS).collect();
    Some(format!("{}{}", "*".repeat(MASK_PREFIX_LENGTH), tail))
}

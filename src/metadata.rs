//! Requests against an asset's metadata collection.
//!
//! Every entry lives under `assets/{asset_id}/metadata/{key}`. The same 404
//! means different things depending on the call site: a missing collection
//! is a broken asset reference, a missing entry is a missing key. Before a
//! 404 is reported, the stored token is checked, since an expired token can
//! look exactly like a missing resource.

use crate::{
    configuration::Configuration,
    credentials::Credentials,
    error::FactError,
    format::render_value,
    http_utils::{ApiClient, RequestError},
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Keys longer than this many characters are cut off in error messages.
const KEY_PREVIEW_LENGTH: usize = 11;

/// Percent-encodes a key as one URL path segment.
///
/// Whitespace characters are encoded one by one between the encoded literal
/// runs, so runs of spaces survive byte-for-byte. Literal dots are encoded as
/// well.
pub fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    let mut run = String::new();

    for c in key.chars() {
        if c.is_whitespace() {
            encoded.push_str(&encode_literal(&run));
            run.clear();
            let mut buffer = [0u8; 4];
            encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut buffer)));
        } else {
            run.push(c);
        }
    }
    encoded.push_str(&encode_literal(&run));
    encoded
}

fn encode_literal(run: &str) -> String {
    urlencoding::encode(run).replace('.', "%2E")
}

pub fn collection_path(asset_id: &str) -> String {
    format!("assets/{}/metadata", urlencoding::encode(asset_id))
}

/// Rejects keys that can not address exactly one entry.
pub fn validate_key(key: &str, max_key_length: usize) -> Result<(), FactError> {
    match key {
        "" => return Err(FactError::InputError("The key can not be empty".to_string())),
        "." | ".." => {
            return Err(FactError::InputError(format!(
                "The key '{}' can not be used, it does not name a single entry",
                key
            )))
        }
        _ => {}
    }

    if key.chars().count() > max_key_length {
        let preview: String = key.chars().take(KEY_PREVIEW_LENGTH).collect();
        return Err(FactError::InputError(format!(
            "The following key exceeds the maximum length: {}...\nThe maximum length is {} characters",
            preview, max_key_length
        )));
    }
    Ok(())
}

/// Metadata operations bound to one resolved asset.
pub struct MetadataClient<'a> {
    api: ApiClient,
    configuration: &'a Configuration,
    credentials: &'a Credentials,
    asset_id: String,
}

impl<'a> MetadataClient<'a> {
    pub fn new(
        configuration: &'a Configuration,
        credentials: &'a Credentials,
        asset_id: impl Into<String>,
    ) -> Result<Self, FactError> {
        let api = credentials.build_client(configuration)?;
        Ok(Self {
            api,
            configuration,
            credentials,
            asset_id: asset_id.into(),
        })
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub async fn fetch_all(&self) -> Result<BTreeMap<String, Value>, FactError> {
        let path = collection_path(&self.asset_id);
        let body = self
            .api
            .get(&path)
            .await
            .map_err(|e| self.classify(e, FactError::asset_missing_by_id))?;

        match body {
            Value::Object(entries) => Ok(entries.into_iter().collect()),
            Value::Null => Ok(BTreeMap::new()),
            other => Err(FactError::internal(format!(
                "Unexpected metadata collection received: {}",
                other
            ))),
        }
    }

    pub async fn fetch_one(&self, key: &str) -> Result<Value, FactError> {
        let path = self.key_path(key)?;
        self.api.get(&path).await.map_err(|e| {
            self.classify(e, || FactError::MissingKey {
                key: key.to_string(),
            })
        })
    }

    /// Checks run locally before anything is sent.
    pub async fn set_one(&self, key: &str, value: &Value) -> Result<(), FactError> {
        let path = self.key_path(key)?;
        self.check_value(key, value)?;

        self.api
            .put(&path, value)
            .await
            .map_err(|e| self.classify(e, FactError::asset_missing_by_id))
    }

    pub async fn delete_one(&self, key: &str) -> Result<(), FactError> {
        let path = self.key_path(key)?;
        self.api
            .delete(&path)
            .await
            .map_err(|e| self.classify(e, FactError::asset_missing_by_id))
    }

    fn key_path(&self, key: &str) -> Result<String, FactError> {
        validate_key(key, self.configuration.max_key_length())?;
        Ok(format!(
            "{}/{}",
            collection_path(&self.asset_id),
            encode_key(key)
        ))
    }

    fn check_value(&self, key: &str, value: &Value) -> Result<(), FactError> {
        let serialized = serde_json::to_string(value).map_err(RequestError::from)?;
        let max_value_length = self.configuration.max_value_length();
        if serialized.chars().count() > max_value_length {
            return Err(FactError::InputError(format!(
                "The value for '{}' exceeds the maximum length of {} characters",
                key, max_value_length
            )));
        }

        if self
            .configuration
            .disabled_special_keys()
            .iter()
            .any(|disabled| disabled == key)
        {
            return Err(FactError::InputError(format!(
                "The key '{}' has been disabled on this installation",
                key
            )));
        }

        if let Some(allowed) = self.configuration.allowed_special_keys().get(key) {
            let rendered = render_value(value);
            if !allowed.iter().any(|v| *v == rendered) {
                return Err(FactError::InputError(format!(
                    "Invalid value for '{}': {}\nAllowed values: {}",
                    key,
                    rendered,
                    allowed.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Turns a 404 into `missing`, unless the token explains it better.
    fn classify(&self, error: RequestError, missing: impl FnOnce() -> FactError) -> FactError {
        match error {
            RequestError::NotFound(url) => {
                debug!("Not found: {}", url);
                if let Err(e) = self.credentials.check_token_freshness() {
                    warn!("The request failed with an unusable token: {}", e);
                    return e.into();
                }
                missing()
            }
            other => other.into(),
        }
    }
}

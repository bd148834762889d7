use std::path::PathBuf;
use thiserror::Error;

use crate::{
    configuration::ConfigurationError, credentials::CredentialsError,
    exit_codes::FactExitCode, format::FormattingError, http_utils::RequestError,
    resolution::LookupError,
};

const CONTACT_ADMINISTRATOR: &str =
    "Please contact your system administrator for further assistance";

/// Everything a command can fail with
#[derive(Debug, Error, strum::IntoStaticStr)]
pub enum FactError {
    /// User supplied data must be changed
    #[error("{0}")]
    InputError(String),
    /// No asset exists under the name the user supplied
    #[error("{0}")]
    MissingAsset(String),
    /// The asset exists but has no entry for the key
    #[error("Could not find an entry for: {key}")]
    MissingKey { key: String },
    /// Token missing, malformed or expired
    #[error(transparent)]
    CredentialsError(#[from] CredentialsError),
    /// A configuration file that is about to change can not be written
    #[error("You do not have permission to update the following config: {}", .path.display())]
    PermissionError {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
    /// A live check of the configuration failed
    #[error("{0}")]
    ValidationError(String),
    #[error("{message}")]
    InternalError {
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),
    #[error("Request failed: {}\n{}", .0, CONTACT_ADMINISTRATOR)]
    RequestError(#[from] RequestError),
    #[error("Prompt failed: {0}")]
    PromptError(#[from] inquire::InquireError),
    #[error("Formatting error: {0}")]
    FormattingError(#[from] FormattingError),
}

impl FactError {
    pub fn internal(message: impl Into<String>) -> Self {
        FactError::InternalError {
            message: message.into(),
            cause: None,
        }
    }

    pub fn internal_with(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FactError::InternalError {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// The asset vanished after resolution or the connection points at the wrong service.
    pub fn asset_missing_by_id() -> Self {
        FactError::internal(format!(
            "Could not find the specified asset by its identifier\n{}",
            CONTACT_ADMINISTRATOR
        ))
    }

    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> FactExitCode {
        match self {
            FactError::InputError(_) => FactExitCode::InputError,
            FactError::MissingAsset(_) => FactExitCode::MissingAsset,
            FactError::MissingKey { .. } => FactExitCode::MissingKey,
            FactError::CredentialsError(_) => FactExitCode::CredentialsError,
            FactError::PermissionError { .. } => FactExitCode::PermissionError,
            FactError::ValidationError(_) => FactExitCode::ValidationError,
            FactError::ConfigurationError(_) => FactExitCode::GeneralError,
            FactError::PromptError(_) => FactExitCode::GeneralError,
            FactError::InternalError { .. }
            | FactError::CommandNotFound(_)
            | FactError::RequestError(_)
            | FactError::FormattingError(_) => FactExitCode::InternalError,
        }
    }

    /// Renders the full `source()` chain, outermost first.
    pub fn chain(&self) -> String {
        let mut lines = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            lines.push(format!("caused by: {}", cause));
            source = cause.source();
        }
        lines.join("\n")
    }
}

impl From<LookupError> for FactError {
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::NotFound { .. } => FactError::MissingAsset(error.to_string()),
            LookupError::Internal { .. } => {
                let message = format!("{}\n{}", error, CONTACT_ADMINISTRATOR);
                FactError::internal_with(message, error)
            }
        }
    }
}

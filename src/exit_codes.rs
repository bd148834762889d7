//! Exit codes for the fact client
//!
//! Every failure a command can raise maps onto one of these codes so that
//! scripts can tell a missing key apart from an expired token or a broken
//! installation.

/// Process exit codes
///
/// Low codes describe problems with the installation or user input, the
/// 20+ band describes things the remote service could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactExitCode {
    /// Success (0) - Command completed successfully
    Success = 0,

    /// Internal error (1) - Something unexpected happened, contact an administrator
    InternalError = 1,

    /// General error (2) - Recoverable failure without a more specific code
    GeneralError = 2,

    /// Input error (3) - User supplied data must be changed
    InputError = 3,

    /// Validation error (5) - A live check of the configuration failed
    ValidationError = 5,

    /// Credentials error (6) - Token missing, malformed or expired
    CredentialsError = 6,

    /// Permission error (7) - A configuration file can not be written
    PermissionError = 7,

    /// Missing asset (21) - No asset exists with the given name
    MissingAsset = 21,

    /// Missing key (22) - The asset has no entry for the key
    MissingKey = 22,
}

impl FactExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get descriptive message for the exit code
    pub fn message(&self) -> &'static str {
        match self {
            FactExitCode::Success => "Success",
            FactExitCode::InternalError => "Internal error",
            FactExitCode::GeneralError => "General error",
            FactExitCode::InputError => "Input error",
            FactExitCode::ValidationError => "Validation error",
            FactExitCode::CredentialsError => "Credentials error",
            FactExitCode::PermissionError => "Permission error",
            FactExitCode::MissingAsset => "Asset not found",
            FactExitCode::MissingKey => "Entry not found",
        }
    }
}

impl From<FactExitCode> for i32 {
    fn from(code: FactExitCode) -> Self {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_published_values() {
        assert_eq!(FactExitCode::Success.code(), exitcode::OK);
        assert_eq!(FactExitCode::InternalError.code(), 1);
        assert_eq!(FactExitCode::InputError.code(), 3);
        assert_eq!(FactExitCode::MissingAsset.code(), 21);
        assert_eq!(i32::from(FactExitCode::MissingKey), 22);
    }
}

//! Unified error type for adreward.

use std::path::PathBuf;

use adreward_accounting::AccountingError;
use adreward_credentials::CredentialError;
use adreward_protocol::ProtocolError;
use adreward_timer::TimerError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` variants let `?` convert sub-crate errors, so callers of
/// the facade handle a single type.
#[derive(Debug, thiserror::Error)]
pub enum AdRewardError {
    /// No credential is stored, or the API rejected the one that is.
    /// The caller should send the user to sign in.
    #[error("not signed in")]
    Unauthenticated,

    /// Encoding or decoding a message failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A call to the accounting API failed.
    #[error(transparent)]
    Accounting(#[from] AccountingError),

    /// Reading or writing the stored credential failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The reward timer rejected an operation.
    #[error(transparent)]
    Timer(#[from] TimerError),

    /// The config file couldn't be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from loading a [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use adreward_protocol::AdId;

    use super::*;

    #[test]
    fn test_from_accounting_error() {
        let err = AccountingError::Unauthorized(401);
        let adreward_err: AdRewardError = err.into();
        assert!(matches!(adreward_err, AdRewardError::Accounting(_)));
        assert!(adreward_err.to_string().contains("401"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let adreward_err: AdRewardError = err.into();
        assert!(matches!(adreward_err, AdRewardError::Protocol(_)));
    }

    #[test]
    fn test_from_credential_error() {
        let adreward_err: AdRewardError = CredentialError::EmptyToken.into();
        assert!(matches!(adreward_err, AdRewardError::Credential(_)));
    }

    #[test]
    fn test_from_timer_error() {
        let err = TimerError::SessionActive(AdId::new("a1"));
        let adreward_err: AdRewardError = err.into();
        assert!(matches!(adreward_err, AdRewardError::Timer(_)));
        assert!(adreward_err.to_string().contains("a1"));
    }

    #[test]
    fn test_from_toml_error() {
        let err = toml::from_str::<toml::Table>("= nope").unwrap_err();
        let adreward_err: AdRewardError = ConfigError::from(err).into();
        assert!(matches!(adreward_err, AdRewardError::Config(ConfigError::Parse(_))));
    }
}

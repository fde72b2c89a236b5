//! Error types for the credential layer.

/// Errors that can occur while loading or persisting credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// No credential is stored. The user has to sign in again; every
    /// authenticated call is impossible until they do.
    #[error("no stored credential, sign-in required")]
    Missing,

    /// A credential with an empty token was about to be stored or was
    /// found on disk. Treated like a missing credential by callers.
    #[error("credential token is empty")]
    EmptyToken,

    /// The credential couldn't be parsed from (or rendered to) JSON.
    #[error("credential file is malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Reading, writing, or deleting the credential file failed.
    #[error("credential storage failed: {0}")]
    Io(#[from] std::io::Error),
}

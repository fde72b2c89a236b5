//! The persisted credential: a bearer token plus the role flag.

use std::fmt;

use adreward_protocol::Role;
use serde::{Deserialize, Serialize};

use crate::CredentialError;

/// What the client keeps between runs so the user stays signed in.
///
/// Serialized as `{"token": "...", "role": "user"}`. `Debug` redacts the
/// token so a stray `?credentials` in a log line can't leak it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    #[serde(default)]
    pub role: Role,
}

impl Credentials {
    /// Creates a credential, rejecting blank tokens.
    pub fn new(
        token: impl Into<String>,
        role: Role,
    ) -> Result<Self, CredentialError> {
        let creds = Self {
            token: token.into(),
            role,
        };
        creds.check()?;
        Ok(creds)
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub(crate) fn check(&self) -> Result<(), CredentialError> {
        if self.token.trim().is_empty() {
            return Err(CredentialError::EmptyToken);
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

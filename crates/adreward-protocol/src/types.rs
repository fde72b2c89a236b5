//! Core types shared by every adreward layer.
//!
//! These are the structures that cross the wire between the client and the
//! remote accounting API (ads, accounts, balance updates) plus the identity
//! newtypes the rest of the workspace passes around.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of a sponsored ad.
///
/// The remote API owns ad ids and we never interpret them, so this wraps an
/// opaque string. `#[serde(transparent)]` keeps it a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdId(pub String);

impl AdId {
    /// Creates an `AdId` from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice (for URL paths and logging).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a platform user. Opaque, like [`AdId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a `UserId` from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-side identifier of one ad-viewing session.
///
/// Never sent to the server; it exists so log lines from the same
/// view-to-reward cycle can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V-{:016x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

/// An amount of reward credit, counted in hundredths (cents).
///
/// Integer arithmetic keeps `balance + price` exact; floats would drift
/// after enough small rewards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
    Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Credits(pub u64);

impl Credits {
    /// Zero credits.
    pub const ZERO: Credits = Credits(0);

    /// Builds an amount from whole units and cents, e.g. `(1, 25)` = 1.25.
    pub fn from_parts(units: u64, cents: u64) -> Self {
        Self(units * 100 + cents)
    }

    /// Adds two amounts, saturating at `u64::MAX` instead of wrapping.
    pub fn saturating_add(self, other: Credits) -> Credits {
        Credits(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The role flag persisted next to the auth token.
///
/// Admins see the review dashboard; everyone else sees the ad board.
/// Serialized lowercase (`"user"`, `"admin"`) to match the API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Returns `true` for administrator accounts.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

// ---------------------------------------------------------------------------
// Ad and Account
// ---------------------------------------------------------------------------

/// One entry of the ad grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    pub title: String,
    /// Click-through destination opened when the user activates the ad.
    pub target_url: String,
    /// Credit granted for a confirmed, full-duration view.
    pub price: Credits,
}

/// The signed-in user's account as returned by `GET users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub balance: Credits,
    /// Older API deployments omit the role; those accounts are plain users.
    #[serde(default)]
    pub role: Role,
}

/// Body of `PUT users/{user_id}/balance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceUpdate {
    pub balance: Credits,
}

// =========================================================================
// Tests
// =========================================================================

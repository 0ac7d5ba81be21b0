//! Typed records for the server-side resources
//!
//! These structs mirror the JSON bodies the backend sends and receives.
//! Only fields the client actually works with are modelled; unknown fields
//! in responses are ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Membership permission levels within a team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permissions {
    #[default]
    Read,
    Write,
    Admin,
}

impl std::fmt::Display for Permissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Permissions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" | "r" => Ok(Self::Read),
            "write" | "w" => Ok(Self::Write),
            "admin" | "a" => Ok(Self::Admin),
            _ => Err(format!("Invalid permissions: {}. Use read, write, or admin.", s)),
        }
    }
}

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub pk: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub joined: Option<DateTime<Utc>>,
}

/// A dataset: a named, versioned collection of files within a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub pk: i64,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: i64,
    pub license: i64,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub creator: Option<i64>,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    /// Set when the dataset has been soft-deleted
    #[serde(default)]
    pub deletion_time: Option<DateTime<Utc>>,
}

impl Dataset {
    /// Whether the dataset has been soft-deleted on the server
    pub fn is_deleted(&self) -> bool {
        self.deletion_time.is_some()
    }
}

/// A project groups datasets under a team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub pk: i64,
    pub name: String,
    pub team: i64,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
}

/// A team of users collaborating on projects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub pk: i64,
    pub name: String,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
}

/// An organisation owning teams
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organisation {
    pub pk: i64,
    pub name: String,
}

/// A user's membership in a team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub pk: i64,
    pub team: i64,
    pub username: String,
    #[serde(default)]
    pub permissions: Permissions,
}

/// A dataset license
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub pk: i64,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A machine-learning framework known to the backend (read-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Framework {
    pub pk: i64,
    pub name: String,
    pub version: String,
}

/// A problem domain known to the backend (read-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub pk: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// --- Request payloads ---

/// Payload for creating a user
#[derive(Debug, Clone, Serialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Partial-update payload for a user; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Payload for creating a dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetCreate {
    pub name: String,
    pub project: i64,
    pub license: i64,
    pub is_public: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tags: String,
}

/// Partial-update payload for a dataset
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// Payload for creating a project
#[derive(Debug, Clone, Serialize)]
pub struct ProjectCreate {
    pub name: String,
    pub team: i64,
}

/// Payload for creating a team
#[derive(Debug, Clone, Serialize)]
pub struct TeamCreate {
    pub name: String,
}

/// Payload for creating an organisation
#[derive(Debug, Clone, Serialize)]
pub struct OrganisationCreate {
    pub name: String,
}

/// Payload for creating a license
#[derive(Debug, Clone, Serialize)]
pub struct LicenseCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    1
}

//! Service configuration.
//!
//! Configuration is loaded once at start from environment variables, with
//! defaults suitable for local development.

use school_org::ParentPolicy;
use std::net::SocketAddr;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,

    /// Behaviour when a create names an unknown parent.
    pub parent_policy: ParentPolicy,

    /// Reject memberships whose org unit does not exist.
    pub validate_membership_unit: bool,

    /// Allow at most one membership per (user, org unit) pair.
    pub unique_memberships: bool,

    /// Check callers against their memberships instead of allowing everything.
    pub enforce_access: bool,

    /// User IDs with unrestricted access when enforcement is on.
    pub superusers: Vec<String>,
}

impl Default for ServerConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            parent_policy: ParentPolicy::Strict,
            validate_membership_unit: true,
            unique_memberships: true,
            enforce_access: false,
            superusers: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SCHOOL_ORG_BIND_ADDR`: Listen address (default: 127.0.0.1:8080)
    /// - `SCHOOL_ORG_PARENT_POLICY`: `strict` or `root` (default: strict)
    /// - `SCHOOL_ORG_VALIDATE_MEMBERSHIP_UNIT`: Check org unit exists (default: true)
    /// - `SCHOOL_ORG_UNIQUE_MEMBERSHIPS`: One membership per pair (default: true)
    /// - `SCHOOL_ORG_ENFORCE_ACCESS`: Membership-based access checks (default: false)
    /// - `SCHOOL_ORG_SUPERUSERS`: Comma-separated superuser IDs (default: none)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let bind_addr = match lookup("SCHOOL_ORG_BIND_ADDR") {
            Some(raw) => raw
                .trim()
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "SCHOOL_ORG_BIND_ADDR".to_string(),
                    message: e.to_string(),
                })?,
            None => default.bind_addr,
        };

        let parent_policy = match lookup("SCHOOL_ORG_PARENT_POLICY") {
            Some(raw) => ParentPolicy::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "SCHOOL_ORG_PARENT_POLICY".to_string(),
                message: format!("expected `strict` or `root`, got `{raw}`"),
            })?,
            None => default.parent_policy,
        };

        let superusers = lookup("SCHOOL_ORG_SUPERUSERS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(default.superusers);

        Ok(Self {
            bind_addr,
            parent_policy,
            validate_membership_unit: parse_flag(
                &lookup,
                "SCHOOL_ORG_VALIDATE_MEMBERSHIP_UNIT",
                default.validate_membership_unit,
            )?,
            unique_memberships: parse_flag(
                &lookup,
                "SCHOOL_ORG_UNIQUE_MEMBERSHIPS",
                default.unique_memberships,
            )?,
            enforce_access: parse_flag(
                &lookup,
                "SCHOOL_ORG_ENFORCE_ACCESS",
                default.enforce_access,
            )?,
            superusers,
        })
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected a boolean, got `{other}`"),
            }),
        },
    }
}

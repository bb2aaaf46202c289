use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::client::DaikinClientBuilder;
use crate::entity::UidSchema;
use crate::types::Credentials;
use crate::{Error, Result};

pub const ENTRY_TITLE: &str = "Daikin One";
pub const CONFIG_VERSION: u32 = 1;
pub const CONFIG_MINOR_VERSION: u32 = 2;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryData {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_uid_schema_version: Option<UidSchema>,
}

impl fmt::Debug for EntryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryData")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("entity_uid_schema_version", &self.entity_uid_schema_version)
            .finish()
    }
}

/// Persisted account configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub version: u32,
    #[serde(default = "default_minor_version")]
    pub minor_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub data: EntryData,
}

fn default_minor_version() -> u32 {
    1
}

impl ConfigEntry {
    /// A fresh entry at the current version using key-based unique ids.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            version: CONFIG_VERSION,
            minor_version: CONFIG_MINOR_VERSION,
            title: Some(ENTRY_TITLE.to_string()),
            data: EntryData {
                email: credentials.email,
                password: credentials.password,
                entity_uid_schema_version: Some(UidSchema::V1),
            },
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Brings an older entry up to the current version. Entries from before
    /// 1.2 keep name-based unique ids. Returns whether anything changed.
    pub fn migrate(&mut self) -> Result<bool> {
        debug!(
            version = self.version,
            minor_version = self.minor_version,
            "migrating config entry"
        );

        if self.version > CONFIG_VERSION {
            error!(
                version = self.version,
                minor_version = self.minor_version,
                "incompatible downgrade detected, restore an earlier backup or re-add the account"
            );
            return Err(Error::Config(format!(
                "unsupported config entry version {}.{}",
                self.version, self.minor_version
            )));
        }

        let mut changed = false;
        if self.version == CONFIG_VERSION && self.minor_version < CONFIG_MINOR_VERSION {
            self.minor_version = CONFIG_MINOR_VERSION;
            self.data.entity_uid_schema_version = Some(UidSchema::Legacy);
            changed = true;
        }

        info!(
            version = self.version,
            minor_version = self.minor_version,
            "config entry migration successful"
        );
        Ok(changed)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.data.email.clone(), self.data.password.clone())
    }

    pub fn uid_schema(&self) -> Result<UidSchema> {
        self.data
            .entity_uid_schema_version
            .ok_or_else(|| Error::Config("entry has no entity uid schema version".to_string()))
    }
}

/// Reason an account could not be added.
#[derive(Debug)]
pub enum FlowError {
    AuthFailed(Error),
    Setup(Error),
}

impl FlowError {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowError::AuthFailed(_) => "auth_failed",
            FlowError::Setup(_) => "unknown",
        }
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::AuthFailed(e) => write!(f, "{}: {e}", self.as_str()),
            FlowError::Setup(e) => write!(f, "{}: {e}", self.as_str()),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowError::AuthFailed(e) | FlowError::Setup(e) => Some(e),
        }
    }
}

/// Checks the builder's credentials with a login before producing an entry.
pub async fn create_entry(
    builder: DaikinClientBuilder,
) -> std::result::Result<ConfigEntry, FlowError> {
    let credentials = builder.credentials().clone();
    let client = builder.build().map_err(FlowError::Setup)?;
    client.login().await.map_err(FlowError::AuthFailed)?;
    Ok(ConfigEntry::new(credentials))
}

//! Appservice registration file.
//!
//! Only the fields these tools consume are modelled; everything else in the
//! document (namespaces, rate limiting, ...) is ignored.

use crate::error::BridgeError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REGISTRATION_PATH: &str = "/etc/matrix-synapse/appservice.reg.yaml";
pub const DEFAULT_HOMESERVER: &str = "https://diasp.in";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub as_token: Option<String>,
    #[serde(skip)]
    path: PathBuf,
}

impl Registration {
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let content = fs::read_to_string(path).map_err(|source| BridgeError::ReadRegistration {
            path: path.to_path_buf(),
            source,
        })?;
        let mut registration = Self::parse(&content).map_err(|source| {
            BridgeError::ParseRegistration {
                path: path.to_path_buf(),
                source,
            }
        })?;
        registration.path = path.to_path_buf();
        tracing::debug!(
            path = %path.display(),
            id = registration.id.as_deref().unwrap_or("-"),
            "loaded registration"
        );
        Ok(registration)
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// The token the appservice authenticates to the homeserver with.
    pub fn as_token(&self) -> Result<&str, BridgeError> {
        self.field("as_token", self.as_token.as_deref())
    }

    /// Base URL of the bridge, which also serves the provisioning API.
    pub fn url(&self) -> Result<&str, BridgeError> {
        self.field("url", self.url.as_deref())
            .map(|url| url.trim_end_matches('/'))
    }

    fn field<'a>(
        &self,
        field: &'static str,
        value: Option<&'a str>,
    ) -> Result<&'a str, BridgeError> {
        match value {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(BridgeError::MissingField {
                field,
                path: self.path.clone(),
            }),
        }
    }
}

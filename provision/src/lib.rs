//! Link or unlink a Matrix room to an IRC channel through the bridge's
//! provisioning API.
//!
//! The room alias is resolved on the homeserver, then a single request is
//! posted to the bridge itself (its registration `url`, not the homeserver).

use bridge_common::http;
use bridge_common::{BridgeError, HomeserverClient};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

pub const DEFAULT_IRC_SERVER: &str = "irc.piratpartiet.se";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionAction {
    Link,
    Unlink,
}

impl ProvisionAction {
    pub fn endpoint(self) -> &'static str {
        match self {
            ProvisionAction::Link => "/_matrix/provision/link",
            ProvisionAction::Unlink => "/_matrix/provision/unlink",
        }
    }
}

impl fmt::Display for ProvisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionAction::Link => write!(f, "link"),
            ProvisionAction::Unlink => write!(f, "unlink"),
        }
    }
}

/// Body of a link or unlink request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionRequest {
    pub remote_room_server: String,
    pub remote_room_channel: String,
    pub matrix_room_id: String,
    /// Only sent when linking; the bridge asks this nick to approve the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op_nick: Option<String>,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LinkOptions {
    pub action: ProvisionAction,
    pub alias: String,
    pub user_id: String,
    pub irc_server: String,
    pub channel: String,
    pub op_nick: String,
    pub key: Option<String>,
}

impl ProvisionRequest {
    pub fn new(options: &LinkOptions, matrix_room_id: impl Into<String>) -> Self {
        let op_nick = match options.action {
            ProvisionAction::Link => Some(options.op_nick.clone()),
            ProvisionAction::Unlink => None,
        };
        Self {
            remote_room_server: options.irc_server.clone(),
            remote_room_channel: options.channel.clone(),
            matrix_room_id: matrix_room_id.into(),
            op_nick,
            user_id: options.user_id.clone(),
            key: options.key.clone().filter(|key| !key.is_empty()),
        }
    }
}

pub struct ProvisionClient {
    base_url: String,
    client: Client,
}

impl ProvisionClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BridgeError> {
        Ok(Self {
            base_url: base_url.into(),
            client: http::client()?,
        })
    }

    /// Post the request and hand back whatever JSON the bridge answered.
    ///
    /// The status code is not checked: the bridge reports refusals in the
    /// body, which the caller prints as-is.
    pub fn submit(
        &self,
        action: ProvisionAction,
        request: &ProvisionRequest,
    ) -> Result<Value, BridgeError> {
        let url = http::join(&self.base_url, action.endpoint());
        tracing::debug!(
            %action,
            room_id = %request.matrix_room_id,
            channel = %request.remote_room_channel,
            "posting provisioning request"
        );

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .map_err(|err| BridgeError::Http(err.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%action, %status, "bridge rejected provisioning request");
        }
        http::json_body(response)
    }
}

pub fn run(
    hs: &HomeserverClient,
    bridge: &ProvisionClient,
    options: &LinkOptions,
) -> Result<Value, BridgeError> {
    let room_id = hs.resolve_alias(&options.alias)?;
    let request = ProvisionRequest::new(options, room_id);
    bridge.submit(options.action, &request)
}

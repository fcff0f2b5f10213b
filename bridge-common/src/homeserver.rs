//! Just enough of the Matrix Client-Server API (r0) to resolve a room alias
//! and read or replace a room's `m.room.power_levels` state event.

use crate::error::BridgeError;
use crate::http;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

const CLIENT_API: &str = "/_matrix/client/r0";

pub struct HomeserverClient {
    base_url: String,
    access_token: String,
    client: Client,
}

impl HomeserverClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, BridgeError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            access_token: access_token.into(),
            client: http::client()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, CLIENT_API, path)
    }

    fn power_levels_url(&self, room_id: &str) -> String {
        self.api_url(&format!(
            "/rooms/{}/state/m.room.power_levels",
            urlencoding::encode(room_id)
        ))
    }

    // The token travels in the query string, so it is stripped from
    // transport errors before they can reach a terminal.
    fn send(&self, request: RequestBuilder) -> Result<Response, BridgeError> {
        request
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .map_err(|err| BridgeError::Http(err.without_url()))
    }

    pub fn resolve_alias(&self, alias: &str) -> Result<String, BridgeError> {
        let url = self.api_url(&format!("/directory/room/{}", urlencoding::encode(alias)));
        tracing::debug!(alias, "resolving room alias");

        let body = http::json_body(self.send(self.client.get(url))?)?;
        match body.get("room_id").and_then(Value::as_str) {
            Some(room_id) if !room_id.is_empty() => {
                tracing::debug!(alias, room_id, "resolved room alias");
                Ok(room_id.to_string())
            }
            _ => {
                if let Some(BridgeError::Matrix { errcode, error }) = matrix_error(&body) {
                    tracing::debug!(alias, %errcode, %error, "directory lookup failed");
                }
                Err(BridgeError::AliasNotFound {
                    alias: alias.to_string(),
                })
            }
        }
    }

    pub fn power_levels(&self, room_id: &str) -> Result<PowerLevels, BridgeError> {
        tracing::debug!(room_id, "fetching power levels");
        let body = http::json_body(self.send(self.client.get(self.power_levels_url(room_id)))?)?;
        if let Some(err) = matrix_error(&body) {
            return Err(err);
        }
        Ok(serde_json::from_value(body)?)
    }

    pub fn put_power_levels(&self, room_id: &str, event: &PowerLevels) -> Result<(), BridgeError> {
        tracing::debug!(room_id, users = event.users.len(), "writing power levels");
        let request = self.client.put(self.power_levels_url(room_id)).json(event);
        let response = self
            .send(request)?
            .error_for_status()
            .map_err(|err| BridgeError::Http(err.without_url()))?;

        if let Ok(body) = http::json_body(response) {
            if let Some(event_id) = body.get("event_id").and_then(Value::as_str) {
                tracing::debug!(room_id, event_id, "power levels updated");
            }
        }
        Ok(())
    }
}

fn matrix_error(body: &Value) -> Option<BridgeError> {
    let errcode = body.get("errcode")?.as_str()?;
    let error = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    Some(BridgeError::Matrix {
        errcode: errcode.to_string(),
        error: error.to_string(),
    })
}

/// Content of an `m.room.power_levels` state event.
///
/// Only the target entry of `users` is interpreted; every other value, in
/// `users` or elsewhere, is carried through untouched so that writing the
/// event back does not rewrite levels stored as strings by older room
/// versions or drop homeserver-defined settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerLevels {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Map<String, Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl PowerLevels {
    /// Integer level of `user_id`; absent or non-integer entries read as 0.
    pub fn level_of(&self, user_id: &str) -> i64 {
        self.users
            .get(user_id)
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    pub fn set_level(&mut self, user_id: &str, level: i64) {
        self.users.insert(user_id.to_string(), Value::from(level));
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

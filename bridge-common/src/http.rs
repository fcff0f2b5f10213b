use crate::error::BridgeError;
use reqwest::blocking::{Client, Response};
use serde_json::Value;

pub const USER_AGENT: &str = concat!("bridge-tools/", env!("CARGO_PKG_VERSION"));

pub fn client() -> Result<Client, BridgeError> {
    let client = Client::builder().user_agent(USER_AGENT).build()?;
    Ok(client)
}

/// Decode a response body as JSON regardless of its status code.
pub fn json_body(response: Response) -> Result<Value, BridgeError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .map_err(|err| BridgeError::Http(err.without_url()))?;
    serde_json::from_slice(&bytes).map_err(|err| {
        tracing::debug!(%status, len = bytes.len(), "response body is not json");
        BridgeError::Json(err)
    })
}

/// Join a base URL and an absolute path without doubling the slash.
pub fn join(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

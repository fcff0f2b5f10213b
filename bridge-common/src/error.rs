use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("cannot read registration file {}: {source}", path.display())]
    ReadRegistration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse registration file {}: {source}", path.display())]
    ParseRegistration {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("cannot read {field} from registration file {}", path.display())]
    MissingField { field: &'static str, path: PathBuf },
    #[error("cannot resolve room alias {alias} to a room id")]
    AliasNotFound { alias: String },
    #[error("homeserver returned {errcode}: {error}")]
    Matrix { errcode: String, error: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub mod error;
pub mod homeserver;
pub mod http;
pub mod logging;
pub mod output;
pub mod registration;

pub use error::BridgeError;
pub use homeserver::{HomeserverClient, PowerLevels};
pub use registration::{Registration, DEFAULT_HOMESERVER, DEFAULT_REGISTRATION_PATH};

use serde::{Deserialize, Serialize};
use validator::Validate;

/// OSC delivery target.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct OscConfig {
    /// `host:port` of the OSC server.
    #[serde(default = "default_server")]
    pub server: String,
}

fn default_server() -> String {
    "127.0.0.1:3334".into()
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
        }
    }
}

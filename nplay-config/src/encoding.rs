use serde::{Deserialize, Serialize};
use validator::Validate;

use nplay_protocols::gotpacket::DEFAULT_MAX_STRING_LEN;
use nplay_protocols::AddressFormat;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct EncodingConfig {
    #[serde(default)]
    pub address_format: AddressFormat,

    /// Longest string argument accepted, in bytes.
    #[validate(range(min = 16, max = 65000))]
    #[serde(default = "default_max_string_len")]
    pub max_string_len: usize,

    /// Emit `/type/*` trigger messages alongside `/gotpacket`.
    #[serde(default)]
    pub triggers: bool,
}

fn default_max_string_len() -> usize {
    DEFAULT_MAX_STRING_LEN
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            address_format: AddressFormat::default(),
            max_string_len: default_max_string_len(),
            triggers: false,
        }
    }
}

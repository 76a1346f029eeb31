use bkload_frame::{DecodeOptions, BROADCAST_ADDRESS};
use serde::{Deserialize, Serialize};

/// Per-connection settings for [`Device`](crate::Device).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Address byte placed in every outbound frame.
    pub address: u8,
    /// Reject boolean bytes other than 0/1 in replies.
    pub strict_bool: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: BROADCAST_ADDRESS,
            strict_bool: false,
        }
    }
}

impl DeviceConfig {
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_strict_bool(mut self, strict: bool) -> Self {
        self.strict_bool = strict;
        self
    }

    /// Decode options implied by this config.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            lenient_bool: !self.strict_bool,
        }
    }
}

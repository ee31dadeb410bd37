//! # Adapter configuration
//!
//! All timeouts are given in milliseconds. The defaults match ESP8266 modules running ESP-AT 1.x/2.x.
use crate::engine::DEFAULT_POLL_INTERVAL_MS;
use heapless::Vec;

/// Max. payload length accepted by a single `AT+CIPSEND`
pub const MAX_PAYLOAD_LENGTH: usize = 2048;

/// Timeouts, polling and device specific settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Restart until `ready` banner. Module reboots, so this takes a while.
    pub reset_timeout_ms: u32,

    /// Short configuration commands, e.g. echo and WIFI mode
    pub command_timeout_ms: u32,

    /// Joining an access point, including DHCP
    pub join_timeout_ms: u32,

    /// Single `AT+CIPSTATUS` query
    pub status_timeout_ms: u32,

    /// Opening the TCP connection
    pub connect_timeout_ms: u32,

    /// Length declaration until the `>` prompt
    pub declare_timeout_ms: u32,

    /// Payload write until `SEND OK`
    pub send_timeout_ms: u32,

    /// Window for collecting the server response after the send confirmation
    pub response_timeout_ms: u32,

    /// Closing the TCP connection
    pub close_timeout_ms: u32,

    /// Delay between two reads of the serial channel
    pub poll_interval_ms: u32,

    /// If true, the connection status gets polled after joining until a connected code is reported
    pub poll_join_status: bool,

    /// Max. number of status queries after joining
    pub status_attempts: usize,

    /// Delay between two status queries
    pub status_backoff_ms: u32,

    /// `STATUS:<n>` codes treated as connected. Meaning differs between firmware versions.
    pub connected_status_codes: Vec<u8, 8>,

    /// Max. HTTP request length in bytes
    pub max_payload_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reset_timeout_ms: 5_000,
            command_timeout_ms: 2_000,
            join_timeout_ms: 15_000,
            status_timeout_ms: 2_000,
            connect_timeout_ms: 5_000,
            declare_timeout_ms: 2_000,
            send_timeout_ms: 4_000,
            response_timeout_ms: 4_000,
            close_timeout_ms: 500,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_join_status: true,
            status_attempts: 10,
            status_backoff_ms: 1_000,
            // 2: Got IP, 3: Connected, 4: Disconnected (TCP), 5: Not connected to AP
            connected_status_codes: Vec::from_slice(&[2, 3, 4]).unwrap_or_default(),
            max_payload_length: MAX_PAYLOAD_LENGTH,
        }
    }
}

impl Config {
    /// Returns true if the given status code counts as connected to the access point
    pub fn is_connected_status(&self, code: u8) -> bool {
        self.connected_status_codes.contains(&code)
    }
}

//! Parsing of status lines and unsolicited messages of ESP-AT
use alloc::string::String;

/// Prefix of the `AT+CIPSTATUS` response line
pub const STATUS_PREFIX: &str = "STATUS:";

/// Prefix of received socket data in active receiving mode
const DATA_PREFIX: &str = "+IPD,";

/// Single line messages of ESP-AT
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum URCMessages {
    /// Modem is ready for receiving AT commands
    Ready,
    /// WIFi connection state changed to to connected
    WifiConnected,
    /// Wifi connection state changed to disconnected
    WifiDisconnected,
    /// Received an IP from the access point
    ReceivedIP,
    /// Connection status code reported by `AT+CIPSTATUS`
    Status(u8),
    /// Socket connected
    SocketConnected,
    /// Socket closed
    SocketClosed,
    /// Transmission of socket data was successful
    SendConfirmation,
    /// Transmission of socket data failed
    SendFail,
    /// A general error happened
    Error,
    /// Unknown message
    Unknown,
}

impl URCMessages {
    /// Parses a single line without terminator
    pub fn parse(line: &str) -> Self {
        if let Some(code) = line.strip_prefix(STATUS_PREFIX) {
            return match code.trim().parse::<u8>() {
                Ok(code) => Self::Status(code),
                Err(_) => Self::Unknown,
            };
        }

        match line.trim() {
            "ready" => Self::Ready,
            "WIFI CONNECTED" => Self::WifiConnected,
            "WIFI DISCONNECT" => Self::WifiDisconnected,
            "WIFI GOT IP" => Self::ReceivedIP,
            "CONNECT" => Self::SocketConnected,
            "CLOSED" => Self::SocketClosed,
            "SEND OK" => Self::SendConfirmation,
            "SEND FAIL" => Self::SendFail,
            "ERROR" => Self::Error,
            _ => Self::Unknown,
        }
    }

    /// Parses all lines of the given text
    pub fn parse_all(text: &str) -> impl Iterator<Item = URCMessages> + '_ {
        text.split("\r\n").filter(|line| !line.is_empty()).map(Self::parse)
    }

    /// Returns the first status code contained in the given text
    pub fn find_status(text: &str) -> Option<u8> {
        Self::parse_all(text).find_map(|message| match message {
            Self::Status(code) => Some(code),
            _ => None,
        })
    }
}

/// Concatenates the data of all `+IPD,<length>:<data>` frames of the given raw text.
/// The data of a truncated frame is taken up to the end of the text.
pub fn extract_data(raw: &str) -> String {
    let mut data = String::new();
    let mut rest = raw;

    while let Some(start) = rest.find(DATA_PREFIX) {
        rest = &rest[start + DATA_PREFIX.len()..];

        let separator = match rest.find(':') {
            Some(separator) => separator,
            None => break,
        };

        // Multiple connection mode prefixes the length by the link ID
        let length = rest[..separator].rsplit(',').next().unwrap_or_default();
        let length = match length.parse::<usize>() {
            Ok(length) => length,
            Err(_) => continue,
        };

        let payload = &rest[separator + 1..];
        let end = floor_char_boundary(payload, length);
        data.push_str(&payload[..end]);
        rest = &payload[end..];
    }

    data
}

/// Largest char boundary which is less or equal to the given index
fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }

    let mut index = index;
    while !text.is_char_boundary(index) {
        index -= 1;
    }

    index
}

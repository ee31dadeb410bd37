use crate::responses::{NoResponse, Token};
use crate::stack::Error as StackError;
use crate::wifi::{BringUpError, JoinError};
use atat::atat_derive::AtatCmd;
use atat::heapless::String;
use atat::Error as AtError;
use core::str::FromStr;

/// Trait for mapping command errors
pub trait CommandErrorHandler {
    type Error;

    /// Token signaling that the command succeeded
    const EXPECTED: Token<'static>;

    /// Maps failures of the serial channel or timer
    const TRANSPORT_ERROR: Self::Error;

    /// Maps regular errors
    fn command_error(&self, error: AtError) -> Self::Error;
}

/// Attention command, just responded by OK
#[derive(Clone, AtatCmd)]
#[at_cmd("", NoResponse)]
pub struct AttentionCommand;

impl CommandErrorHandler for AttentionCommand {
    type Error = BringUpError;
    const EXPECTED: Token<'static> = Token::Success;
    const TRANSPORT_ERROR: Self::Error = BringUpError::TransportError;

    fn command_error(&self, error: AtError) -> Self::Error {
        BringUpError::ProbeError(error)
    }
}

/// Restarts the module, which confirms with the `ready` banner once booted
#[derive(Clone, AtatCmd)]
#[at_cmd("+RST", NoResponse)]
pub struct RestartCommand;

impl CommandErrorHandler for RestartCommand {
    type Error = BringUpError;
    const EXPECTED: Token<'static> = Token::Ready;
    const TRANSPORT_ERROR: Self::Error = BringUpError::TransportError;

    fn command_error(&self, error: AtError) -> Self::Error {
        BringUpError::ResetError(error)
    }
}

/// Disables the command echo
#[derive(Clone, AtatCmd)]
#[at_cmd("E0", NoResponse)]
pub struct EchoOffCommand;

impl CommandErrorHandler for EchoOffCommand {
    type Error = BringUpError;
    const EXPECTED: Token<'static> = Token::Success;
    const TRANSPORT_ERROR: Self::Error = BringUpError::TransportError;

    fn command_error(&self, error: AtError) -> Self::Error {
        BringUpError::EchoError(error)
    }
}

/// Sets the WIFI mode
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CWMODE", NoResponse)]
pub struct WifiModeCommand {
    /// WIFI mode:
    ///     0: Null mode. Wi-Fi RF will be disabled.
    ///     1: Station mode.
    ///     2: SoftAP mode.
    ///     3: SoftAP+Station mode.
    #[at_arg(position = 0)]
    mode: usize,
}

impl WifiModeCommand {
    pub fn station_mode() -> Self {
        Self { mode: 1 }
    }
}

impl CommandErrorHandler for WifiModeCommand {
    type Error = BringUpError;
    const EXPECTED: Token<'static> = Token::Success;
    const TRANSPORT_ERROR: Self::Error = BringUpError::TransportError;

    fn command_error(&self, error: AtError) -> Self::Error {
        BringUpError::ModeError(error)
    }
}

/// Command for joining the target WIFI access point
///
/// SSID and password are quoted but not escaped, so `"` and `,` characters corrupt the command.
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CWJAP", NoResponse)]
pub struct AccessPointConnectCommand {
    /// The SSID of the target access point
    #[at_arg(position = 0)]
    ssid: String<32>,

    /// The password/key of the target access point
    #[at_arg(position = 1)]
    password: String<64>,
}

impl AccessPointConnectCommand {
    pub fn new(ssid: String<32>, password: String<64>) -> Self {
        Self { ssid, password }
    }
}

impl CommandErrorHandler for AccessPointConnectCommand {
    type Error = JoinError;
    const EXPECTED: Token<'static> = Token::JoinConfirmation;
    const TRANSPORT_ERROR: Self::Error = JoinError::TransportError;

    fn command_error(&self, error: AtError) -> Self::Error {
        JoinError::ConnectError(error)
    }
}

/// Queries the connection status, responded by `STATUS:<n>`
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTATUS", NoResponse)]
pub struct ConnectionStatusCommand;

impl CommandErrorHandler for ConnectionStatusCommand {
    type Error = JoinError;
    const EXPECTED: Token<'static> = Token::Custom(crate::urc::STATUS_PREFIX);
    const TRANSPORT_ERROR: Self::Error = JoinError::TransportError;

    fn command_error(&self, error: AtError) -> Self::Error {
        JoinError::StatusError(error)
    }
}

/// Establish TCP Connection in single connection mode
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTART", NoResponse)]
pub struct ConnectCommand {
    /// Connection type, e.g. TCP, UDP, SSL
    #[at_arg(position = 0)]
    connection_type: String<5>,

    /// Remote host name or IP address
    #[at_arg(position = 1)]
    remote_host: String<64>,

    /// Remote port
    #[at_arg(position = 2)]
    port: u16,
}

impl ConnectCommand {
    /// Establishes a TCP connection to the given host
    pub fn tcp(remote_host: String<64>, port: u16) -> Self {
        Self {
            connection_type: String::from_str("TCP").unwrap_or_default(),
            remote_host,
            port,
        }
    }
}

impl CommandErrorHandler for ConnectCommand {
    type Error = StackError;
    const EXPECTED: Token<'static> = Token::Success;
    const TRANSPORT_ERROR: Self::Error = StackError::TransportError;

    fn command_error(&self, error: AtError) -> Self::Error {
        StackError::ConnectFailed(error)
    }
}

/// Declares the length of the following payload, responded by the `>` prompt
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSEND", NoResponse)]
pub struct TransmissionPrepareCommand {
    /// Payload length in bytes
    #[at_arg(position = 0)]
    length: usize,
}

impl TransmissionPrepareCommand {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl CommandErrorHandler for TransmissionPrepareCommand {
    type Error = StackError;
    const EXPECTED: Token<'static> = Token::Prompt;
    const TRANSPORT_ERROR: Self::Error = StackError::TransportError;

    fn command_error(&self, error: AtError) -> Self::Error {
        StackError::SendDeclareFailed(error)
    }
}

/// Closes the TCP connection
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPCLOSE", NoResponse)]
pub struct CloseSocketCommand;

impl CommandErrorHandler for CloseSocketCommand {
    type Error = StackError;
    const EXPECTED: Token<'static> = Token::Success;
    const TRANSPORT_ERROR: Self::Error = StackError::TransportError;

    fn command_error(&self, error: AtError) -> Self::Error {
        StackError::CloseError(error)
    }
}

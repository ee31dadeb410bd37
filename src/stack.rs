//! # TCP transmission
//!
//! Single connection TCP client used for HTTP requests. A connection lives for exactly one
//! transmission: open, declare length, write payload, await confirmation, close.
use crate::commands::{CloseSocketCommand, ConnectCommand, TransmissionPrepareCommand};
use crate::channel::SerialChannel;
use crate::responses::{Response, Token};
use crate::wifi::Adapter;
use alloc::string::String;
use atat::heapless::String as BoundedString;
use atat::Error as AtError;
use core::str::FromStr;
use fugit::TimerDurationU32;
use fugit_timer::Timer;

/// Network related errors
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Requests are only possible while joined to a network
    NotAssociated,

    /// TCP connect command failed
    ConnectFailed(AtError),

    /// Declaring the payload length was not confirmed by the prompt (CIPSEND command)
    SendDeclareFailed(AtError),

    /// Transmission of data failed, either reported by `SEND FAIL` or writing the payload failed
    SendFailed(AtError),

    /// Socket close command failed
    CloseError(AtError),

    /// Payload exceeds the max. length of a single transmission
    PayloadTooLong,

    /// Given host is longer then the max. size of 64 chars
    InvalidHostLength,

    /// Serial channel or timer failed
    TransportError,
}

impl<S: SerialChannel, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> Adapter<S, T, TIMER_HZ> {
    /// Opens a TCP connection. Nothing needs to be closed if this fails.
    pub(crate) fn open_connection(&mut self, host: &str, port: u16) -> Result<(), Error> {
        let host = BoundedString::from_str(host).map_err(|_| Error::InvalidHostLength)?;

        let timeout = self.config.connect_timeout_ms;
        self.send_command(ConnectCommand::tcp(host, port), timeout)?;
        Ok(())
    }

    /// Transmits the payload over the open connection and returns all text received afterwards
    ///
    /// A missing send confirmation is not treated as error, only an explicit `SEND FAIL`.
    pub(crate) fn transmit(&mut self, payload: &[u8]) -> Result<String, Error> {
        let timeout = self.config.declare_timeout_ms;
        self.send_command(TransmissionPrepareCommand::new(payload.len()), timeout)?;
        self.engine
            .write_payload(payload)
            .map_err(|_| Error::SendFailed(AtError::Write))?;

        let timeout = TimerDurationU32::millis(self.config.send_timeout_ms);
        let confirmation = self
            .engine
            .wait_for(Token::SendConfirmation, timeout)
            .map_err(|_| Error::TransportError)?;
        let mut text = String::from(self.engine.last_response());

        match confirmation {
            Response::Matched(_) => {}
            Response::ErrorToken(_) => return Err(Error::SendFailed(AtError::Error)),
            Response::TimedOut(_) => {
                log::warn!("Transmission of {} bytes not confirmed", payload.len());
                return Ok(text);
            }
        }

        // Server closes the connection after responding
        let timeout = TimerDurationU32::millis(self.config.response_timeout_ms);
        self.engine
            .wait_for(Token::SocketClosed, timeout)
            .map_err(|_| Error::TransportError)?;
        text.push_str(self.engine.last_response());

        Ok(text)
    }

    /// Closes the TCP connection. Failures are just logged, as closing an already closed
    /// connection is expected to fail.
    pub(crate) fn close_connection(&mut self) {
        let timeout = self.config.close_timeout_ms;

        if let Err(error) = self.send_command(CloseSocketCommand, timeout) {
            log::debug!("Ignoring close failure: {:?}", error);
        }
    }
}

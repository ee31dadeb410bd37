//! # Modem session and WIFI access point client
//!
//! Bring-up of the module and joining a network is supported.
//!
//! [Adapter::initialize] restarts the module, disables the command echo and switches to station
//! mode. Any failure faults the adapter for good, since the module state is unknown afterwards.
//! Joining a network may be retried as often as needed.
//!
//! ## Example
//!
//! ````
//! # use esp_at_http::example::{ExampleSerial, ExampleTimer};
//! # use esp_at_http::wifi::{Adapter, ModemState, WifiAdapter};
//! #
//! let mut adapter: Adapter<_, _, 1_000> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//!
//! // Restart, echo off and station mode
//! adapter.initialize().unwrap();
//! assert!(adapter.is_initialized());
//!
//! // Joining the access point, waits until an IP got assigned
//! let state = adapter.associate("test_wifi", "secret").unwrap();
//! assert!(state.ip_assigned);
//! assert_eq!(ModemState::Associated, adapter.state());
//! ````
use crate::commands::{
    AccessPointConnectCommand, AttentionCommand, CommandErrorHandler, ConnectionStatusCommand, EchoOffCommand,
    RestartCommand, WifiModeCommand,
};
use crate::channel::SerialChannel;
use crate::config::Config;
use crate::engine::Engine;
use crate::urc::URCMessages;
use alloc::string::String;
use atat::heapless::String as BoundedString;
use atat::{AtatCmd, Error as AtError};
use core::fmt::Debug;
use core::str::FromStr;
use fugit::TimerDurationU32;
use fugit_timer::Timer;

/// Wifi network adapter trait
pub trait WifiAdapter {
    /// Error during module bring-up
    type BringUpError: Debug;

    /// Error when joining a WIFI network
    type JoinError: Debug;

    /// Restarts and configures the module
    fn initialize(&mut self) -> Result<(), Self::BringUpError>;

    /// Connects to an WIFI access point and returns the connection state
    fn associate(&mut self, ssid: &str, key: &str) -> Result<JoinState, Self::JoinError>;

    /// Queries the current WIFI connection status
    fn join_status(&mut self) -> Result<JoinState, Self::JoinError>;
}

/// Lifecycle of the modem session
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModemState {
    /// No command was sent yet
    Uninitialized,
    /// Bring-up in progress
    Initializing,
    /// Restarted and configured, not joined to a network
    Ready,
    /// Joining a network in progress
    Associating,
    /// Joined to a network
    Associated,
    /// Bring-up failed. No further commands are sent.
    Faulted,
}

/// Central client for network communication
pub struct Adapter<S: SerialChannel, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> {
    /// Command/response engine owning the serial channel
    pub(crate) engine: Engine<S, T, TIMER_HZ>,

    /// Timeouts and device specific settings
    pub(crate) config: Config,

    /// Current session state
    state: ModemState,
}

/// Possible errors during bring-up
#[derive(Clone, Debug, PartialEq)]
pub enum BringUpError {
    /// Attention command failed
    ProbeError(AtError),

    /// Restart was not confirmed by the ready banner
    ResetError(AtError),

    /// Error while disabling the echo
    EchoError(AtError),

    /// Error wile setting WIFI mode to station
    ModeError(AtError),

    /// A previous bring-up failed, no commands are sent anymore
    Faulted,

    /// Serial channel or timer failed
    TransportError,
}

/// Possible errors when joining an access point
#[derive(Clone, Debug, PartialEq)]
pub enum JoinError {
    /// Adapter is not initialized or faulted
    NotReady,

    /// Error while setting WIFI credentials
    ConnectError(AtError),

    /// Connection status query failed
    StatusError(AtError),

    /// Join command succeeded, but no connected status code was reported in time.
    /// Contains the last reported status code.
    UnconfirmedConnection(Option<u8>),

    /// Given SSD is longer then the max. size of 32 chars
    InvalidSSDLength,

    /// Given password is longer then the max. size of 63 chars
    InvalidPasswordLength,

    /// Serial channel or timer failed
    TransportError,
}

/// Current WIFI connection state
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct JoinState {
    /// True if connected to an WIFI access point
    pub connected: bool,

    /// True if an IP was assigned
    pub ip_assigned: bool,

    /// Last status code reported by the module
    pub status: Option<u8>,
}

impl<S: SerialChannel, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> WifiAdapter for Adapter<S, T, TIMER_HZ> {
    type BringUpError = BringUpError;
    type JoinError = JoinError;

    /// Restarts the module, disables echo and switches to station mode.
    /// On failure the adapter gets faulted and rejects all further operations.
    fn initialize(&mut self) -> Result<(), BringUpError> {
        if self.state == ModemState::Faulted {
            return Err(BringUpError::Faulted);
        }

        self.state = ModemState::Initializing;
        let result = self.bring_up();

        match &result {
            Ok(_) => self.transition(ModemState::Ready),
            Err(error) => {
                log::warn!("Bring-up failed: {:?}", error);
                self.transition(ModemState::Faulted);
            }
        }

        result
    }

    /// Connects to an WIFI access point and returns the connection state
    ///
    /// With status polling enabled, the status is queried until a connected status code is reported,
    /// as some firmware confirms the join command before an IP was assigned.
    fn associate(&mut self, ssid: &str, key: &str) -> Result<JoinState, JoinError> {
        if !matches!(self.state, ModemState::Ready | ModemState::Associated) {
            return Err(JoinError::NotReady);
        }

        if ssid.len() > 32 {
            return Err(JoinError::InvalidSSDLength);
        }

        if key.len() > 63 {
            return Err(JoinError::InvalidPasswordLength);
        }

        self.state = ModemState::Associating;
        let result = self.connect_access_point(ssid, key);

        match &result {
            Ok(_) => self.transition(ModemState::Associated),
            Err(error) => {
                log::warn!("Joining {} failed: {:?}", ssid, error);
                self.transition(ModemState::Ready);
            }
        }

        result
    }

    /// Queries the connection status once and updates the association state accordingly
    fn join_status(&mut self) -> Result<JoinState, JoinError> {
        if !matches!(self.state, ModemState::Ready | ModemState::Associated) {
            return Err(JoinError::NotReady);
        }

        let code = self.query_status()?;
        let connected = self.config.is_connected_status(code);

        if connected {
            self.transition(ModemState::Associated);
        } else {
            self.transition(ModemState::Ready);
        }

        Ok(JoinState {
            connected,
            ip_assigned: connected,
            status: Some(code),
        })
    }
}

impl<S: SerialChannel, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> Adapter<S, T, TIMER_HZ> {
    /// Creates a new adapter using the default configuration
    pub fn new(serial: S, timer: T) -> Self {
        Self::with_config(serial, timer, Config::default())
    }

    /// Creates a new adapter using the given configuration
    pub fn with_config(serial: S, timer: T, config: Config) -> Self {
        let mut engine = Engine::new(serial, timer);
        engine.set_poll_interval(TimerDurationU32::millis(config.poll_interval_ms));

        Self {
            engine,
            config,
            state: ModemState::Uninitialized,
        }
    }

    /// Sends the attention command, e.g. for checking that the module is responsive
    pub fn probe(&mut self) -> Result<(), BringUpError> {
        if self.state == ModemState::Faulted {
            return Err(BringUpError::Faulted);
        }

        let timeout = self.config.command_timeout_ms;
        self.send_command(AttentionCommand, timeout)?;
        Ok(())
    }

    /// Current session state
    pub fn state(&self) -> ModemState {
        self.state
    }

    /// True if bring-up succeeded
    pub fn is_initialized(&self) -> bool {
        matches!(
            self.state,
            ModemState::Ready | ModemState::Associating | ModemState::Associated
        )
    }

    /// True if joined to a network
    pub fn is_associated(&self) -> bool {
        self.state == ModemState::Associated
    }

    /// Full text received during the last transaction
    pub fn last_response_text(&self) -> &str {
        self.engine.last_response()
    }

    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configuration
    pub fn set_config(&mut self, config: Config) {
        self.engine
            .set_poll_interval(TimerDurationU32::millis(config.poll_interval_ms));
        self.config = config;
    }

    /// Sets the timeout for sending TCP data in ms
    pub fn set_send_timeout_ms(&mut self, timeout: u32) {
        self.config.send_timeout_ms = timeout;
    }

    /// Returns the serial channel and timer
    pub fn release(self) -> (S, T) {
        self.engine.release()
    }

    /// Restart followed by echo and mode configuration. The first failure aborts.
    fn bring_up(&mut self) -> Result<(), BringUpError> {
        // Module reboots, so all following commands are meaningless without ready banner
        let timeout = self.config.reset_timeout_ms;
        self.send_command(RestartCommand, timeout)?;

        let timeout = self.config.command_timeout_ms;
        self.send_command(EchoOffCommand, timeout)?;
        self.send_command(WifiModeCommand::station_mode(), timeout)?;

        Ok(())
    }

    /// Sends the command for setting the WIFI credentials and awaits the connection
    fn connect_access_point(&mut self, ssid: &str, key: &str) -> Result<JoinState, JoinError> {
        let ssid = BoundedString::from_str(ssid).map_err(|_| JoinError::InvalidSSDLength)?;
        let key = BoundedString::from_str(key).map_err(|_| JoinError::InvalidPasswordLength)?;

        let timeout = self.config.join_timeout_ms;
        self.send_command(AccessPointConnectCommand::new(ssid, key), timeout)?;

        let ip_assigned =
            URCMessages::parse_all(self.engine.last_response()).any(|message| message == URCMessages::ReceivedIP);

        if ip_assigned || !self.config.poll_join_status {
            return Ok(JoinState {
                connected: true,
                ip_assigned,
                status: None,
            });
        }

        self.await_connected_status()
    }

    /// Polls the status until a connected code is reported or the attempts are exhausted
    fn await_connected_status(&mut self) -> Result<JoinState, JoinError> {
        let backoff = TimerDurationU32::millis(self.config.status_backoff_ms);
        let mut last_status = None;

        for attempt in 0..self.config.status_attempts {
            if attempt > 0 {
                self.engine.delay(backoff).map_err(|_| JoinError::TransportError)?;
            }

            match self.query_status() {
                Ok(code) if self.config.is_connected_status(code) => {
                    return Ok(JoinState {
                        connected: true,
                        ip_assigned: true,
                        status: Some(code),
                    });
                }
                Ok(code) => last_status = Some(code),
                Err(JoinError::TransportError) => return Err(JoinError::TransportError),
                Err(error) => log::debug!("Status query attempt {} failed: {:?}", attempt, error),
            }
        }

        Err(JoinError::UnconfirmedConnection(last_status))
    }

    /// Sends AT+CIPSTATUS and parses the reported code
    fn query_status(&mut self) -> Result<u8, JoinError> {
        let timeout = self.config.status_timeout_ms;
        let line = self.send_command(ConnectionStatusCommand, timeout)?;

        match URCMessages::parse(&line) {
            URCMessages::Status(code) => Ok(code),
            _ => Err(JoinError::StatusError(AtError::InvalidResponse)),
        }
    }

    /// Sends a command and maps the error if the command failed
    pub(crate) fn send_command<Cmd: AtatCmd + CommandErrorHandler>(
        &mut self,
        command: Cmd,
        timeout_ms: u32,
    ) -> Result<String, Cmd::Error> {
        let timeout = TimerDurationU32::millis(timeout_ms);
        let response = self
            .engine
            .transact_command(&command, Cmd::EXPECTED, timeout)
            .map_err(|_| Cmd::TRANSPORT_ERROR)?;

        response.into_result().map_err(|error| command.command_error(error))
    }

    fn transition(&mut self, state: ModemState) {
        if self.state != state {
            log::info!("Modem state {:?} -> {:?}", self.state, state);
        }

        self.state = state;
    }
}

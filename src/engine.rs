//! # Command/response engine
//!
//! Executes half-duplex AT transactions: a command is written, then the received lines are
//! matched against the expected [Token] until a match, a failure line or the deadline.
//!
//! The deadline is measured from the moment the command was written. Unrelated lines do not
//! extend the wait.
//!
//! The timer is only used for delays between two polls. Elapsed time is accumulated from the poll
//! intervals, so timers whose `now()` restarts on every `start()` are supported.
use crate::buffer::{LineAssembler, DELIMITER};
use crate::channel::SerialChannel;
use crate::responses::{Response, Token, Verdict};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use atat::AtatCmd;
use fugit::TimerDurationU32;
use fugit_timer::Timer;

/// Size of a single read from the serial channel
const READ_CHUNK_SIZE: usize = 64;

/// Max. reads per poll iteration, so that a continuous byte stream does not stall deadline checks
const MAX_READS_PER_POLL: usize = 16;

/// Default delay between two polls of the serial channel
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// Low level failures of the serial channel or timer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Writing to the serial channel failed
    Write,

    /// Reading from the serial channel failed
    Read,

    /// Upstream timer error
    Timer,
}

/// Drives the serial channel. All modem traffic passes this type.
pub struct Engine<S: SerialChannel, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> {
    /// Serial transport
    pub(crate) serial: S,

    /// Timer used for deadlines and poll delays
    pub(crate) timer: T,

    /// Received but not yet consumed data
    lines: LineAssembler,

    /// Full text received during the last wait
    last_response: String,

    /// Delay between two reads of the serial channel
    poll_interval: TimerDurationU32<TIMER_HZ>,
}

impl<S: SerialChannel, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> Engine<S, T, TIMER_HZ> {
    pub fn new(serial: S, timer: T) -> Self {
        Self {
            serial,
            timer,
            lines: LineAssembler::new(),
            last_response: String::new(),
            poll_interval: TimerDurationU32::millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Sets the delay between two reads of the serial channel, at least one tick
    pub fn set_poll_interval(&mut self, interval: TimerDurationU32<TIMER_HZ>) {
        self.poll_interval = interval.max(TimerDurationU32::from_ticks(1));
    }

    /// Sends the command (terminator is appended) and waits for the expected token
    pub fn transact(
        &mut self,
        command: &str,
        expected: Token<'_>,
        timeout: TimerDurationU32<TIMER_HZ>,
    ) -> Result<Response, Error> {
        self.flush()?;

        log::debug!("TX: {}", command);
        self.write(command.as_bytes())?;
        self.write(DELIMITER)?;

        if expected == Token::None {
            self.last_response.clear();
            return Ok(Response::Matched(String::new()));
        }

        self.await_response(Some(command), expected, timeout)
    }

    /// Encodes the ATAT command and executes it as transaction
    pub fn transact_command<Cmd: AtatCmd>(
        &mut self,
        command: &Cmd,
        expected: Token<'_>,
        timeout: TimerDurationU32<TIMER_HZ>,
    ) -> Result<Response, Error> {
        let mut frame = vec![0x0; Cmd::MAX_LEN];
        let length = command.write(&mut frame);
        let text = String::from_utf8_lossy(&frame[..length]);

        self.transact(text.trim_end_matches("\r\n"), expected, timeout)
    }

    /// Waits for the expected token without sending anything. Data which arrived after the
    /// previous transaction is taken into account.
    pub fn wait_for(&mut self, expected: Token<'_>, timeout: TimerDurationU32<TIMER_HZ>) -> Result<Response, Error> {
        self.await_response(None, expected, timeout)
    }

    /// Writes raw payload data, no terminator appended and no response awaited
    pub fn write_payload(&mut self, payload: &[u8]) -> Result<(), Error> {
        log::debug!("TX: {} payload bytes", payload.len());
        self.write(payload)
    }

    /// Blocks for the given duration
    pub fn delay(&mut self, duration: TimerDurationU32<TIMER_HZ>) -> Result<(), Error> {
        self.timer.start(duration).map_err(|_| Error::Timer)?;
        nb::block!(self.timer.wait()).map_err(|_| Error::Timer)
    }

    /// Full text received while waiting during the last transaction
    pub fn last_response(&self) -> &str {
        &self.last_response
    }

    /// Takes the last response, e.g. for keeping it across cleanup commands
    pub(crate) fn take_last_response(&mut self) -> String {
        core::mem::take(&mut self.last_response)
    }

    /// Overwrites the last response
    pub(crate) fn set_last_response(&mut self, text: String) {
        self.last_response = text;
    }

    /// Returns the serial channel and timer
    pub fn release(self) -> (S, T) {
        (self.serial, self.timer)
    }

    /// Polls until the expected token, its failure counterpart or the deadline.
    /// Everything received is stored as last response, even if the wait gets aborted by an error.
    fn await_response(
        &mut self,
        echo: Option<&str>,
        expected: Token<'_>,
        timeout: TimerDurationU32<TIMER_HZ>,
    ) -> Result<Response, Error> {
        let mut transcript = Vec::new();
        let result = self.poll(echo, expected, timeout, &mut transcript);
        self.last_response = String::from_utf8_lossy(&transcript).into_owned();

        match &result {
            Ok(Response::Matched(line)) => log::debug!("RX matched {:?}: {}", expected, line),
            Ok(Response::ErrorToken(line)) => log::warn!("RX failure while awaiting {:?}: {}", expected, line),
            Ok(Response::TimedOut(_)) => log::warn!("Timeout while awaiting {:?}", expected),
            Err(error) => log::warn!("Transaction aborted: {:?}", error),
        }

        result
    }

    fn poll(
        &mut self,
        echo: Option<&str>,
        expected: Token<'_>,
        timeout: TimerDurationU32<TIMER_HZ>,
        transcript: &mut Vec<u8>,
    ) -> Result<Response, Error> {
        let mut elapsed = TimerDurationU32::from_ticks(0);

        loop {
            self.receive(transcript)?;

            if let Some(response) = self.match_lines(echo, expected) {
                return Ok(response);
            }

            if expected.matches_partial(self.lines.peek_all()) {
                let partial = String::from_utf8_lossy(self.lines.peek_all()).into_owned();
                self.lines.clear();
                return Ok(Response::Matched(partial));
            }

            if elapsed >= timeout {
                let partial = String::from_utf8_lossy(self.lines.peek_all()).into_owned();
                return Ok(Response::TimedOut(partial));
            }

            let interval = self.poll_interval;
            self.delay(interval)?;
            elapsed = elapsed + interval;
        }
    }

    /// Consumes complete lines until one matches or fails
    fn match_lines(&mut self, echo: Option<&str>, expected: Token<'_>) -> Option<Response> {
        while let Some(line) = self.lines.next_line() {
            log::trace!("RX: {}", line);

            // Command echo, e.g. before echo got disabled
            if echo.map(|echo| echo == line).unwrap_or(false) {
                continue;
            }

            match expected.classify(&line) {
                Some(Verdict::Matched) => return Some(Response::Matched(line)),
                Some(Verdict::Failed) => return Some(Response::ErrorToken(line)),
                None => {}
            }
        }

        None
    }

    /// Reads all pending bytes into the line assembler
    fn receive(&mut self, transcript: &mut Vec<u8>) -> Result<(), Error> {
        let mut chunk = [0x0; READ_CHUNK_SIZE];

        for _ in 0..MAX_READS_PER_POLL {
            let length = self.serial.read_available(&mut chunk).map_err(|_| Error::Read)?;
            if length == 0 {
                break;
            }

            self.lines.feed(&chunk[..length]);
            transcript.extend_from_slice(&chunk[..length]);
        }

        Ok(())
    }

    /// Drops stale data of already concluded transactions
    fn flush(&mut self) -> Result<(), Error> {
        let mut discarded = self.lines.len();
        self.lines.clear();

        let mut chunk = [0x0; READ_CHUNK_SIZE];
        for _ in 0..MAX_READS_PER_POLL {
            let length = self.serial.read_available(&mut chunk).map_err(|_| Error::Read)?;
            if length == 0 {
                break;
            }

            discarded += length;
        }

        if discarded > 0 {
            log::trace!("Discarded {} stale bytes", discarded);
        }

        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.serial.write(bytes).map_err(|_| Error::Write)
    }
}

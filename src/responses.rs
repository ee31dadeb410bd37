use alloc::string::String;
use atat::atat_derive::AtatResp;
use atat::Error as AtError;

/// Generic success line
pub const OK: &str = "OK";

/// Generic error line
pub const ERROR: &str = "ERROR";

/// Payload prompt, sent without line terminator
pub const PROMPT: &str = ">";

/// Banner after a restart
pub const READY: &str = "ready";

/// Socket data was transmitted
pub const SEND_OK: &str = "SEND OK";

/// Socket data transmission failed
pub const SEND_FAIL: &str = "SEND FAIL";

/// Socket was closed
pub const CLOSED: &str = "CLOSED";

/// Joining the access point failed, preceded by `+CWJAP:<code>`
pub const FAIL: &str = "FAIL";

/// Commands which gets just responded by OK
#[derive(Clone, AtatResp)]
pub struct NoResponse;

/// Expected response of a command
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Fire and forget, nothing is awaited
    None,

    /// First non-empty line is accepted
    Any,

    /// Line containing `OK`
    Success,

    /// Line containing `ERROR`
    Error,

    /// The unterminated `>` prompt
    Prompt,

    /// The `ready` banner
    Ready,

    /// `SEND OK`, fails fast on `SEND FAIL`
    SendConfirmation,

    /// `OK` of the join command, fails fast on `FAIL` or `ERROR`
    JoinConfirmation,

    /// Line consisting of `CLOSED` only
    SocketClosed,

    /// Line containing the given text
    Custom(&'a str),
}

/// Classification of a single line against a [Token]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Line contains the expected token
    Matched,

    /// Line contains the failure counterpart of the expected token
    Failed,
}

impl<'a> Token<'a> {
    /// Text which needs to be contained in a line
    pub fn literal(&self) -> Option<&'a str> {
        match self {
            Token::None | Token::Any => None,
            Token::Success | Token::JoinConfirmation => Some(OK),
            Token::Error => Some(ERROR),
            Token::Prompt => Some(PROMPT),
            Token::Ready => Some(READY),
            Token::SendConfirmation => Some(SEND_OK),
            Token::SocketClosed => Some(CLOSED),
            Token::Custom(text) => Some(*text),
        }
    }

    /// Texts signaling that the expected token is never going to arrive
    pub fn failures(&self) -> &'static [&'static str] {
        match self {
            Token::Success | Token::Prompt => &[ERROR],
            Token::JoinConfirmation => &[FAIL, ERROR],
            Token::SendConfirmation => &[SEND_FAIL],
            _ => &[],
        }
    }

    /// True if the token may arrive without line terminator
    pub fn matches_raw(&self) -> bool {
        matches!(self, Token::Prompt)
    }

    /// Returns true if the given complete line contains the token
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Token::None => false,
            Token::Any => !line.is_empty(),
            // The prompt is never part of a regular response line
            Token::Prompt => line.starts_with(PROMPT),
            // Server data may contain the word anywhere
            Token::SocketClosed => line.trim() == CLOSED,
            _ => self.literal().map(|literal| line.contains(literal)).unwrap_or(false),
        }
    }

    /// Returns true if the unterminated remainder contains the token
    pub fn matches_partial(&self, partial: &[u8]) -> bool {
        if !self.matches_raw() {
            return false;
        }

        partial.windows(PROMPT.len()).any(|window| window == PROMPT.as_bytes())
    }

    /// Classifies a complete line
    pub(crate) fn classify(&self, line: &str) -> Option<Verdict> {
        if self.matches(line) {
            return Some(Verdict::Matched);
        }

        if self.failures().iter().any(|failure| line.contains(failure)) {
            return Some(Verdict::Failed);
        }

        None
    }
}

/// Outcome of a single command transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Line matching the expected token
    Matched(String),

    /// Line containing the failure token, returned without waiting for the timeout
    ErrorToken(String),

    /// Deadline passed, contains the unterminated remainder
    TimedOut(String),
}

impl Response {
    /// Returns true if the expected token was received
    pub fn is_matched(&self) -> bool {
        matches!(self, Response::Matched(_))
    }

    /// The matched line, error line or partial data
    pub fn text(&self) -> &str {
        match self {
            Response::Matched(text) | Response::ErrorToken(text) | Response::TimedOut(text) => text,
        }
    }

    /// Maps the outcome to the ATAT error taxonomy
    pub fn into_result(self) -> Result<String, AtError> {
        match self {
            Response::Matched(line) => Ok(line),
            Response::ErrorToken(_) => Err(AtError::Error),
            Response::TimedOut(_) => Err(AtError::Timeout),
        }
    }
}

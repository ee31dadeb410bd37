//! # Line assembler
//!
//! Collects raw modem bytes and splits them into `\r\n` terminated lines. Responses may be split
//! at any byte boundary, so incomplete data is kept until its terminator arrives.
use alloc::string::String;
use alloc::vec::Vec;

/// Line delimiter used by ESP-AT
pub(crate) const DELIMITER: &[u8] = b"\r\n";

/// Growable receive buffer with line extraction
#[derive(Default, Debug)]
pub struct LineAssembler {
    /// Bytes received but not yet consumed as line
    buffer: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends newly received bytes
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Removes and returns the earliest complete line without its delimiter.
    /// Returns None if no delimiter has been received yet.
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.find_delimiter()?;
        let line = String::from_utf8_lossy(&self.buffer[..end]).into_owned();
        self.buffer.drain(..end + DELIMITER.len());

        Some(line)
    }

    /// Returns the unconsumed content, e.g. for detecting the unterminated prompt
    pub fn peek_all(&self) -> &[u8] {
        &self.buffer
    }

    /// Drops all buffered data
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Returns the count of unconsumed bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no unconsumed bytes are left
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Index of the first delimiter
    fn find_delimiter(&self) -> Option<usize> {
        self.buffer.windows(DELIMITER.len()).position(|window| window == DELIMITER)
    }
}

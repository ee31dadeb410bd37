//! # Serial channel
//!
//! Byte level access to the modem UART. The channel has no framing of its own, all line handling
//! happens in [LineAssembler](crate::buffer::LineAssembler).
//!
//! Any type implementing [embedded_io::Read], [embedded_io::ReadReady] and [embedded_io::Write]
//! is a channel. Baud rate and buffer sizes need to be configured by the host before handing the
//! channel over.
use core::fmt::Debug;
use embedded_io::{ErrorType, Read, ReadReady, Write};

/// Non-blocking serial transport used by the [Engine](crate::engine::Engine)
pub trait SerialChannel {
    /// Transport specific error
    type Error: Debug;

    /// Writes all bytes, blocks until the data is handed to the transport
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Reads whatever has arrived since the last call. Returns 0 if nothing is pending.
    fn read_available(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<T: Read + ReadReady + Write> SerialChannel for T {
    type Error = <T as ErrorType>::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.write_all(bytes)?;
        self.flush()
    }

    fn read_available(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        if !self.read_ready()? {
            return Ok(0);
        }

        self.read(buffer)
    }
}

//! Mocks for doc examples
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_io::{ErrorType, Read, ReadReady, Write};
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;

/// Response of the server to every HTTP request
const SERVER_RESPONSE: &str = "HTTP/1.1 200 OK\r\n\r\nstored";

/// Serial mock simulating a ESP-AT module which responds to all commands successfully
#[derive(Default)]
pub struct ExampleSerial {
    /// Pending data to be read by the host
    rx: VecDeque<u8>,

    /// Current incomplete command line
    line: Vec<u8>,

    /// Remaining payload bytes of a declared transmission
    payload_remaining: usize,
}

impl ExampleSerial {
    fn respond(&mut self, response: &str) {
        self.rx.extend(response.as_bytes());
    }

    fn handle_command(&mut self, command: &str) {
        match command {
            "AT" | "AT+CWMODE=1" => self.respond("\r\nOK\r\n"),
            "AT+RST" => self.respond("\r\nOK\r\n\r\n ets Jan  8 2013,rst cause:2\r\n\r\nready\r\n"),
            "ATE0" => self.respond("ATE0\r\n\r\nOK\r\n"),
            "AT+CIPSTATUS" => self.respond("STATUS:2\r\n\r\nOK\r\n"),
            "AT+CIPCLOSE" => self.respond("\r\nERROR\r\n"),
            _ if command.starts_with("AT+CWJAP=") => self.respond("WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n"),
            _ if command.starts_with("AT+CIPSTART=") => self.respond("CONNECT\r\n\r\nOK\r\n"),
            _ if command.starts_with("AT+CIPSEND=") => match command[11..].parse::<usize>() {
                Ok(length) => {
                    self.payload_remaining = length;
                    self.respond("\r\nOK\r\n> ");
                }
                Err(_) => self.respond("\r\nERROR\r\n"),
            },
            _ => self.respond("\r\nERROR\r\n"),
        }
    }

    fn handle_payload_end(&mut self, length: usize) {
        let mut response = String::new();
        let mut digits = [0x0; 20];

        response.push_str("\r\nRecv ");
        response.push_str(numtoa::NumToA::numtoa_str(length, 10, &mut digits));
        response.push_str(" bytes\r\n\r\nSEND OK\r\n\r\n+IPD,");
        response.push_str(numtoa::NumToA::numtoa_str(SERVER_RESPONSE.len(), 10, &mut digits));
        response.push(':');
        response.push_str(SERVER_RESPONSE);
        response.push_str("\r\nCLOSED\r\n");

        self.respond(&response);
    }
}

impl ErrorType for ExampleSerial {
    type Error = Infallible;
}

impl Read for ExampleSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut length = 0;

        while length < buf.len() {
            match self.rx.pop_front() {
                Some(byte) => buf[length] = byte,
                None => break,
            }
            length += 1;
        }

        Ok(length)
    }
}

impl ReadReady for ExampleSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

impl Write for ExampleSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut payload_length = 0;

        for byte in buf {
            if self.payload_remaining > 0 {
                self.payload_remaining -= 1;
                payload_length += 1;

                if self.payload_remaining == 0 {
                    self.handle_payload_end(payload_length);
                }
                continue;
            }

            self.line.push(*byte);
            if self.line.ends_with(b"\r\n") {
                let command = String::from_utf8_lossy(&self.line[..self.line.len() - 2]).into_owned();
                self.line.clear();
                self.handle_command(&command);
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Timer mock, time passes just while waiting
#[derive(Default)]
pub struct ExampleTimer {
    /// Current time in ms
    now: u32,

    /// End of the running timer
    deadline: u32,
}

impl Timer<1_000> for ExampleTimer {
    type Error = Infallible;

    fn now(&mut self) -> TimerInstantU32<1_000> {
        TimerInstantU32::from_ticks(self.now)
    }

    fn start(&mut self, duration: TimerDurationU32<1_000>) -> Result<(), Self::Error> {
        self.deadline = self.now + duration.ticks();
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn wait(&mut self) -> nb::Result<(), Self::Error> {
        self.now = self.now.max(self.deadline);
        Ok(())
    }
}

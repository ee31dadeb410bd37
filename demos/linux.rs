//! Example that runs on Linux using a serial-USB-adapter.
use std::{env, io, time::Duration};

use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
use esp_at_http::{
    http::HttpRequest,
    wifi::{Adapter, WifiAdapter},
};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

// Timer frequency in Hz
const TIMER_HZ: u32 = 1000;

fn main() {
    env_logger::init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    if args.len() != 6 {
        println!("Usage: {} <path-to-serial> <baudrate> <ssid> <psk> <host>", args[0]);
        println!("Example: {} /dev/ttyUSB0 115200 mywifi hellopasswd123 ifconfig.net", args[0]);
        println!("\nNote: To run the example with debug logging, run it like this:");
        println!("\n  RUST_LOG=trace cargo run --example linux -- /dev/ttyUSB0 115200 mywifi hellopasswd123 ifconfig.net");
        std::process::exit(1);
    }
    let dev = &args[1];
    let baud_rate: u32 = args[2].parse().expect("Invalid baud rate");
    let ssid = &args[3];
    let psk = &args[4];
    let host = &args[5];

    println!("Starting (dev={}, baud={:?})...", dev, baud_rate);

    // Open serial port
    let port = serialport::new(dev, baud_rate)
        .data_bits(DataBits::Eight)
        .flow_control(FlowControl::None)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .timeout(Duration::from_millis(50))
        .open()
        .expect("Could not open serial port");

    let mut adapter: Adapter<_, _, TIMER_HZ> = Adapter::new(Serial::new(port), timer::SysTimer::new());

    // Restart and configure the module
    println!("Initializing...");
    adapter.initialize().expect("Module bring-up failed");

    // Join WIFI access point
    println!("Join WiFi \"{}\"...", ssid);
    let state = adapter.associate(ssid, psk).unwrap_or_else(|error| {
        println!("Modem output:\n---\n{}\n---", adapter.last_response_text());
        panic!("Joining failed: {:?}", error);
    });
    assert!(state.connected);

    // Send HTTP request
    println!("Sending HTTP request to {}...", host);
    let request = HttpRequest::get(host, "/");
    let response = adapter.send(&request).unwrap_or_else(|error| {
        println!("Modem output:\n---\n{}\n---", adapter.last_response_text());
        panic!("Request failed: {:?}", error);
    });

    match response.status_code() {
        Some(code) => println!("Server responded with status {}", code),
        None => println!("No status line received"),
    }
    println!("Response:\n---\n{}\n---", response.payload());
}

/// Non-blocking [embedded_io] wrapper of the serial port
struct Serial {
    port: Box<dyn SerialPort>,
}

impl Serial {
    fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl ErrorType for Serial {
    type Error = ErrorKind;
}

impl Read for Serial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match io::Read::read(&mut self.port, buf) {
            Ok(length) => Ok(length),
            Err(e) if e.kind() == io::ErrorKind::TimedOut || e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => {
                log::error!("Error while reading serial: {}", e);
                Err(ErrorKind::Other)
            }
        }
    }
}

impl ReadReady for Serial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        let pending = self.port.bytes_to_read().map_err(|_| ErrorKind::Other)?;
        Ok(pending > 0)
    }
}

impl Write for Serial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        io::Write::write(&mut self.port, buf).map_err(|e| {
            log::error!("Error while writing serial: {}", e);
            ErrorKind::Other
        })
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        io::Write::flush(&mut self.port).map_err(|_| ErrorKind::Other)
    }
}

mod timer {
    use std::{convert::TryInto, time::Instant as StdInstant};

    use fugit::Instant;
    use fugit_timer::Timer;

    /// A timer with millisecond precision.
    pub struct SysTimer {
        start: StdInstant,
        duration_ms: u32,
        started: bool,
    }

    impl SysTimer {
        pub fn new() -> SysTimer {
            SysTimer {
                start: StdInstant::now(),
                duration_ms: 0,
                started: false,
            }
        }
    }

    impl Timer<1000> for SysTimer {
        type Error = &'static str;

        /// Return current time `Instant`
        fn now(&mut self) -> fugit::TimerInstantU32<1000> {
            let milliseconds = (StdInstant::now() - self.start).as_millis();
            let ticks: u32 = milliseconds.try_into().expect("u32 timer overflow");
            Instant::<u32, 1, 1000>::from_ticks(ticks)
        }

        /// Start timer with a `duration`
        fn start(&mut self, duration: fugit::TimerDurationU32<1000>) -> Result<(), Self::Error> {
            self.start = StdInstant::now();
            self.duration_ms = duration.ticks();
            self.started = true;

            Ok(())
        }

        /// Tries to stop this timer.
        fn cancel(&mut self) -> Result<(), Self::Error> {
            if !self.started {
                Err("cannot cancel stopped timer")
            } else {
                self.started = false;
                Ok(())
            }
        }

        /// Wait until timer `duration` has expired.
        fn wait(&mut self) -> nb::Result<(), Self::Error> {
            let now = StdInstant::now();
            if (now - self.start).as_millis() >= self.duration_ms.into() {
                Ok(())
            } else {
                Err(nb::Error::WouldBlock)
            }
        }
    }

}

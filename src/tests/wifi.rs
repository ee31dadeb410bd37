use crate::config::Config;
use crate::tests::mock::{sim, FakeSerial, MockTimer, Reply, SimClock, SimTimer};
use crate::wifi::{Adapter, BringUpError, JoinError, JoinState, ModemState, WifiAdapter};
use alloc::string::String;
use atat::Error as AtError;

type AdapterType = Adapter<FakeSerial, SimTimer, 1_000>;

/// Scripts a successful bring-up
fn add_bring_up(serial: &mut FakeSerial) {
    serial.respond("AT+RST", Reply::immediate(b"\r\nOK\r\n").then(200, b"\r\n\r\nready\r\n"));
    serial.respond_with("ATE0", b"ATE0\r\n\r\nOK\r\n");
    serial.respond_with("AT+CWMODE", b"\r\nOK\r\n");
}

fn ready_adapter() -> (SimClock, AdapterType) {
    let (clock, mut serial, timer) = sim();
    add_bring_up(&mut serial);

    let mut adapter: AdapterType = Adapter::new(serial, timer);
    adapter.initialize().unwrap();
    (clock, adapter)
}

#[test]
fn test_initialize_correct_commands() {
    let (_, adapter) = ready_adapter();

    assert_eq!(["AT+RST", "ATE0", "AT+CWMODE=1"], adapter.engine.serial.commands());
    assert_eq!(ModemState::Ready, adapter.state());
    assert!(adapter.is_initialized());
    assert!(!adapter.is_associated());
}

#[test]
fn test_initialize_reset_error() {
    let (_, serial, timer) = sim();

    let mut adapter: AdapterType = Adapter::new(serial, timer);
    let error = adapter.initialize().unwrap_err();

    assert_eq!(BringUpError::ResetError(AtError::Timeout), error);
    assert_eq!(ModemState::Faulted, adapter.state());
    assert_eq!(["AT+RST"], adapter.engine.serial.commands());
}

#[test]
fn test_initialize_echo_error() {
    let (clock, mut serial, timer) = sim();
    serial.respond_with("AT+RST", b"\r\nOK\r\n\r\nready\r\n");
    serial.respond_with("ATE0", b"ATE0\r\n\r\nERROR\r\n");

    let mut adapter: AdapterType = Adapter::new(serial, timer);
    let error = adapter.initialize().unwrap_err();

    assert_eq!(BringUpError::EchoError(AtError::Error), error);
    assert!(clock.now() < 1_000);
    assert_eq!(["AT+RST", "ATE0"], adapter.engine.serial.commands());
}

#[test]
fn test_initialize_mode_error() {
    let (_, mut serial, timer) = sim();
    serial.respond("AT+RST", Reply::immediate(b"\r\nready\r\n"));
    serial.respond_with("ATE0", b"\r\nOK\r\n");
    serial.respond_with("AT+CWMODE", b"\r\nERROR\r\n");

    let mut adapter: AdapterType = Adapter::new(serial, timer);
    let error = adapter.initialize().unwrap_err();

    assert_eq!(BringUpError::ModeError(AtError::Error), error);
    assert_eq!(ModemState::Faulted, adapter.state());
}

#[test]
fn test_faulted_adapter_sends_nothing() {
    let (_, serial, timer) = sim();

    let mut adapter: AdapterType = Adapter::new(serial, timer);
    adapter.initialize().unwrap_err();

    assert_eq!(Err(BringUpError::Faulted), adapter.initialize());
    assert_eq!(Err(BringUpError::Faulted), adapter.probe());
    assert_eq!(Err(JoinError::NotReady), adapter.associate("test_wifi", "secret"));
    assert_eq!(Err(JoinError::NotReady), adapter.join_status());
    assert_eq!(1, adapter.engine.serial.commands().len());
}

#[test]
fn test_initialize_transport_error() {
    let (_, mut serial, timer) = sim();
    serial.fail_write_at(0);

    let mut adapter: AdapterType = Adapter::new(serial, timer);
    assert_eq!(Err(BringUpError::TransportError), adapter.initialize());
    assert_eq!(ModemState::Faulted, adapter.state());
}

#[test]
fn test_probe() {
    let (_, mut serial, timer) = sim();
    serial.respond_with("AT", b"\r\nOK\r\n");

    let mut adapter: AdapterType = Adapter::new(serial, timer);
    adapter.probe().unwrap();

    assert_eq!(["AT"], adapter.engine.serial.commands());
    assert_eq!(ModemState::Uninitialized, adapter.state());
}

#[test]
fn test_probe_timer_error() {
    let (_, serial, _) = sim();
    let mut timer = MockTimer::new();
    timer.expect_start().returning(|_| Err(1));

    let mut adapter: Adapter<FakeSerial, MockTimer, 1_000> = Adapter::new(serial, timer);
    assert_eq!(Err(BringUpError::TransportError), adapter.probe());
}

#[test]
fn test_associate_requires_initialization() {
    let (_, serial, timer) = sim();

    let mut adapter: AdapterType = Adapter::new(serial, timer);
    assert_eq!(Err(JoinError::NotReady), adapter.associate("test_wifi", "secret"));
    assert!(adapter.engine.serial.commands().is_empty());
}

#[test]
fn test_associate_got_ip() {
    let (_, mut adapter) = ready_adapter();
    adapter.engine.serial.respond(
        "AT+CWJAP",
        Reply::delayed(1_000, b"WIFI CONNECTED\r\n").then(2_500, b"WIFI GOT IP\r\n\r\nOK\r\n"),
    );

    let state = adapter.associate("test_wifi", "secret").unwrap();

    assert_eq!(
        JoinState {
            connected: true,
            ip_assigned: true,
            status: None
        },
        state
    );
    assert_eq!(ModemState::Associated, adapter.state());
    assert_eq!(Some(&String::from("AT+CWJAP=\"test_wifi\",\"secret\"")), adapter.engine.serial.commands().last());
    assert_eq!(0, adapter.engine.serial.command_count("AT+CIPSTATUS"));
}

#[test]
fn test_associate_status_polled() {
    let (_, mut adapter) = ready_adapter();
    adapter.engine.serial.respond_with("AT+CWJAP", b"WIFI CONNECTED\r\n\r\nOK\r\n");
    adapter.engine.serial.respond_with("AT+CIPSTATUS", b"STATUS:5\r\n\r\nOK\r\n");
    adapter.engine.serial.respond_with("AT+CIPSTATUS", b"STATUS:2\r\n\r\nOK\r\n");

    let state = adapter.associate("test_wifi", "secret").unwrap();

    assert!(state.connected);
    assert!(state.ip_assigned);
    assert_eq!(Some(2), state.status);
    assert_eq!(2, adapter.engine.serial.command_count("AT+CIPSTATUS"));
    assert!(adapter.is_associated());
}

#[test]
fn test_associate_status_polling_disabled() {
    let (_, mut adapter) = ready_adapter();
    adapter.set_config(Config {
        poll_join_status: false,
        ..Config::default()
    });
    adapter.engine.serial.respond_with("AT+CWJAP", b"WIFI CONNECTED\r\n\r\nOK\r\n");

    let state = adapter.associate("test_wifi", "secret").unwrap();

    assert!(state.connected);
    assert!(!state.ip_assigned);
    assert_eq!(0, adapter.engine.serial.command_count("AT+CIPSTATUS"));
}

#[test]
fn test_associate_unconfirmed_connection() {
    let (clock, mut adapter) = ready_adapter();
    adapter.set_config(Config {
        status_attempts: 3,
        status_backoff_ms: 500,
        ..Config::default()
    });
    adapter.engine.serial.respond_with("AT+CWJAP", b"\r\nOK\r\n");
    adapter.engine.serial.respond_with("AT+CIPSTATUS", b"STATUS:5\r\n\r\nOK\r\n");

    let start = clock.now();
    let error = adapter.associate("test_wifi", "secret").unwrap_err();

    assert_eq!(JoinError::UnconfirmedConnection(Some(5)), error);
    assert_eq!(3, adapter.engine.serial.command_count("AT+CIPSTATUS"));
    assert!(clock.now() - start >= 1_000);
    assert_eq!(ModemState::Ready, adapter.state());
}

#[test]
fn test_associate_status_errors_retried() {
    let (_, mut adapter) = ready_adapter();
    adapter.engine.serial.respond_with("AT+CWJAP", b"\r\nOK\r\n");
    adapter.engine.serial.respond_with("AT+CIPSTATUS", b"\r\nERROR\r\n");
    adapter.engine.serial.respond_with("AT+CIPSTATUS", b"STATUS:3\r\n\r\nOK\r\n");

    let state = adapter.associate("test_wifi", "secret").unwrap();
    assert_eq!(Some(3), state.status);
}

#[test]
fn test_associate_custom_connected_codes() {
    let (_, mut adapter) = ready_adapter();
    let mut config = Config::default();
    config.connected_status_codes.clear();
    config.connected_status_codes.push(5).unwrap();
    adapter.set_config(config);

    adapter.engine.serial.respond_with("AT+CWJAP", b"\r\nOK\r\n");
    adapter.engine.serial.respond_with("AT+CIPSTATUS", b"STATUS:5\r\n\r\nOK\r\n");

    assert_eq!(Some(5), adapter.associate("test_wifi", "secret").unwrap().status);
}

#[test]
fn test_associate_connect_error() {
    let (clock, mut adapter) = ready_adapter();
    adapter
        .engine
        .serial
        .respond_with("AT+CWJAP", b"+CWJAP:1\r\n\r\nFAIL\r\n\r\nERROR\r\n");

    let start = clock.now();
    let error = adapter.associate("test_wifi", "wrong").unwrap_err();

    assert_eq!(JoinError::ConnectError(AtError::Error), error);
    assert!(clock.now() - start < 1_000);
    assert!(adapter.last_response_text().contains("+CWJAP:1"));
    assert_eq!(ModemState::Ready, adapter.state());
}

#[test]
fn test_associate_fail_without_error_line() {
    let (clock, mut adapter) = ready_adapter();
    adapter.engine.serial.respond_with("AT+CWJAP", b"+CWJAP:1\r\n\r\nFAIL\r\n");

    let start = clock.now();
    let error = adapter.associate("test_wifi", "wrong").unwrap_err();

    assert_eq!(JoinError::ConnectError(AtError::Error), error);
    assert!(clock.now() - start < 1_000);
    assert!(!adapter.is_associated());
}

#[test]
fn test_associate_retry_after_error() {
    let (_, mut adapter) = ready_adapter();
    adapter.engine.serial.respond_with("AT+CWJAP", b"\r\nERROR\r\n");
    adapter.engine.serial.respond_with("AT+CWJAP", b"WIFI GOT IP\r\n\r\nOK\r\n");

    adapter.associate("test_wifi", "secret").unwrap_err();
    adapter.associate("test_wifi", "secret").unwrap();

    assert!(adapter.is_associated());
}

#[test]
fn test_associate_timeout() {
    let (_, mut adapter) = ready_adapter();

    let error = adapter.associate("test_wifi", "secret").unwrap_err();
    assert_eq!(JoinError::ConnectError(AtError::Timeout), error);
}

#[test]
fn test_associate_invalid_lengths() {
    let (_, mut adapter) = ready_adapter();

    let ssid = "x".repeat(33);
    assert_eq!(Err(JoinError::InvalidSSDLength), adapter.associate(&ssid, "secret"));

    let key = "x".repeat(64);
    assert_eq!(Err(JoinError::InvalidPasswordLength), adapter.associate("test_wifi", &key));

    assert_eq!(0, adapter.engine.serial.command_count("AT+CWJAP"));
    assert_eq!(ModemState::Ready, adapter.state());
}

#[test]
fn test_join_status() {
    let (_, mut adapter) = ready_adapter();
    adapter.engine.serial.respond_with("AT+CIPSTATUS", b"STATUS:2\r\n\r\nOK\r\n");
    adapter.engine.serial.respond_with("AT+CIPSTATUS", b"STATUS:5\r\n\r\nOK\r\n");

    let state = adapter.join_status().unwrap();
    assert!(state.connected);
    assert!(adapter.is_associated());

    let state = adapter.join_status().unwrap();
    assert!(!state.connected);
    assert_eq!(Some(5), state.status);
    assert_eq!(ModemState::Ready, adapter.state());
}

#[test]
fn test_join_status_invalid_response() {
    let (_, mut adapter) = ready_adapter();
    adapter.engine.serial.respond_with("AT+CIPSTATUS", b"STATUS:?\r\n\r\nOK\r\n");

    let error = adapter.join_status().unwrap_err();
    assert_eq!(JoinError::StatusError(AtError::InvalidResponse), error);
}

#[test]
fn test_last_response_text() {
    let (_, mut adapter) = ready_adapter();
    adapter.engine.serial.respond_with("AT+CWJAP", b"WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n");

    adapter.associate("test_wifi", "secret").unwrap();
    assert_eq!("WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n", adapter.last_response_text());
}

#[test]
fn test_release() {
    let (_, adapter) = ready_adapter();

    let (serial, _) = adapter.release();
    assert_eq!(3, serial.commands().len());
}

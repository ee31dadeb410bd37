//! # ESP-AT HTTP client
//!
//! Blocking AT command engine and minimal HTTP client for Espressif modules running the ESP-AT firmware.
//!
//! Any serial channel implementing the [embedded-io](embedded_io) `Read`, `ReadReady` and `Write`
//! traits may be used as transport. Deadlines and poll delays are driven by a
//! [fugit timer](fugit_timer::Timer).
//!
//! * [wifi]: Module bring-up and joining an access point
//! * [http]: GET/PUT requests over a single TCP connection
//! * [engine]: Low level command/response transactions
//!
//! ## Logging
//!
//! All modem traffic is logged using the [log] facade. Raw lines are logged on trace level.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

extern crate alloc;

pub mod buffer;
pub mod channel;
pub(crate) mod commands;
pub mod config;
pub mod engine;
pub mod http;
pub mod responses;
pub mod stack;
pub mod urc;
pub mod url;
pub mod wifi;

#[cfg(feature = "examples")]
pub mod example;

#[cfg(test)]
mod tests;

//! # Minimal HTTP client
//!
//! Builds HTTP/1.1 GET and PUT requests and transmits them over a fresh TCP connection. The
//! connection gets closed after every request, regardless of the outcome.
//!
//! No chunked encoding, redirects or TLS are supported. The request has to fit in a single
//! transmission, s. [Config::max_payload_length](crate::config::Config).
//!
//! ## Example
//!
//! ````
//! # use esp_at_http::example::{ExampleSerial, ExampleTimer};
//! # use esp_at_http::http::HttpRequest;
//! # use esp_at_http::wifi::{Adapter, WifiAdapter};
//! #
//! let mut adapter: Adapter<_, _, 1_000> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//! adapter.initialize().unwrap();
//! adapter.associate("test_wifi", "secret").unwrap();
//!
//! // Pushing a sensor reading
//! let query = [("sensor", "temp 1"), ("value", "21.5")];
//! let request = HttpRequest::get("10.0.0.1", "/api/update").with_query(&query);
//! let response = adapter.send(&request).unwrap();
//!
//! assert_eq!(Some(200), response.status_code());
//! assert_eq!("HTTP/1.1 200 OK\r\n\r\nstored", response.payload());
//! ````
use crate::channel::SerialChannel;
use crate::stack::Error;
use crate::urc::extract_data;
use crate::url;
use crate::wifi::Adapter;
use alloc::string::String;
use fugit_timer::Timer;
use numtoa::NumToA;

/// Supported request methods
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
        }
    }
}

/// HTTP request parameters
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest<'a> {
    pub method: Method,

    /// Remote host name or IP, also used for the `Host` header
    pub host: &'a str,

    pub port: u16,

    /// Unencoded path, e.g. `/api/update`
    pub path: &'a str,

    /// Unencoded query parameters, in order
    pub query: &'a [(&'a str, &'a str)],

    /// JSON body
    pub body: Option<&'a str>,
}

impl<'a> HttpRequest<'a> {
    /// GET request to port 80
    pub fn get(host: &'a str, path: &'a str) -> Self {
        Self {
            method: Method::Get,
            host,
            port: 80,
            path,
            query: &[],
            body: None,
        }
    }

    /// PUT request with JSON body to port 80
    pub fn put(host: &'a str, path: &'a str, body: &'a str) -> Self {
        Self {
            method: Method::Put,
            body: Some(body),
            ..Self::get(host, path)
        }
    }

    pub fn with_port(self, port: u16) -> Self {
        Self { port, ..self }
    }

    pub fn with_query(self, query: &'a [(&'a str, &'a str)]) -> Self {
        Self { query, ..self }
    }

    /// Encodes the request as sent over the wire
    pub fn build(&self) -> String {
        let mut request = String::new();

        request.push_str(self.method.as_str());
        request.push(' ');
        match self.path {
            "" => request.push('/'),
            path => request.push_str(&url::encode_path(path)),
        }

        if !self.query.is_empty() {
            request.push('?');
            request.push_str(&url::query_string(self.query));
        }

        request.push_str(" HTTP/1.1\r\nHost: ");
        request.push_str(self.host);
        request.push_str("\r\n");

        if let Some(body) = self.body {
            let mut digits = [0x0; 20];
            request.push_str("Content-Type: application/json\r\nContent-Length: ");
            request.push_str(body.len().numtoa_str(10, &mut digits));
            request.push_str("\r\n");
        }

        request.push_str("Connection: close\r\n\r\n");

        if let Some(body) = self.body {
            request.push_str(body);
        }

        request
    }
}

/// Text received after transmitting the request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// Raw modem output, including send confirmation and data frames
    text: String,
}

impl HttpResponse {
    pub(crate) fn new(text: String) -> Self {
        Self { text }
    }

    /// Raw modem output, possibly empty if the server did not respond in time
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Socket data received from the server
    pub fn payload(&self) -> String {
        extract_data(&self.text)
    }

    /// Status code of the HTTP status line, if received
    pub fn status_code(&self) -> Option<u16> {
        let start = self.text.find("HTTP/1.")?;
        let status = self.text[start..].split(' ').nth(1)?;

        if status.len() != 3 {
            return None;
        }

        status.parse().ok()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl<S: SerialChannel, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> Adapter<S, T, TIMER_HZ> {
    /// Sends the request and returns the received server response
    ///
    /// The connection is closed after the request in any case, even if a previous step failed.
    /// A response gets returned even if the server did not respond in time.
    pub fn send(&mut self, request: &HttpRequest<'_>) -> Result<HttpResponse, Error> {
        if !self.is_associated() {
            return Err(Error::NotAssociated);
        }

        let payload = request.build();
        if payload.len() > self.config.max_payload_length {
            return Err(Error::PayloadTooLong);
        }

        self.open_connection(request.host, request.port)?;
        let result = self.transmit(payload.as_bytes());

        // Keeps the diagnostics of the failed step instead of the close response
        let diagnostics = self.engine.take_last_response();
        self.close_connection();

        match result {
            Ok(text) => {
                self.engine.set_last_response(text.clone());
                Ok(HttpResponse::new(text))
            }
            Err(error) => {
                log::warn!("{} {} failed: {:?}", request.method.as_str(), request.path, error);
                self.engine.set_last_response(diagnostics);
                Err(error)
            }
        }
    }

    /// Sends a GET request to port 80
    pub fn get(&mut self, host: &str, path: &str, query: &[(&str, &str)]) -> Result<HttpResponse, Error> {
        self.send(&HttpRequest::get(host, path).with_query(query))
    }

    /// Sends a PUT request with JSON body to port 80
    pub fn put(&mut self, host: &str, path: &str, query: &[(&str, &str)], body: &str) -> Result<HttpResponse, Error> {
        self.send(&HttpRequest::put(host, path, body).with_query(query))
    }
}

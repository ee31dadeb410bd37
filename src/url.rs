//! # URL encoding
//!
//! Percent-encoding following RFC 3986. Only unreserved characters (`A-Z a-z 0-9 - . _ ~`) are kept,
//! everything else is encoded byte-wise as `%XX` using uppercase hex digits.
//!
//! Query parameters are encoded one by one and afterwards joined by literal `=` and `&`, so that
//! reserved characters inside values do not break the query structure.
//!
//! ````
//! # use esp_at_http::url;
//! assert_eq!("a%20b%26c", url::encode("a b&c"));
//! assert_eq!("t=21.5&loc=lab%201", url::query_string(&[("t", "21.5"), ("loc", "lab 1")]));
//! ````
use alloc::string::String;
use alloc::vec::Vec;

/// Returns true if the byte may be used without encoding
fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// Appends the percent-encoded value to the target
pub fn encode_into(value: &str, target: &mut String) {
    for byte in value.bytes() {
        if is_unreserved(byte) {
            target.push(byte as char);
            continue;
        }

        let hex = base16::encode_byte_u(byte);
        target.push('%');
        target.push(hex[0] as char);
        target.push(hex[1] as char);
    }
}

/// Percent-encodes the given value
pub fn encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    encode_into(value, &mut encoded);
    encoded
}

/// Encodes each path segment, the `/` separators are kept
pub fn encode_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());

    for (index, segment) in path.split('/').enumerate() {
        if index > 0 {
            encoded.push('/');
        }

        encode_into(segment, &mut encoded);
    }

    encoded
}

/// Builds the query string (without leading `?`) of the given key/value pairs
pub fn query_string(params: &[(&str, &str)]) -> String {
    let mut query = String::new();

    for (index, (key, value)) in params.iter().enumerate() {
        if index > 0 {
            query.push('&');
        }

        encode_into(key, &mut query);
        query.push('=');
        encode_into(value, &mut query);
    }

    query
}

/// Decodes a percent-encoded value. Returns None on invalid escape sequences or invalid UTF-8.
pub fn decode(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] != b'%' {
            decoded.push(bytes[index]);
            index += 1;
            continue;
        }

        let high = base16::decode_byte(*bytes.get(index + 1)?)?;
        let low = base16::decode_byte(*bytes.get(index + 2)?)?;
        decoded.push(high << 4 | low);
        index += 3;
    }

    String::from_utf8(decoded).ok()
}

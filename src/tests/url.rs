use crate::url::{decode, encode, encode_path, query_string};
use alloc::string::String;
use alloc::vec::Vec;

#[test]
fn test_encode_unreserved_kept() {
    assert_eq!("AZaz09-._~", encode("AZaz09-._~"));
}

#[test]
fn test_encode_reserved() {
    assert_eq!("%20%26%3D%3F%2F%23%2B%25", encode(" &=?/#+%"));
}

#[test]
fn test_encode_multi_byte() {
    assert_eq!("23%C2%B0C", encode("23°C"));
}

#[test]
fn test_encode_path() {
    assert_eq!("/api/v1/my%20file", encode_path("/api/v1/my file"));
    assert_eq!("/", encode_path("/"));
    assert_eq!("", encode_path(""));
}

#[test]
fn test_decode_round_trip() {
    let values = ["a b", "k=v&x=y?", "100% sure", "Grüße, Welt"];

    for value in values {
        assert_eq!(Some(String::from(value)), decode(&encode(value)));
    }
}

#[test]
fn test_decode_invalid() {
    assert_eq!(None, decode("%"));
    assert_eq!(None, decode("%2"));
    assert_eq!(None, decode("%ZZ"));
    assert_eq!(None, decode("%FF"));
}

#[test]
fn test_decode_lowercase_hex() {
    assert_eq!(Some(String::from("a/b")), decode("a%2fb"));
}

#[test]
fn test_query_string_split_recovers_params() {
    let params = [("q", "a&b=c"), ("next?", "x y"), ("empty", "")];
    let query = query_string(&params);

    let recovered: Vec<(String, String)> = query
        .split('&')
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap();
            (decode(key).unwrap(), decode(value).unwrap())
        })
        .collect();

    assert_eq!(3, recovered.len());
    for ((key, value), (expected_key, expected_value)) in recovered.iter().zip(params.iter()) {
        assert_eq!(expected_key, key);
        assert_eq!(expected_value, value);
    }
}

#[test]
fn test_query_string_empty() {
    assert_eq!("", query_string(&[]));
}

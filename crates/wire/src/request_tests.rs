// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fixtures::start_data;
use serde_json::json;
use similar_asserts::assert_eq;

fn data(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

#[test]
fn round_trips_every_key_of_a_well_formed_request() {
    let original = data(start_data("da8fd868", "9141", "ace7"));
    let request = BuildRequest::from_data(&original).unwrap();
    assert_eq!(request.to_data(), original);
}

#[test]
fn round_trips_command_arguments() {
    let mut original = data(start_data("T1", "9141", "ace7"));
    original.insert("entrypointCommandArguments".into(), json!(["-c", "print('hi')"]));
    let request = BuildRequest::from_data(&original).unwrap();
    assert_eq!(
        request.entrypoint_args.as_deref(),
        Some(&["-c".to_string(), "print('hi')".to_string()][..])
    );
    assert_eq!(request.to_data(), original);
}

#[test]
fn optional_fields_may_be_absent_or_null() {
    let mut original = data(start_data("T1", "9141", "ace7"));
    original.remove("query");
    original.remove("user_he_key");
    original.remove("userId");
    original.insert("entrypointCommandArguments".into(), Value::Null);
    let request = BuildRequest::from_data(&original).unwrap();
    assert_eq!(request.query, None);
    assert_eq!(request.user_he_key, None);
    assert_eq!(request.user_id, None);
    assert_eq!(request.entrypoint_args, None);
    assert!(!request.to_data().contains_key("entrypointCommandArguments"));
}

#[test]
fn unknown_extra_keys_are_ignored() {
    let mut original = data(start_data("T1", "9141", "ace7"));
    original.insert("comment".into(), json!("ignored"));
    assert!(BuildRequest::from_data(&original).is_ok());
}

#[yare::parameterized(
    train_id     = { "trainId" },
    proposal_id  = { "proposalId" },
    stations     = { "stations" },
    files        = { "files" },
    master_image = { "masterImage" },
    executable   = { "entrypointExecutable" },
    path         = { "entrypointPath" },
    session_id   = { "sessionId" },
    hash         = { "hash" },
    hash_signed  = { "hashSigned" },
)]
fn missing_required_key_is_malformed(key: &str) {
    let mut original = data(start_data("T1", "9141", "ace7"));
    original.remove(key);
    let err = BuildRequest::from_data(&original).unwrap_err();
    assert!(err.to_string().contains(key), "error {:?} should name {}", err, key);
}

#[yare::parameterized(
    empty_train_id = { "trainId",     json!("") },
    empty_hash     = { "hash",        json!("  ") },
    empty_stations = { "stations",    json!([]) },
    proposal_text  = { "proposalId",  json!("ninety") },
    stations_text  = { "stations",    json!("s1,s2") },
)]
fn invalid_values_are_malformed(key: &str, value: Value) {
    let mut original = data(start_data("T1", "9141", "ace7"));
    original.insert(key.into(), value);
    assert!(matches!(BuildRequest::from_data(&original), Err(MessageError::Malformed(_))));
}

#[yare::parameterized(
    numeric = { json!(42),      "42" },
    named   = { json!("alice"), "alice" },
)]
fn user_id_accepts_numbers_and_strings(raw: Value, expected: &str) {
    let id: UserId = serde_json::from_value(raw.clone()).unwrap();
    similar_asserts::assert_eq!(id.to_string(), expected);
    similar_asserts::assert_eq!(serde_json::to_value(&id).unwrap(), raw);
}

use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use serde_json::json;

use codec_json_event::{
    ConfigError, JsonDecoder, JsonEventConfig, JsonEventDecoder, ReservedColumn, ReservedKind, build_decoder,
};
use row_api::{DecodeError, RecordType, Row, RowDecoder, Value};

fn event_decoder(names: &str, types: &str) -> JsonEventDecoder {
    JsonEventDecoder::with_defaults(RecordType::from_columns(names, types).unwrap()).unwrap()
}

#[test]
fn event_with_all_metadata_columns() {
    let decoder = event_decoder("uuid,host,ts,count", "string,string,string,int");
    let row = decoder
        .decode(
            br#"{"uuid":"abc","host":"h1","timestamp":"2021-01-01T00:00:00.000Z","data":{"Count":7}}"#,
        )
        .unwrap();

    assert_eq!(
        row,
        Row(vec![
            Value::from("abc"),
            Value::from("h1"),
            Value::from("2021-01-01 00:00:00"),
            Value::Int32(7),
        ])
    );
}

#[test]
fn empty_payload_without_metadata_columns() {
    let decoder = event_decoder("count", "int");
    assert_eq!(decoder.decode(br#"{"data":{}}"#).unwrap(), Row(vec![Value::Null]));
}

#[test]
fn declared_timestamp_column_requires_root_key() {
    let decoder = event_decoder("ts,count", "string,int");
    let err = decoder.decode(br#"{"data":{"count":1}}"#).unwrap_err();
    assert_eq!(
        err,
        DecodeError::MissingField {
            path: String::new(),
            field: "timestamp".into(),
        }
    );
}

#[test]
fn map_keys_colliding_ignoring_case() {
    let decoder = event_decoder("tags", "map<string,string>");
    let err = decoder
        .decode(br#"{"data":{"tags":{"A":"1","a":"2"}}}"#)
        .unwrap_err();
    assert_eq!(
        err,
        DecodeError::DuplicateKey {
            path: "tags".into(),
            key: "a".into(),
        }
    );
}

#[test]
fn colliding_map_keys_report_the_later_key() {
    let decoder = event_decoder("tags", "map<string,string>");
    let err = decoder
        .decode(br#"{"data":{"tags":{"a":"1","A":"2"}}}"#)
        .unwrap_err();
    assert_eq!(
        err,
        DecodeError::DuplicateKey {
            path: "tags".into(),
            key: "A".into(),
        }
    );
}

#[test]
fn list_element_of_wrong_kind() {
    let decoder = event_decoder("items", "array<int>");
    let err = decoder
        .decode(br#"{"data":{"items":[1,2,"x"]}}"#)
        .unwrap_err();
    assert!(matches!(&err, DecodeError::TypeMismatch { .. }));
    assert_eq!(err.path(), Some("items"));
}

#[test]
fn missing_payload() {
    let decoder = event_decoder("count", "int");
    let err = decoder.decode(br#"{"uuid":"abc"}"#).unwrap_err();
    assert_eq!(
        err,
        DecodeError::MissingField {
            path: String::new(),
            field: "data".into(),
        }
    );
}

#[test]
fn payload_must_be_an_object() {
    let decoder = event_decoder("count", "int");
    let cases = [
        (json!({"data": [1]}), "array"),
        (json!({"data": "x"}), "string"),
        (json!({"data": null}), "null"),
    ];
    for (doc, found) in cases {
        assert_eq!(
            decoder.decode_value(&doc).unwrap_err(),
            DecodeError::type_mismatch("data", "struct", found)
        );
    }
}

#[test]
fn root_must_be_an_object() {
    let decoder = event_decoder("count", "int");
    let cases = [
        (b"[1]".as_slice(), "array"),
        (br#""x""#.as_slice(), "string"),
        (b"7".as_slice(), "number"),
    ];
    for (doc, found) in cases {
        assert_eq!(
            decoder.decode(doc).unwrap_err(),
            DecodeError::type_mismatch("", "struct", found)
        );
    }
}

#[test]
fn reserved_column_with_non_text_type_is_rejected() {
    let schema = RecordType::from_columns("uuid,count", "bigint,int").unwrap();
    assert!(matches!(
        JsonEventDecoder::with_defaults(schema),
        Err(ConfigError::ReservedColumnNotText { .. })
    ));
}

#[test]
fn malformed_document() {
    let decoder = event_decoder("count", "int");
    assert!(matches!(
        decoder.decode(b"{\"data\":"),
        Err(DecodeError::MalformedDocument(_))
    ));
}

#[test]
fn any_casing_resolves_to_the_same_slot() {
    let decoder = event_decoder("userName", "string");
    for key in ["username", "USERNAME", "UserName", "userName", "uSeRnAmE"] {
        let doc = json!({ "data": { key: "bob" } });
        assert_eq!(decoder.decode_value(&doc).unwrap(), Row(vec![Value::from("bob")]));
    }
}

#[test]
fn metadata_comes_from_root_not_payload() {
    let decoder = event_decoder("host,count", "string,int");
    let doc = json!({"host": "root-host", "data": {"host": "payload-host", "count": 1}});
    assert_eq!(
        decoder.decode_value(&doc).unwrap(),
        Row(vec![Value::from("root-host"), Value::Int32(1)])
    );
}

#[test]
fn nested_structures_decode_fully() {
    let decoder = event_decoder(
        "id,tags,visits",
        "bigint,map<string,array<string>>,array<struct<page:string,ms:double>>",
    );
    let row = decoder
        .decode_value(&json!({
            "data": {
                "ID": 12,
                "Tags": {"Env": ["prod", "eu"]},
                "visits": [{"PAGE": "/", "ms": 1.5}, {"page": "/a", "extra": true}]
            }
        }))
        .unwrap();

    assert_eq!(row.get(0), Some(&Value::Int64(12)));
    let tags = row.get(1).and_then(Value::as_map).unwrap();
    assert_eq!(
        tags.get("env"),
        Some(&Value::List(vec![Value::from("prod"), Value::from("eu")]))
    );
    assert_eq!(tags.keys().collect::<Vec<_>>(), vec!["Env"]);
    assert_eq!(
        row.get(2),
        Some(&Value::List(vec![
            Value::Row(Row(vec![Value::from("/"), Value::Float64(1.5)])),
            Value::Row(Row(vec![Value::from("/a"), Value::Null])),
        ]))
    );
}

#[test]
fn custom_reserved_columns_and_payload_key() {
    let config = JsonEventConfig {
        payload_key: "body".into(),
        reserved: vec![ReservedColumn::new(ReservedKind::Timestamp, "event_time", "at")],
        ..JsonEventConfig::default()
    };
    let schema = RecordType::from_columns("event_time,uuid", "string,string").unwrap();
    let decoder = JsonEventDecoder::new(schema, &config).unwrap();

    // `uuid` is not reserved here: it comes from the payload.
    let row = decoder
        .decode_value(&json!({"at": "2022-02-02T10:00:00Z", "body": {"uuid": "p"}}))
        .unwrap();
    assert_eq!(
        row,
        Row(vec![Value::from("2022-02-02 10:00:00"), Value::from("p")])
    );
}

#[test]
fn plain_mode_decodes_whole_document() {
    let schema = RecordType::from_columns("a,b", "int,string").unwrap();
    let config = JsonEventConfig::parse(r#"mode = "plain""#).unwrap();
    let decoder = build_decoder(schema, &config).unwrap();
    assert_eq!(
        decoder.decode(br#"{"A":1,"b":"x","data":{}}"#).unwrap(),
        Row(vec![Value::Int32(1), Value::from("x")])
    );
}

#[test]
fn decoding_fails_fast_without_partial_rows() {
    let decoder = JsonDecoder::new(RecordType::from_columns("a,b", "int,int").unwrap());
    assert_eq!(
        decoder.decode(br#"{"a":"bad","b":2}"#),
        Err(DecodeError::type_mismatch("a", "int32", "string"))
    );
}

#[test]
fn decoder_is_shared_across_threads() {
    let decoder: Arc<dyn RowDecoder> =
        Arc::new(event_decoder("host,n", "string,bigint"));

    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let decoder = Arc::clone(&decoder);
            thread::spawn(move || {
                let doc = json!({"host": format!("h{i}"), "data": {"n": i}});
                decoder.decode_value(&doc)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let row = handle.join().unwrap().unwrap();
        assert_eq!(
            row,
            Row(vec![Value::from(format!("h{i}")), Value::Int64(i as i64)])
        );
    }
}

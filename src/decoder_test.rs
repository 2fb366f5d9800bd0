use std::sync::Arc;

use crate::constant::oid;
use crate::decoder::{DecoderTable, GLOBAL_DECODERS, decode_bool, decode_bytea, decode_float, decode_int};
use crate::error::Error;
use crate::value::Value;

#[test]
fn builtin_table_covers_scalar_types() {
    let table = DecoderTable::builtin();
    for type_oid in [
        oid::BOOL,
        oid::INT2,
        oid::INT4,
        oid::INT8,
        oid::OID,
        oid::FLOAT4,
        oid::FLOAT8,
        oid::BYTEA,
    ] {
        assert!(table.get(type_oid).is_some(), "missing decoder for {type_oid}");
    }
}

#[test]
fn text_like_types_are_not_registered() {
    let table = DecoderTable::builtin();
    for type_oid in [oid::TEXT, oid::VARCHAR, oid::NUMERIC, oid::JSON, oid::UUID] {
        assert!(table.get(type_oid).is_none());
    }
}

#[test]
fn global_table_is_built_once() {
    let a = Arc::clone(&GLOBAL_DECODERS);
    let b = Arc::clone(&GLOBAL_DECODERS);
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!a.is_empty());
}

#[test]
fn with_replaces_entry() {
    fn always_zero(_: &str) -> crate::error::Result<Value> {
        Ok(Value::Int(0))
    }

    let table = DecoderTable::new().with(oid::INT4, decode_int);
    assert_eq!(table.len(), 1);
    let table = table.with(oid::INT4, always_zero);
    assert_eq!(table.len(), 1);

    let decoder = table.get(oid::INT4).unwrap();
    assert_eq!(decoder("42").unwrap(), Value::Int(0));
}

#[test]
fn bool_spellings() {
    assert_eq!(decode_bool("t").unwrap(), Value::Bool(true));
    assert_eq!(decode_bool("f").unwrap(), Value::Bool(false));
    assert_eq!(decode_bool("true").unwrap(), Value::Bool(true));
    assert!(matches!(decode_bool("maybe"), Err(Error::DecodeError(_))));
}

#[test]
fn int_parses_and_rejects() {
    assert_eq!(decode_int("1").unwrap(), Value::Int(1));
    assert_eq!(decode_int("-9223372036854775808").unwrap(), Value::Int(i64::MIN));
    assert!(matches!(decode_int("1.5"), Err(Error::DecodeError(_))));
    assert!(matches!(decode_int(""), Err(Error::DecodeError(_))));
}

#[test]
fn float_special_values() {
    assert_eq!(decode_float("1.25").unwrap(), Value::Float(1.25));
    assert_eq!(decode_float("Infinity").unwrap(), Value::Float(f64::INFINITY));
    assert_eq!(
        decode_float("-Infinity").unwrap(),
        Value::Float(f64::NEG_INFINITY)
    );
    match decode_float("NaN").unwrap() {
        Value::Float(f) => assert!(f.is_nan()),
        other => panic!("unexpected value: {other:?}"),
    }
}

#[test]
fn bytea_hex_format() {
    assert_eq!(
        decode_bytea("\\x00ff10Ab").unwrap(),
        Value::Bytes(vec![0x00, 0xff, 0x10, 0xab])
    );
    assert_eq!(decode_bytea("\\x").unwrap(), Value::Bytes(vec![]));
    assert!(matches!(decode_bytea("\\x0"), Err(Error::DecodeError(_))));
    assert!(matches!(decode_bytea("\\xzz"), Err(Error::DecodeError(_))));
}

#[test]
fn bytea_escape_format() {
    assert_eq!(
        decode_bytea("ab\\000\\\\c").unwrap(),
        Value::Bytes(vec![b'a', b'b', 0, b'\\', b'c'])
    );
    assert_eq!(decode_bytea("\\\\").unwrap(), Value::Bytes(vec![b'\\']));
    assert_eq!(decode_bytea("\\377").unwrap(), Value::Bytes(vec![0xff]));
    assert!(matches!(decode_bytea("\\9"), Err(Error::DecodeError(_))));
}

#[cfg(feature = "with-chrono")]
#[test]
fn temporal_types() {
    use chrono::{NaiveDate, Timelike};

    let table = DecoderTable::builtin();

    let date = table.get(oid::DATE).unwrap()("2024-02-29").unwrap();
    assert_eq!(
        date,
        Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
    );

    match table.get(oid::TIMESTAMP).unwrap()("2024-02-29 12:30:45.123456").unwrap() {
        Value::Timestamp(ts) => assert_eq!(ts.nanosecond(), 123_456_000),
        other => panic!("unexpected value: {other:?}"),
    }

    match table.get(oid::TIMESTAMPTZ).unwrap()("2024-02-29 12:30:45+05:30").unwrap() {
        Value::TimestampTz(ts) => assert_eq!(ts.offset().local_minus_utc(), 5 * 3600 + 1800),
        other => panic!("unexpected value: {other:?}"),
    }

    assert_eq!(
        table.get(oid::DATE).unwrap()("infinity").unwrap(),
        Value::Text("infinity".to_string())
    );
}

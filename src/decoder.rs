use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::constant::{Oid, oid};
use crate::error::{Error, Result};
use crate::value::Value;

/// Converts the raw text representation of a column into a typed value
pub type Decoder = fn(&str) -> Result<Value>;

/// The decoder table shared by every connection in the process
///
/// Built on first use and never mutated afterwards.
pub static GLOBAL_DECODERS: LazyLock<Arc<DecoderTable>> =
    LazyLock::new(|| Arc::new(DecoderTable::builtin()));

/// Immutable mapping from a server type identifier to its decoder
///
/// Types without an entry are passed through as text by the row decoder.
#[derive(Debug, Clone, Default)]
pub struct DecoderTable {
    decoders: HashMap<Oid, Decoder>,
}

impl DecoderTable {
    /// An empty table: every column decodes as text
    pub fn new() -> Self {
        Self::default()
    }

    /// The table of decoders for the server's built-in types
    pub fn builtin() -> Self {
        let table = Self::new()
            .with(oid::BOOL, decode_bool)
            .with(oid::INT2, decode_int)
            .with(oid::INT4, decode_int)
            .with(oid::INT8, decode_int)
            .with(oid::OID, decode_int)
            .with(oid::FLOAT4, decode_float)
            .with(oid::FLOAT8, decode_float)
            .with(oid::BYTEA, decode_bytea);

        #[cfg(feature = "with-chrono")]
        let table = table
            .with(oid::DATE, temporal::decode_date)
            .with(oid::TIMESTAMP, temporal::decode_timestamp)
            .with(oid::TIMESTAMPTZ, temporal::decode_timestamptz);

        table
    }

    /// Register `decoder` for `type_oid`, replacing any previous entry
    pub fn with(mut self, type_oid: Oid, decoder: Decoder) -> Self {
        self.decoders.insert(type_oid, decoder);
        self
    }

    pub fn get(&self, type_oid: Oid) -> Option<Decoder> {
        self.decoders.get(&type_oid).copied()
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

pub fn decode_bool(raw: &str) -> Result<Value> {
    match raw {
        "t" | "true" | "TRUE" | "y" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
        "f" | "false" | "FALSE" | "n" | "no" | "off" | "0" => Ok(Value::Bool(false)),
        _ => Err(Error::DecodeError(format!("invalid boolean: {raw:?}"))),
    }
}

pub fn decode_int(raw: &str) -> Result<Value> {
    raw.parse::<i64>()
        .map(Value::Int)
        .map_err(|e| Error::DecodeError(format!("invalid integer {raw:?}: {e}")))
}

/// Accepts `NaN`, `Infinity` and `-Infinity` as the server spells them
pub fn decode_float(raw: &str) -> Result<Value> {
    raw.parse::<f64>()
        .map(Value::Float)
        .map_err(|e| Error::DecodeError(format!("invalid float {raw:?}: {e}")))
}

/// Decodes both the `hex` (`\x0a0b`) and the legacy `escape` output formats
pub fn decode_bytea(raw: &str) -> Result<Value> {
    match raw.strip_prefix("\\x") {
        Some(hex) => decode_bytea_hex(hex),
        None => decode_bytea_escape(raw),
    }
    .map(Value::Bytes)
}

fn decode_bytea_hex(hex: &str) -> Result<Vec<u8>> {
    let digits = hex.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(Error::DecodeError(
            "bytea hex input has an odd number of digits".to_string(),
        ));
    }

    digits
        .chunks_exact(2)
        .map(|pair| Ok((hex_digit(pair[0])? << 4) | hex_digit(pair[1])?))
        .collect()
}

fn hex_digit(digit: u8) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(Error::DecodeError(format!(
            "invalid hex digit in bytea: {:?}",
            char::from(digit)
        ))),
    }
}

fn decode_bytea_escape(raw: &str) -> Result<Vec<u8>> {
    let input = raw.as_bytes();
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while let Some(&byte) = input.get(i) {
        if byte != b'\\' {
            out.push(byte);
            i += 1;
            continue;
        }

        match input.get(i + 1..i + 4) {
            Some([b'\\', ..]) => {
                out.push(b'\\');
                i += 2;
            }
            Some(&[a, b, c]) if is_octal(a) && is_octal(b) && is_octal(c) => {
                out.push(((a - b'0') << 6) | ((b - b'0') << 3) | (c - b'0'));
                i += 4;
            }
            _ if input.get(i + 1) == Some(&b'\\') => {
                out.push(b'\\');
                i += 2;
            }
            _ => {
                return Err(Error::DecodeError(
                    "invalid escape sequence in bytea".to_string(),
                ));
            }
        }
    }

    Ok(out)
}

fn is_octal(byte: u8) -> bool {
    (b'0'..=b'7').contains(&byte)
}

#[cfg(feature = "with-chrono")]
mod temporal {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    use crate::error::{Error, Result};
    use crate::value::Value;

    // `infinity` and `-infinity` have no chrono counterpart and stay text.
    fn is_infinite(raw: &str) -> bool {
        raw == "infinity" || raw == "-infinity"
    }

    pub(super) fn decode_date(raw: &str) -> Result<Value> {
        if is_infinite(raw) {
            return Ok(Value::Text(raw.to_string()));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|e| Error::DecodeError(format!("invalid date {raw:?}: {e}")))
    }

    pub(super) fn decode_timestamp(raw: &str) -> Result<Value> {
        if is_infinite(raw) {
            return Ok(Value::Text(raw.to_string()));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
            .map(Value::Timestamp)
            .map_err(|e| Error::DecodeError(format!("invalid timestamp {raw:?}: {e}")))
    }

    pub(super) fn decode_timestamptz(raw: &str) -> Result<Value> {
        if is_infinite(raw) {
            return Ok(Value::Text(raw.to_string()));
        }
        DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z")
            .map(Value::TimestampTz)
            .map_err(|e| Error::DecodeError(format!("invalid timestamptz {raw:?}: {e}")))
    }
}

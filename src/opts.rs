use std::sync::Arc;

use smart_default::SmartDefault;

use crate::decoder::{DecoderTable, GLOBAL_DECODERS};
use crate::error::Error;
use crate::row::RowMode;

/// A configuration for connection
///
/// ```rs
/// let mut opts1 = Opts::default();
/// opts1.conninfo = "host=localhost dbname=app".to_string();
///
/// let opts2 = Opts::try_from("postgres://app@localhost/app?row_mode=positional")?;
/// ```
#[derive(Debug, Clone, SmartDefault)]
pub struct Opts {
    /// Connection string handed to the transport as-is
    ///
    /// Either a libpq `key=value` string or a `postgres://` URL.
    pub conninfo: String,

    /// Shape of the rows every command of this connection produces
    pub row_mode: RowMode,

    /// Decoders applied to column values. Shared, never mutated.
    #[default(Arc::clone(&GLOBAL_DECODERS))]
    pub decoders: Arc<DecoderTable>,
}

impl TryFrom<&str> for Opts {
    type Error = Error;

    fn try_from(conninfo: &str) -> Result<Self, Self::Error> {
        // key=value strings belong to the transport
        if !has_url_scheme(conninfo) {
            return Ok(Self {
                conninfo: conninfo.to_string(),
                ..Default::default()
            });
        }

        let mut parsed = url::Url::parse(conninfo)
            .map_err(|e| Error::BadConfigError(format!("Failed to parse PostgreSQL URL: {}", e)))?;

        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(Error::BadConfigError(format!(
                "Invalid URL scheme '{}', expected 'postgres' or 'postgresql'",
                parsed.scheme()
            )));
        }

        // `row_mode` is ours; everything else is forwarded to the server
        let mut row_mode = RowMode::default();
        let mut forwarded = Vec::new();
        for (key, value) in parsed.query_pairs() {
            if key == "row_mode" {
                row_mode = parse_row_mode(&value)?;
            } else {
                forwarded.push((key.into_owned(), value.into_owned()));
            }
        }

        if forwarded.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(forwarded);
        }

        Ok(Self {
            conninfo: parsed.into(),
            row_mode,
            ..Default::default()
        })
    }
}

impl TryFrom<String> for Opts {
    type Error = Error;

    fn try_from(conninfo: String) -> Result<Self, Self::Error> {
        Self::try_from(conninfo.as_str())
    }
}

/// `true` if `conninfo` starts with `scheme://`
///
/// A `://` inside a key/value string, e.g. in an `options` value, does not count.
fn has_url_scheme(conninfo: &str) -> bool {
    let Some((scheme, _)) = conninfo.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn parse_row_mode(value: &str) -> Result<RowMode, Error> {
    match value {
        "keyed" | "object" => Ok(RowMode::Keyed),
        "positional" | "array" => Ok(RowMode::Positional),
        other => Err(Error::BadConfigError(format!(
            "Invalid row_mode '{}', expected 'keyed' or 'positional'",
            other
        ))),
    }
}

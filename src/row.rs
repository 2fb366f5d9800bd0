use std::sync::Arc;

use crate::col::Column;
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::value::Value;

/// Shape of the rows a connection produces, fixed when the connection is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowMode {
    /// Rows keyed by column name, in column order
    #[default]
    Keyed,
    /// Rows as a positional list of values
    Positional,
}

/// Raw text of one cell plus the transport's explicit null flag
#[derive(Debug, Clone, Copy)]
pub struct RawCell<'a> {
    pub text: &'a [u8],
    pub null_flag: bool,
}

impl RawCell<'_> {
    /// A cell is NULL only when its text is empty *and* it is flagged null.
    /// An unflagged empty string is an empty string.
    pub fn is_null(&self) -> bool {
        self.text.is_empty() && self.null_flag
    }
}

/// Decode one cell of `column`
///
/// Types without a decoder pass through unchanged: as text when the bytes are
/// UTF-8, as raw bytes otherwise.
pub fn decode_cell(column: &Column, cell: RawCell<'_>) -> Result<Value> {
    if cell.is_null() {
        return Ok(Value::Null);
    }

    let Some(decoder) = column.decoder else {
        return Ok(match simdutf8::basic::from_utf8(cell.text) {
            Ok(text) => Value::Text(text.to_string()),
            Err(_) => Value::Bytes(cell.text.to_vec()),
        });
    };

    let text = simdutf8::basic::from_utf8(cell.text).map_err(|_| {
        Error::DecodeError(format!("column {:?} is not valid UTF-8", column.name))
    })?;
    decoder(text)
}

/// Decode tuple `row_index` of the transport's current result object
pub fn decode_row<T: Transport + ?Sized>(
    transport: &T,
    columns: &[Column],
    row_index: usize,
    mode: RowMode,
) -> Result<Row> {
    match mode {
        RowMode::Keyed => {
            let mut row = KeyedRow::with_capacity(columns.len());
            for (field_index, column) in columns.iter().enumerate() {
                let value = decode_cell(column, raw_cell(transport, row_index, field_index))?;
                row.insert(Arc::clone(&column.name), value);
            }
            Ok(Row::Keyed(row))
        }
        RowMode::Positional => {
            let values = columns
                .iter()
                .enumerate()
                .map(|(field_index, column)| {
                    decode_cell(column, raw_cell(transport, row_index, field_index))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Row::Positional(values))
        }
    }
}

fn raw_cell<T: Transport + ?Sized>(transport: &T, row: usize, field: usize) -> RawCell<'_> {
    RawCell {
        text: transport.value(row, field),
        null_flag: transport.is_null(row, field),
    }
}

/// A decoded row
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Keyed(KeyedRow),
    Positional(Vec<Value>),
}

impl Row {
    /// Look up a value by column name. Positional rows have no names.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Row::Keyed(row) => row.get(name),
            Row::Positional(_) => None,
        }
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Keyed(row) => row.entries.get(index).map(|(_, value)| value),
            Row::Positional(values) => values.get(index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Keyed(row) => row.len(),
            Row::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_values(self) -> Vec<Value> {
        match self {
            Row::Keyed(row) => row.entries.into_iter().map(|(_, value)| value).collect(),
            Row::Positional(values) => values,
        }
    }
}

/// Name-to-value mapping in column order
///
/// A repeated column name keeps its first position and takes the later value,
/// so `SELECT 1 AS a, 2 AS a` yields one entry `a = 2`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyedRow {
    entries: Vec<(Arc<str>, Value)>,
}

impl KeyedRow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, name: Arc<str>, value: Value) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_ref(), value))
    }
}

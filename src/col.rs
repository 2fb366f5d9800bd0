use std::sync::Arc;

use crate::constant::Oid;
use crate::decoder::{Decoder, DecoderTable};

/// One column of the current result object
///
/// The decoder is resolved once per result object, not once per cell.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: Arc<str>,
    pub type_oid: Oid,
    pub decoder: Option<Decoder>,
}

impl Column {
    pub fn new(name: &str, type_oid: Oid, decoders: &DecoderTable) -> Self {
        Self {
            name: Arc::from(name),
            type_oid,
            decoder: decoders.get(type_oid),
        }
    }
}

//! A non-blocking query driver for a single PostgreSQL connection.
//!
//! The driver sits on top of a [`Transport`](transport::Transport) that does the
//! socket I/O (typically a libpq binding in non-blocking mode). It serializes
//! command dispatch, drains outbound bytes, pumps result objects as they arrive,
//! decodes column values through a shared [`DecoderTable`](decoder::DecoderTable)
//! and completes every command exactly once.
//!
//! [`Connection`] is the sans-I/O core. The async driver
//! [`tokio::Conn`](crate::tokio::Conn) drives it by awaiting the readiness
//! events the core asks for.

pub mod col;
mod completion;
mod conn;
pub mod constant;
pub mod decoder;
pub mod error;
pub mod handler;
mod opts;
pub mod protocol;
mod pump;
pub mod row;
pub mod tokio;
pub mod transport;
pub mod value;

pub use completion::{Completion, Outcome};
pub use conn::Connection;
pub use error::{Error, Result};
pub use handler::{Notification, SubscriptionId};
pub use opts::Opts;
pub use row::{Row, RowMode};
pub use value::Value;

#[cfg(test)]
mod decoder_test;

//! The non-blocking wire-protocol capability the connection is built on.
//!
//! The driver never touches a socket itself. It asks a [`Transport`] to send,
//! flush and consume bytes, and inspects the result objects the transport has
//! assembled. The method set mirrors libpq's asynchronous command API, so a
//! libpq binding implements it almost one-to-one.

use std::future::Future;
use std::io;

use crate::constant::Oid;
use crate::handler::Notification;

/// Outcome of one attempt to flush buffered outbound bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushStatus {
    /// Everything was written
    Flushed,
    /// Some bytes are still queued; retry once the socket is writable
    Pending,
    /// Writing failed
    Failed,
}

pub trait Transport {
    /// Open the connection, blocking until it is established
    fn connect(&mut self, conninfo: &str) -> bool;

    fn set_nonblocking(&mut self, nonblocking: bool) -> bool;

    /// Queue a simple query. `false` if the transport refused it.
    fn send_query(&mut self, sql: &str) -> bool;

    /// Queue a named prepare
    fn send_prepare(&mut self, name: &str, sql: &str, param_count: usize) -> bool;

    /// Queue execution of a previously prepared statement
    fn send_query_prepared(&mut self, name: &str, params: &[Option<&str>]) -> bool;

    fn flush(&mut self) -> FlushStatus;

    /// Read whatever bytes the socket has. `false` on a read error.
    fn consume_input(&mut self) -> bool;

    /// `true` if the next result object cannot be produced without more input
    fn is_busy(&self) -> bool;

    /// Load the next completed result object. `false` once none remain.
    fn next_result(&mut self) -> bool;

    // Inspection of the current result object.

    /// Raw `ExecStatusType` code
    fn result_status(&self) -> i32;
    fn field_count(&self) -> usize;
    fn field_name(&self, field: usize) -> &str;
    fn field_type(&self, field: usize) -> Oid;
    fn tuple_count(&self) -> usize;
    fn value(&self, row: usize, field: usize) -> &[u8];
    fn is_null(&self, row: usize, field: usize) -> bool;
    fn result_error_message(&self) -> Option<String>;

    fn last_error_message(&self) -> Option<String>;

    /// Pop one asynchronous notification consumed from the socket
    fn next_notification(&mut self) -> Option<Notification>;

    fn escape_literal(&mut self, value: &str) -> Option<String>;
    fn escape_identifier(&mut self, value: &str) -> Option<String>;

    /// Called when the connection subscribes to readability
    fn start_read(&mut self) {}

    /// Called when the connection drops its readability subscription
    fn stop_read(&mut self) {}
}

/// One-shot readiness waits used by [`crate::tokio::Conn`]
pub trait Readiness {
    fn readable(&mut self) -> impl Future<Output = io::Result<()>> + Send;
    fn writable(&mut self) -> impl Future<Output = io::Result<()>> + Send;
}

//! Scripted in-memory transport.
//!
//! Result objects arrive in batches: each `consume_input` moves the next batch
//! from the wire into the ready queue. The transport reports busy while the
//! ready queue is empty and batches are still on the wire.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;

use zero_pq::constant::{Oid, exec_status, oid};
use zero_pq::transport::{FlushStatus, Readiness, Transport};
use zero_pq::{Notification, Opts};

#[derive(Debug, Clone)]
pub struct MockResult {
    pub status: i32,
    pub fields: Vec<(String, Oid)>,
    /// `None` is an empty cell flagged null
    pub rows: Vec<Vec<Option<String>>>,
    pub error: Option<String>,
}

impl MockResult {
    pub fn tuples(fields: &[(&str, Oid)], rows: &[&[Option<&str>]]) -> Self {
        Self {
            status: exec_status::TUPLES_OK,
            fields: fields
                .iter()
                .map(|(name, type_oid)| ((*name).to_string(), *type_oid))
                .collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.map(str::to_string)).collect())
                .collect(),
            error: None,
        }
    }

    pub fn command_ok() -> Self {
        Self::with_status(exec_status::COMMAND_OK)
    }

    pub fn fatal(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::with_status(exec_status::FATAL_ERROR)
        }
    }

    pub fn with_status(status: i32) -> Self {
        Self {
            status,
            fields: Vec::new(),
            rows: Vec::new(),
            error: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockTransport {
    // scripted behavior
    pub connect_ok: bool,
    pub nonblocking_ok: bool,
    pub accept_commands: bool,
    pub flush_script: VecDeque<FlushStatus>,
    pub fail_consume: bool,
    pub last_error: Option<String>,
    pub wire: VecDeque<Vec<MockResult>>,
    pub notifications: VecDeque<Notification>,

    // state
    ready: VecDeque<MockResult>,
    current: Option<MockResult>,

    // observations
    pub sent: Vec<String>,
    pub flush_calls: usize,
    pub consume_calls: usize,
    pub start_read_calls: usize,
    pub stop_read_calls: usize,
    pub readable_waits: usize,
    pub writable_waits: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            connect_ok: true,
            nonblocking_ok: true,
            accept_commands: true,
            ..Default::default()
        }
    }

    /// Queue one batch of result objects on the wire
    pub fn push_batch(&mut self, results: Vec<MockResult>) {
        self.wire.push_back(results);
    }

    /// Queue a batch holding a single result object
    pub fn push(&mut self, result: MockResult) {
        self.push_batch(vec![result]);
    }

    pub fn notify(&mut self, channel: &str, payload: &str) {
        self.notifications.push_back(Notification {
            channel: channel.to_string(),
            payload: payload.to_string(),
            process_id: 4242,
        });
    }

    fn current(&self) -> &MockResult {
        self.current.as_ref().expect("no current result")
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, conninfo: &str) -> bool {
        self.sent.push(format!("connect {conninfo}"));
        self.connect_ok
    }

    fn set_nonblocking(&mut self, nonblocking: bool) -> bool {
        assert!(nonblocking);
        self.nonblocking_ok
    }

    fn send_query(&mut self, sql: &str) -> bool {
        self.sent.push(format!("query {sql}"));
        self.accept_commands
    }

    fn send_prepare(&mut self, name: &str, sql: &str, param_count: usize) -> bool {
        self.sent.push(format!("prepare {name} {param_count} {sql}"));
        self.accept_commands
    }

    fn send_query_prepared(&mut self, name: &str, params: &[Option<&str>]) -> bool {
        self.sent.push(format!("execute {name} {params:?}"));
        self.accept_commands
    }

    fn flush(&mut self) -> FlushStatus {
        self.flush_calls += 1;
        self.flush_script.pop_front().unwrap_or(FlushStatus::Flushed)
    }

    fn consume_input(&mut self) -> bool {
        self.consume_calls += 1;
        if self.fail_consume {
            return false;
        }
        if let Some(batch) = self.wire.pop_front() {
            self.ready.extend(batch);
        }
        true
    }

    fn is_busy(&self) -> bool {
        self.ready.is_empty() && !self.wire.is_empty()
    }

    fn next_result(&mut self) -> bool {
        self.current = self.ready.pop_front();
        self.current.is_some()
    }

    fn result_status(&self) -> i32 {
        self.current().status
    }

    fn field_count(&self) -> usize {
        self.current().fields.len()
    }

    fn field_name(&self, field: usize) -> &str {
        &self.current().fields[field].0
    }

    fn field_type(&self, field: usize) -> Oid {
        self.current().fields[field].1
    }

    fn tuple_count(&self) -> usize {
        self.current().rows.len()
    }

    fn value(&self, row: usize, field: usize) -> &[u8] {
        match &self.current().rows[row][field] {
            Some(text) => text.as_bytes(),
            None => b"",
        }
    }

    fn is_null(&self, row: usize, field: usize) -> bool {
        self.current().rows[row][field].is_none()
    }

    fn result_error_message(&self) -> Option<String> {
        self.current().error.clone()
    }

    fn last_error_message(&self) -> Option<String> {
        self.last_error.clone()
    }

    fn next_notification(&mut self) -> Option<Notification> {
        self.notifications.pop_front()
    }

    fn escape_literal(&mut self, value: &str) -> Option<String> {
        Some(format!("'{}'", value.replace('\'', "''")))
    }

    fn escape_identifier(&mut self, value: &str) -> Option<String> {
        Some(format!("\"{}\"", value.replace('"', "\"\"")))
    }

    fn start_read(&mut self) {
        self.start_read_calls += 1;
    }

    fn stop_read(&mut self) {
        self.stop_read_calls += 1;
    }
}

impl Readiness for MockTransport {
    async fn readable(&mut self) -> io::Result<()> {
        self.readable_waits += 1;
        Ok(())
    }

    async fn writable(&mut self) -> io::Result<()> {
        self.writable_waits += 1;
        Ok(())
    }
}

/// Route the crate's `tracing` output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn connected() -> zero_pq::Connection<MockTransport> {
    init_tracing();
    zero_pq::Connection::open(MockTransport::new(), "host=localhost").unwrap()
}

pub fn connected_with(opts: Opts) -> zero_pq::Connection<MockTransport> {
    init_tracing();
    let mut conn = zero_pq::Connection::new(MockTransport::new(), &opts);
    conn.connect(&opts.conninfo).unwrap();
    conn
}

pub const INT4: Oid = oid::INT4;
pub const TEXT: Oid = oid::TEXT;

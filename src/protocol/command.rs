use crate::transport::Transport;

/// A command the dispatcher hands to the transport
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    /// Simple query; may contain several statements
    Query { sql: &'a str },
    /// Create a named prepared statement
    Prepare {
        name: &'a str,
        sql: &'a str,
        param_count: usize,
    },
    /// Execute a named prepared statement. `None` parameters are sent as NULL.
    ExecutePrepared {
        name: &'a str,
        params: &'a [Option<&'a str>],
    },
}

impl Command<'_> {
    /// Queue the command on the transport. `false` if it was refused.
    pub(crate) fn send<T: Transport + ?Sized>(&self, transport: &mut T) -> bool {
        match *self {
            Command::Query { sql } => transport.send_query(sql),
            Command::Prepare {
                name,
                sql,
                param_count,
            } => transport.send_prepare(name, sql, param_count),
            Command::ExecutePrepared { name, params } => {
                transport.send_query_prepared(name, params)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::Query { .. } => "query",
            Command::Prepare { .. } => "prepare",
            Command::ExecutePrepared { .. } => "execute",
        }
    }
}

/// What the connection is waiting for before it can make progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Outbound bytes are queued: call `on_writable` once the transport is writable
    WaitWritable,
    /// Subscribed to inbound data: call `on_readable` once the transport is readable
    WaitReadable,
    /// Nothing to wait for
    Idle,
}

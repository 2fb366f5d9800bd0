//! Sans-I/O connection: command dispatch, outbound drain and the readiness gate.
//!
//! [`Connection`] never blocks and never waits. Every entry point does as much
//! work as the transport allows and then reports, through [`Connection::next_action`],
//! which readiness event it needs next. Whoever owns the event loop waits for
//! that event and calls [`Connection::on_writable`] or [`Connection::on_readable`].
//! [`crate::tokio::Conn`] is such an owner.
//!
//! At most one command is in flight. Its outcome is delivered exactly once
//! through the [`Completion`] returned at dispatch.

use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};

use crate::col::Column;
use crate::completion::{self, Completion, Outcome, PendingCommand};
use crate::decoder::DecoderTable;
use crate::error::{Error, Result};
use crate::handler::{ErrorHandler, Notification, NotificationHandler, Subscribers, SubscriptionId};
use crate::opts::Opts;
use crate::protocol::{Action, Command, CopyDirection};
use crate::row::{Row, RowMode};
use crate::transport::{FlushStatus, Transport};

const DISPATCH_FAILED: &str = "Something went wrong dispatching the query";
const CONNECT_FAILED: &str = "Unable to connect";
const NONBLOCKING_FAILED: &str = "Unable to set non-blocking to true";
const FLUSH_FAILED: &str = "Unable to flush the command";

pub struct Connection<T> {
    pub(crate) transport: T,
    pub(crate) decoders: Arc<DecoderTable>,
    pub(crate) row_mode: RowMode,
    connected: bool,

    // state of the in-flight command
    pending: Option<PendingCommand>,
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: Vec<Row>,
    pub(crate) error: Option<Error>,
    pub(crate) copy: Option<CopyDirection>,
    draining: bool,

    // readiness gate
    reading: bool,
    pinned: bool,

    pub(crate) notification_handlers: Subscribers<NotificationHandler>,
    error_handlers: Subscribers<ErrorHandler>,
    next_subscription: u64,
}

impl<T: Transport> Connection<T> {
    /// Wrap a transport. Nothing is sent until [`Connection::connect`].
    pub fn new(transport: T, opts: &Opts) -> Self {
        Self {
            transport,
            decoders: Arc::clone(&opts.decoders),
            row_mode: opts.row_mode,
            connected: false,
            pending: None,
            columns: Vec::new(),
            rows: Vec::new(),
            error: None,
            copy: None,
            draining: false,
            reading: false,
            pinned: false,
            notification_handlers: Subscribers::default(),
            error_handlers: Subscribers::default(),
            next_subscription: 0,
        }
    }

    /// Wrap a transport and connect it using `opts.conninfo`
    pub fn open<O: TryInto<Opts>>(transport: T, opts: O) -> Result<Self>
    where
        Error: From<O::Error>,
    {
        let opts: Opts = opts.try_into()?;
        let mut conn = Self::new(transport, &opts);
        conn.connect(&opts.conninfo)?;
        Ok(conn)
    }

    /// Establish the connection and switch the transport to non-blocking mode
    ///
    /// A failure is fatal: the connection must not be used afterwards.
    #[instrument(skip_all)]
    pub fn connect(&mut self, conninfo: &str) -> Result<()> {
        if self.connected {
            return Err(Error::InvalidUsage("already connected".to_string()));
        }

        self.columns.clear();
        if !self.transport.connect(conninfo) {
            return Err(Error::ConnectionError(self.last_error(CONNECT_FAILED)));
        }
        if !self.transport.set_nonblocking(true) {
            return Err(Error::ConnectionError(NONBLOCKING_FAILED.to_string()));
        }

        self.connected = true;
        debug!("connected");

        if self.pinned {
            self.start_reading();
        }
        Ok(())
    }

    /// Run a simple query, which may contain several statements
    pub fn query(&mut self, sql: &str) -> Completion {
        self.dispatch(Command::Query { sql })
    }

    /// Create the named prepared statement `name`
    pub fn prepare(&mut self, name: &str, sql: &str, param_count: usize) -> Completion {
        self.dispatch(Command::Prepare {
            name,
            sql,
            param_count,
        })
    }

    /// Execute the named prepared statement `name`
    pub fn execute_prepared(&mut self, name: &str, params: &[Option<&str>]) -> Completion {
        self.dispatch(Command::ExecutePrepared { name, params })
    }

    /// Hand `command` to the transport and start draining it
    ///
    /// The caller must wait for the previous command's completion before
    /// dispatching the next one. A command dispatched while another is in
    /// flight is rejected with [`Error::InvalidUsage`] and is never queued; the
    /// in-flight command is unaffected.
    ///
    /// If the transport refuses the command, the returned completion already
    /// holds [`Error::DispatchError`] and the connection stays usable.
    #[instrument(skip_all, fields(kind = command.kind()))]
    pub fn dispatch(&mut self, command: Command<'_>) -> Completion {
        if !self.connected {
            return Completion::ready(Err(Error::InvalidUsage("not connected".to_string())));
        }
        if self.pending.is_some() {
            return Completion::ready(Err(Error::InvalidUsage(
                "a command is already in flight".to_string(),
            )));
        }
        if self.copy.is_some() {
            return Completion::ready(Err(Error::InvalidUsage(
                "the connection is in copy mode".to_string(),
            )));
        }

        // no stale readability from the previous command may reach this one
        self.stop_reading();

        if !command.send(&mut self.transport) {
            let message = self.last_error(DISPATCH_FAILED);
            debug!(%message, "transport refused the command");
            return Completion::ready(Err(Error::DispatchError(message)));
        }

        self.columns.clear();
        self.rows.clear();
        self.error = None;

        let (pending, completion) = completion::channel();
        self.pending = Some(pending);
        debug!("command dispatched");

        self.drain();
        completion
    }

    /// Retry flushing queued outbound bytes
    pub fn on_writable(&mut self) {
        if self.draining {
            self.drain();
        }
    }

    /// The readiness event the connection needs next
    pub fn next_action(&self) -> Action {
        if self.draining {
            Action::WaitWritable
        } else if self.reading {
            Action::WaitReadable
        } else {
            Action::Idle
        }
    }

    fn drain(&mut self) {
        match self.transport.flush() {
            FlushStatus::Flushed => {
                self.draining = false;
                self.start_reading();
            }
            FlushStatus::Pending => {
                trace!("command partially flushed, waiting for writability");
                self.draining = true;
            }
            FlushStatus::Failed => {
                self.draining = false;
                let message = self.last_error(FLUSH_FAILED);
                self.finish(Err(Error::FlushError(message)));
            }
        }
    }

    fn start_reading(&mut self) {
        if self.reading {
            return;
        }
        self.reading = true;
        self.transport.start_read();
        trace!("subscribed to readability");
    }

    // No-op while notification subscribers hold the gate open.
    fn stop_reading(&mut self) {
        if !self.reading || self.pinned {
            return;
        }
        self.reading = false;
        self.transport.stop_read();
        trace!("unsubscribed from readability");
    }

    /// Deliver `outcome` to the in-flight command, if any, and reset per-command state
    pub(crate) fn finish(&mut self, outcome: Outcome) {
        self.columns.clear();
        self.rows.clear();
        self.error = None;

        if let Some(pending) = self.pending.take() {
            debug!(ok = outcome.is_ok(), "command completed");
            pending.complete(outcome);
        }

        self.stop_reading();
    }

    /// Surface an error that belongs to no particular command
    pub(crate) fn emit_error(&mut self, error: Error) {
        if self.error_handlers.is_empty() {
            warn!(%error, "connection error without a subscriber");
            return;
        }
        for handler in self.error_handlers.handlers_mut() {
            handler(&error);
        }
    }

    pub(crate) fn last_error(&self, fallback: &str) -> String {
        self.transport
            .last_error_message()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Subscribe to server notifications
    ///
    /// The first subscription pins the readiness gate open for the rest of the
    /// connection's life, so notifications arriving between commands are read.
    /// Unsubscribing does not close it again.
    pub fn on_notification<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        let id = self.subscription_id();
        self.notification_handlers.push(id, Box::new(handler));
        self.pinned = true;
        if self.connected {
            self.start_reading();
        }
        id
    }

    /// Subscribe to errors not attributable to a command: read failures and
    /// unrecognized result statuses
    pub fn on_error<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Error) + Send + 'static,
    {
        let id = self.subscription_id();
        self.error_handlers.push(id, Box::new(handler));
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notification_handlers.remove(id) || self.error_handlers.remove(id)
    }

    fn subscription_id(&mut self) -> SubscriptionId {
        self.next_subscription += 1;
        SubscriptionId(self.next_subscription)
    }

    pub fn escape_literal(&mut self, value: &str) -> Result<String> {
        self.transport
            .escape_literal(value)
            .ok_or_else(|| Error::InvalidUsage(self.last_error("Unable to escape literal")))
    }

    pub fn escape_identifier(&mut self, value: &str) -> Result<String> {
        self.transport
            .escape_identifier(value)
            .ok_or_else(|| Error::InvalidUsage(self.last_error("Unable to escape identifier")))
    }

    /// The copy stream the server switched into, if any
    ///
    /// While set, inbound data belongs to the caller's copy handling and no
    /// command can be dispatched.
    pub fn copy_mode(&self) -> Option<CopyDirection> {
        self.copy
    }

    /// Return to normal result processing after the copy stream has been handled
    pub fn finish_copy(&mut self) {
        if let Some(direction) = self.copy.take() {
            debug!(?direction, "copy finished");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the readiness gate is subscribed to readability
    pub fn is_reading(&self) -> bool {
        self.reading
    }

    /// Columns of the result object currently being processed
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_mode(&self) -> RowMode {
        self.row_mode
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

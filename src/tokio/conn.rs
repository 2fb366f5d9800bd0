use tracing::instrument;

use crate::completion::Completion;
use crate::conn::Connection;
use crate::error::{Error, Result};
use crate::handler::{Notification, SubscriptionId};
use crate::opts::Opts;
use crate::protocol::Action;
use crate::row::Row;
use crate::transport::{Readiness, Transport};

/// Async driver for a [`Connection`]
///
/// Waits on the transport's readiness and feeds each event to the connection
/// until the awaited command completes.
pub struct Conn<T> {
    inner: Connection<T>,
}

impl<T: Transport + Readiness> Conn<T> {
    /// Connect `transport` using connection options
    pub fn new<O: TryInto<Opts>>(transport: T, opts: O) -> Result<Self>
    where
        Error: From<O::Error>,
    {
        Ok(Self {
            inner: Connection::open(transport, opts)?,
        })
    }

    /// Drive an already connected [`Connection`]
    pub fn from_connection(inner: Connection<T>) -> Self {
        Self { inner }
    }

    /// Run a simple query and collect the rows of its last result
    #[instrument(skip_all)]
    pub async fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let completion = self.inner.query(sql);
        self.wait(completion).await
    }

    /// Create the named prepared statement `name`
    #[instrument(skip_all)]
    pub async fn prepare(&mut self, name: &str, sql: &str, param_count: usize) -> Result<()> {
        let completion = self.inner.prepare(name, sql, param_count);
        self.wait(completion).await.map(drop)
    }

    /// Execute the named prepared statement `name`
    #[instrument(skip_all)]
    pub async fn exec(&mut self, name: &str, params: &[Option<&str>]) -> Result<Vec<Row>> {
        let completion = self.inner.execute_prepared(name, params);
        self.wait(completion).await
    }

    /// Drive the connection until `completion` holds its outcome
    pub async fn wait(&mut self, mut completion: Completion) -> Result<Vec<Row>> {
        loop {
            if let Some(outcome) = completion.try_take() {
                return outcome;
            }
            if !self.turn().await? {
                // nothing left to wait for, so nothing will ever complete it
                return Err(Error::InvalidUsage(
                    "the connection went idle before the command completed".to_string(),
                ));
            }
        }
    }

    /// Wait for one readiness event and process it
    ///
    /// Returns `false` without waiting when the connection has nothing to wait for.
    pub async fn turn(&mut self) -> Result<bool> {
        match self.inner.next_action() {
            Action::WaitWritable => {
                self.inner.transport_mut().writable().await?;
                self.inner.on_writable();
            }
            Action::WaitReadable => {
                self.inner.transport_mut().readable().await?;
                self.inner.on_readable();
            }
            Action::Idle => return Ok(false),
        }
        Ok(true)
    }

    /// Keep processing readiness events until the connection goes idle
    ///
    /// With a notification subscriber the readiness gate never closes, so this
    /// only returns on an I/O error.
    #[instrument(skip_all)]
    pub async fn listen(&mut self) -> Result<()> {
        while self.turn().await? {}
        Ok(())
    }

    pub fn on_notification<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.inner.on_notification(handler)
    }

    pub fn on_error<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Error) + Send + 'static,
    {
        self.inner.on_error(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }

    pub fn escape_literal(&mut self, value: &str) -> Result<String> {
        self.inner.escape_literal(value)
    }

    pub fn escape_identifier(&mut self, value: &str) -> Result<String> {
        self.inner.escape_identifier(value)
    }

    pub fn connection(&self) -> &Connection<T> {
        &self.inner
    }

    pub fn connection_mut(&mut self) -> &mut Connection<T> {
        &mut self.inner
    }

    pub fn into_connection(self) -> Connection<T> {
        self.inner
    }
}

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::error::{Error, Result};
use crate::row::Row;

/// Final outcome of one command: its rows, or the error that ended it
pub type Outcome = Result<Vec<Row>>;

/// Completion side of the single in-flight command
pub(crate) struct PendingCommand {
    sender: oneshot::Sender<Outcome>,
}

impl PendingCommand {
    pub(crate) fn complete(self, outcome: Outcome) {
        if self.sender.send(outcome).is_err() {
            tracing::trace!("command completed after its completion was dropped");
        }
    }
}

/// Create the two ends of a command's completion
pub(crate) fn channel() -> (PendingCommand, Completion) {
    let (sender, receiver) = oneshot::channel();
    (
        PendingCommand { sender },
        Completion {
            receiver,
            done: false,
        },
    )
}

/// Receives the outcome of a dispatched command exactly once
///
/// Either await it, or poll it with [`Completion::try_take`] while driving the
/// connection yourself. Awaiting a completion whose outcome was already taken
/// yields [`Error::Closed`].
#[must_use = "a command's outcome is only observable through its completion"]
pub struct Completion {
    receiver: oneshot::Receiver<Outcome>,
    done: bool,
}

impl Completion {
    /// A completion that already holds its outcome
    pub(crate) fn ready(outcome: Outcome) -> Self {
        let (pending, completion) = channel();
        pending.complete(outcome);
        completion
    }

    /// Take the outcome if the command has finished
    ///
    /// Returns `None` while the command is in flight and after the outcome has
    /// been taken once.
    pub fn try_take(&mut self) -> Option<Outcome> {
        if self.done {
            return None;
        }
        let outcome = match self.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(Error::Closed),
        };
        self.done = true;
        Some(outcome)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl Future for Completion {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.done {
            return Poll::Ready(Err(Error::Closed));
        }
        let received = ready!(Pin::new(&mut self.receiver).poll(cx));
        self.done = true;
        Poll::Ready(received.unwrap_or_else(|_| Err(Error::Closed)))
    }
}

//! Result pump: turns inbound data into rows and completes the in-flight command.

use tracing::{debug, trace};

use crate::col::Column;
use crate::conn::Connection;
use crate::error::{Error, Result};
use crate::protocol::ResultStatus;
use crate::row::decode_row;
use crate::transport::Transport;

const READ_FAILED: &str = "Unable to read from the server";
const COMMAND_FAILED: &str = "The server reported an error without a message";

impl<T: Transport> Connection<T> {
    /// Consume inbound data after the transport became readable
    ///
    /// Returns early, leaving the command in flight, whenever the transport
    /// needs more input to produce the next result object.
    pub fn on_readable(&mut self) {
        if !self.transport.consume_input() {
            let message = self.last_error(READ_FAILED);
            self.emit_error(Error::ReadError(message));
            return;
        }

        self.deliver_notifications();

        if self.copy.is_some() {
            return;
        }

        if self.transport.is_busy() {
            trace!("result incomplete, waiting for more input");
            return;
        }

        while self.transport.next_result() {
            let status = ResultStatus::from(self.transport.result_status());
            trace!(?status, "result object");

            match status {
                ResultStatus::TuplesOk | ResultStatus::CommandOk | ResultStatus::EmptyQuery => {
                    self.consume_fields();
                }
                ResultStatus::FatalError => {
                    let message = self
                        .transport
                        .result_error_message()
                        .filter(|message| !message.is_empty())
                        .unwrap_or_else(|| self.last_error(COMMAND_FAILED));
                    self.error = Some(Error::CommandError(message));
                }
                ResultStatus::CopyOut | ResultStatus::CopyBoth => {
                    // the copy segment contributes no rows
                    self.rows.clear();
                    self.copy = status.copy_direction();
                    debug!(direction = ?self.copy, "handing off to copy mode");
                    break;
                }
                ResultStatus::Unrecognized(raw) => {
                    self.emit_error(Error::ProtocolError(format!(
                        "unrecognized command status: {}",
                        raw
                    )));
                    break;
                }
            }

            if self.transport.is_busy() {
                trace!("more result objects pending, waiting for more input");
                return;
            }
        }

        let outcome = match self.error.take() {
            Some(error) => Err(error),
            None => Ok(std::mem::take(&mut self.rows)),
        };
        self.finish(outcome);
    }

    /// Record the fields of the current result object and decode all its rows
    ///
    /// The rows replace those of any earlier result object of the same command.
    fn consume_fields(&mut self) {
        self.columns.clear();
        let field_count = self.transport.field_count();
        self.columns.extend((0..field_count).map(|field| {
            Column::new(
                self.transport.field_name(field),
                self.transport.field_type(field),
                &self.decoders,
            )
        }));

        let tuple_count = self.transport.tuple_count();
        let rows = (0..tuple_count)
            .map(|row| decode_row(&self.transport, &self.columns, row, self.row_mode))
            .collect::<Result<Vec<_>>>();

        match rows {
            Ok(rows) => self.rows = rows,
            Err(error) => {
                self.rows.clear();
                self.error = Some(error);
            }
        }
    }

    fn deliver_notifications(&mut self) {
        while let Some(notification) = self.transport.next_notification() {
            if self.notification_handlers.is_empty() {
                trace!(channel = %notification.channel, "notification without a subscriber");
                continue;
            }
            for handler in self.notification_handlers.handlers_mut() {
                handler(&notification);
            }
        }
    }
}

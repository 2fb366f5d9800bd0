use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Connecting or switching the transport into non-blocking mode failed.
    /// The connection must not be used afterwards.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The transport refused to accept a command at send time.
    #[error("Dispatch error: {0}")]
    DispatchError(String),

    /// Writing buffered command bytes failed.
    #[error("Flush error: {0}")]
    FlushError(String),

    /// Consuming inbound bytes failed.
    #[error("Read error: {0}")]
    ReadError(String),

    /// The server reported a fatal result for a command.
    #[error("Server Error: {0}")]
    CommandError(String),

    /// An unrecognized result status was observed.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Bad config error: {0}")]
    BadConfigError(String),

    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    /// The connection went away before the command completed.
    #[error("Connection closed before the command completed")]
    Closed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

pub type Result<T> = std::result::Result<T, Error>;

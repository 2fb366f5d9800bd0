use crate::constant::exec_status;

/// Status of one result object, as far as the result pump cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    TuplesOk,
    CommandOk,
    EmptyQuery,
    FatalError,
    CopyOut,
    CopyBoth,
    /// Any other raw status code
    Unrecognized(i32),
}

impl ResultStatus {
    pub fn copy_direction(self) -> Option<CopyDirection> {
        match self {
            ResultStatus::CopyOut => Some(CopyDirection::Out),
            ResultStatus::CopyBoth => Some(CopyDirection::Both),
            _ => None,
        }
    }
}

impl From<i32> for ResultStatus {
    fn from(raw: i32) -> Self {
        match raw {
            exec_status::TUPLES_OK => ResultStatus::TuplesOk,
            exec_status::COMMAND_OK => ResultStatus::CommandOk,
            exec_status::EMPTY_QUERY => ResultStatus::EmptyQuery,
            exec_status::FATAL_ERROR => ResultStatus::FatalError,
            exec_status::COPY_OUT => ResultStatus::CopyOut,
            exec_status::COPY_BOTH => ResultStatus::CopyBoth,
            other => ResultStatus::Unrecognized(other),
        }
    }
}

/// Direction of the bulk-copy stream the server switched into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyDirection {
    /// Server to client
    Out,
    /// Both directions (replication)
    Both,
}

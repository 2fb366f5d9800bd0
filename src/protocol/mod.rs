pub mod command;
pub mod status;

pub use command::{Action, Command};
pub use status::{CopyDirection, ResultStatus};

use thiserror::Error;

/// Errors produced by the core engines.
///
/// All of these are local and recoverable; callers either check the
/// precondition up front or handle the returned failure. Nothing here is
/// fatal to the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A control operation was issued in a state that does not allow it,
    /// e.g. starting the pacer with an empty word list or answering a
    /// question with no session in progress.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// A battery id was looked up that the battery set does not contain.
    #[error("battery not found: {0}")]
    BatteryNotFound(String),
}

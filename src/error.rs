//! Error types for tombola game operations.

use derive_more::Display;

/// Error returned when a game operation is rejected.
///
/// Every rejection happens before the session is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TombolaError {
    /// No session with this ID exists.
    #[display("Game {} not found", _0)]
    NotFound(String),

    /// An argument is outside its allowed range.
    #[display("Invalid argument: {}", _0)]
    InvalidArgument(String),

    /// The session's status forbids the action.
    #[display("Invalid state: {}", _0)]
    InvalidState(String),
}

impl std::error::Error for TombolaError {}

//! Error types for sluice protocol operations

use thiserror::Error;

/// Command-line grammar errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("Empty command line")]
    EmptyCommandLine,

    #[error("Unterminated quoted value at column {column}")]
    UnterminatedQuote { column: usize },

    #[error("Invalid command name '{name}' at column {column}")]
    InvalidCommandName { name: String, column: usize },

    #[error("Invalid option name '{name}' at column {column}")]
    InvalidOptionName { name: String, column: usize },

    #[error("Duplicate option '{name}' at column {column}")]
    DuplicateOption { name: String, column: usize },

    #[error("Invalid field token '{token}' at column {column}")]
    InvalidField { token: String, column: usize },
}

/// Multi-value decoding errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unbalanced '$' wrapping in multi-value text at offset {offset}")]
    UnbalancedWrapping { offset: usize },
}

/// Stage/role dispatch errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Missing stage token after command '{command}'")]
    MissingStageToken { command: String },

    #[error("Unrecognized stage token '{token}'")]
    UnrecognizedStageToken { token: String },

    #[error("Role token '{token}' is not valid for command '{command}'")]
    InvalidRoleToken { token: String, command: String },
}

/// Stream framing errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolFramingError {
    #[error("Input header not terminated by a blank line")]
    MissingHeaderTerminator,

    #[error("Malformed header line '{line}'")]
    MalformedHeaderLine { line: String },

    #[error("Row has {got} cells, expected {expected}")]
    CellCountMismatch { expected: usize, got: usize },

    #[error("Invalid escape sequence '\\{escape}' in cell")]
    InvalidCellEscape { escape: char },

    #[error("Truncated escape sequence at end of cell")]
    TruncatedEscape,

    #[error("Field '{field}' is not part of the output schema")]
    UnknownOutputField { field: String },
}

/// Master error type for all sluice protocol faults.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Framing error: {0}")]
    Framing(#[from] ProtocolFramingError),

    #[error("Command error: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Create a command-level error from any displayable reason.
    pub fn command(reason: impl Into<String>) -> Self {
        Self::Command(reason.into())
    }
}

/// Result type alias for sluice protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

// =============================================================================
// TESTS
// =============================================================================

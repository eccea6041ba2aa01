use thiserror::Error;

/// Errors raised by the report analysis core.
///
/// These are cheap to clone so that memoized `Result`s can be handed out
/// repeatedly without recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("unknown node id '{0}'")]
    UnknownNode(String),
    #[error("sequence index {0} out of range")]
    UnknownSequence(usize),
    #[error("instruction index {0} out of range")]
    UnknownInstruction(usize),
    #[error("position {position} out of range for alignment of length {length}")]
    PositionOutOfRange { position: usize, length: usize },
    #[error("malformed report graph: {0}")]
    MalformedGraph(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

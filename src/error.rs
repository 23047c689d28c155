use std::fmt;

/// Failure modes of the computation core.
///
/// I/O failures (network, session, malformed upstream payloads) are handled
/// with `anyhow` in the client layer and never reach these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// An aggregate or series could not be computed at all: empty input, or
    /// zero call-side open interest for the put-call ratio. Distinct from a
    /// legitimate zero/neutral value.
    NoData(String),

    /// Fewer bars than the minimum window of every requested classification.
    /// Individual indicator positions short on history are `None`, not errors.
    InsufficientHistory(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisError::NoData(msg) => write!(f, "no data: {}", msg),
            AnalysisError::InsufficientHistory(msg) => {
                write!(f, "insufficient history: {}", msg)
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

use thiserror::Error;

/// The three fail-loud classes from the error handling design, plus the
/// I/O wrappers a CLI driver needs to propagate (the CLI folds these into
/// `anyhow::Error` at the call site). `Unroutable` and proposal failures
/// are deliberately absent here: both are algorithmic outcomes, absorbed
/// into counters rather than surfaced as an `Err`.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("input malformed: {0}")]
    InputMalformed(String),

    #[error("configuration invalid: {0}")]
    ConfigInvalid(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

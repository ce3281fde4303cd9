//! error.rs
//!
//! Error kinds for the rounding engine and its driver, mapped to the
//! exit-code bands described in the CLI surface: 0 success, 1 fatal, 2 a
//! recoverable condition was hit at least once (an unparseable line in
//! stream mode, or a value whose parser had to clamp a field).

#[derive(Debug, thiserror::Error)]
pub enum DroundError {
    #[error("cannot interpret date/time string `{0}`")]
    ParseDate(String),

    #[error("cannot parse duration/rounding string `{0}`")]
    ParseDuration(String),

    #[error("no durations given")]
    EmptyDurationList,

    #[error("could not open stdin: {0}")]
    IoOpen(#[source] std::io::Error),

    #[error("value required a fixed-up field")]
    FixApplied,
}

// Whether a given `DroundError` is fatal or merely biases the exit code is
// mode-dependent (a `ParseDate` aborts in point mode but only warns and
// continues in stream mode), so that mapping lives in `driver.rs` rather
// than on the error type itself.

use thiserror::Error;

/// Error kinds the windowing engine recognizes, per the error handling
/// policy: everything local is contained (log + drop); only a broken
/// state-machine invariant escalates to the supervisor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("matcher failed: {0}")]
    MatcherFailed(String),

    #[error("bus publish failed: {0}")]
    BusPublishFailed(String),

    #[error("listener unavailable: {0}")]
    ListenerUnavailable(String),

    #[error("internal assertion failed: {0}")]
    InternalAssertionFailed(String),

    #[error("supervisor exhausted its retry budget")]
    SupervisorExhausted,

    #[error("snapshot query timed out")]
    SnapshotTimeout,
}

use chrono::Duration;

use crate::error::WindowError;
use crate::signal::HealthSignal;
use crate::window::Window;

/// An opaque match descriptor produced by a `PatternMatcher`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub pattern: String,
    pub matched: Vec<HealthSignal>,
}

/// The set of synthesized signals a matcher wants republished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideEffect {
    pub signals: Vec<HealthSignal>,
}

/// The full result of scanning a window's signals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalPatternMatchResult {
    pub matches: Vec<Match>,
    pub captured_signals: Vec<HealthSignal>,
    pub side_effect: SideEffect,
    pub frequency: Option<Duration>,
    pub source_window: Option<Window>,
}

/// Scans a window's signals and returns zero or more matches plus a
/// synthesized side-effect signal set.
///
/// Implementations must be deterministic given identical input: calling
/// `search` twice with the same `source` and `window_duration` must produce
/// equal results.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait PatternMatcher: Send + Sync + std::fmt::Debug {
    fn search(
        &self,
        source: &[HealthSignal],
        window_duration: Duration,
    ) -> Result<SignalPatternMatchResult, WindowError>;
}

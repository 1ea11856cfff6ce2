use chrono::{DateTime, Utc};

use crate::window::Window;

/// Pure policy: given a window (and a `force` hint), decide whether it
/// should roll over.
///
/// Contract: advance never produces overlapping windows and never rewinds.
/// A successor, when produced, must satisfy `next.from == current.to`. When
/// `force` is `true` an implementation MUST return `Some(_)`.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait Advancer: Send + Sync + std::fmt::Debug {
    fn advance(&self, current: &Window, force: bool, now: DateTime<Utc>) -> Option<Window>;
}

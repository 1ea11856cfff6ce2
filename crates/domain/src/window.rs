use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::signal::HealthSignal;

/// A contiguous, half-open time span `[from, to)` accumulating signals.
///
/// Invariants: `to > from`; `data`/`prior_data` never shrink during a
/// window's lifetime except via an explicit `flush`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub data: Vec<HealthSignal>,
    pub prior_data: Vec<HealthSignal>,
}

impl Window {
    /// Construct a fresh window `[now, now + frequency)` with empty data.
    pub fn for_frequency(now: DateTime<Utc>, frequency: Duration) -> Self {
        Self {
            from: now,
            to: now + frequency,
            data: Vec::new(),
            prior_data: Vec::new(),
        }
    }

    /// Construct the contiguous successor of `self`, carrying `self.data`
    /// forward as `prior_data`.
    pub fn successor(&self, frequency: Duration) -> Self {
        Self {
            from: self.to,
            to: self.to + frequency,
            data: Vec::new(),
            prior_data: self.data.clone(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    /// `true` once `ref_time >= self.to`.
    pub fn expired(&self, ref_time: DateTime<Utc>) -> bool {
        ref_time >= self.to
    }

    pub fn push(&mut self, signal: HealthSignal) {
        self.data.push(signal);
    }

    /// A read-only copy of the accumulated signals.
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            data: self.data.clone(),
        }
    }
}

/// A read-only view of a window's contents, returned by `snapshot` queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub data: Vec<HealthSignal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn for_frequency_sets_half_open_bounds() {
        let w = Window::for_frequency(at(0), Duration::seconds(10));
        assert_eq!(w.from, at(0));
        assert_eq!(w.to, at(10));
        assert!(w.data.is_empty());
        assert!(w.prior_data.is_empty());
    }

    #[test]
    fn successor_is_contiguous_and_carries_prior_data() {
        let mut w = Window::for_frequency(at(0), Duration::seconds(10));
        w.push(HealthSignal::new("a", at(1), "src"));

        let next = w.successor(Duration::seconds(10));

        assert_eq!(next.from, w.to);
        assert_eq!(next.to, w.to + Duration::seconds(10));
        assert!(next.data.is_empty());
        assert_eq!(next.prior_data, w.data);
    }

    #[test]
    fn expired_is_true_at_or_after_to() {
        let w = Window::for_frequency(at(0), Duration::seconds(10));
        assert!(!w.expired(at(9)));
        assert!(w.expired(at(10)));
        assert!(w.expired(at(11)));
    }

    #[test]
    fn snapshot_is_a_value_copy() {
        let mut w = Window::for_frequency(at(0), Duration::seconds(10));
        w.push(HealthSignal::new("a", at(1), "src"));

        let snap = w.snapshot();
        w.push(HealthSignal::new("b", at(2), "src"));

        assert_eq!(snap.data.len(), 1, "snapshot must not see later pushes");
    }
}

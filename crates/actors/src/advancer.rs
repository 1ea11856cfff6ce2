use chrono::{DateTime, Utc};
use domain::{Advancer, Window};

/// Default tumbling policy: roll when forced, when the window has expired
/// by wall clock, or (if configured) once `data` crosses a count
/// threshold. Contiguity is guaranteed by `Window::successor`.
#[derive(Debug, Clone, Copy)]
pub struct TumblingAdvancer {
    frequency: chrono::Duration,
    max_signals: usize,
}

impl TumblingAdvancer {
    pub fn new(frequency: chrono::Duration, max_signals: usize) -> Self {
        Self {
            frequency,
            max_signals,
        }
    }
}

impl Advancer for TumblingAdvancer {
    fn advance(&self, current: &Window, force: bool, now: DateTime<Utc>) -> Option<Window> {
        let over_threshold = self.max_signals > 0 && current.data.len() >= self.max_signals;

        if force || current.expired(now) || over_threshold {
            Some(current.successor(self.frequency))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::HealthSignal;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn does_not_advance_before_expiry_or_threshold() {
        let advancer = TumblingAdvancer::new(chrono::Duration::seconds(10), 0);
        let w = Window::for_frequency(at(0), chrono::Duration::seconds(10));

        assert!(advancer.advance(&w, false, at(5)).is_none());
    }

    #[test]
    fn advances_on_expiry() {
        let advancer = TumblingAdvancer::new(chrono::Duration::seconds(10), 0);
        let w = Window::for_frequency(at(0), chrono::Duration::seconds(10));

        let next = advancer.advance(&w, false, at(10)).expect("should advance");
        assert_eq!(next.from, w.to);
        assert_eq!(next.to, w.to + chrono::Duration::seconds(10));
    }

    #[test]
    fn advances_on_count_threshold() {
        let advancer = TumblingAdvancer::new(chrono::Duration::seconds(10), 2);
        let mut w = Window::for_frequency(at(0), chrono::Duration::seconds(10));
        w.push(HealthSignal::new("a", at(1), "src"));
        assert!(advancer.advance(&w, false, at(2)).is_none());

        w.push(HealthSignal::new("b", at(2), "src"));
        assert!(advancer.advance(&w, false, at(2)).is_some());
    }

    #[test]
    fn force_always_advances() {
        let advancer = TumblingAdvancer::new(chrono::Duration::seconds(10), 0);
        let w = Window::for_frequency(at(0), chrono::Duration::seconds(10));

        assert!(advancer.advance(&w, true, at(0)).is_some());
    }

    #[test]
    fn never_overlaps_or_rewinds() {
        let advancer = TumblingAdvancer::new(chrono::Duration::seconds(10), 0);
        let w = Window::for_frequency(at(0), chrono::Duration::seconds(10));
        let next = advancer.advance(&w, true, at(0)).unwrap();

        assert_eq!(next.from, w.to, "no gap, no overlap");
        assert!(next.from >= w.from, "never rewinds");
    }
}

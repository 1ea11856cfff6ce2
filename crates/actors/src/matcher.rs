use chrono::{DateTime, Duration, Utc};
use domain::{HealthSignal, Match, PatternMatcher, SideEffect, SignalPatternMatchResult, WindowError};

/// Flags windows whose signal count crosses a configured threshold and
/// synthesizes one side-effect signal named after the matched pattern.
#[derive(Debug, Clone)]
pub struct ThresholdMatcher {
    pattern: String,
    threshold: usize,
}

impl ThresholdMatcher {
    pub fn new(pattern: impl Into<String>, threshold: usize) -> Self {
        Self {
            pattern: pattern.into(),
            threshold,
        }
    }
}

impl PatternMatcher for ThresholdMatcher {
    fn search(
        &self,
        source: &[HealthSignal],
        window_duration: Duration,
    ) -> Result<SignalPatternMatchResult, WindowError> {
        if source.len() < self.threshold {
            return Ok(SignalPatternMatchResult {
                frequency: Some(window_duration),
                ..Default::default()
            });
        }

        let matched = source.to_vec();
        // Deterministic given identical input: derive the side-effect's
        // timestamp from the input itself (the latest signal observed)
        // rather than the wall clock, which would differ across calls.
        let side_effect_timestamp = source
            .last()
            .map(|s| s.timestamp)
            .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap());
        let side_effect_signal = HealthSignal::new(
            format!("{}.threshold_exceeded", self.pattern),
            side_effect_timestamp,
            "window-engine",
        );

        Ok(SignalPatternMatchResult {
            matches: vec![Match {
                pattern: self.pattern.clone(),
                matched: matched.clone(),
            }],
            captured_signals: matched,
            side_effect: SideEffect {
                signals: vec![side_effect_signal],
            },
            frequency: Some(window_duration),
            source_window: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn signals(n: usize) -> Vec<HealthSignal> {
        let t = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        (0..n)
            .map(|i| HealthSignal::new(format!("sig-{i}"), t, "collector"))
            .collect()
    }

    #[test]
    fn below_threshold_produces_no_matches_or_side_effects() {
        let matcher = ThresholdMatcher::new("cpu", 3);
        let result = matcher.search(&signals(2), Duration::seconds(10)).unwrap();

        assert!(result.matches.is_empty());
        assert!(result.side_effect.signals.is_empty());
    }

    #[test]
    fn at_or_above_threshold_produces_one_match_and_one_side_effect() {
        let matcher = ThresholdMatcher::new("cpu", 3);
        let result = matcher.search(&signals(3), Duration::seconds(10)).unwrap();

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.side_effect.signals.len(), 1);
        assert_eq!(result.side_effect.signals[0].name, "cpu.threshold_exceeded");
        assert_eq!(result.captured_signals.len(), 3);
    }

    #[test]
    fn is_deterministic_given_identical_input() {
        let matcher = ThresholdMatcher::new("cpu", 3);
        let input = signals(5);

        let a = matcher.search(&input, Duration::seconds(10)).unwrap();
        let b = matcher.search(&input, Duration::seconds(10)).unwrap();

        assert_eq!(a.matches, b.matches);
        assert_eq!(a.captured_signals, b.captured_signals);
        assert_eq!(a.side_effect.signals, b.side_effect.signals);
    }

    #[test]
    fn side_effect_timestamp_is_derived_from_input_not_the_wall_clock() {
        let matcher = ThresholdMatcher::new("cpu", 1);
        let input = signals(2);

        let result = matcher.search(&input, Duration::seconds(10)).unwrap();

        assert_eq!(result.side_effect.signals[0].timestamp, input.last().unwrap().timestamp);
    }
}

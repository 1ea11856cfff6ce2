use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An opaque health observation the engine treats as payload.
///
/// `source` is rewritable by the engine when a matcher republishes a
/// synthesized signal, so downstream consumers can trace causality back to
/// the window that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSignal {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl HealthSignal {
    pub fn new(name: impl Into<String>, timestamp: DateTime<Utc>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp,
            source: source.into(),
        }
    }

    /// Clone this signal with `source` rewritten, as the engine does when
    /// republishing a matcher's side-effect signals.
    pub fn rewritten_source(&self, source: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            timestamp: self.timestamp,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewritten_source_preserves_name_and_timestamp() {
        let now = Utc::now();
        let s = HealthSignal::new("cpu.high", now, "collector-1");
        let rewritten = s.rewritten_source("window-engine");

        assert_eq!(rewritten.name, s.name);
        assert_eq!(rewritten.timestamp, s.timestamp);
        assert_eq!(rewritten.source, "window-engine");
    }
}

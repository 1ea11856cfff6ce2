use domain::{HealthSignal, SignalBus};
use tracing::debug;

/// A `SignalBus` that logs every publish. Useful as the default for the
/// demonstration CLI and in tests that don't care about a real transport.
#[derive(Debug, Default)]
pub struct LoggingBus;

#[async_trait::async_trait]
impl SignalBus for LoggingBus {
    async fn publish(&self, signal: HealthSignal) {
        debug!(signal.name = %signal.name, signal.source = %signal.source, "published side-effect signal");
    }
}

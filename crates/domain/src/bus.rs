use crate::signal::HealthSignal;

/// Publishes synthesized signals. Fire-and-forget: failures are logged by
/// the caller and never propagate back into the actor's state machine.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait SignalBus: Send + Sync + std::fmt::Debug {
    async fn publish(&self, signal: HealthSignal);
}

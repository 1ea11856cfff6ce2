use std::sync::Arc;

use domain::{
    Advancer, Clock, HealthSignal, PatternMatcher, SignalBus, SystemClock, WindowActorConfig,
    WindowError, WindowEventListener, WindowSnapshot,
};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use tokio::sync::oneshot;
use tracing::error;

use crate::advancer::TumblingAdvancer;
use crate::matcher::ThresholdMatcher;
use crate::supervisor::{Supervisor, SupervisorArgs, SupervisorMsg};

/// Shared handle to a `WindowEventListener`, threaded through to whichever
/// `WindowActor` child is currently alive and held by the supervisor for
/// the lifetime of a session.
pub type ListenerRef = Arc<dyn WindowEventListener>;

/// Everything a `WindowActorHandle` needs to build a fresh `WindowActor`:
/// the pattern matcher and advancement policy are pluggable, the bus and
/// clock default to production implementations.
#[derive(Clone)]
pub struct WindowActorDeps {
    pub matcher: Arc<dyn PatternMatcher>,
    pub advancer: Arc<dyn Advancer>,
    pub bus: Arc<dyn SignalBus>,
    pub clock: Arc<dyn Clock>,
}

impl WindowActorDeps {
    /// Builds the default dependency set: a count/expiry tumbling advancer
    /// and a threshold matcher, both driven by the given config.
    pub fn defaults(config: &WindowActorConfig, pattern: impl Into<String>, threshold: usize) -> Self {
        let frequency = chrono::Duration::from_std(config.frequency)
            .unwrap_or_else(|_| chrono::Duration::seconds(60));

        Self {
            matcher: Arc::new(ThresholdMatcher::new(pattern, threshold)),
            advancer: Arc::new(TumblingAdvancer::new(frequency, config.max_signals_per_window)),
            bus: Arc::new(crate::bus::LoggingBus),
            clock: Arc::new(SystemClock),
        }
    }
}

/// A thin, cloneable façade over a supervised `WindowActor` (C8). Owns the
/// `Supervisor`'s `ActorRef`; callers never see `WindowMsg`/`SupervisorMsg`
/// directly, and never need to know whether the child they're addressing
/// has been restarted underneath them.
#[derive(Clone)]
pub struct WindowActorHandle {
    supervisor: ActorRef<SupervisorMsg>,
}

impl WindowActorHandle {
    /// Spawns a `Supervisor`, which in turn spawns and starts the first
    /// `WindowActor` child with a fresh window sized by `config.frequency`.
    /// The periodic tick is armed after `config.initial_processing_delay`.
    pub async fn start(
        config: WindowActorConfig,
        deps: WindowActorDeps,
        listener: ListenerRef,
    ) -> Result<Self, ActorProcessingErr> {
        let args = SupervisorArgs {
            config,
            deps,
            listener,
        };
        let (supervisor, _join) = Actor::spawn(None, Supervisor, args).await?;

        Ok(Self { supervisor })
    }

    /// Submits a signal for accumulation into the current window (or stash,
    /// if the window isn't open yet).
    pub fn submit(&self, signal: HealthSignal) -> Result<(), ActorProcessingErr> {
        Ok(self.supervisor.send_message(SupervisorMsg::Submit(signal))?)
    }

    /// Forces the current window closed and advances immediately, without
    /// waiting for wall-clock expiry.
    pub fn close_current_window(&self) -> Result<(), ActorProcessingErr> {
        Ok(self.supervisor.send_message(SupervisorMsg::CloseCurrentWindow)?)
    }

    /// Discards the current window's accumulated data and pauses
    /// processing for `resume_processing_delay` before resuming.
    pub fn flush(&self) -> Result<(), ActorProcessingErr> {
        Ok(self.supervisor.send_message(SupervisorMsg::Flush)?)
    }

    /// Pauses the current window directly (without discarding its data)
    /// for `resume_delay` before the actor resumes accepting signals.
    pub fn pause(&self, resume_delay: std::time::Duration) -> Result<(), ActorProcessingErr> {
        Ok(self.supervisor.send_message(SupervisorMsg::Pause(resume_delay))?)
    }

    /// Drives a tick immediately rather than waiting for the periodic
    /// scheduler; primarily useful in tests.
    pub fn tick(&self) -> Result<(), ActorProcessingErr> {
        Ok(self.supervisor.send_message(SupervisorMsg::Tick)?)
    }

    /// Reads a snapshot of the current window's accumulated signals.
    /// `Ok(None)` means no window is currently open (e.g. paused or still
    /// initializing). Fails with `WindowError::SupervisorExhausted` once
    /// the restart budget has been exhausted.
    pub async fn snapshot(&self) -> Result<Option<WindowSnapshot>, WindowError> {
        let (tx, rx) = oneshot::channel();
        self.supervisor
            .send_message(SupervisorMsg::Snapshot(RpcReplyPort::from(tx)))
            .map_err(|e| WindowError::ListenerUnavailable(e.to_string()))?;

        match rx.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "supervisor dropped snapshot reply");
                Err(WindowError::ListenerUnavailable(e.to_string()))
            }
        }
    }

    /// Requests a graceful shutdown; the current `WindowActor` closes and
    /// reports its window, if any, before stopping, and the supervisor does
    /// not restart it.
    pub fn stop(&self) {
        if let Err(e) = self.supervisor.send_message(SupervisorMsg::Stop) {
            error!(error = %e, "failed to request window actor stop");
        }
    }

    /// Immediately tears down the supervisor and its child, skipping the
    /// graceful drain `stop()` performs. Unlike `stop()`, no `Stopped`/
    /// `Closed` events are guaranteed to reach the listener first.
    pub fn terminate(&self) {
        self.supervisor.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{WindowEvent, WindowEventListener};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingListener {
        events: Mutex<Vec<WindowEvent>>,
    }

    impl RecordingListener {
        fn events(&self) -> Vec<WindowEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl WindowEventListener for RecordingListener {
        fn accept(&self, event: WindowEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn test_config() -> WindowActorConfig {
        WindowActorConfig {
            initial_processing_delay: std::time::Duration::from_secs(3600),
            tick_interval: std::time::Duration::from_secs(3600),
            ask_timeout: std::time::Duration::from_millis(200),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn submit_close_snapshot_and_stop_round_trip() {
        let listener: Arc<RecordingListener> = Arc::new(RecordingListener::default());
        let config = test_config();
        let deps = WindowActorDeps::defaults(&config, "cpu", 100);

        let handle = WindowActorHandle::start(config, deps, listener.clone())
            .await
            .unwrap();

        handle
            .submit(HealthSignal::new("cpu.load", chrono::Utc::now(), "collector"))
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let snapshot = handle.snapshot().await.unwrap().expect("window should be open");
        assert_eq!(snapshot.data.len(), 1);

        handle.close_current_window().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(listener
            .events()
            .iter()
            .any(|e| matches!(e, WindowEvent::Closed { .. })));

        handle.stop();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(listener
            .events()
            .iter()
            .any(|e| matches!(e, WindowEvent::Stopped { .. })));
    }

    #[tokio::test]
    async fn pause_emits_paused_and_resumes_after_the_given_delay() {
        let listener: Arc<RecordingListener> = Arc::new(RecordingListener::default());
        let config = test_config();
        let deps = WindowActorDeps::defaults(&config, "cpu", 100);

        let handle = WindowActorHandle::start(config, deps, listener.clone())
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        handle.pause(std::time::Duration::from_millis(30)).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(listener
            .events()
            .iter()
            .any(|e| matches!(e, WindowEvent::Paused { .. })));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(listener
            .events()
            .iter()
            .any(|e| matches!(e, WindowEvent::Resumed { .. })));
    }

    #[tokio::test]
    async fn tick_is_a_no_op_before_the_window_expires() {
        let listener: Arc<RecordingListener> = Arc::new(RecordingListener::default());
        let config = test_config();
        let deps = WindowActorDeps::defaults(&config, "cpu", 100);

        let handle = WindowActorHandle::start(config, deps, listener.clone())
            .await
            .unwrap();

        handle.tick().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!listener
            .events()
            .iter()
            .any(|e| matches!(e, WindowEvent::Closed { .. })));
    }

    #[tokio::test]
    async fn terminate_tears_down_the_supervisor_without_graceful_events() {
        let listener: Arc<RecordingListener> = Arc::new(RecordingListener::default());
        let config = test_config();
        let deps = WindowActorDeps::defaults(&config, "cpu", 100);

        let handle = WindowActorHandle::start(config, deps, listener.clone())
            .await
            .unwrap();

        handle.terminate();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(
            handle.snapshot().await.is_err(),
            "a killed supervisor must not answer further requests"
        );
    }
}

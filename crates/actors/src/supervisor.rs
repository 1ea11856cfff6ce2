use std::time::Duration as StdDuration;

use domain::{BackoffConfig, HealthSignal, WindowActorConfig, WindowError, WindowEvent, WindowSnapshot};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, SupervisionEvent};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::handle::{ListenerRef, WindowActorDeps};
use crate::messages::WindowMsg;
use crate::window_actor::{WindowActor, WindowActorArgs};

/// Commands accepted by the `Supervisor`. Everything but `Restart`/`Arm` is
/// forwarded to whichever `WindowActor` child is currently alive; a
/// supervisor that has exhausted its restart budget answers `Snapshot` with
/// `WindowError::SupervisorExhausted` and drops every other command.
#[derive(Debug)]
pub enum SupervisorMsg {
    Submit(HealthSignal),
    CloseCurrentWindow,
    Flush,
    Pause(StdDuration),
    Tick,
    Snapshot(RpcReplyPort<Result<Option<WindowSnapshot>, WindowError>>),
    Stop,
    /// Arms the periodic tick interval once `initial_processing_delay` has
    /// elapsed.
    Arm,
    /// Self-addressed, scheduled after a failure's backoff delay.
    Restart,
}

pub struct SupervisorArgs {
    pub config: WindowActorConfig,
    pub deps: WindowActorDeps,
    pub listener: ListenerRef,
}

pub struct SupervisorState {
    config: WindowActorConfig,
    deps: WindowActorDeps,
    listener: ListenerRef,
    child: Option<ActorRef<WindowMsg>>,
    attempt: u32,
    exhausted: bool,
    stopping: bool,
}

/// Restarts a failed `WindowActor` with exponential backoff (C7). A crash
/// loses the in-flight window: the replacement child starts a brand new
/// window, it does not resume the one that was open when its predecessor
/// died. After `backoff.max_retries` consecutive failures the supervisor
/// transitions to an exhausted state: further commands are no-ops and
/// `Snapshot` answers `WindowError::SupervisorExhausted`.
#[derive(Debug)]
pub struct Supervisor;

impl Supervisor {
    fn window_args(state: &SupervisorState) -> WindowActorArgs {
        let frequency = chrono::Duration::from_std(state.config.frequency)
            .unwrap_or_else(|_| chrono::Duration::seconds(60));

        WindowActorArgs {
            advancer: state.deps.advancer.clone(),
            matcher: state.deps.matcher.clone(),
            bus: state.deps.bus.clone(),
            clock: state.deps.clock.clone(),
            frequency,
            resume_processing_delay: state.config.resume_processing_delay,
        }
    }

    fn backoff_delay(config: &BackoffConfig, attempt: u32) -> StdDuration {
        let jitter = rand::random::<f64>() * 2.0 - 1.0;
        config.delay_for(attempt, jitter)
    }

    async fn spawn_child(
        myself: &ActorRef<SupervisorMsg>,
        state: &SupervisorState,
    ) -> Result<ActorRef<WindowMsg>, ActorProcessingErr> {
        let window_args = Self::window_args(state);
        let frequency = window_args.frequency;
        let (child, _) =
            Actor::spawn_linked(None, WindowActor, window_args, myself.get_cell()).await?;

        let window = domain::Window::for_frequency(state.deps.clock.now(), frequency);
        child.send_message(WindowMsg::Start {
            window,
            reply_to: state.listener.clone(),
        })?;
        Ok(child)
    }
}

#[async_trait::async_trait]
impl Actor for Supervisor {
    type Msg = SupervisorMsg;
    type State = SupervisorState;
    type Arguments = SupervisorArgs;

    #[tracing::instrument(skip_all)]
    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let mut state = SupervisorState {
            config: args.config,
            deps: args.deps,
            listener: args.listener,
            child: None,
            attempt: 0,
            exhausted: false,
            stopping: false,
        };

        let child = Self::spawn_child(&myself, &state).await?;
        state.child = Some(child);

        let initial_delay = state.config.initial_processing_delay;
        ractor::time::send_after(initial_delay, myself.get_cell(), || SupervisorMsg::Arm);

        Ok(state)
    }

    #[tracing::instrument(skip_all)]
    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        msg: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match msg {
            SupervisorMsg::Arm => {
                let tick_interval = state.config.tick_interval;
                ractor::time::send_interval(tick_interval, myself.get_cell(), || SupervisorMsg::Tick);
            }

            SupervisorMsg::Submit(signal) => {
                if !state.exhausted {
                    if let Some(child) = &state.child {
                        child.send_message(WindowMsg::HealthSignal(signal))?;
                    }
                }
            }

            SupervisorMsg::CloseCurrentWindow => {
                if !state.exhausted {
                    if let Some(child) = &state.child {
                        child.send_message(WindowMsg::CloseCurrentWindow)?;
                    }
                }
            }

            SupervisorMsg::Flush => {
                if !state.exhausted {
                    if let Some(child) = &state.child {
                        child.send_message(WindowMsg::Flush)?;
                    }
                }
            }

            SupervisorMsg::Pause(resume_delay) => {
                if !state.exhausted {
                    if let Some(child) = &state.child {
                        child.send_message(WindowMsg::Pause { resume_delay })?;
                    }
                }
            }

            SupervisorMsg::Tick => {
                if !state.exhausted {
                    if let Some(child) = &state.child {
                        child.send_message(WindowMsg::Tick)?;
                    }
                }
            }

            SupervisorMsg::Snapshot(reply) => {
                if state.exhausted {
                    let _ = reply.send(Err(WindowError::SupervisorExhausted));
                    return Ok(());
                }

                match &state.child {
                    Some(child) => {
                        let (tx, rx) = oneshot::channel();
                        child.send_message(WindowMsg::GetSnapshot(RpcReplyPort::from(tx)))?;
                        match tokio::time::timeout(state.config.ask_timeout, rx).await {
                            Ok(Ok(snapshot)) => {
                                let _ = reply.send(Ok(snapshot));
                            }
                            Ok(Err(e)) => {
                                let _ = reply.send(Err(WindowError::ListenerUnavailable(e.to_string())));
                            }
                            Err(_) => {
                                let _ = reply.send(Err(WindowError::SnapshotTimeout));
                            }
                        }
                    }
                    None => {
                        let _ = reply.send(Err(WindowError::ListenerUnavailable(
                            "window actor is restarting".to_string(),
                        )));
                    }
                }
            }

            SupervisorMsg::Stop => {
                state.stopping = true;
                if let Some(child) = &state.child {
                    child.send_message(WindowMsg::Stop)?;
                } else {
                    myself.stop(Some("stop requested".to_string()));
                }
            }

            SupervisorMsg::Restart => {
                let child = Self::spawn_child(&myself, state).await?;
                state.child = Some(child);
                info!(attempt = state.attempt, "restarted window actor");
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn handle_supervisor_evt(
        &self,
        myself: ActorRef<Self::Msg>,
        event: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match event {
            SupervisionEvent::ActorFailed(_cell, err) => {
                warn!(error = %err, "window actor failed");
                state.child = None;
                self.schedule_restart(myself, state)?;
            }
            SupervisionEvent::ActorTerminated(_cell, _, reason) => {
                state.child = None;
                if state.stopping || reason.as_deref() == Some("stop requested") {
                    info!("window actor stopped cleanly");
                    if state.stopping {
                        myself.stop(Some("stop requested".to_string()));
                    }
                } else {
                    warn!(?reason, "window actor terminated unexpectedly");
                    self.schedule_restart(myself, state)?;
                }
            }
            _ => {
                warn!("unhandled supervision event");
            }
        }
        Ok(())
    }
}

impl Supervisor {
    fn schedule_restart(
        &self,
        myself: ActorRef<SupervisorMsg>,
        state: &mut SupervisorState,
    ) -> Result<(), ActorProcessingErr> {
        if state.attempt >= state.config.backoff.max_retries {
            error!(
                attempts = state.attempt,
                "exhausted restart budget; window supervisor giving up"
            );
            state.exhausted = true;
            state.listener.accept(WindowEvent::Stopped { window: None });
            return Ok(());
        }

        let delay = Self::backoff_delay(&state.config.backoff, state.attempt);
        state.attempt += 1;
        ractor::time::send_after(delay, myself.get_cell(), || SupervisorMsg::Restart);
        Ok(())
    }
}

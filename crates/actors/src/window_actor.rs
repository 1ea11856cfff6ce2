use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use domain::{Advancer, Clock, PatternMatcher, SignalBus, Window, WindowError, WindowEvent};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use tracing::{debug, warn};

use crate::handle::ListenerRef;
use crate::messages::WindowMsg;

/// Phases of the windowing state machine. Initial: `Initializing`.
/// Terminal: the actor stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Initializing,
    Ready,
    Windowing,
    Pausing,
}

/// Construction arguments for a `WindowActor`: the policies it consults and
/// the configuration it threads through each transition.
pub struct WindowActorArgs {
    pub advancer: Arc<dyn Advancer>,
    pub matcher: Arc<dyn PatternMatcher>,
    pub bus: Arc<dyn SignalBus>,
    pub clock: Arc<dyn Clock>,
    pub frequency: Duration,
    pub resume_processing_delay: StdDuration,
}

pub struct WindowActorState {
    pub(crate) phase: Phase,
    pub(crate) window: Option<Window>,
    pub(crate) reply_to: Option<ListenerRef>,
    pub(crate) stash: VecDeque<WindowMsg>,
    pub(crate) stopped: bool,
    advancer: Arc<dyn Advancer>,
    matcher: Arc<dyn PatternMatcher>,
    bus: Arc<dyn SignalBus>,
    clock: Arc<dyn Clock>,
    pub(crate) frequency: Duration,
    pub(crate) resume_processing_delay: StdDuration,
}

impl std::fmt::Debug for WindowActorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowActorState")
            .field("phase", &self.phase)
            .field("window", &self.window)
            .field("stash_len", &self.stash.len())
            .field("stopped", &self.stopped)
            .finish()
    }
}

/// The windowing engine's state machine (C6). One actor owns exactly one
/// window at a time; every transition in this module mirrors the command
/// table of the windowing engine's lifecycle: `Start`/`OpenWindow` bootstrap
/// a window, `HealthSignal`/`AddToWindow` accumulate it, and
/// `AdvanceWindow`/`CloseWindow`/`Flush`/`Pause`/`Resume`/`Tick` drive the
/// rest of its life.
#[derive(Debug)]
pub struct WindowActor;

#[async_trait::async_trait]
impl Actor for WindowActor {
    type Msg = WindowMsg;
    type State = WindowActorState;
    type Arguments = WindowActorArgs;

    #[tracing::instrument(skip_all)]
    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        Ok(WindowActorState {
            phase: Phase::Initializing,
            window: None,
            reply_to: None,
            stash: VecDeque::new(),
            stopped: false,
            advancer: args.advancer,
            matcher: args.matcher,
            bus: args.bus,
            clock: args.clock,
            frequency: args.frequency,
            resume_processing_delay: args.resume_processing_delay,
        })
    }

    #[tracing::instrument(skip_all)]
    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        msg: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        debug!(phase = ?state.phase, msg = ?msg, "handling message");

        match msg {
            WindowMsg::Start { window, reply_to } => {
                if state.phase != Phase::Initializing {
                    return Err(assertion_failed("Start received outside initializing"));
                }
                state.reply_to = Some(reply_to);
                state.phase = Phase::Ready;
                myself.send_message(WindowMsg::OpenWindow { window })?;
                Ok(())
            }

            WindowMsg::OpenWindow { window } => {
                if state.phase != Phase::Ready {
                    return Err(assertion_failed("OpenWindow received outside ready"));
                }
                state.window = Some(window.clone());
                emit(state, WindowEvent::Opened { window });
                state.phase = Phase::Windowing;

                let stashed: Vec<_> = state.stash.drain(..).collect();
                for stashed_msg in stashed {
                    myself.send_message(stashed_msg)?;
                }
                Ok(())
            }

            WindowMsg::HealthSignal(signal) => {
                match state.phase {
                    Phase::Windowing => {
                        let window = state
                            .window
                            .clone()
                            .expect("windowing implies a current window");
                        myself.send_message(WindowMsg::AddToWindow { signal, window })?;
                    }
                    Phase::Initializing | Phase::Ready | Phase::Pausing => {
                        state.stash.push_back(WindowMsg::HealthSignal(signal));
                    }
                }
                Ok(())
            }

            WindowMsg::AddToWindow { signal, window } => {
                if state.phase != Phase::Windowing {
                    return Err(assertion_failed("AddToWindow received outside windowing"));
                }
                if !state.window.as_ref().is_some_and(|w| same_span(w, &window)) {
                    debug!("AddToWindow for a window that is no longer current; ignoring");
                    return Ok(());
                }

                let current = state.window.as_mut().expect("checked above");
                current.push(signal.clone());
                let updated = current.clone();

                emit(
                    state,
                    WindowEvent::AddedToWindow {
                        signal,
                        window: updated.clone(),
                    },
                );

                if let Some(next) = state.advancer.advance(&updated, false, state.clock.now()) {
                    myself.send_message(WindowMsg::AdvanceWindow {
                        closing: updated,
                        next,
                    })?;
                }
                Ok(())
            }

            WindowMsg::AdvanceWindow { closing, next } => {
                match state.phase {
                    Phase::Windowing => {
                        if state.window.as_ref() != Some(&closing) {
                            debug!("AdvanceWindow for a window that is no longer current; ignoring");
                            return Ok(());
                        }
                    }
                    Phase::Ready => {
                        // Reached via CloseWindow(advance=true); there is no
                        // current window to compare against, `closing` is
                        // trusted as the window CloseWindow just emitted.
                    }
                    Phase::Initializing | Phase::Pausing => {
                        return Err(assertion_failed("AdvanceWindow received outside windowing/ready"));
                    }
                }

                emit(
                    state,
                    WindowEvent::Advanced {
                        new_window: next.clone(),
                        data: closing.data.clone(),
                    },
                );
                run_matcher_and_publish(state, &closing).await;

                let entered_from_ready = state.phase == Phase::Ready;
                state.window = Some(next.clone());

                if entered_from_ready {
                    myself.send_message(WindowMsg::OpenWindow { window: next })?;
                }
                Ok(())
            }

            WindowMsg::CloseWindow { window, advance } => {
                if state.phase != Phase::Windowing {
                    debug!("CloseWindow ignored: actor is not currently windowing");
                    return Ok(());
                }
                if state.window.as_ref() != Some(&window) {
                    debug!("CloseWindow for a window that is no longer current; ignoring");
                    return Ok(());
                }

                emit(
                    state,
                    WindowEvent::Closed {
                        window: window.clone(),
                        data: window.data.clone(),
                    },
                );
                state.window = None;
                state.phase = Phase::Ready;

                if advance {
                    let next = state.advancer.advance(&window, true, state.clock.now());
                    let next = next.ok_or_else(|| {
                        assertion_failed("advancer returned None for a forced advance")
                    })?;
                    myself.send_message(WindowMsg::AdvanceWindow {
                        closing: window,
                        next,
                    })?;
                } else {
                    run_matcher_and_publish(state, &window).await;
                }
                Ok(())
            }

            WindowMsg::CloseCurrentWindow => {
                // The externally-requested close (Handle::close_current_window)
                // closes and matches the current window without opening a
                // successor (S1: Opened, AddedToWindow*, Closed — no Advanced,
                // no re-Opened). Forced advance is reserved for the Tick
                // wall-clock-expiry path (S2), which posts CloseWindow{advance:
                // true} directly rather than going through this command.
                if state.phase != Phase::Windowing {
                    debug!("CloseCurrentWindow ignored: actor is not currently windowing");
                    return Ok(());
                }
                let window = state
                    .window
                    .clone()
                    .expect("windowing implies a current window");
                myself.send_message(WindowMsg::CloseWindow {
                    window,
                    advance: false,
                })?;
                Ok(())
            }

            WindowMsg::Flush => {
                if state.phase != Phase::Windowing {
                    return Err(assertion_failed("Flush received outside windowing"));
                }
                if let Some(window) = state.window.as_mut() {
                    window.data.clear();
                }
                let resume_delay = state.resume_processing_delay;
                myself.send_message(WindowMsg::Pause { resume_delay })?;
                Ok(())
            }

            WindowMsg::Pause { resume_delay } => {
                if state.phase != Phase::Windowing {
                    return Err(assertion_failed("Pause received outside windowing"));
                }
                let window = state
                    .window
                    .clone()
                    .expect("windowing implies a current window");
                emit(state, WindowEvent::Paused { window });
                state.phase = Phase::Pausing;

                let cell = myself.get_cell();
                ractor::time::send_after(resume_delay, cell, || WindowMsg::Resume);
                Ok(())
            }

            WindowMsg::Resume => {
                if state.phase != Phase::Pausing {
                    return Err(assertion_failed("Resume received outside pausing"));
                }
                let window = state
                    .window
                    .clone()
                    .expect("pausing implies a current window");
                emit(state, WindowEvent::Resumed { window });
                state.phase = Phase::Windowing;
                // Stashed signals are intentionally NOT redelivered here —
                // see DESIGN.md, Open Question 1.
                Ok(())
            }

            WindowMsg::Tick => {
                if state.phase == Phase::Windowing {
                    let window = state
                        .window
                        .clone()
                        .expect("windowing implies a current window");
                    if window.expired(state.clock.now()) {
                        myself.send_message(WindowMsg::CloseWindow {
                            window,
                            advance: true,
                        })?;
                    }
                }
                // Ticks in any other phase are ignored (see DESIGN.md, Open
                // Question 2).
                Ok(())
            }

            WindowMsg::GetSnapshot(reply) => {
                let snapshot = state.window.as_ref().map(|w| w.snapshot());
                Ok(reply.send(snapshot)?)
            }

            WindowMsg::Stop => {
                if state.stopped {
                    return Ok(());
                }
                state.stopped = true;
                emit(
                    state,
                    WindowEvent::Stopped {
                        window: state.window.clone(),
                    },
                );
                if let Some(window) = state.window.take() {
                    emit(
                        state,
                        WindowEvent::Closed {
                            data: window.data.clone(),
                            window,
                        },
                    );
                }
                myself.stop(Some("stop requested".to_string()));
                Ok(())
            }
        }
    }

    #[tracing::instrument(skip_all)]
    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        debug!(stashed = state.stash.len(), "window actor stopped, discarding any stashed messages");
        state.stash.clear();
        Ok(())
    }
}

/// Identity check for "is `candidate` still the window this actor has open",
/// ignoring `data`. `HealthSignal`'s handler clones the current window
/// *before* the matching `AddToWindow` turn runs, so by the time that turn
/// executes, one or more earlier `AddToWindow`s for the same burst may
/// already have pushed onto `state.window` — comparing full `Window`
/// equality would treat that ordinary growth as the window no longer being
/// current and silently drop the signal. Bounds never change for a window's
/// lifetime, so they're the right identity to compare.
fn same_span(a: &Window, b: &Window) -> bool {
    a.from == b.from && a.to == b.to
}

fn emit(state: &WindowActorState, event: WindowEvent) {
    match state.reply_to.as_ref() {
        Some(listener) => listener.accept(event),
        None => warn!(?event, "no listener registered; dropping lifecycle event"),
    }
}

async fn run_matcher_and_publish(state: &WindowActorState, window: &Window) {
    match state.matcher.search(&window.data, window.duration()) {
        Ok(result) => {
            for signal in result.side_effect.signals {
                let rewritten = signal.rewritten_source("window-engine");
                state.bus.publish(rewritten).await;
            }
        }
        Err(err) => {
            warn!(error = %err, "matcher failed; no side-effects published for this window");
        }
    }
}

fn assertion_failed(msg: &str) -> ActorProcessingErr {
    Box::new(WindowError::InternalAssertionFailed(msg.to_string()))
}

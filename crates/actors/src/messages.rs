use std::time::Duration;

use domain::{HealthSignal, Window, WindowSnapshot};
use ractor::RpcReplyPort;

use crate::handle::ListenerRef;

/// Commands accepted by the `WindowActor`, exactly the set spec'd for the
/// state machine: `Start`/`OpenWindow` drive the `initializing -> ready ->
/// windowing` bootstrap, `HealthSignal`/`AddToWindow` accumulate, and
/// `AdvanceWindow`/`CloseWindow`/`Flush`/`Pause`/`Resume`/`Tick` drive the
/// rest of the lifecycle.
#[derive(Debug)]
pub enum WindowMsg {
    Start {
        window: Window,
        reply_to: ListenerRef,
    },
    OpenWindow {
        window: Window,
    },
    HealthSignal(HealthSignal),
    AddToWindow {
        signal: HealthSignal,
        window: Window,
    },
    AdvanceWindow {
        closing: Window,
        next: Window,
    },
    CloseWindow {
        window: Window,
        advance: bool,
    },
    CloseCurrentWindow,
    Flush,
    Pause {
        resume_delay: Duration,
    },
    Resume,
    Tick,
    GetSnapshot(RpcReplyPort<Option<WindowSnapshot>>),
    Stop,
}

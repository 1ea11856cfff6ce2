use crate::signal::HealthSignal;
use crate::window::Window;

/// Lifecycle events emitted by the `WindowActor`.
///
/// A valid session's event sequence is a word in the regex:
/// `Opened (AddedToWindow)* (Advanced | Closed | (Paused Resumed)+ (AddedToWindow)* (Advanced|Closed))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    Opened {
        window: Window,
    },
    Advanced {
        new_window: Window,
        data: Vec<HealthSignal>,
    },
    Closed {
        window: Window,
        data: Vec<HealthSignal>,
    },
    AddedToWindow {
        signal: HealthSignal,
        window: Window,
    },
    Paused {
        window: Window,
    },
    Resumed {
        window: Window,
    },
    Stopped {
        window: Option<Window>,
    },
}

/// Receives lifecycle events. Distinct from the side-effect `SignalBus`: a
/// listener failing to accept an event is logged and does not affect the
/// next event's delivery attempt.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait WindowEventListener: Send + Sync + std::fmt::Debug {
    fn accept(&self, event: WindowEvent);
}

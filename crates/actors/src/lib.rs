//! `ractor`-based actor wiring for the health-signal windowing engine:
//! the `WindowActor` state machine, its supervising restart policy, and
//! the default `Advancer`/`PatternMatcher`/`SignalBus` implementations.

pub mod advancer;
pub mod bus;
pub mod handle;
pub mod matcher;
pub mod messages;
pub mod supervisor;
pub mod window_actor;

pub use advancer::TumblingAdvancer;
pub use bus::LoggingBus;
pub use handle::{ListenerRef, WindowActorDeps, WindowActorHandle};
pub use matcher::ThresholdMatcher;
pub use messages::WindowMsg;
pub use supervisor::{Supervisor, SupervisorArgs, SupervisorMsg};
pub use window_actor::{WindowActor, WindowActorArgs};

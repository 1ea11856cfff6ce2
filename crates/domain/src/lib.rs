//! Data model and trait contracts for the health-signal windowing engine.
//!
//! This crate has no async runtime dependency of its own: `Window`,
//! `HealthSignal` and the policy traits are usable from plain `#[test]`
//! functions. The actor wiring that drives them lives in the `actors` crate.

pub mod advancer;
pub mod bus;
pub mod clock;
pub mod config;
pub mod error;
pub mod listener;
pub mod matcher;
pub mod signal;
pub mod state;
pub mod window;

pub use advancer::Advancer;
pub use bus::SignalBus;
pub use clock::{Clock, SystemClock};
pub use config::{BackoffConfig, WindowActorConfig};
pub use error::WindowError;
pub use listener::{WindowEvent, WindowEventListener};
pub use matcher::{Match, PatternMatcher, SideEffect, SignalPatternMatchResult};
pub use signal::HealthSignal;
pub use state::WindowState;
pub use window::{Window, WindowSnapshot};

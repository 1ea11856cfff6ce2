use domain::{WindowEvent, WindowEventListener};
use tracing::info;

/// A `WindowEventListener` that logs every lifecycle event. The default
/// sink for the demonstration CLI; a real deployment would wire in
/// something that forwards events to its own observability stack instead.
#[derive(Debug, Default)]
pub struct LoggingListener;

impl WindowEventListener for LoggingListener {
    fn accept(&self, event: WindowEvent) {
        match event {
            WindowEvent::Opened { window } => {
                info!(from = %window.from, to = %window.to, "window opened");
            }
            WindowEvent::AddedToWindow { signal, window } => {
                info!(signal = %signal.name, count = window.data.len(), "signal added to window");
            }
            WindowEvent::Advanced { new_window, data } => {
                info!(from = %new_window.from, carried = data.len(), "window advanced");
            }
            WindowEvent::Closed { window, data } => {
                info!(from = %window.from, to = %window.to, count = data.len(), "window closed");
            }
            WindowEvent::Paused { window } => {
                info!(from = %window.from, "window paused");
            }
            WindowEvent::Resumed { window } => {
                info!(from = %window.from, "window resumed");
            }
            WindowEvent::Stopped { window } => {
                info!(had_window = window.is_some(), "window actor stopped");
            }
        }
    }
}

use crate::window::Window;

/// State-machine scratchpad held by the `WindowActor` across transitions.
///
/// `reply_to` is `Some` in every state except `Initializing`; it is set once
/// by `Start` and never mutated afterward.
#[derive(Debug, Default)]
pub struct WindowState<L> {
    pub window: Option<Window>,
    pub reply_to: Option<L>,
}

impl<L> WindowState<L> {
    pub fn new() -> Self {
        Self {
            window: None,
            reply_to: None,
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("window actor failed to start: {0}")]
    ActorStart(#[from] ractor::ActorProcessingErr),

    #[error(transparent)]
    Window(#[from] domain::WindowError),
}

pub mod cli;
mod error;
pub mod listener;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

mod config;
mod prompt;
mod service;

pub use config::*;
pub use prompt::*;
pub use service::*;

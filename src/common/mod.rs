mod comparison;
mod config;
mod error;
mod models;
mod zone;

pub use comparison::*;
pub(crate) use config::*;
pub use error::*;
pub use models::*;
pub use zone::*;

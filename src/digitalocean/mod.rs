mod config;
mod models;
mod store;

pub use config::*;
pub use store::*;

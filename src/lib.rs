pub mod common;
pub mod config;
pub mod digitalocean;
pub mod service;
pub mod zonefile;

pub use self::config::*;

use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{method} {url} failed: {source}"))]
    RequestError {
        url: String,
        method: String,
        source: Box<ureq::Error>,
    },
    #[snafu(display("{message}"))]
    ResponseError { message: String },
    #[snafu(display("{prefix}: {message}"))]
    ConfigError { message: String, prefix: String },
    #[snafu(display("{message}: {source}"))]
    ZoneFileError {
        message: String,
        source: Box<dyn std::error::Error>,
    },
    #[snafu(display("{store}: {message}: {source}"))]
    StoreError {
        store: String,
        message: String,
        source: Box<dyn std::error::Error>,
    },
    #[snafu(display("Zone {zone} not found"))]
    ZoneNotFoundError { zone: String },
    #[snafu(display("Cannot use {kind} record {name} ({data})"))]
    RecordError {
        kind: String,
        name: String,
        data: String,
    },
    #[snafu(display("{message}"))]
    SyncError { message: String },
    #[snafu(display("{message}: {source}"))]
    IoError {
        message: String,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;

const READER_NAME: &str = "ZoneFile";

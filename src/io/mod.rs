//! File input and output.

pub mod reader;
pub mod writer;

pub use reader::{LoadedTable, SourceReader, read_file};
pub use writer::{OutputWriter, OverwriteMode, WriteOptions, WriteStatistics};

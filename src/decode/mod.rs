//! Record source module
//!
//! Reads newline-delimited JSON files into ordered records.
//!
//! # Overview
//!
//! The decode module provides:
//! - `JsonlDecoder` - One JSON object per line
//! - `RecordSource` - Reads a file from disk and decodes it
//!
//! A single malformed line aborts the whole file; there is no partial
//! recovery within a file.

mod decoders;

pub use decoders::{JsonlDecoder, RecordSource};

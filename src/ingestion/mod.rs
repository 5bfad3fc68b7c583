//! Upstream record sources.
//!
//! [`csv::CsvRecords`] streams typed records out of a headered CSV file, one record at a time,
//! so large inputs can be fed to a [`crate::processing::SplitStream`] in bounded batches.
//! [`csv::ingest_csv_from_path`] collects the whole file into a [`crate::types::DataSet`].

pub mod csv;

pub use self::csv::{ingest_csv_from_path, ingest_csv_from_reader, CsvRecords};

// file: src/exporter/mod.rs
// description: answer export module exports
// reference: internal module structure

pub mod csv;

pub use self::csv::CsvExporter;

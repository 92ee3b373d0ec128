//! Data layer: CSV parsing, the shared dataset and search
//!
//! Rows flow parser → `RowBuilder` → `Table` → `Dataset`; searches read a
//! `Dataset` snapshot and never mutate it.

// Row construction
pub mod row_builder;
pub mod table;

// Loading and storage
pub mod csv_parser;
pub mod dataset;

// Query execution
pub mod search;

pub use csv_parser::CsvParser;
pub use dataset::Dataset;
pub use row_builder::{IdentityBuilder, Row, RowBuilder, StarBuilder, StarRecord};
pub use search::{Narrowing, SearchEngine, SearchOutcome, SearchQuery};
pub use table::Table;

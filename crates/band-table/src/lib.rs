//! Band Table
//!
//! Flat, row-per-sample view of a decomposition: a timestamp, the original
//! sample and one column per band. Cells past a band's valid range are
//! `None` rather than zero, so "no data" never reads as a zero-valued sample.

mod error;
mod table;

pub use error::TableError;
pub use table::{BandColumn, BandTable, ColumnSource, TableRow};

//! Data models for facility listings.

mod facility;

pub use facility::{CsvRecord, SachsenRecord, WeserRecord};

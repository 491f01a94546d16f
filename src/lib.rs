//! AWO directory scraper.
//!
//! Collects facility contact details from the AWO Sachsen and AWO Weser-Ems
//! directories and writes them to CSV.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod storage;
pub mod utils;

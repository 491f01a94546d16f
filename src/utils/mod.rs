//! Shared utility functions.
//!
//! - `html`: selector compilation and positional DOM helpers

pub mod html;

//! Reader for Touchstone-style S-parameter files in their several drifted
//! layouts, normalized to one table of RF metrics, plus PNG plotting.

pub mod color;
pub mod config;
pub mod data;
pub mod plot;

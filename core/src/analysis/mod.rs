//! Downstream analysis over the fully joined trend table.

pub mod correlation;

pub use correlation::{CorrelationBand, CorrelationResult, correlate, render_results_table, render_summary};

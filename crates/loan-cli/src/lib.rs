//! CLI library components for the loan cleaning pipeline.

pub mod logging;
pub mod pipeline;
pub mod types;

//! Per-source jobs. Each one wires its own column layout and output into the
//! shared pipeline.

pub mod actions;
pub mod catalog;
pub mod statuses;

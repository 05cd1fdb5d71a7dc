//! Core of the statistics report builder.
//!
//! Directory layout rules, options, the tool traits and the pipeline that
//! turns a `stats_<author>` directory into a single `report-<name>.pdf`.

pub mod error;
pub mod layout;
pub mod options;
pub mod pipeline;
pub mod plugin;

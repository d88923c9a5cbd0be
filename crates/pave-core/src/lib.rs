//! Street paving record classifier and mile aggregator.
//!
//! A scheduled run reads a raw work-order extract, pushes it through the
//! classifier stages for one mode, and atomically replaces that mode's
//! production file. The aggregator reads the production file back to report
//! miles paved over a window.

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod exit_codes;
pub mod logging;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod summary;

pub use aggregate::{AggregateResult, MileAggregator, MileBreakdown};
pub use classify::{Classification, Classifier, Stage, StageStat};
pub use pipeline::classify_and_publish;
pub use source::{CsvExtract, MemorySource, RecordSource};
pub use store::{ProductionStore, WriteReceipt};
pub use summary::RunSummary;

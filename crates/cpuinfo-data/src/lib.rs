//! Parsing and reporting layer for the cpuinfo log parser.
//!
//! Classifies log lines, runs the per-loop state machine, aggregates CPU
//! figures per loop and per rank, and writes the CSV outputs.

pub mod aggregator;
pub mod analysis;
pub mod classifier;
pub mod parser;
pub mod reader;
pub mod writer;

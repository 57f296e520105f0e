//! Compliance Assistant - Retrieval-augmented compliance analysis
//!
//! This crate runs Gap Review and Deep Dive analyses of company documents
//! against regulatory inputs, repairs and parses the generator's JSON output,
//! keeps a history of analyses with user feedback, and feeds that feedback
//! back into later prompts as learnings.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

//! VCT: Valve Commercial Toolkit
//!
//! A Unix-style toolkit for managing the commercial lifecycle of valve and
//! actuator projects as plain text files: versioned technical lists,
//! consolidated quotation BOMs, tiered pricing, and an append-only audit
//! trail for irreversible business confirmations.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;

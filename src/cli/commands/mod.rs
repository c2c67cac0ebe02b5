//! Command implementations

pub mod audit;
pub mod completions;
pub mod consolidate;
pub mod init;
pub mod production;
pub mod project;
pub mod quote;
pub mod sel;
pub mod team;
pub mod tech;
pub mod ticket;

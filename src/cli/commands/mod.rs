//! CLI command implementations

pub mod config;
pub mod fold;
pub mod goto;
pub mod outline;
pub mod resolve;
pub mod session;

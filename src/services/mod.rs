//! Service layer for symnav

pub mod config;
pub mod outline;

pub use config::{ConfigService, DefaultConfigService};
pub use outline::{JsonOutlineProvider, LspOutlineProvider, OutlineProvider};

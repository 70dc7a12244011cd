//! Infrastructure layer
//!
//! Language server processes and their wire protocol.

pub mod lsp;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash document content to detect unchanged re-syncs
#[inline]
pub fn hash_content(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

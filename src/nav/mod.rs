//! Nearest-symbol navigation core
//!
//! Outlines come from an [`OutlineProvider`](crate::services::outline::OutlineProvider),
//! get repaired by [`normalize`], cached per document in [`SymbolIndex`], and
//! queried with [`resolve`]. [`Navigator`] turns the result into selection
//! moves and keeps the per-document [`NavigationSession`].

pub mod filter;
pub mod fold;
pub mod index;
pub mod navigator;
pub mod normalize;
pub mod outline;
pub mod resolve;
pub mod session;

pub use filter::is_navigable;
pub use fold::{FoldOptions, plan_folds};
pub use index::{IndexStats, SymbolIndex};
pub use navigator::{Direction, NavTarget, NavigationOutcome, NavigationPolicy, Navigator};
pub use normalize::normalize;
pub use outline::{Located, Outline, SymbolPath};
pub use resolve::{NearestSymbols, resolve};
pub use session::{HighlightUpdate, NavigationSession};

//! # runview-core - Core Engine Types
//!
//! Foundation crate for Runview. Splits a raw stream of log lines into
//! time-ordered blocks (one per program run, delimited by configurable
//! start markers), indexes which lines match which pattern per block, and
//! derives run metadata (timestamps, duration, pass/fail).
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, chrono, thiserror, regex, toml, tracing).
//!
//! ## Public API
//!
//! ### Patterns (`pattern`, `patterns`, `style`)
//! - [`Pattern`] - A compiled search expression with display metadata
//! - [`PatternDef`] - The validated on-disk record a pattern is built from
//! - [`PatternSet`] - Ordered pattern collection with TOML persistence and
//!   the reserved free-search pseudo-pattern
//! - [`TextStyle`], [`Color`] - Typed display attributes behind the flat
//!   persisted token list
//!
//! ### Blocks (`block`, `blocks`)
//! - [`Block`] - One run's lines, per-pattern match indexes, and derived
//!   metadata
//! - [`BlockCollection`] - Line-by-line segmentation state machine
//! - [`Direction`], [`LineRendering`] - Navigation and display-time
//!   rendering options
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum (expression, style, schema, parse,
//!   lookup, IO)
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`

pub mod block;
pub mod blocks;
pub mod error;
pub mod logging;
pub mod pattern;
pub mod patterns;
pub mod style;

/// Prelude for common imports used throughout the Runview crates
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use tracing::{debug, error, info, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use block::{Block, Direction, LineRendering};
pub use blocks::BlockCollection;
pub use error::{Error, Result};
pub use pattern::{Pattern, PatternDef, FREE_SEARCH_ID};
pub use patterns::PatternSet;
pub use style::{Color, TextStyle};

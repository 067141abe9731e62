//! runview-app - Session state and orchestration for Runview
//!
//! Ties the core engine together for a display layer: log-file ingestion
//! (legacy-encoding decode, mtime ordering), the session facade (block
//! selection, pattern edits, free search, jump-to-match), and pattern-file
//! discovery in the user folder.

pub mod ingest;
pub mod session;
pub mod user_files;

// Re-export primary types
pub use session::{EditPolicy, Session};
pub use user_files::{get_patterns, user_folder};

//! Session state over an ingested set of log files
//!
//! The session is the facade the display layer talks to: it owns the
//! pattern set and the finalized blocks, tracks which block is selected,
//! and routes pattern edits back into re-matching. Everything is
//! single-threaded and synchronous; ingestion completes before any
//! interaction is possible.

use std::path::PathBuf;

use runview_core::prelude::*;
use runview_core::{Block, BlockCollection, Direction, PatternDef, PatternSet};

use crate::ingest;

/// What to recompute on the selected block after a pattern edit
///
/// `MatchOnly` recomputes just the edited pattern's match index, leaving
/// `passed` and the block name as finalized. `Refinalize` re-runs the full
/// finalize pass so a needed-pattern edit is reflected in pass/fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPolicy {
    #[default]
    MatchOnly,
    Refinalize,
}

/// One viewing session: patterns + segmented blocks + selection
#[derive(Debug)]
pub struct Session {
    patterns: PatternSet,
    blocks: BlockCollection,
    selected: usize,
    edit_policy: EditPolicy,
}

impl Session {
    /// Ingest log files and build the session
    ///
    /// Files are processed oldest-mtime first, lines in file order. Fails
    /// when a file cannot be read, or when the input yields no blocks
    /// (there would be nothing to select).
    pub fn ingest(patterns: PatternSet, log_files: &[PathBuf]) -> Result<Session> {
        let ordered = ingest::sort_by_mtime(log_files.to_vec())?;
        let mut blocks = BlockCollection::new();
        for path in &ordered {
            let text = ingest::read_log_file(path)?;
            debug!("Ingesting {}", path.display());
            for line in text.lines() {
                blocks.add_line(&patterns, line);
            }
        }
        blocks.finalize(&patterns);
        if blocks.is_empty() {
            return Err(Error::config("log files contained no lines"));
        }
        info!(
            "Ingested {} blocks from {} files",
            blocks.len(),
            ordered.len()
        );
        Ok(Session {
            patterns,
            blocks,
            selected: 0,
            edit_policy: EditPolicy::default(),
        })
    }

    pub fn edit_policy(&self) -> EditPolicy {
        self.edit_policy
    }

    pub fn set_edit_policy(&mut self, policy: EditPolicy) {
        self.edit_policy = policy;
    }

    // ─────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────

    /// Select the block the display should follow
    pub fn select_block(&mut self, index: usize) -> Result<()> {
        if index >= self.blocks.len() {
            return Err(Error::BlockOutOfRange {
                index,
                count: self.blocks.len(),
            });
        }
        self.selected = index;
        Ok(())
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The currently selected block
    pub fn current_block(&self) -> &Block {
        // selected is validated on every change and blocks is never empty
        &self.blocks.blocks()[self.selected]
    }

    /// All finalized blocks, for the tab strip
    pub fn blocks(&self) -> &[Block] {
        self.blocks.blocks()
    }

    /// The active pattern set, for panel enumeration and refresh checks
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    // ─────────────────────────────────────────────────────────────
    // Pattern Edits
    // ─────────────────────────────────────────────────────────────

    /// Replace a pattern definition and re-match on the selected block
    pub fn edit_pattern(&mut self, id: &str, def: &PatternDef) -> Result<()> {
        self.patterns.replace(id, def)?;
        self.rematch(id)
    }

    /// Add a new pattern and index it on the selected block
    ///
    /// Returns the assigned id.
    pub fn add_pattern(&mut self, def: &PatternDef) -> Result<String> {
        let id = self.patterns.add(def)?;
        self.rematch(&id)?;
        Ok(id)
    }

    /// Change the free-search expression and re-index it on the selected
    /// block
    ///
    /// An empty expression clears the search.
    pub fn set_free_search(&mut self, expression: &str) -> Result<()> {
        self.patterns.set_free_search(expression)?;
        let free = self.patterns.free();
        if let Some(block) = self.blocks.get_mut(self.selected) {
            block.rerun_pattern(free);
        }
        Ok(())
    }

    /// Re-run every pattern against the selected block, rebuilding its
    /// whole match index
    ///
    /// Cheaper than a full re-finalize: timestamps, duration and the
    /// pass/fail verdict are left as they were.
    pub fn rerun_patterns(&mut self) {
        if let Some(block) = self.blocks.get_mut(self.selected) {
            for pattern in self.patterns.iter_with_free() {
                block.rerun_pattern(pattern);
            }
        }
    }

    fn rematch(&mut self, id: &str) -> Result<()> {
        match self.edit_policy {
            EditPolicy::MatchOnly => {
                let pattern = self
                    .patterns
                    .get(id)
                    .ok_or_else(|| Error::not_found(id))?;
                if let Some(block) = self.blocks.get_mut(self.selected) {
                    block.rerun_pattern(pattern);
                }
            }
            EditPolicy::Refinalize => {
                if let Some(block) = self.blocks.get_mut(self.selected) {
                    block.finalize(&self.patterns);
                }
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────

    /// Nearest match of a pattern before/after a line in the selected
    /// block, or `None` to stay put
    pub fn find_match(
        &self,
        pattern_id: &str,
        direction: Direction,
        from_line: usize,
    ) -> Option<usize> {
        self.current_block()
            .adjacent_match(pattern_id, direction, from_line)
    }

    // ─────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────

    /// Write edited patterns back to their backing file
    pub fn save_patterns(&mut self) -> Result<()> {
        self.patterns.persist()
    }
}

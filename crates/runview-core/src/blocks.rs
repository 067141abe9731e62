//! Block segmentation state machine
//!
//! Consumes lines one at a time, starts a new block when a boundary line
//! is detected, and owns the ordered list of finalized blocks. There is
//! always exactly one open block; it joins the finalized sequence only
//! when closed, and only when it has at least one line.

use tracing::debug;

use crate::block::Block;
use crate::patterns::PatternSet;

/// Ordered collection of finalized blocks plus the one open block
#[derive(Debug)]
pub struct BlockCollection {
    blocks: Vec<Block>,
    open: Block,
}

impl BlockCollection {
    pub fn new() -> BlockCollection {
        BlockCollection {
            blocks: Vec::new(),
            open: Block::new(1, ""),
        }
    }

    /// Feed one line
    ///
    /// Only the first declared block-start pattern is consulted per line;
    /// when it matches, its first captured group becomes the new block's
    /// label and the previous block is closed.
    pub fn add_line(&mut self, patterns: &PatternSet, line: &str) {
        if let Some(pattern) = patterns.block_starts().next() {
            if let Some(caps) = pattern.captures(line) {
                let label = caps.get(1).map_or("", |group| group.as_str()).to_string();
                self.start_block(patterns, &label);
            }
        }
        self.open.append(line);
    }

    fn start_block(&mut self, patterns: &PatternSet, label: &str) {
        self.close_open(patterns);
        self.open = Block::new(self.blocks.len() + 1, label);
    }

    fn close_open(&mut self, patterns: &PatternSet) {
        if self.open.is_empty() {
            return;
        }
        let mut closed = std::mem::replace(&mut self.open, Block::new(0, ""));
        closed.finalize(patterns);
        debug!("Closed block `{}` with {} lines", closed.name, closed.line_count());
        self.blocks.push(closed);
    }

    /// Close out the open block at the end of ingestion
    ///
    /// A no-op when no lines are pending, so calling it again is safe.
    pub fn finalize(&mut self, patterns: &PatternSet) {
        self.close_open(patterns);
        self.open = Block::new(self.blocks.len() + 1, "");
    }

    /// Finalized blocks in ingestion order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }
}

impl Default for BlockCollection {
    fn default() -> Self {
        Self::new()
    }
}

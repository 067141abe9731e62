//! A single compiled search pattern with its display metadata

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::style::TextStyle;

/// Reserved id of the free-search pseudo-pattern
pub const FREE_SEARCH_ID: &str = "free";

const FREE_SEARCH_NAME: &str = "Free search";

/// One pattern record as persisted in a pattern file
///
/// This is the on-disk shape; field names follow the pattern file format.
/// Validation beyond structure (regex compilation, style tokens) happens
/// when a [`Pattern`] is built from the record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PatternDef {
    /// Display name
    pub name: String,
    /// Regex source text
    pub pattern: String,
    /// A matching line starts a new block
    pub block_start: bool,
    /// A block without a match is considered crashed
    pub needed: bool,
    /// Capture-group template rendered into block properties
    pub property: String,
    /// Style tokens: bold/italic/underline plus at most one RRGGBB color
    pub style: Vec<String>,
    /// Whether matched lines are highlighted in the display
    pub visible: bool,
}

impl PatternDef {
    /// An empty definition, the starting point of the pattern edit dialog
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            pattern: String::new(),
            block_start: false,
            needed: false,
            property: String::new(),
            style: Vec::new(),
            visible: true,
        }
    }
}

/// A compiled search pattern
///
/// Identity is the `id`, not the content: replacing a pattern with an
/// edited definition keeps the id. The compiled expression is immutable;
/// edits build a whole new `Pattern`.
#[derive(Debug, Clone)]
pub struct Pattern {
    id: String,
    pub name: String,
    raw: String,
    regex: Regex,
    pub block_start: bool,
    pub needed: bool,
    pub property: String,
    pub style: TextStyle,
    pub visible: bool,
    /// Edited since load, not yet written back (transient, never persisted)
    pub modified: bool,
}

impl Pattern {
    /// Build a pattern from a validated definition record
    ///
    /// Fails atomically: an uncompilable expression or a bad style token
    /// leaves no partially constructed pattern behind.
    pub fn new(id: impl Into<String>, def: &PatternDef) -> Result<Pattern> {
        let regex = compile(&def.pattern)?;
        let style = TextStyle::parse(&def.style)?;
        Ok(Pattern {
            id: id.into(),
            name: def.name.clone(),
            raw: def.pattern.clone(),
            regex,
            block_start: def.block_start,
            needed: def.needed,
            property: def.property.clone(),
            style,
            visible: def.visible,
            modified: false,
        })
    }

    /// Build the reserved free-search pseudo-pattern
    ///
    /// Never persisted, never a block start, never needed. An empty
    /// expression means "no search entered" and matches nothing.
    pub fn free_search(expression: &str) -> Result<Pattern> {
        let regex = compile(expression)?;
        Ok(Pattern {
            id: FREE_SEARCH_ID.to_string(),
            name: FREE_SEARCH_NAME.to_string(),
            raw: expression.to_string(),
            regex,
            block_start: false,
            needed: false,
            property: String::new(),
            style: TextStyle::default(),
            visible: true,
            modified: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Source text of the expression
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// An empty expression stands for "no search entered"
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Apply the expression to a single line, returning the first match
    /// with its captured groups
    ///
    /// Standard regex search semantics: the expression may match anywhere
    /// in the line. Pure, no side effects.
    pub fn captures<'l>(&self, line: &'l str) -> Option<Captures<'l>> {
        if self.is_empty() {
            return None;
        }
        self.regex.captures(line)
    }

    /// Cheap boolean form of [`Pattern::captures`]
    pub fn is_match(&self, line: &str) -> bool {
        !self.is_empty() && self.regex.is_match(line)
    }

    /// Expand capture-group references (`$1`, `${name}`) in the property
    /// template with the captured text
    ///
    /// A template with no group reference is returned unchanged.
    pub fn extract_property(&self, caps: &Captures<'_>) -> String {
        let mut out = String::new();
        caps.expand(&self.property, &mut out);
        out
    }

    /// Rebuild the persisted record for this pattern
    pub fn to_def(&self) -> PatternDef {
        PatternDef {
            name: self.name.clone(),
            pattern: self.raw.clone(),
            block_start: self.block_start,
            needed: self.needed,
            property: self.property.clone(),
            style: self.style.tokens(),
            visible: self.visible,
        }
    }

    /// Row text for the search panel: name plus match count
    pub fn summary(&self, count: usize) -> String {
        format!("{} : {}", self.name, count)
    }
}

/// Identity is the id: an edited pattern equals the one it replaced
impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Pattern {}

fn compile(expression: &str) -> Result<Regex> {
    Regex::new(expression).map_err(|e| Error::invalid_expression(expression, e.to_string()))
}

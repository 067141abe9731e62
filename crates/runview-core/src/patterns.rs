//! Ordered pattern collection with TOML persistence
//!
//! Pattern files are arrays of `[[pattern]]` tables, so declaration order
//! survives the round trip. Order is significant: it is the display order,
//! and block-start detection consults patterns in declared order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::pattern::{Pattern, PatternDef, FREE_SEARCH_ID};

/// On-disk shape of a pattern file
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct PatternFile {
    #[serde(default, rename = "pattern")]
    patterns: Vec<PatternDef>,
}

/// The ordered set of patterns for one log format, plus the always-present
/// free-search pseudo-pattern
///
/// Ids are the zero-based declaration position rendered as a string
/// (`"0"`, `"1"`, ...); the free-search pattern owns the reserved id
/// `"free"` and is never part of the persisted representation.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    free: Pattern,
    path: Option<PathBuf>,
}

impl PatternSet {
    /// Parse pattern definitions from TOML text
    ///
    /// Structural violations (missing field, wrong type, unknown field)
    /// fail with [`Error::Schema`] and reject the whole set. A record
    /// whose expression or style fails construction fails with
    /// [`Error::Parse`] naming the entry.
    pub fn parse(text: &str) -> Result<PatternSet> {
        let file: PatternFile = toml::from_str(text).map_err(|e| Error::schema(e.to_string()))?;
        let mut patterns = Vec::with_capacity(file.patterns.len());
        for (index, def) in file.patterns.iter().enumerate() {
            let pattern = Pattern::new(index.to_string(), def)
                .map_err(|e| Error::parse(&def.name, &e))?;
            patterns.push(pattern);
        }
        Ok(PatternSet {
            patterns,
            free: Pattern::free_search("")?,
            path: None,
        })
    }

    /// Load pattern definitions from a file
    pub fn load(path: impl Into<PathBuf>) -> Result<PatternSet> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)?;
        let mut set = Self::parse(&text)?;
        debug!("Loaded {} patterns from {:?}", set.patterns.len(), path);
        set.path = Some(path);
        Ok(set)
    }

    /// Backing file, when loaded from one
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persisted patterns in declared order (free search excluded)
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Persisted patterns followed by the free-search pattern: the order
    /// blocks run and index patterns in
    pub fn iter_with_free(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().chain(std::iter::once(&self.free))
    }

    /// Number of persisted patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns that can start a new block, in declared order
    pub fn block_starts(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().filter(|p| p.block_start)
    }

    /// Patterns whose absence marks a block as crashed
    pub fn needed(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().filter(|p| p.needed)
    }

    /// Display names in declared order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    /// Look up a pattern by id
    ///
    /// The reserved id `"free"` always resolves to the free-search
    /// pattern, regardless of persisted content.
    pub fn get(&self, id: &str) -> Option<&Pattern> {
        if id == FREE_SEARCH_ID {
            return Some(&self.free);
        }
        self.patterns.iter().find(|p| p.id() == id)
    }

    /// The free-search pseudo-pattern
    pub fn free(&self) -> &Pattern {
        &self.free
    }

    /// Replace the free-search pattern with a new expression
    ///
    /// An empty expression clears the search.
    pub fn set_free_search(&mut self, expression: &str) -> Result<()> {
        self.free = Pattern::free_search(expression)?;
        Ok(())
    }

    /// Id the next added pattern will get
    pub fn next_id(&self) -> String {
        self.patterns.len().to_string()
    }

    /// Append a new pattern, assigning the next sequential id
    ///
    /// Returns the assigned id. The new pattern is marked modified.
    pub fn add(&mut self, def: &PatternDef) -> Result<String> {
        let id = self.next_id();
        let mut pattern = Pattern::new(id.clone(), def)?;
        pattern.modified = true;
        self.patterns.push(pattern);
        Ok(id)
    }

    /// Replace the pattern with the given id, keeping its position
    ///
    /// Fails with [`Error::NotFound`] when no pattern has the id.
    pub fn replace(&mut self, id: &str, def: &PatternDef) -> Result<()> {
        let position = self
            .patterns
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| Error::not_found(id))?;
        let mut pattern = Pattern::new(id, def)?;
        pattern.modified = true;
        self.patterns[position] = pattern;
        Ok(())
    }

    /// Patterns edited since load or the last persist
    pub fn modified(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().filter(|p| p.modified)
    }

    /// Whether any pattern has unsaved edits
    pub fn is_modified(&self) -> bool {
        self.patterns.iter().any(|p| p.modified)
    }

    /// Clear all modified flags
    pub fn clear_modified(&mut self) {
        for pattern in &mut self.patterns {
            pattern.modified = false;
        }
    }

    /// Write the persisted patterns back to the backing file
    ///
    /// The previous contents are copied to a `.bkp` sibling first, and the
    /// new contents land via a temp file rename, so a failure at any step
    /// leaves the original file intact.
    pub fn persist(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| Error::config("pattern set has no backing file"))?;
        let file = PatternFile {
            patterns: self.patterns.iter().map(Pattern::to_def).collect(),
        };
        let content = toml::to_string_pretty(&file)
            .map_err(|e| Error::config(format!("failed to render pattern file: {e}")))?;

        if path.exists() {
            std::fs::copy(&path, path.with_extension("bkp"))?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &path)?;

        self.clear_modified();
        info!("Saved {} patterns to {:?}", self.patterns.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PATTERNS: &str = r#"
[[pattern]]
name = "App start"
pattern = '\[Init\] Application ([0-9.]+)'
block_start = true
needed = false
property = "$1"
style = ["bold", "00FF00"]
visible = true

[[pattern]]
name = "App end"
pattern = "Application exiting"
block_start = false
needed = true
property = ""
style = []
visible = true
"#;

    #[test]
    fn test_parse_ok() {
        let set = PatternSet::parse(TWO_PATTERNS).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.names().collect::<Vec<_>>(), ["App start", "App end"]);
        assert_eq!(set.get("0").unwrap().name, "App start");
        assert_eq!(set.get("1").unwrap().name, "App end");
    }

    #[test]
    fn test_missing_field_is_schema_error() {
        // `needed` omitted: structural violation, not a parse error
        let text = r#"
[[pattern]]
name = "App start"
pattern = "x"
block_start = true
property = ""
style = []
visible = true
"#;
        let err = PatternSet::parse(text).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_unknown_field_is_schema_error() {
        let text = r#"
[[pattern]]
name = "App start"
pattern = "x"
block_start = true
needed = false
property = ""
style = []
visible = true
colour = "red"
"#;
        let err = PatternSet::parse(text).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_bad_expression_is_parse_error_naming_entry() {
        let text = r#"
[[pattern]]
name = "Broken"
pattern = "[unclosed"
block_start = false
needed = false
property = ""
style = []
visible = true
"#;
        let err = PatternSet::parse(text).unwrap_err();
        match err {
            Error::Parse { name, .. } => assert_eq!(name, "Broken"),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_block_starts_in_declared_order() {
        let set = PatternSet::parse(TWO_PATTERNS).unwrap();
        let starts: Vec<_> = set.block_starts().map(|p| p.name.as_str()).collect();
        assert_eq!(starts, ["App start"]);
    }

    #[test]
    fn test_needed_patterns() {
        let set = PatternSet::parse(TWO_PATTERNS).unwrap();
        let needed: Vec<_> = set.needed().map(|p| p.name.as_str()).collect();
        assert_eq!(needed, ["App end"]);
    }

    #[test]
    fn test_get_free_always_resolves() {
        let set = PatternSet::parse(TWO_PATTERNS).unwrap();
        let free = set.get("free").unwrap();
        assert_eq!(free.name, "Free search");
    }

    #[test]
    fn test_free_not_in_persisted_iteration() {
        let set = PatternSet::parse(TWO_PATTERNS).unwrap();
        assert_eq!(set.iter().count(), 2);
        assert_eq!(set.iter_with_free().count(), 3);
        let last = set.iter_with_free().last().unwrap();
        assert_eq!(last.id(), FREE_SEARCH_ID);
    }

    #[test]
    fn test_add_assigns_next_id_and_marks_modified() {
        let mut set = PatternSet::parse(TWO_PATTERNS).unwrap();
        assert_eq!(set.next_id(), "2");
        let mut def = PatternDef::empty();
        def.name = "New pattern".to_string();
        let id = set.add(&def).unwrap();
        assert_eq!(id, "2");
        assert_eq!(set.len(), 3);
        assert!(set.is_modified());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut set = PatternSet::parse(TWO_PATTERNS).unwrap();
        let mut def = PatternDef::empty();
        def.name = "Renamed".to_string();
        set.replace("0", &def).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), ["Renamed", "App end"]);
        assert_eq!(set.get("0").unwrap().name, "Renamed");
    }

    #[test]
    fn test_replace_unknown_id_not_found() {
        let mut set = PatternSet::parse(TWO_PATTERNS).unwrap();
        let err = set.replace("9", &PatternDef::empty()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_set_free_search_rejects_bad_expression() {
        let mut set = PatternSet::parse(TWO_PATTERNS).unwrap();
        let err = set.set_free_search("[oops").unwrap_err();
        assert!(matches!(err, Error::InvalidExpression { .. }));
    }

    #[test]
    fn test_clear_modified() {
        let mut set = PatternSet::parse(TWO_PATTERNS).unwrap();
        set.add(&PatternDef::empty()).unwrap();
        assert!(set.is_modified());
        set.clear_modified();
        assert!(!set.is_modified());
        assert_eq!(set.modified().count(), 0);
    }

    #[test]
    fn test_persist_round_trip_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        std::fs::write(&path, TWO_PATTERNS).unwrap();

        let mut set = PatternSet::load(&path).unwrap();
        let mut def = PatternDef::empty();
        def.name = "Extra".to_string();
        def.pattern = "extra".to_string();
        set.add(&def).unwrap();
        set.persist().unwrap();
        assert!(!set.is_modified());

        // previous contents survive in the backup
        let backup = std::fs::read_to_string(dir.path().join("app.bkp")).unwrap();
        assert_eq!(backup, TWO_PATTERNS);

        // reloading yields identical definitions in the same order
        let reloaded = PatternSet::load(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
        let before: Vec<_> = set.iter().map(Pattern::to_def).collect();
        let after: Vec<_> = reloaded.iter().map(Pattern::to_def).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_persist_without_backing_file_fails() {
        let mut set = PatternSet::parse(TWO_PATTERNS).unwrap();
        let err = set.persist().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}

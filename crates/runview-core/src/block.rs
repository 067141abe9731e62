//! A contiguous run of log lines belonging to one execution
//!
//! Blocks accumulate raw lines while open; all derivation (timestamps,
//! duration, pattern match indexes, pass/fail, properties) happens once at
//! finalize time, keeping the hot ingestion path allocation-light.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::pattern::Pattern;
use crate::patterns::PatternSet;

const UNKNOWN: &str = "unknown";

/// Direction for jump-to-match navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Display-time line rendering for [`Block::display_text`]
///
/// `Compact` is a presentation transform only; stored lines are never
/// altered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineRendering {
    /// Lines exactly as ingested
    #[default]
    Raw,
    /// Level words compacted to one-letter codes, timestamps rewritten as
    /// elapsed time since block start
    Compact,
}

fn level_code(word: &str) -> Option<&'static str> {
    match word {
        "DEBUG" => Some("D"),
        "INFO" => Some("I"),
        "WARN" => Some("W"),
        "ERROR" => Some("E"),
        "FATAL" => Some("F"),
        _ => None,
    }
}

/// Try to get a timestamp from a line
///
/// A line yields a timestamp iff its second whitespace-delimited field
/// parses as an ISO-8601 datetime. Any other shape is not an error, just
/// no timestamp.
fn extract_datetime(line: &str) -> Option<NaiveDateTime> {
    let field = line.split_whitespace().nth(1)?;
    parse_iso(field)
}

fn parse_iso(field: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(field, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(field, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Format a time difference as zero-padded `HH:MM:SS`, hours unbounded
fn format_delta(delta: chrono::Duration) -> String {
    let total = delta.num_seconds();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Time difference between the bounds, or `"unknown"` when either bound
/// is absent or the difference is negative
fn calculate_delta(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> String {
    match (start, end) {
        (Some(start), Some(end)) if end >= start => format_delta(end - start),
        _ => UNKNOWN.to_string(),
    }
}

fn format_bound(bound: Option<NaiveDateTime>) -> String {
    match bound {
        Some(ts) => ts.to_string(),
        None => UNKNOWN.to_string(),
    }
}

/// One block of log lines and its derived metadata
#[derive(Debug, Clone)]
pub struct Block {
    /// 1-based sequence number, assigned in ingestion order
    pub num: usize,
    /// Raw label captured from the boundary line (`"unknown"` default)
    label: String,
    /// Display name; after finalize: `"NN label OK"` or `"NN label Crash"`
    pub name: String,
    lines: Vec<String>,
    match_index: HashMap<String, Vec<usize>>,
    /// First parseable timestamp in the block
    pub start: Option<NaiveDateTime>,
    /// Last parseable timestamp in the block
    pub end: Option<NaiveDateTime>,
    /// `HH:MM:SS` between the bounds, or `"unknown"`
    pub duration: String,
    /// All needed patterns matched at least once
    pub passed: bool,
    props: Vec<String>,
}

impl Block {
    pub fn new(num: usize, label: &str) -> Block {
        let label = if label.is_empty() { UNKNOWN } else { label };
        Block {
            num,
            label: label.to_string(),
            name: label.to_string(),
            lines: Vec::new(),
            match_index: HashMap::new(),
            start: None,
            end: None,
            duration: String::new(),
            passed: false,
            props: Vec::new(),
        }
    }

    /// Append a raw line
    ///
    /// No matching happens here; everything is deferred to finalize.
    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Raw label captured from the boundary line
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Close this block: derive timestamps and duration, run every
    /// pattern (free search included), compute pass/fail, assemble the
    /// property strings and the display name
    ///
    /// Idempotent: a second call rebuilds the same derived state rather
    /// than appending to it.
    pub fn finalize(&mut self, patterns: &PatternSet) {
        if self.lines.is_empty() {
            return;
        }
        self.start = self.first_datetime();
        self.end = self.last_datetime();
        self.duration = calculate_delta(self.start, self.end);
        for pattern in patterns.iter_with_free() {
            self.rerun_pattern(pattern);
        }
        self.passed = self.check_needed(patterns);
        let result = if self.passed { "OK" } else { "Crash" };
        self.name = format!("{:02} {} {}", self.num, self.label, result);
        self.props = vec![
            format!("Name: {}", self.label),
            format!("Start: {}", format_bound(self.start)),
            format!("End: {}", format_bound(self.end)),
            format!("Duration: {}", self.duration),
            format!("Lines: {}", self.lines.len()),
            format!("Result: {result}"),
        ];
    }

    fn first_datetime(&self) -> Option<NaiveDateTime> {
        self.lines.iter().find_map(|line| extract_datetime(line))
    }

    fn last_datetime(&self) -> Option<NaiveDateTime> {
        self.lines
            .iter()
            .rev()
            .find_map(|line| extract_datetime(line))
    }

    /// Recompute the match index for one pattern only
    ///
    /// Used after a pattern edit or a free-search change. Timestamps,
    /// duration, name and `passed` are left untouched; re-deriving those
    /// is the caller's call (see the session's edit policy).
    pub fn rerun_pattern(&mut self, pattern: &Pattern) {
        let hits: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| pattern.is_match(line))
            .map(|(num, _)| num)
            .collect();
        self.match_index.insert(pattern.id().to_string(), hits);
    }

    fn check_needed(&self, patterns: &PatternSet) -> bool {
        patterns
            .needed()
            .all(|p| self.match_index.get(p.id()).is_some_and(|hits| !hits.is_empty()))
    }

    /// Line numbers that matched the pattern, ascending
    pub fn matches(&self, pattern_id: &str) -> &[usize] {
        self.match_index
            .get(pattern_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn match_count(&self, pattern_id: &str) -> usize {
        self.matches(pattern_id).len()
    }

    /// Nearest match strictly after (or before) `from_line`
    ///
    /// `None` when there is no such match; the caller keeps its position.
    pub fn adjacent_match(
        &self,
        pattern_id: &str,
        direction: Direction,
        from_line: usize,
    ) -> Option<usize> {
        let hits = self.matches(pattern_id);
        match direction {
            Direction::Next => hits.iter().copied().find(|&line| line > from_line),
            Direction::Previous => hits
                .iter()
                .copied()
                .take_while(|&line| line < from_line)
                .last(),
        }
    }

    /// Property values extracted from the first match of each pattern
    /// that carries a property template
    pub fn extracted_properties(&self, patterns: &PatternSet) -> Vec<String> {
        let mut values = Vec::new();
        for pattern in patterns.iter() {
            if pattern.property.is_empty() {
                continue;
            }
            let Some(&first) = self.matches(pattern.id()).first() else {
                continue;
            };
            if let Some(caps) = pattern.captures(&self.lines[first]) {
                values.push(pattern.extract_property(&caps));
            }
        }
        values
    }

    /// The collected `"key: value"` property strings
    pub fn props(&self) -> &[String] {
        &self.props
    }

    /// Properties joined for the properties panel
    pub fn props_text(&self) -> String {
        self.props.join("\n")
    }

    /// All lines joined for presentation
    pub fn display_text(&self, rendering: LineRendering) -> String {
        match rendering {
            LineRendering::Raw => self.lines.join("\n"),
            LineRendering::Compact => self
                .lines
                .iter()
                .map(|line| self.alter_line(line))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Compact one line for display: level word to letter code, timestamp
    /// to elapsed time since block start
    fn alter_line(&self, line: &str) -> String {
        let mut parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if parts.len() < 2 {
            return line.to_string();
        }
        let Some(code) = level_code(&parts[0]) else {
            return line.to_string();
        };
        parts[0] = code.to_string();
        if let Some(start) = self.start {
            if let Some(ts) = parse_iso(&parts[1]) {
                let delta = ts - start;
                let seconds = delta.num_seconds();
                parts[1] = format!(
                    "{}:{:02}:{:02}.{:03}",
                    seconds / 3600,
                    (seconds % 3600) / 60,
                    seconds % 60,
                    delta.num_milliseconds().rem_euclid(1000)
                );
            }
        }
        parts.join(" ")
    }
}

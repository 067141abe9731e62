//! Pattern-file discovery in the user data folder
//!
//! Pattern files live in the user's data directory under `runview/`. With
//! several pattern files present, `rules.toml` decides which one applies
//! to a given set of log files: an ordered list of rules, each mapping a
//! pattern file to log-file globs, first match wins.

use std::path::{Path, PathBuf};

use globset::Glob;
use serde::Deserialize;

use runview_core::prelude::*;
use runview_core::PatternSet;

const RULES_FILE: &str = "rules.toml";
const PATTERN_EXT: &str = "toml";

/// The user configuration folder, created when missing
pub fn user_folder() -> Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| Error::config("no user data directory"))?;
    let folder = base.join("runview");
    std::fs::create_dir_all(&folder)?;
    Ok(folder)
}

#[derive(Debug, Deserialize)]
struct Rule {
    /// Pattern file this rule selects
    patterns: String,
    /// Log-file name globs the rule applies to
    globs: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesFile {
    #[serde(default, rename = "rule")]
    rules: Vec<Rule>,
}

/// Resolve and load the pattern set for a set of log files
///
/// With an explicit `name` the file is used directly (".toml" appended
/// when missing). Otherwise a lone pattern file is used as-is, and
/// multiple files are disambiguated through `rules.toml`.
pub fn get_patterns(
    name: Option<&str>,
    log_files: &[PathBuf],
    user_folder: &Path,
) -> Result<PatternSet> {
    if let Some(name) = name {
        return exact_patterns(user_folder, name);
    }
    let mut candidates = pattern_files(user_folder)?;
    if candidates.is_empty() {
        return Err(Error::config(format!(
            "no pattern files found in {}",
            user_folder.display()
        )));
    }
    let has_rules = candidates
        .iter()
        .any(|path| file_name_is(path, RULES_FILE));
    if candidates.len() == 1 {
        if has_rules {
            return Err(Error::config(
                "only rules.toml found, please create a patterns file",
            ));
        }
        return PatternSet::load(candidates.remove(0));
    }
    if !has_rules {
        return Err(Error::config(
            "multiple pattern files found, but no rules.toml",
        ));
    }
    patterns_from_rules(user_folder, log_files)
}

/// Load an explicitly named pattern file
fn exact_patterns(user_folder: &Path, name: &str) -> Result<PatternSet> {
    let mut file_name = name.to_string();
    if !file_name.to_lowercase().ends_with(".toml") {
        file_name.push_str(".toml");
    }
    let path = user_folder.join(file_name);
    if !path.is_file() {
        return Err(Error::config_not_found(path));
    }
    PatternSet::load(path)
}

/// Select a pattern file through rules.toml, first matching glob wins
fn patterns_from_rules(user_folder: &Path, log_files: &[PathBuf]) -> Result<PatternSet> {
    let text = std::fs::read_to_string(user_folder.join(RULES_FILE))?;
    let rules: RulesFile = toml::from_str(&text).map_err(|e| Error::schema(e.to_string()))?;
    for rule in &rules.rules {
        for glob in &rule.globs {
            let matcher = Glob::new(glob)
                .map_err(|e| Error::config(format!("bad glob `{glob}`: {e}")))?
                .compile_matcher();
            for log_file in log_files {
                if log_file
                    .file_name()
                    .is_some_and(|file_name| matcher.is_match(file_name))
                {
                    debug!("Rule `{glob}` selected {}", rule.patterns);
                    return PatternSet::load(user_folder.join(&rule.patterns));
                }
            }
        }
    }
    Err(Error::config(format!(
        "no pattern file rule matched {} log files",
        log_files.len()
    )))
}

fn pattern_files(user_folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(user_folder)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == PATTERN_EXT) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name_is(path: &Path, name: &str) -> bool {
    path.file_name().is_some_and(|file_name| file_name == name)
}

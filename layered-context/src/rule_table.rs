//! The compiled cue rule table.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::lexicon::clinical_rule_defs;
use crate::{ConfigResult, ConfigurationError, CueRule, CueRuleDef};

/// On-disk layout shared by TOML and RON rule files.
///
/// TOML: a list of `[[rule]]` tables. RON: `(rule: [(pattern: "denies", ...)])`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default, rename = "rule")]
    pub rules: Vec<CueRuleDef>,
}

/// Immutable set of compiled cue rules.
///
/// Built once and shared by reference (typically behind an `Arc`) across
/// every document an engine processes. Nothing mutates it after
/// construction, so concurrent readers need no locking.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<CueRule>,
    defs: Vec<CueRuleDef>,
}

/// Compile rule definitions into a table, failing on the first bad rule.
pub fn build_rule_table<I>(defs: I) -> ConfigResult<RuleTable>
where
    I: IntoIterator<Item = CueRuleDef>,
{
    let defs: Vec<CueRuleDef> = defs.into_iter().collect();
    let rules = defs
        .iter()
        .enumerate()
        .map(|(index, def)| def.compile(index))
        .collect::<ConfigResult<Vec<_>>>()?;

    tracing::info!(
        rules = rules.len(),
        terminators = rules.iter().filter(|r| r.is_terminator()).count(),
        "built cue rule table"
    );

    Ok(RuleTable { rules, defs })
}

impl RuleTable {
    /// The built-in clinical lexicon.
    pub fn clinical_defaults() -> ConfigResult<Self> {
        build_rule_table(clinical_rule_defs())
    }

    /// Parse rule definitions from TOML.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let file: RuleFile = toml::from_str(source)?;
        build_rule_table(file.rules)
    }

    /// Parse rule definitions from RON.
    pub fn from_ron_str(source: &str) -> ConfigResult<Self> {
        let file: RuleFile = ron::from_str(source)?;
        build_rule_table(file.rules)
    }

    /// Load a `.toml` or `.ron` rule file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.display().to_string(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("ron") => Self::from_ron_str(&content),
            _ => Err(ConfigurationError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    /// A new table with `extra` appended after the existing rules.
    pub fn extended<I>(&self, extra: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = CueRuleDef>,
    {
        build_rule_table(self.defs.iter().cloned().chain(extra))
    }

    pub fn rules(&self) -> &[CueRule] {
        &self.rules
    }

    /// The definitions this table was compiled from.
    pub fn definitions(&self) -> &[CueRuleDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

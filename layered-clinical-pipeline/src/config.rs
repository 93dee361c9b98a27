//! Pipeline configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use layered_context::{build_rule_table, clinical_rule_defs, CueRuleDef, RuleTable};
use serde::{Deserialize, Serialize};

use crate::source::{DICTIONARY_CONFIDENCE, DICTIONARY_PRIORITY};
use crate::{DictionarySource, EntityType, PipelineError, PipelineResult};

/// Settings for the built-in [`DictionarySource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    pub enabled: bool,
    pub confidence: f64,
    pub priority: u32,
    /// Extra terms per entity type, added to the built-in dictionary.
    pub terms: BTreeMap<EntityType, Vec<String>>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence: DICTIONARY_CONFIDENCE,
            priority: DICTIONARY_PRIORITY,
            terms: BTreeMap::new(),
        }
    }
}

impl DictionaryConfig {
    /// The configured dictionary, or `None` when disabled.
    pub fn source(&self) -> Option<DictionarySource> {
        if !self.enabled {
            return None;
        }
        let source = self.terms.iter().fold(DictionarySource::clinical(), |source, (entity_type, terms)| {
            source.with_terms(*entity_type, terms)
        });
        Some(source.with_confidence(self.confidence).with_priority(self.priority))
    }
}

/// Configuration for building a [`Pipeline`](crate::Pipeline).
///
/// ```toml
/// fail_on_error = false
/// use_default_rules = true
/// rules_path = "rules/oncology.ron"
/// abbreviations = ["Cardiol."]
///
/// [dictionary]
/// confidence = 0.8
///
/// [dictionary.terms]
/// disorder = ["sepsis"]
///
/// [[rule]]
/// pattern = "negative for"
/// category = "negation"
/// direction = "forward"
/// max_scope = 6
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Turn the first soft error of a document into a hard failure.
    pub fail_on_error: bool,
    /// Start the rule table from the built-in clinical lexicon.
    pub use_default_rules: bool,
    /// A `.toml` or `.ron` rule file appended after the defaults.
    pub rules_path: Option<PathBuf>,
    /// Extra sentence-final abbreviations for the tokenizer.
    pub abbreviations: Vec<String>,
    pub dictionary: DictionaryConfig,
    /// Rules appended last.
    #[serde(rename = "rule")]
    pub rules: Vec<CueRuleDef>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fail_on_error: false,
            use_default_rules: true,
            rules_path: None,
            abbreviations: Vec::new(),
            dictionary: DictionaryConfig::default(),
            rules: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(source: &str) -> PipelineResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Build the cue rule table: defaults, then the rule file, then inline
    /// rules.
    pub fn rule_table(&self) -> PipelineResult<RuleTable> {
        let mut defs: Vec<CueRuleDef> = Vec::new();
        if self.use_default_rules {
            defs.extend(clinical_rule_defs());
        }
        if let Some(path) = &self.rules_path {
            defs.extend(RuleTable::load(path)?.definitions().iter().cloned());
        }
        defs.extend(self.rules.iter().cloned());
        Ok(build_rule_table(defs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_context::{ConfigurationError, CueCategory, Direction};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert!(config.dictionary.enabled);
        assert_eq!(config.dictionary.confidence, 0.85);
        assert_eq!(config.dictionary.priority, 1);
    }

    #[test]
    fn test_full_config() {
        let config = PipelineConfig::from_toml_str(
            r#"
fail_on_error = true
use_default_rules = false
abbreviations = ["Cardiol."]

[dictionary]
confidence = 0.8

[dictionary.terms]
disorder = ["sepsis"]
sign_symptom = ["malaise"]

[[rule]]
pattern = "negative for"
category = "negation"
direction = "forward"
max_scope = 6
"#,
        )
        .unwrap();

        assert!(config.fail_on_error);
        assert_eq!(config.abbreviations, vec!["Cardiol.".to_string()]);
        assert_eq!(config.dictionary.confidence, 0.8);
        assert_eq!(config.dictionary.terms[&EntityType::Disorder], vec!["sepsis".to_string()]);

        let table = config.rule_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rules()[0].category(), Some(CueCategory::Negation));
        assert_eq!(table.rules()[0].direction(), Direction::Forward);
    }

    #[test]
    fn test_rule_file_is_appended_after_defaults() {
        let mut file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        file.write_all(br#"(rule: [(pattern: "nil by mouth", category: Some(negation), direction: forward)])"#)
            .unwrap();

        let config = PipelineConfig {
            rules_path: Some(file.path().to_path_buf()),
            ..PipelineConfig::default()
        };
        let table = config.rule_table().unwrap();
        assert_eq!(table.len(), clinical_rule_defs().len() + 1);
        assert_eq!(
            table.rules().last().unwrap().pattern().as_str(),
            "nil by mouth"
        );
    }

    #[test]
    fn test_bad_inline_rule_is_a_configuration_error() {
        let config = PipelineConfig {
            use_default_rules: false,
            rules: vec![CueRuleDef::regex("(unclosed", CueCategory::Negation, Direction::Forward, 3)],
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.rule_table(),
            Err(PipelineError::Configuration(ConfigurationError::InvalidPattern { index: 0, .. }))
        ));
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[dictionary]\nenabled = false\n").unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert!(config.dictionary.source().is_none());

        assert!(matches!(
            PipelineConfig::load(Path::new("/nonexistent/pipeline.toml")),
            Err(PipelineError::Io { .. })
        ));
    }

    #[test]
    fn test_unknown_entity_type_rejected() {
        let result = PipelineConfig::from_toml_str("[dictionary.terms]\nvital = [\"bp\"]\n");
        assert!(matches!(result, Err(PipelineError::Toml(_))));
    }
}

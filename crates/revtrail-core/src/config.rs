//! Diff configuration.
//!
//! Loaded from TOML; every field is optional and falls back to its default.
//!
//! ```toml
//! language = "en"
//! array_fan_out = 5
//!
//! [labels.meterSerial]
//! vi = "Số công tơ"
//! en = "Meter serial"
//!
//! [entity_noise.reseller]
//! collection_segments = ["orders", "history", "histories", "branches"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diff::labels::LabelDictionary;
use crate::diff::noise::NoisePolicy;
use crate::errors::{AuditError, Result};

/// Presentation language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Vi,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Vi => "vi",
            Language::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" => Ok(Language::Vi),
            "en" => Ok(Language::En),
            other => Err(AuditError::InvalidConfig {
                reason: format!("unsupported language '{}'", other),
            }),
        }
    }
}

/// Diff pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Containers at this depth are compared whole
    pub max_depth: usize,
    /// Elements visited per array of objects
    pub array_fan_out: usize,
    /// Labels named in a group summary before "+K"
    pub summary_labels: usize,
    /// Display strings are cut after this many characters
    pub ellipsis_at: usize,
    pub language: Language,
    /// Entries merged over the built-in labels
    pub labels: LabelDictionary,
    pub noise: NoisePolicy,
    /// Replaces `noise` for the named entity types
    pub entity_noise: BTreeMap<String, NoisePolicy>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            array_fan_out: 3,
            summary_labels: 3,
            ellipsis_at: 80,
            language: Language::Vi,
            labels: LabelDictionary::builtin(),
            noise: NoisePolicy::default(),
            entity_noise: BTreeMap::new(),
        }
    }
}

impl DiffConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for malformed TOML, unknown keys or zero limits.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: DiffConfig =
            toml::from_str(text).map_err(|e| AuditError::InvalidConfig {
                reason: e.to_string(),
            })?;
        let mut labels = LabelDictionary::builtin();
        labels.merge(std::mem::take(&mut config.labels));
        config.labels = labels;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when the file cannot be read or does not parse.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AuditError::InvalidConfig {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// `InvalidConfig` naming the first zero limit.
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("max_depth", self.max_depth),
            ("array_fan_out", self.array_fan_out),
            ("summary_labels", self.summary_labels),
            ("ellipsis_at", self.ellipsis_at),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(AuditError::InvalidConfig {
                    reason: format!("{} must be at least 1", name),
                });
            }
        }
        Ok(())
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Noise policy applying to an entity type
    pub fn noise_for(&self, entity_type: &str) -> &NoisePolicy {
        self.entity_noise.get(entity_type).unwrap_or(&self.noise)
    }
}

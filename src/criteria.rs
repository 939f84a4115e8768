//! Evaluation configuration and criterion label normalization.
//!
//! Every output format asks the same [`CriterionRegistry`] for the label attached to a
//! judgement. Nothing else derives a criterion label.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Label used for every judgement of a prompt-based evaluation.
pub const CUSTOM_EVALUATION_LABEL: &str = "Custom Evaluation";
/// Label used for a fixed-criteria judgement whose criterion is not configured.
pub const UNKNOWN_CRITERION_LABEL: &str = "Unknown Criterion";

/// How documents were judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMethod {
    /// A finite list of named criteria.
    Fixed,
    /// A single free-text custom prompt.
    Prompt,
}

impl EvaluationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationMethod::Fixed => "fixed",
            EvaluationMethod::Prompt => "prompt",
        }
    }
}

/// Evaluation configuration supplied alongside the judgement stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub method: EvaluationMethod,
    #[serde(default)]
    pub criteria: Vec<String>,
    #[serde(default, alias = "customPrompt", skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read evaluation config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse evaluation config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid evaluation config: {0}")]
    Invalid(String),
}

impl EvaluationConfig {
    pub fn fixed<I, S>(criteria: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: EvaluationMethod::Fixed,
            criteria: criteria.into_iter().map(Into::into).collect(),
            custom_prompt: None,
        }
    }

    pub fn prompt(custom_prompt: impl Into<String>) -> Self {
        Self {
            method: EvaluationMethod::Prompt,
            criteria: Vec::new(),
            custom_prompt: Some(custom_prompt.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.method {
            EvaluationMethod::Fixed => {
                if self.criteria.is_empty() {
                    return Err(ConfigError::Invalid(
                        "fixed evaluation requires at least one criterion".to_string(),
                    ));
                }
                let mut seen = HashSet::new();
                for name in &self.criteria {
                    if name.trim().is_empty() {
                        return Err(ConfigError::Invalid(
                            "criterion names must be non-empty".to_string(),
                        ));
                    }
                    if !seen.insert(name.as_str()) {
                        return Err(ConfigError::Invalid(format!(
                            "duplicate criterion: {name}"
                        )));
                    }
                }
            }
            EvaluationMethod::Prompt => {
                let prompt = self.custom_prompt.as_deref().unwrap_or("");
                if prompt.trim().is_empty() {
                    return Err(ConfigError::Invalid(
                        "prompt evaluation requires a non-empty custom prompt".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Number of distinct criteria judged under this configuration.
    pub fn criterion_count(&self) -> usize {
        match self.method {
            EvaluationMethod::Fixed => self.criteria.len(),
            EvaluationMethod::Prompt => 1,
        }
    }
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<EvaluationConfig, ConfigError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let config: EvaluationConfig = serde_json::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}

/// Outcome of normalizing one raw criterion label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCriterion {
    pub label: String,
    /// False when a fixed-criteria label was coerced to [`UNKNOWN_CRITERION_LABEL`].
    pub recognized: bool,
}

/// Maps raw judgement criterion labels to canonical labels.
#[derive(Debug, Clone)]
pub struct CriterionRegistry {
    method: EvaluationMethod,
    known: Vec<String>,
}

impl CriterionRegistry {
    pub fn new(config: &EvaluationConfig) -> Self {
        Self {
            method: config.method,
            known: config.criteria.clone(),
        }
    }

    pub fn method(&self) -> EvaluationMethod {
        self.method
    }

    /// Canonical labels in configuration order.
    pub fn labels(&self) -> Vec<String> {
        match self.method {
            EvaluationMethod::Fixed => self.known.clone(),
            EvaluationMethod::Prompt => vec![CUSTOM_EVALUATION_LABEL.to_string()],
        }
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.resolve(raw).label
    }

    pub fn resolve(&self, raw: &str) -> NormalizedCriterion {
        match self.method {
            // Raw label ignored: judges echo back arbitrary text, including "".
            EvaluationMethod::Prompt => NormalizedCriterion {
                label: CUSTOM_EVALUATION_LABEL.to_string(),
                recognized: true,
            },
            EvaluationMethod::Fixed => match self.known.iter().find(|name| name.as_str() == raw) {
                Some(name) => NormalizedCriterion {
                    label: name.clone(),
                    recognized: true,
                },
                None => NormalizedCriterion {
                    label: UNKNOWN_CRITERION_LABEL.to_string(),
                    recognized: false,
                },
            },
        }
    }
}

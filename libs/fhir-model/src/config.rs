//! Model construction settings
//!
//! Settings are plain data: load them from YAML, build them fluently, or
//! install one as the process-wide default used by [`Builder::build`].
//!
//! [`Builder::build`]: crate::Builder::build

use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid model configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Controls which checks run when a builder is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Run the skippable checks (choice membership, reference targets,
    /// value-or-children, primitive lexical rules, contained nesting).
    /// Required elements are always enforced.
    pub validate: bool,

    /// Check reference targets against the allowed resource types.
    pub check_reference_types: bool,

    /// Reject C0 control characters (other than tab, CR and LF) in strings.
    pub check_control_chars: bool,
}

static CURRENT: RwLock<ModelConfig> = RwLock::new(ModelConfig::DEFAULT);

impl ModelConfig {
    pub const DEFAULT: Self = Self {
        validate: true,
        check_reference_types: true,
        check_control_chars: true,
    };

    /// Settings for trusted input (e.g. data read back from our own store).
    pub const fn trusted() -> Self {
        Self {
            validate: false,
            check_reference_types: false,
            check_control_chars: false,
        }
    }

    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder {
            config: Self::DEFAULT,
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Process-wide settings used by [`crate::Builder::build`].
    pub fn current() -> Self {
        *CURRENT.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the process-wide settings.
    pub fn set_current(config: Self) {
        if !config.validate {
            tracing::warn!("model validation disabled; builders will only enforce required elements");
        }
        *CURRENT.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    pub(crate) fn reference_checks_enabled(&self) -> bool {
        self.validate && self.check_reference_types
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Fluent construction of a [`ModelConfig`].
#[derive(Debug, Clone)]
pub struct ModelConfigBuilder {
    config: ModelConfig,
}

impl ModelConfigBuilder {
    pub fn validate(mut self, validate: bool) -> Self {
        self.config.validate = validate;
        self
    }

    pub fn check_reference_types(mut self, check: bool) -> Self {
        self.config.check_reference_types = check;
        self
    }

    pub fn check_control_chars(mut self, check: bool) -> Self {
        self.config.check_control_chars = check;
        self
    }

    pub fn build(self) -> ModelConfig {
        self.config
    }
}

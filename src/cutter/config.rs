//! Configuration for the cutter.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cutter::error::{CutterError, CutterResult};
use crate::cutter::limits::{Limits, TEXT_KEY};
use crate::cutter::matcher::Matcher;

/// String-to-string hook run by the pipeline.
pub type TextHook = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Configuration for a [`crate::Cutter`].
#[derive(Clone, Default)]
pub struct CutterConfig {
    /// Appended when the output was truncated.
    pub suffix: String,
    /// Instance limits, merged over the defaults.
    pub limits: Limits,
    /// Caller matchers, tried before the built-ins.
    pub matchers: Vec<Matcher>,
    /// Runs once on the raw input; an empty result short-circuits.
    pub prepare: Option<TextHook>,
    /// Runs on every emitted plain-text segment.
    pub text_parse: Option<TextHook>,
}

impl CutterConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the truncation suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Merge `limits` over the current ones.
    #[must_use]
    pub fn with_limits(mut self, limits: &Limits) -> Self {
        self.limits = self.limits.merged(limits);
        self
    }

    /// Set a single limit.
    #[must_use]
    pub fn with_limit(mut self, key: impl Into<String>, limit: usize) -> Self {
        self.limits.set(key, limit);
        self
    }

    /// Append a caller matcher.
    #[must_use]
    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// Append several caller matchers, keeping their order.
    #[must_use]
    pub fn with_matchers(mut self, matchers: impl IntoIterator<Item = Matcher>) -> Self {
        self.matchers.extend(matchers);
        self
    }

    /// Set the prepare hook.
    #[must_use]
    pub fn on_prepare<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.prepare = Some(Arc::new(f));
        self
    }

    /// Set the plain-text hook.
    #[must_use]
    pub fn on_text_parse<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.text_parse = Some(Arc::new(f));
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if a caller matcher uses the reserved `text` key or two
    /// caller matchers share a key.
    pub fn validate(&self) -> CutterResult<()> {
        let mut seen = HashSet::new();
        for matcher in &self.matchers {
            if matcher.key() == TEXT_KEY {
                return Err(CutterError::InvalidConfig(format!(
                    "matcher key `{TEXT_KEY}` is reserved for the text budget"
                )));
            }
            if !seen.insert(matcher.key()) {
                return Err(CutterError::InvalidConfig(format!(
                    "duplicate matcher key `{}`",
                    matcher.key()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CutterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CutterConfig")
            .field("suffix", &self.suffix)
            .field("limits", &self.limits)
            .field("matchers", &self.matchers)
            .field("prepare", &self.prepare.is_some())
            .field("text_parse", &self.text_parse.is_some())
            .finish()
    }
}

/// Serializable part of the configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterSettings {
    /// Appended when the output was truncated.
    pub suffix: String,
    /// Limits merged over the defaults.
    pub limits: Limits,
}

impl CutterSettings {
    /// Parse settings from JSON.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> CutterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> CutterResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build a config carrying these settings.
    #[must_use]
    pub fn into_config(self) -> CutterConfig {
        CutterConfig::new()
            .with_suffix(self.suffix)
            .with_limits(&self.limits)
    }
}

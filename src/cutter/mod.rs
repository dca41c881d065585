//! Budgeted truncation of markdown-like text.
//!
//! The pipeline runs in three steps:
//! - `prepare` hook on the raw input
//! - resource extraction ([`extract::analyze`])
//! - budgeted reassembly ([`assemble::Assembler`])
//!
//! Images, links and caller-defined spans are never cut through the middle.

pub mod assemble;
pub mod config;
pub mod error;
pub mod extract;
pub mod limits;
pub mod matcher;

pub use assemble::{Assembler, SegmentPlan};
pub use config::{CutterConfig, CutterSettings, TextHook};
pub use error::{CutterError, CutterResult};
pub use extract::{MatchCounter, PassOutput, Report, Resource};
pub use limits::Limits;
pub use matcher::{Matcher, MatcherRegistry, Pattern};

use serde::Serialize;
use tracing::debug;

/// Output of [`Cutter::dissect`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Dissection {
    /// Extraction report; absent when the input was empty before or after `prepare`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    /// Final string.
    pub content: String,
}

/// Truncation engine. Immutable once built, so one instance can serve
/// concurrent callers.
#[derive(Clone, Debug)]
pub struct Cutter {
    config: CutterConfig,
    registry: MatcherRegistry,
}

impl Default for Cutter {
    fn default() -> Self {
        Self::from_parts(CutterConfig::default())
    }
}

impl Cutter {
    /// Create a cutter from `config`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: CutterConfig) -> CutterResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(mut config: CutterConfig) -> Self {
        config.limits = Limits::default().merged(&config.limits);
        let registry = MatcherRegistry::new(config.matchers.clone());
        Self { config, registry }
    }

    /// Instance limits.
    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.config.limits
    }

    /// Effective matchers in claiming order.
    #[must_use]
    pub const fn matchers(&self) -> &MatcherRegistry {
        &self.registry
    }

    /// First matcher registered under `key`.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Matcher> {
        self.registry.find(key)
    }

    /// Apply the prepare hook.
    #[must_use]
    pub fn prepare(&self, text: &str) -> String {
        match &self.config.prepare {
            Some(hook) => hook(text),
            None => text.to_string(),
        }
    }

    /// Apply the plain-text hook.
    #[must_use]
    pub fn text_parse(&self, text: &str) -> String {
        match &self.config.text_parse {
            Some(hook) => hook(text),
            None => text.to_string(),
        }
    }

    /// Extract resources from `text` under the instance limits merged with `overrides`.
    #[must_use]
    pub fn analyze(&self, text: &str, overrides: &Limits) -> Report {
        extract::analyze(text, &self.registry, &self.limits().merged(overrides))
    }

    /// Rebuild `report` under the instance limits merged with `overrides`.
    #[must_use]
    pub fn assemble(&self, report: &Report, overrides: &Limits) -> String {
        Assembler::new(
            &self.registry,
            &self.config.suffix,
            self.config.text_parse.as_ref(),
        )
        .assemble(report, &self.limits().merged(overrides))
    }

    /// Run the full pipeline and keep the intermediate report.
    #[must_use]
    pub fn dissect(&self, text: &str, overrides: &Limits) -> Dissection {
        if text.is_empty() {
            return Dissection::default();
        }
        let prepared = self.prepare(text);
        if prepared.is_empty() {
            debug!("Prepare hook returned empty text");
            return Dissection::default();
        }

        let report = self.analyze(&prepared, overrides);
        let content = self.assemble(&report, overrides);
        debug!(
            input_chars = prepared.chars().count(),
            output_chars = content.chars().count(),
            "Cut text"
        );

        Dissection {
            report: Some(report),
            content,
        }
    }

    /// Run the full pipeline and return only the final string.
    #[must_use]
    pub fn cut(&self, text: &str, overrides: &Limits) -> String {
        self.dissect(text, overrides).content
    }
}

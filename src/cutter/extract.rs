//! Resource extraction.
//!
//! Each matcher runs over the output of the previous one. Accepted occurrences
//! are swapped for filler of the same char length so later passes keep their
//! offsets; occurrences past a kind's limit are replaced or dropped.

use std::collections::HashMap;
use std::iter;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cutter::limits::Limits;
use crate::cutter::matcher::{Matcher, MatcherRegistry};

/// Character written over accepted occurrences.
pub const FILLER: char = '_';

/// One extracted occurrence. Offsets and lengths count `char`s.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Kind key of the matcher that claimed it.
    pub key: String,
    /// Offset of the placeholder in the report string.
    pub start_index: usize,
    /// Matched text.
    pub raw_content: String,
    /// Char length of `raw_content`, equal to the placeholder length.
    pub raw_length: usize,
    /// Visible length, absent for budget-free kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_length: Option<usize>,
}

impl Resource {
    /// Offset one past the placeholder.
    #[must_use]
    pub const fn end_index(&self) -> usize {
        self.start_index + self.raw_length
    }
}

/// Output of [`analyze`]: the placeholder-bearing text and what was pulled out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Text with accepted occurrences replaced by filler.
    pub string: String,
    /// Resources in discovery order.
    pub resources: Vec<Resource>,
}

/// Accepted occurrences per kind within one call.
#[derive(Clone, Debug, Default)]
pub struct MatchCounter(HashMap<String, usize>);

impl MatchCounter {
    /// Occurrences accepted so far for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> usize {
        self.0.get(key).copied().unwrap_or(0)
    }

    fn record(&mut self, key: &str) {
        *self.0.entry(key.to_string()).or_insert(0) += 1;
    }
}

/// Replacement of an overflowing occurrence, in input char offsets.
#[derive(Clone, Copy, Debug)]
struct Shift {
    end: usize,
    removed: usize,
    inserted: usize,
}

/// Result of running a single matcher.
#[derive(Clone, Debug)]
pub struct PassOutput {
    /// Text after this pass.
    pub string: String,
    /// Occurrences accepted by this pass.
    pub resources: Vec<Resource>,
    shifts: Vec<Shift>,
}

impl PassOutput {
    /// Map an offset in the pass input to the pass output.
    ///
    /// Only overflow replacements move text; filler keeps lengths intact.
    #[must_use]
    pub fn remap(&self, offset: usize) -> usize {
        let (removed, inserted) = self
            .shifts
            .iter()
            .filter(|s| s.end <= offset)
            .fold((0, 0), |(r, i), s| (r + s.removed, i + s.inserted));
        offset + inserted - removed
    }
}

/// Run one matcher over `text`, accepting up to `limit` occurrences of its kind.
///
/// Returns `None` when the matcher has no pattern.
pub fn match_pass(
    text: &str,
    matcher: &Matcher,
    limit: usize,
    counter: &mut MatchCounter,
) -> Option<PassOutput> {
    let Some(pattern) = matcher.pattern() else {
        warn!(key = matcher.key(), "Matcher has no pattern, skipping");
        return None;
    };

    let mut string = String::with_capacity(text.len());
    let mut resources = Vec::new();
    let mut shifts = Vec::new();
    let mut last = 0;
    let mut in_chars = 0;
    let mut out_chars = 0;

    for span in pattern.find_spans(text) {
        let gap = &text[last..span.start];
        let gap_chars = gap.chars().count();
        string.push_str(gap);
        in_chars += gap_chars;
        out_chars += gap_chars;

        let raw = &text[span.start..span.end];
        let raw_length = raw.chars().count();

        if counter.get(matcher.key()) < limit {
            counter.record(matcher.key());
            resources.push(Resource {
                key: matcher.key().to_string(),
                start_index: out_chars,
                raw_content: raw.to_string(),
                raw_length,
                display_length: matcher.display_length(raw),
            });
            string.extend(iter::repeat_n(FILLER, raw_length));
            out_chars += raw_length;
        } else {
            let replacement = matcher.overflow(raw);
            let inserted = replacement.chars().count();
            string.push_str(&replacement);
            out_chars += inserted;
            shifts.push(Shift {
                end: in_chars + raw_length,
                removed: raw_length,
                inserted,
            });
        }

        in_chars += raw_length;
        last = span.end;
    }
    string.push_str(&text[last..]);

    Some(PassOutput {
        string,
        resources,
        shifts,
    })
}

/// Extract resources from `text` with every matcher in `registry`.
#[must_use]
pub fn analyze(text: &str, registry: &MatcherRegistry, limits: &Limits) -> Report {
    let mut counter = MatchCounter::default();
    let mut string = text.to_string();
    let mut resources: Vec<Resource> = Vec::new();

    for matcher in registry.iter() {
        let Some(pass) = match_pass(&string, matcher, limits.kind(matcher.key()), &mut counter)
        else {
            continue;
        };

        // Earlier resources move when this pass replaced overflow in front of them.
        for resource in &mut resources {
            resource.start_index = pass.remap(resource.start_index);
        }

        string = pass.string;
        resources.extend(pass.resources);
    }

    debug!(
        resources = resources.len(),
        chars = string.chars().count(),
        "Analyzed text"
    );

    Report { string, resources }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cutter::matcher::{IMAGE_KEY, LINK_KEY};

    fn builtin(key: &str) -> Matcher {
        match MatcherRegistry::default().find(key) {
            Some(m) => m.clone(),
            None => panic!("missing built-in {key}"),
        }
    }

    fn pass(text: &str, matcher: &Matcher, limit: usize) -> PassOutput {
        match match_pass(text, matcher, limit, &mut MatchCounter::default()) {
            Some(out) => out,
            None => panic!("matcher without pattern"),
        }
    }

    #[test]
    fn test_image_pass() {
        let out = pass("tes![image](url)t[link](xx)", &builtin(IMAGE_KEY), 2);
        assert_eq!(out.string, "tes_____________t[link](xx)");
        assert_eq!(
            out.resources,
            vec![Resource {
                key: "image".to_string(),
                start_index: 3,
                raw_content: "![image](url)".to_string(),
                raw_length: 13,
                display_length: None,
            }]
        );
    }

    #[test]
    fn test_link_pass_records_display_length() {
        let out = pass("test[link](xx)", &builtin(LINK_KEY), 2);
        assert_eq!(out.string, "test__________");
        assert_eq!(out.resources.len(), 1);
        assert_eq!(out.resources[0].start_index, 4);
        assert_eq!(out.resources[0].raw_length, 10);
        assert_eq!(out.resources[0].display_length, Some(4));
    }

    #[test]
    fn test_literal_pass() {
        let out = pass("string[link](xx)", &Matcher::literal("string", "string"), 2);
        assert_eq!(out.string, "______[link](xx)");
        assert_eq!(out.resources[0].raw_content, "string");
    }

    #[test]
    fn test_pass_without_pattern() {
        let out = match_pass(
            "foo",
            &Matcher::unpatterned("empty"),
            1,
            &mut MatchCounter::default(),
        );
        assert!(out.is_none());
    }

    #[test]
    fn test_overflow_handler_replaces_extra_occurrences() {
        let foo = Matcher::literal("foo", "foo").with_overflow(|_| "1".to_string());
        let out = pass("foofoo[link](xx)", &foo, 1);
        assert_eq!(out.string, "___1[link](xx)");
        assert_eq!(out.resources.len(), 1);
    }

    #[test]
    fn test_overflow_without_handler_is_removed() {
        let out = pass("foo foo foo", &Matcher::literal("foo", "foo"), 1);
        assert_eq!(out.string, "___  ");
    }

    #[test]
    fn test_zero_limit_accepts_nothing() {
        let out = pass("![a](b) text", &builtin(IMAGE_KEY), 0);
        assert!(out.resources.is_empty());
        assert_eq!(out.string, " text");
    }

    #[test]
    fn test_offsets_count_chars() {
        let out = pass("墨水[链接](x)", &builtin(LINK_KEY), 1);
        assert_eq!(out.resources[0].start_index, 2);
        assert_eq!(out.resources[0].raw_length, 7);
        assert_eq!(out.resources[0].display_length, Some(2));
        assert_eq!(out.string, "墨水_______");
    }

    #[test]
    fn test_counter_is_shared_per_kind() {
        let foo = Matcher::literal("foo", "foo");
        let mut counter = MatchCounter::default();
        let first = match_pass("foo", &foo, 1, &mut counter);
        let second = match_pass("foo", &foo, 1, &mut counter);
        assert_eq!(first.map(|p| p.resources.len()), Some(1));
        assert_eq!(second.map(|p| p.resources.len()), Some(0));
        assert_eq!(counter.get("foo"), 1);
    }

    #[test]
    fn test_analyze_runs_matchers_in_order() {
        let report = analyze(
            "a![img](u)b[l](v)c",
            &MatcherRegistry::default(),
            &Limits::default(),
        );
        assert_eq!(report.string, "a_________b______c");
        let keys: Vec<&str> = report.resources.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["image", "link"]);
    }

    #[test]
    fn test_analyze_respects_limits() {
        let report = analyze(
            "[a](1)[b](2)[c](3)",
            &MatcherRegistry::default(),
            &Limits::default().with("link", 2),
        );
        assert_eq!(report.resources.len(), 2);
        assert_eq!(report.string, "____________");
    }

    #[test]
    fn test_analyze_remaps_earlier_resources_after_overflow() {
        let report = analyze(
            "[a](1)[b](2)![i](u)",
            &MatcherRegistry::default(),
            &Limits::default(),
        );
        assert_eq!(report.string, "_____________");
        let image = report.resources.iter().find(|r| r.key == "image");
        assert_eq!(image.map(|r| r.start_index), Some(6));
        for resource in &report.resources {
            let placeholder: String = report
                .string
                .chars()
                .skip(resource.start_index)
                .take(resource.raw_length)
                .collect();
            assert!(placeholder.chars().all(|c| c == FILLER));
        }
    }

    #[test]
    fn test_image_claims_text_before_link() {
        let report = analyze("![a](b)", &MatcherRegistry::default(), &Limits::default());
        assert_eq!(report.resources.len(), 1);
        assert_eq!(report.resources[0].key, "image");
    }

    #[test]
    fn test_remap_identity_without_overflow() {
        let out = pass("[a](1)", &builtin(LINK_KEY), 1);
        assert_eq!(out.remap(0), 0);
        assert_eq!(out.remap(10), 10);
    }
}

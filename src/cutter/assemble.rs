//! Budgeted reassembly of an extraction report.
//!
//! Resource placeholders get free budget up to their raw length, so the walk
//! may look `limits.text + Σ raw_length` chars into the report string. That
//! window is split into alternating text and resource segments; text consumes
//! the budget char by char, resources consume their display length (if any)
//! and are always emitted whole.

use tracing::{debug, trace};

use crate::cutter::config::TextHook;
use crate::cutter::extract::{Report, Resource};
use crate::cutter::limits::Limits;
use crate::cutter::matcher::MatcherRegistry;

/// Split plan for a report under a given budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentPlan {
    /// Furthest report offset considered.
    pub max_end: usize,
    /// Cut points, ascending. Repeated points mark empty text segments.
    pub points: Vec<usize>,
    /// Segments; even indices are text, odd indices are placeholders.
    pub segments: Vec<String>,
    /// Whether the window already drops part of the report.
    pub clipped: bool,
}

impl SegmentPlan {
    /// Plan the split of `string` for resources sorted by `start_index`.
    #[must_use]
    pub fn new(string: &str, sorted: &[&Resource], text_limit: usize) -> Self {
        let ignore_len: usize = sorted.iter().map(|r| r.raw_length).sum();
        let max_end = text_limit.saturating_add(ignore_len);
        let points = cut_points(sorted, max_end);
        let segments = split_at_points(string, &points);
        let clipped = max_end < string.chars().count();

        Self {
            max_end,
            points,
            segments,
            clipped,
        }
    }

    /// Number of placeholder segments.
    #[must_use]
    pub fn resource_segments(&self) -> usize {
        self.segments.len() / 2
    }
}

/// Cut points for `sorted` resources within `max_end`.
///
/// A resource straddling `max_end` contributes its start only; the final
/// point clips its placeholder.
#[must_use]
pub fn cut_points(sorted: &[&Resource], max_end: usize) -> Vec<usize> {
    let mut points = vec![0];
    for resource in sorted {
        if resource.start_index < max_end {
            points.push(resource.start_index);
        }
        if resource.end_index() < max_end {
            points.push(resource.end_index());
        }
    }
    points.push(max_end);
    points
}

/// Split `text` between consecutive `points` (char offsets, clamped to the end).
///
/// Points are sorted first and a leading `0` is implied.
#[must_use]
pub fn split_at_points(text: &str, points: &[usize]) -> Vec<String> {
    if points.is_empty() {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    let mut sorted = points.to_vec();
    sorted.sort_unstable();
    if sorted[0] != 0 {
        sorted.insert(0, 0);
    }

    sorted
        .windows(2)
        .map(|pair| {
            let start = pair[0].min(chars.len());
            let end = pair[1].min(chars.len());
            chars[start..end].iter().collect()
        })
        .collect()
}

/// Reassembles reports into budgeted output.
pub struct Assembler<'a> {
    registry: &'a MatcherRegistry,
    suffix: &'a str,
    text_parse: Option<&'a TextHook>,
}

impl<'a> Assembler<'a> {
    /// Assembler rendering resources through `registry`.
    #[must_use]
    pub const fn new(
        registry: &'a MatcherRegistry,
        suffix: &'a str,
        text_parse: Option<&'a TextHook>,
    ) -> Self {
        Self {
            registry,
            suffix,
            text_parse,
        }
    }

    fn parse_text(&self, text: &str) -> String {
        match self.text_parse {
            Some(hook) => hook(text),
            None => text.to_string(),
        }
    }

    fn render(&self, resource: &Resource, available: usize) -> String {
        match self.registry.find(&resource.key) {
            Some(matcher) => matcher.render(&resource.raw_content, available),
            None => resource.raw_content.clone(),
        }
    }

    /// Rebuild `report` within `limits.text()`.
    ///
    /// Output may exceed the budget when a rendered resource cannot shrink to
    /// the remaining quota.
    #[must_use]
    pub fn assemble(&self, report: &Report, limits: &Limits) -> String {
        let text_limit = limits.text();
        if report.string.is_empty() {
            return String::new();
        }

        if report.resources.is_empty() {
            let kept: String = report.string.chars().take(text_limit).collect();
            let mut out = self.parse_text(&kept);
            if report.string.chars().count() > text_limit {
                out.push_str(self.suffix);
            }
            return out;
        }

        let mut sorted: Vec<&Resource> = report.resources.iter().collect();
        sorted.sort_by_key(|r| r.start_index);

        let plan = SegmentPlan::new(&report.string, &sorted, text_limit);
        debug!(
            max_end = plan.max_end,
            points = ?plan.points,
            clipped = plan.clipped,
            "Planned segments"
        );

        let mut suffix_required = plan.clipped;
        let mut consumed = 0;
        let mut cursor = 0;
        let mut out = String::new();

        for (index, segment) in plan.segments.iter().enumerate() {
            let quota = text_limit.saturating_sub(consumed);
            if quota == 0 {
                trace!(index, "Budget exhausted");
                break;
            }

            let segment_len = segment.chars().count();

            if index % 2 == 0 {
                // Empty segments between adjacent resources never reach `text_parse`.
                if segment_len == 0 {
                    continue;
                }
                let piece = if segment_len > quota {
                    suffix_required = true;
                    segment.chars().take(quota).collect()
                } else {
                    segment.clone()
                };
                consumed += segment_len.min(quota);
                trace!(index, quota, kept = segment_len.min(quota), "Text segment");
                out.push_str(&self.parse_text(&piece));
                continue;
            }

            let Some(resource) = sorted.get(cursor) else {
                continue;
            };
            cursor += 1;

            let rendered = self.render(resource, segment_len.min(quota));
            if let Some(display_length) = resource.display_length {
                consumed = consumed.saturating_add(display_length);
                suffix_required = false;
            }
            trace!(index, quota, key = %resource.key, "Resource segment");
            out.push_str(&rendered);
        }

        if suffix_required {
            out.push_str(self.suffix);
        }
        out
    }
}

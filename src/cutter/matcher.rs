//! Resource matchers and the matcher registry.
//!
//! A [`Matcher`] describes one kind of embedded resource: how to find it, how
//! much visible text it stands for, how to render it under a tight budget and
//! what to do with occurrences past the kind's limit. The optional pieces are
//! plain capability fields checked where they are used.

use std::fmt;
use std::ops::Range;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::warn;

use crate::cutter::error::{CutterError, CutterResult};

/// Computes the display length of a raw match.
pub type DisplayLengthFn = Arc<dyn Fn(&str) -> usize + Send + Sync>;

/// Renders a raw match given the display length still available.
pub type RenderFn = Arc<dyn Fn(&str, usize) -> String + Send + Sync>;

/// Replaces an occurrence past the kind's limit.
pub type OverflowFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Key of the built-in image matcher.
pub const IMAGE_KEY: &str = "image";

/// Key of the built-in link matcher.
pub const LINK_KEY: &str = "link";

/// Mark appended to a link label that had to be shortened.
pub const LABEL_TRUNCATOR: &str = "...";

const IMAGE_PATTERN: &str = r"!\[.*?\]\(.*?\)";
const LINK_PATTERN: &str = r"\[.*?\]\(.*?\)";

static LINK_LABEL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]\(.*?\)").ok());

static BUILTIN_MATCHERS: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    vec![
        builtin(IMAGE_KEY, IMAGE_PATTERN),
        builtin(LINK_KEY, LINK_PATTERN)
            .with_display_length(link_label_len)
            .with_render(render_link),
    ]
});

/// How a matcher finds its occurrences.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Regular expression, scanned leftmost-first.
    Regex(Regex),
    /// Exact substring.
    Literal(String),
}

impl Pattern {
    /// Compile a regex pattern.
    ///
    /// # Errors
    /// Returns the regex error if `source` does not compile.
    pub fn regex(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self::Regex)
    }

    /// Literal substring pattern.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Byte ranges of all non-overlapping occurrences, left to right.
    #[must_use]
    pub fn find_spans(&self, haystack: &str) -> Vec<Range<usize>> {
        match self {
            Self::Regex(re) => re.find_iter(haystack).map(|m| m.range()).collect(),
            Self::Literal(needle) if needle.is_empty() => Vec::new(),
            Self::Literal(needle) => haystack
                .match_indices(needle.as_str())
                .map(|(start, m)| start..start + m.len())
                .collect(),
        }
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

/// Definition of one resource kind.
#[derive(Clone)]
pub struct Matcher {
    key: String,
    pattern: Option<Pattern>,
    display_length: Option<DisplayLengthFn>,
    render: Option<RenderFn>,
    on_overflow: Option<OverflowFn>,
}

impl Matcher {
    /// Matcher for `key` using `pattern`.
    #[must_use]
    pub fn new(key: impl Into<String>, pattern: impl Into<Pattern>) -> Self {
        Self {
            key: key.into(),
            pattern: Some(pattern.into()),
            display_length: None,
            render: None,
            on_overflow: None,
        }
    }

    /// Matcher for `key` from a regex source.
    ///
    /// # Errors
    /// Returns [`CutterError::InvalidPattern`] if the regex does not compile.
    pub fn regex(key: impl Into<String>, source: &str) -> CutterResult<Self> {
        let key = key.into();
        match Pattern::regex(source) {
            Ok(pattern) => Ok(Self::new(key, pattern)),
            Err(source) => Err(CutterError::InvalidPattern { key, source }),
        }
    }

    /// Matcher for `key` matching an exact substring.
    #[must_use]
    pub fn literal(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(key, Pattern::literal(text))
    }

    /// Matcher with no pattern. It is kept in the registry but never matches.
    #[must_use]
    pub fn unpatterned(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            pattern: None,
            display_length: None,
            render: None,
            on_overflow: None,
        }
    }

    /// Count matches of this kind against the text budget.
    #[must_use]
    pub fn with_display_length<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> usize + Send + Sync + 'static,
    {
        self.display_length = Some(Arc::new(f));
        self
    }

    /// Render matches through `f(raw, available)` instead of verbatim.
    #[must_use]
    pub fn with_render<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(f));
        self
    }

    /// Replace occurrences past the limit with `f(raw)` instead of dropping them.
    #[must_use]
    pub fn with_overflow<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.on_overflow = Some(Arc::new(f));
        self
    }

    /// Kind key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Pattern, if one was configured.
    #[must_use]
    pub const fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    /// Display length of `raw`, or `None` when this kind is budget-free.
    #[must_use]
    pub fn display_length(&self, raw: &str) -> Option<usize> {
        self.display_length.as_ref().map(|f| f(raw))
    }

    /// Rendered form of `raw` given `available` display length.
    #[must_use]
    pub fn render(&self, raw: &str, available: usize) -> String {
        match &self.render {
            Some(render) => render(raw, available),
            None => raw.to_string(),
        }
    }

    /// Replacement for an occurrence past the limit.
    #[must_use]
    pub fn overflow(&self, raw: &str) -> String {
        self.on_overflow
            .as_ref()
            .map_or_else(String::new, |f| f(raw))
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("key", &self.key)
            .field("pattern", &self.pattern)
            .field("display_length", &self.display_length.is_some())
            .field("render", &self.render.is_some())
            .field("on_overflow", &self.on_overflow.is_some())
            .finish()
    }
}

fn builtin(key: &str, source: &str) -> Matcher {
    Matcher::regex(key, source).unwrap_or_else(|err| {
        warn!("Built-in matcher disabled: {err}");
        Matcher::unpatterned(key)
    })
}

/// Built-in matchers shared by every registry.
#[must_use]
pub fn builtin_matchers() -> &'static [Matcher] {
    &BUILTIN_MATCHERS
}

/// Char length of a link's bracketed label.
#[must_use]
pub fn link_label_len(raw: &str) -> usize {
    LINK_LABEL
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map_or(0, |label| label.as_str().chars().count())
}

/// Re-emit a link with its label cut to `available` chars.
///
/// The label gets [`LABEL_TRUNCATOR`] appended when it was shortened. Input
/// that does not look like a link is returned unchanged.
#[must_use]
pub fn render_link(raw: &str, available: usize) -> String {
    let Some(label) = LINK_LABEL
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
    else {
        return raw.to_string();
    };

    let text = label.as_str();
    let mut out = String::with_capacity(raw.len() + LABEL_TRUNCATOR.len());
    out.push_str(&raw[..label.start()]);
    out.extend(text.chars().take(available));
    if text.chars().count() > available {
        out.push_str(LABEL_TRUNCATOR);
    }
    out.push_str(&raw[label.end()..]);
    out
}

/// Ordered matcher list: caller matchers first, then the built-ins.
///
/// A built-in whose key is also used by a caller matcher is left out.
#[derive(Clone, Debug)]
pub struct MatcherRegistry {
    custom: Vec<Matcher>,
    builtins: &'static [Matcher],
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MatcherRegistry {
    /// Registry with `custom` ahead of the built-ins.
    #[must_use]
    pub fn new(custom: Vec<Matcher>) -> Self {
        Self {
            custom,
            builtins: builtin_matchers(),
        }
    }

    /// Matchers in the order they claim text.
    pub fn iter(&self) -> impl Iterator<Item = &Matcher> {
        self.custom.iter().chain(
            self.builtins
                .iter()
                .filter(|b| !self.custom.iter().any(|c| c.key == b.key)),
        )
    }

    /// First matcher registered under `key`.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Matcher> {
        self.iter().find(|m| m.key == key)
    }

    /// Number of effective matchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the registry holds no matchers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let registry = MatcherRegistry::default();
        let keys: Vec<&str> = registry.iter().map(Matcher::key).collect();
        assert_eq!(keys, vec![IMAGE_KEY, LINK_KEY]);
    }

    #[test]
    fn test_custom_matchers_come_first() {
        let registry = MatcherRegistry::new(vec![Matcher::literal("foo", "foo")]);
        let keys: Vec<&str> = registry.iter().map(Matcher::key).collect();
        assert_eq!(keys, vec!["foo", IMAGE_KEY, LINK_KEY]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_custom_key_shadows_builtin() {
        let registry = MatcherRegistry::new(vec![
            Matcher::literal(IMAGE_KEY, "<img>").with_render(|_, _| "[img]".to_string()),
        ]);
        assert_eq!(registry.len(), 2);
        let image = registry.find(IMAGE_KEY);
        assert!(image.is_some_and(|m| m.render("<img>", 0) == "[img]"));
    }

    #[test]
    fn test_find_missing() {
        assert!(MatcherRegistry::default().find("emoticon").is_none());
    }

    #[test]
    fn test_builtin_image_has_no_capabilities() {
        let registry = MatcherRegistry::default();
        let Some(image) = registry.find(IMAGE_KEY) else {
            panic!("image matcher missing");
        };
        assert_eq!(image.display_length("![a](b)"), None);
        assert_eq!(image.render("![a](b)", 0), "![a](b)");
        assert_eq!(image.overflow("![a](b)"), "");
    }

    #[test]
    fn test_link_label_len() {
        assert_eq!(link_label_len("[link](xx)"), 4);
        assert_eq!(link_label_len("[墨水](x)"), 2);
        assert_eq!(link_label_len("xxxxx"), 0);
    }

    #[test]
    fn test_render_link_truncates_label() {
        assert_eq!(render_link("[link0](link_url:0)", 1), "[l...](link_url:0)");
        assert_eq!(render_link("[link0](link_url:0)", 5), "[link0](link_url:0)");
        assert_eq!(render_link("[link0](link_url:0)", 19), "[link0](link_url:0)");
        assert_eq!(render_link("[link0](link_url:0)", 0), "[...](link_url:0)");
    }

    #[test]
    fn test_render_link_passes_through_non_links() {
        assert_eq!(render_link("xxxxx", 2), "xxxxx");
    }

    #[test]
    fn test_render_link_label_monotonic() {
        let raw = "[a longer label](u)";
        let mut previous = usize::MAX;
        for available in (0..20).rev() {
            let rendered = render_link(raw, available);
            let label = rendered
                .trim_start_matches('[')
                .split(']')
                .next()
                .unwrap_or_default()
                .trim_end_matches(LABEL_TRUNCATOR)
                .chars()
                .count();
            assert!(label <= previous);
            previous = label;
        }
    }

    #[test]
    fn test_literal_spans() {
        let pattern = Pattern::literal("foo");
        assert_eq!(pattern.find_spans("foofoo bar foo"), vec![0..3, 3..6, 11..14]);
        assert!(Pattern::literal("").find_spans("abc").is_empty());
    }

    #[test]
    fn test_regex_constructor_rejects_bad_source() {
        let err = Matcher::regex("broken", "(");
        assert!(matches!(err, Err(CutterError::InvalidPattern { ref key, .. }) if key == "broken"));
    }

    #[test]
    fn test_unpatterned_has_no_pattern() {
        assert!(Matcher::unpatterned("empty").pattern().is_none());
    }
}

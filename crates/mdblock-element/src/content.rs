//! Markdown text and where it came from.

use std::borrow::Cow;
use std::sync::LazyLock;

use mdblock_renderer::Origin;
use regex::Regex;
use url::Url;

/// First run of leading tabs or spaces on any line.
static INDENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[\t ]+").unwrap());

/// Markdown text with its provenance.
///
/// Sources are replaced wholesale, never edited in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentSource {
    text: String,
    origin: Origin,
    source_url: Option<Url>,
}

impl ContentSource {
    /// Text captured from the host's own markup.
    #[must_use]
    pub fn local(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Local,
            source_url: None,
        }
    }

    /// Text fetched from `url`.
    #[must_use]
    pub fn remote(text: impl Into<String>, url: Url) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Remote,
            source_url: Some(url),
        }
    }

    /// Raw text assigned programmatically.
    #[must_use]
    pub fn assigned(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Remote,
            source_url: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn source_url(&self) -> Option<&Url> {
        self.source_url.as_ref()
    }

    /// Copy of this source with common indentation removed.
    #[must_use]
    pub(crate) fn normalized(&self) -> Self {
        Self {
            text: normalize_indentation(&self.text).into_owned(),
            origin: self.origin,
            source_url: self.source_url.clone(),
        }
    }
}

/// Strip the indentation of the first indented line from every line.
///
/// Only lines that start with exactly that run of tabs and spaces lose it;
/// other lines are left alone.
///
/// # Examples
///
/// ```
/// use mdblock_element::normalize_indentation;
///
/// assert_eq!(normalize_indentation("\n    # Title\n    text"), "\n# Title\ntext");
/// assert_eq!(normalize_indentation("  a\n    b\nc"), "a\n  b\nc");
/// ```
pub fn normalize_indentation(text: &str) -> Cow<'_, str> {
    let Some(indent) = INDENT_RE.find(text) else {
        return Cow::Borrowed(text);
    };
    let indent = indent.as_str();

    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.strip_prefix(indent).unwrap_or(line));
    }
    Cow::Owned(out)
}

//! Markdown parsing engine.
//!
//! Elements hold an engine behind `Arc<dyn ParsingEngine>`; [`PulldownEngine`]
//! is the pulldown-cmark backed implementation.

use pulldown_cmark::{Options, Parser};

use crate::inline::protect_block_markers;
use crate::rules::{RenderContext, RuleTable};
use crate::writer::HtmlWriter;

/// Error returned by a parsing engine.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("input of {len} bytes exceeds the {limit} byte limit")]
    InputTooLarge { len: usize, limit: usize },
}

/// Converts markdown text to HTML with a per-call rule table.
pub trait ParsingEngine: Send + Sync {
    /// Parse `text` as inline content only: no paragraphs, headings or lists.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the input is rejected.
    fn parse_inline(
        &self,
        text: &str,
        rules: &RuleTable,
        ctx: &RenderContext<'_>,
    ) -> Result<String, ParseError>;

    /// Parse `text` as a full markdown document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the input is rejected.
    fn parse_block(
        &self,
        text: &str,
        rules: &RuleTable,
        ctx: &RenderContext<'_>,
    ) -> Result<String, ParseError>;
}

/// Options for [`PulldownEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Enable tables, strikethrough and task lists.
    pub gfm: bool,
    /// Reject inputs longer than this many bytes.
    pub max_input_bytes: Option<usize>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            max_input_bytes: None,
        }
    }
}

/// pulldown-cmark engine.
///
/// # Example
///
/// ```
/// use mdblock_renderer::{Origin, ParsingEngine, PulldownEngine, RenderConfiguration, RenderContext, RuleTable};
///
/// let engine = PulldownEngine::new();
/// let config = RenderConfiguration::new();
/// let ctx = RenderContext::new(&config, Origin::Local);
/// let html = engine.parse_block("# Title", &RuleTable::block(), &ctx).unwrap();
/// assert_eq!(html, r#"<h1 id="title">Title</h1>"#);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PulldownEngine {
    options: EngineOptions,
}

impl PulldownEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn check_size(&self, text: &str) -> Result<(), ParseError> {
        match self.options.max_input_bytes {
            Some(limit) if text.len() > limit => Err(ParseError::InputTooLarge {
                len: text.len(),
                limit,
            }),
            _ => Ok(()),
        }
    }

    fn block_options(&self) -> Options {
        let mut options = Options::empty();
        if self.options.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
        }
        options
    }

    fn inline_options(&self) -> Options {
        if self.options.gfm {
            Options::ENABLE_STRIKETHROUGH
        } else {
            Options::empty()
        }
    }
}

impl ParsingEngine for PulldownEngine {
    fn parse_inline(
        &self,
        text: &str,
        rules: &RuleTable,
        ctx: &RenderContext<'_>,
    ) -> Result<String, ParseError> {
        self.check_size(text)?;
        let protected = protect_block_markers(text);
        let parser = Parser::new_ext(&protected, self.inline_options());
        Ok(HtmlWriter::new(rules, ctx, true).write(parser))
    }

    fn parse_block(
        &self,
        text: &str,
        rules: &RuleTable,
        ctx: &RenderContext<'_>,
    ) -> Result<String, ParseError> {
        self.check_size(text)?;
        let parser = Parser::new_ext(text, self.block_options());
        Ok(HtmlWriter::new(rules, ctx, false).write(parser))
    }
}

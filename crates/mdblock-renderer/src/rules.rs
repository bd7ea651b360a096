//! Rendering rule table and the built-in rules.
//!
//! A [`RuleTable`] maps the constructs an element customizes (`heading`,
//! `code`, `codespan`) to plain functions. Rules never capture their owner;
//! everything they need arrives through an explicit [`RenderContext`], so a
//! table can be copied freely between elements without sharing state.

use std::fmt::Write;

use crate::escape::{escape_code_for_origin, escape_html};
use crate::options::{HeadingLinkMode, Origin, RenderConfiguration};
use crate::slug::Slugger;

/// Class prefix for fenced code languages.
pub const LANG_PREFIX: &str = "language-";

/// Per-render inputs handed to every rule.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    pub config: &'a RenderConfiguration,
    pub origin: Origin,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a RenderConfiguration, origin: Origin) -> Self {
        Self { config, origin }
    }
}

/// A parsed heading as seen by a heading rule.
#[derive(Clone, Copy, Debug)]
pub struct Heading<'a> {
    /// Rendered inline HTML of the heading content.
    pub html: &'a str,
    /// Level as written in the markdown (1-6).
    pub level: u8,
    /// Plain text of the heading, used for the slug.
    pub raw: &'a str,
}

/// Renders a heading.
pub type HeadingRule = fn(&Heading<'_>, &RenderContext<'_>, &mut Slugger) -> String;

/// Renders a code block from engine-escaped code and an optional language.
pub type CodeRule = fn(&str, Option<&str>, &RenderContext<'_>) -> String;

/// Renders a code span from engine-escaped code.
pub type CodespanRule = fn(&str, &RenderContext<'_>) -> String;

/// Markdown constructs that can be overridden.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Construct {
    Heading,
    Code,
    Codespan,
}

impl Construct {
    pub const ALL: [Self; 3] = [Self::Heading, Self::Code, Self::Codespan];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Code => "code",
            Self::Codespan => "codespan",
        }
    }
}

/// Overrides for specific constructs; absent entries use engine defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleTable {
    heading: Option<HeadingRule>,
    code: Option<CodeRule>,
    codespan: Option<CodespanRule>,
}

impl RuleTable {
    /// A table without overrides.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Inline-only table: `codespan`.
    #[must_use]
    pub fn span() -> Self {
        Self::empty().with_codespan(codespan_rule)
    }

    /// Block table: the span rules plus `heading` and `code`.
    #[must_use]
    pub fn block() -> Self {
        Self::span().with_heading(heading_rule).with_code(code_rule)
    }

    #[must_use]
    pub fn with_heading(mut self, rule: HeadingRule) -> Self {
        self.heading = Some(rule);
        self
    }

    #[must_use]
    pub fn with_code(mut self, rule: CodeRule) -> Self {
        self.code = Some(rule);
        self
    }

    #[must_use]
    pub fn with_codespan(mut self, rule: CodespanRule) -> Self {
        self.codespan = Some(rule);
        self
    }

    /// Whether `construct` has an override registered.
    pub fn has(&self, construct: Construct) -> bool {
        match construct {
            Construct::Heading => self.heading.is_some(),
            Construct::Code => self.code.is_some(),
            Construct::Codespan => self.codespan.is_some(),
        }
    }

    pub(crate) fn heading(&self) -> Option<HeadingRule> {
        self.heading
    }

    pub(crate) fn code(&self) -> Option<CodeRule> {
        self.code
    }

    pub(crate) fn codespan(&self) -> Option<CodespanRule> {
        self.codespan
    }
}

/// Heading with level shift, slug id and optional anchor decoration.
pub fn heading_rule(heading: &Heading<'_>, ctx: &RenderContext<'_>, slugger: &mut Slugger) -> String {
    let level = ctx.config.effective_heading_level(heading.level);
    let id = slugger.slug(heading.raw);

    let mut out = String::new();
    write!(out, r#"<h{level} id="{id}">"#).unwrap();
    match ctx.config.heading_link_mode() {
        HeadingLinkMode::None => out.push_str(heading.html),
        HeadingLinkMode::SelfLink => {
            write!(out, r##"<a href="#{id}" class="anchor">{}</a>"##, heading.html).unwrap();
        }
        HeadingLinkMode::PrefixSymbol(symbol) => {
            write!(out, r##"<a href="#{id}" class="anchor">{symbol}</a>{}"##, heading.html)
                .unwrap();
        }
    }
    write!(out, "</h{level}>").unwrap();
    out
}

/// Fenced or indented code block.
pub fn code_rule(code: &str, language: Option<&str>, ctx: &RenderContext<'_>) -> String {
    let code = escape_code_for_origin(code, ctx.origin);
    match language {
        Some(lang) => format!(
            r#"<pre class="{LANG_PREFIX}{}"><code>{code}</code></pre>"#,
            escape_html(lang)
        ),
        None => format!("<pre><code>{code}</code></pre>"),
    }
}

/// Inline code span.
pub fn codespan_rule(code: &str, ctx: &RenderContext<'_>) -> String {
    format!("<code>{}</code>", escape_code_for_origin(code, ctx.origin))
}

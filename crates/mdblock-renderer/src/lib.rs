//! Markdown parsing engine with per-element rendering rules.
//!
//! This crate turns markdown text into HTML for the `<md-span>` and
//! `<md-block>` elements. Parsing is done by [`PulldownEngine`], which
//! implements the object-safe [`ParsingEngine`] trait. Each parse receives
//! a [`RuleTable`] and a [`RenderContext`]:
//!
//! - [`RuleTable`]: overrides for `heading`, `code` and `codespan`
//! - [`RenderContext`]: the element's [`RenderConfiguration`] and the content [`Origin`]
//!
//! Everything else (paragraphs, lists, tables, links) is written by the engine.
//!
//! # Example
//!
//! ```
//! use mdblock_renderer::{
//!     HeadingLinkMode, Origin, ParsingEngine, PulldownEngine, RenderConfiguration,
//!     RenderContext, RuleTable,
//! };
//!
//! let config = RenderConfiguration::new().with_heading_link_mode(HeadingLinkMode::SelfLink);
//! let ctx = RenderContext::new(&config, Origin::Remote);
//! let html = PulldownEngine::new()
//!     .parse_block("# Hello\n\n`<b>`", &RuleTable::block(), &ctx)
//!     .unwrap();
//! assert_eq!(
//!     html,
//!     r##"<h1 id="hello"><a href="#hello" class="anchor">Hello</a></h1><p><code>&lt;b&gt;</code></p>"##
//! );
//! ```

mod engine;
mod escape;
mod inline;
mod options;
mod rules;
mod slug;
mod state;
mod util;
mod writer;

pub use engine::{EngineOptions, ParseError, ParsingEngine, PulldownEngine};
pub use escape::{escape_code_for_origin, escape_html};
pub use inline::protect_block_markers;
pub use options::{HeadingLinkMode, MAX_HEADING_LEVEL, Origin, RenderConfiguration};
pub use rules::{
    CodeRule, CodespanRule, Construct, Heading, HeadingRule, LANG_PREFIX, RenderContext,
    RuleTable, code_rule, codespan_rule, heading_rule,
};
pub use slug::{Slugger, slugify};

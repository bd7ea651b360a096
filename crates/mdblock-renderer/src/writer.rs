//! HTML writer driven by pulldown-cmark events.
//!
//! Common elements (paragraphs, lists, tables, inline formatting) are written
//! directly; headings, code blocks and code spans go through the rule table
//! when an override is registered.

use std::fmt::Write;

use pulldown_cmark::{Event, Tag, TagEnd};

use crate::escape::escape_html;
use crate::inline::LINE_GUARD;
use crate::rules::{Heading, RenderContext, RuleTable};
use crate::slug::Slugger;
use crate::state::{CodeBlockState, HeadingState, ImageState, PendingCode, TableState};
use crate::util::{code_block_language, heading_level_to_num};

/// Single-use writer for one parse.
pub(crate) struct HtmlWriter<'r> {
    rules: &'r RuleTable,
    ctx: &'r RenderContext<'r>,
    inline: bool,
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    slugger: Slugger,
    paragraphs: usize,
}

impl<'r> HtmlWriter<'r> {
    /// Create a writer. In `inline` mode paragraphs are not wrapped in `<p>`.
    pub(crate) fn new(rules: &'r RuleTable, ctx: &'r RenderContext<'r>, inline: bool) -> Self {
        Self {
            rules,
            ctx,
            inline,
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            slugger: Slugger::new(),
            paragraphs: 0,
        }
    }

    /// Consume events and return the HTML.
    pub(crate) fn write<'a, I>(mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.output
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.push_inline("\n"),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not enabled in parser options
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.inline {
                    if self.paragraphs > 0 {
                        self.output.push('\n');
                    }
                    self.paragraphs += 1;
                } else {
                    self.output.push_str("<p>");
                }
            }
            Tag::Heading { level, .. } => {
                // Opening tag is written at the end, once the slug is known
                self.heading.start(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => self.code.start(code_block_language(&kind)),
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.set_head(true);
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let open = self.table.open_cell();
                self.output.push_str(&open);
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = format!(r#"<a href="{}""#, escape_html(&dest_url));
                if !title.is_empty() {
                    write!(link, r#" title="{}""#, escape_html(&title)).unwrap();
                }
                link.push('>');
                self.push_inline(&link);
            }
            Tag::Image {
                dest_url, title, ..
            } => self.image.start(&dest_url, &title),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if !self.inline {
                    self.output.push_str("</p>");
                }
            }
            TagEnd::Heading(_) => self.end_heading(),
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => self.end_code_block(),
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.set_head(false);
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                let close = self.table.close_cell();
                self.output.push_str(close);
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                let (src, alt, title) = self.image.end();
                let mut img = format!(r#"<img src="{}""#, escape_html(&src));
                if !title.is_empty() {
                    write!(img, r#" title="{}""#, escape_html(&title)).unwrap();
                }
                write!(img, r#" alt="{}">"#, escape_html(&alt)).unwrap();
                self.push_inline(&img);
            }
        }
    }

    fn end_heading(&mut self) {
        let Some((level, raw, html)) = self.heading.finish() else {
            return;
        };
        if let Some(rule) = self.rules.heading() {
            let heading = Heading {
                html: &html,
                level,
                raw: &raw,
            };
            let rendered = rule(&heading, self.ctx, &mut self.slugger);
            self.output.push_str(&rendered);
        } else {
            let id = self.slugger.slug(&raw);
            write!(self.output, r#"<h{level} id="{id}">{html}</h{level}>"#).unwrap();
        }
    }

    fn end_code_block(&mut self) {
        let Some(PendingCode { language: lang, text }) = self.code.finish() else {
            return;
        };
        let escaped = escape_html(&text);
        if let Some(rule) = self.rules.code() {
            let rendered = rule(&escaped, lang.as_deref(), self.ctx);
            self.output.push_str(&rendered);
        } else if let Some(lang) = lang {
            write!(
                self.output,
                r#"<pre><code class="language-{}">{escaped}</code></pre>"#,
                escape_html(&lang)
            )
            .unwrap();
        } else {
            write!(self.output, "<pre><code>{escaped}</code></pre>").unwrap();
        }
    }

    fn text(&mut self, text: &str) {
        let text = if self.inline {
            text.strip_prefix(LINE_GUARD).unwrap_or(text)
        } else {
            text
        };
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        let escaped = escape_html(code);
        let html = match self.rules.codespan() {
            Some(rule) => rule(&escaped, self.ctx),
            None => format!("<code>{escaped}</code>"),
        };
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        self.push_inline(&html);
    }

    fn task_list_marker(&mut self, checked: bool) {
        if checked {
            self.output
                .push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            self.output.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}

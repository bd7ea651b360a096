//! Context tracked by the HTML writer while walking parser events.

use pulldown_cmark::Alignment;

/// Fenced or indented code waiting for its closing event.
pub(crate) struct PendingCode {
    pub(crate) language: Option<String>,
    pub(crate) text: String,
}

/// Code block being collected, if any.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    pending: Option<PendingCode>,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.pending = Some(PendingCode {
            language,
            text: String::new(),
        });
    }

    pub(crate) fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        if let Some(code) = &mut self.pending {
            code.text.push_str(text);
        }
    }

    pub(crate) fn finish(&mut self) -> Option<PendingCode> {
        self.pending.take()
    }
}

/// Position inside a GFM table.
#[derive(Default)]
pub(crate) struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    column: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        *self = Self {
            alignments,
            ..Self::default()
        };
    }

    /// Enter or leave the header row.
    pub(crate) fn set_head(&mut self, in_head: bool) {
        self.in_head = in_head;
        self.column = 0;
    }

    pub(crate) fn start_row(&mut self) {
        self.column = 0;
    }

    /// Opening tag for the cell in the current column.
    pub(crate) fn open_cell(&self) -> String {
        let tag = if self.in_head { "th" } else { "td" };
        match self
            .alignments
            .get(self.column)
            .copied()
            .and_then(css_text_align)
        {
            Some(align) => format!(r#"<{tag} style="text-align:{align}">"#),
            None => format!("<{tag}>"),
        }
    }

    /// Closing tag for the current cell. Advances to the next column.
    pub(crate) fn close_cell(&mut self) -> &'static str {
        self.column += 1;
        if self.in_head { "</th>" } else { "</td>" }
    }
}

fn css_text_align(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
        Alignment::None => None,
    }
}

/// Alt text of an image being collected.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
    src: String,
    title: String,
}

impl ImageState {
    pub(crate) fn start(&mut self, src: &str, title: &str) {
        self.active = true;
        self.alt_text.clear();
        src.clone_into(&mut self.src);
        title.clone_into(&mut self.title);
    }

    /// End the image and return `(src, alt, title)`.
    pub(crate) fn end(&mut self) -> (String, String, String) {
        self.active = false;
        (
            std::mem::take(&mut self.src),
            std::mem::take(&mut self.alt_text),
            std::mem::take(&mut self.title),
        )
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Heading content being collected: plain text for the slug, HTML for the body.
#[derive(Default)]
pub(crate) struct HeadingState {
    level: Option<u8>,
    text: String,
    html: String,
}

impl HeadingState {
    pub(crate) fn start(&mut self, level: u8) {
        self.level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.level.is_some()
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    /// Finish the heading and return `(level, trimmed text, trimmed html)`.
    pub(crate) fn finish(&mut self) -> Option<(u8, String, String)> {
        let level = self.level.take()?;
        let text = std::mem::take(&mut self.text).trim().to_owned();
        let html = std::mem::take(&mut self.html).trim().to_owned();
        Some((level, text, html))
    }
}

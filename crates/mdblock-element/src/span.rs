//! `<md-span>`: inline markdown.

use std::sync::Arc;

use mdblock_renderer::{ParsingEngine, PulldownEngine};

use crate::element::{MarkdownElement, Variant};
use crate::error::RenderError;
use crate::host::HostElement;
use crate::sanitize::{AmmoniaSanitizer, Sanitizer};

/// Inline markdown element. Renders without paragraphs or block structure.
///
/// # Example
///
/// ```
/// use mdblock_element::{HostElement, MarkdownSpanElement};
/// use url::Url;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let host = HostElement::new(Url::parse("https://example.com/").unwrap())
///     .with_inner_html("Use `<b>` for **bold**");
/// let mut span = MarkdownSpanElement::new(host);
/// span.attach().await.unwrap();
/// assert_eq!(
///     span.element().host().inner_html(),
///     "Use <code>&lt;b&gt;</code> for <strong>bold</strong>"
/// );
/// # });
/// ```
pub struct MarkdownSpanElement<S = AmmoniaSanitizer> {
    inner: MarkdownElement<S>,
}

impl MarkdownSpanElement {
    /// Create a span element with the default engine and sanitizer.
    #[must_use]
    pub fn new(host: HostElement) -> Self {
        Self::with_parts(host, Arc::new(PulldownEngine::new()), Arc::new(AmmoniaSanitizer))
    }
}

impl<S: Sanitizer> MarkdownSpanElement<S> {
    #[must_use]
    pub fn with_parts(host: HostElement, engine: Arc<dyn ParsingEngine>, sanitizer: Arc<S>) -> Self {
        Self {
            inner: MarkdownElement::new(host, Variant::span(), engine, sanitizer),
        }
    }

    /// See [`MarkdownElement::attach`].
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if parsing or sanitization fails.
    pub async fn attach(&mut self) -> Result<bool, RenderError> {
        self.inner.attach().await
    }

    pub fn detach(&mut self) {
        self.inner.detach();
    }

    /// See [`MarkdownElement::render`].
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if parsing or sanitization fails.
    pub async fn render(&mut self) -> Result<bool, RenderError> {
        self.inner.render().await
    }

    /// See [`MarkdownElement::set_content`].
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if parsing or sanitization fails.
    pub async fn set_content(&mut self, text: impl Into<String>) -> Result<bool, RenderError> {
        self.inner.set_content(text).await
    }

    pub fn element(&self) -> &MarkdownElement<S> {
        &self.inner
    }
}

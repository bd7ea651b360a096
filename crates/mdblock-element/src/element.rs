//! Shared render pipeline: capture, normalize, parse, sanitize, commit.

use std::sync::Arc;

use mdblock_renderer::{ParsingEngine, RenderConfiguration, RenderContext, RuleTable};
use tokio::sync::broadcast;

use crate::content::ContentSource;
use crate::error::RenderError;
use crate::host::{HostElement, RENDERED_ATTR, UNTRUSTED_ATTR};
use crate::notify::{self, RenderComplete};
use crate::sanitize::{AmmoniaSanitizer, Sanitizer};

/// Parser entry point a variant renders with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseEntry {
    Inline,
    Block,
}

/// What distinguishes one element kind from another.
#[derive(Clone, Copy, Debug)]
pub struct Variant {
    pub entry: ParseEntry,
    pub rules: RuleTable,
}

impl Variant {
    /// `<md-span>`: inline parsing, `codespan` rule.
    #[must_use]
    pub fn span() -> Self {
        Self {
            entry: ParseEntry::Inline,
            rules: RuleTable::span(),
        }
    }

    /// `<md-block>`: block parsing, `heading`, `code` and `codespan` rules.
    #[must_use]
    pub fn block() -> Self {
        Self {
            entry: ParseEntry::Block,
            rules: RuleTable::block(),
        }
    }
}

/// Lifecycle position of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementState {
    Unattached,
    /// Attached, nothing to render.
    AttachedEmpty,
    /// Attached with content that has not rendered successfully yet.
    Pending,
    Rendered,
}

/// Render pipeline shared by span and block elements.
///
/// Holds the host node, the current [`ContentSource`] and
/// [`RenderConfiguration`], and re-renders the whole output on every
/// [`render`](Self::render) call.
pub struct MarkdownElement<S = AmmoniaSanitizer> {
    host: HostElement,
    variant: Variant,
    engine: Arc<dyn ParsingEngine>,
    sanitizer: Arc<S>,
    content: Option<ContentSource>,
    config: RenderConfiguration,
    untrusted_locked: bool,
    notifier: broadcast::Sender<RenderComplete>,
}

impl<S: Sanitizer> MarkdownElement<S> {
    #[must_use]
    pub fn new(
        host: HostElement,
        variant: Variant,
        engine: Arc<dyn ParsingEngine>,
        sanitizer: Arc<S>,
    ) -> Self {
        Self {
            host,
            variant,
            engine,
            sanitizer,
            content: None,
            config: RenderConfiguration::new(),
            untrusted_locked: false,
            notifier: notify::channel(),
        }
    }

    /// Connect to the document.
    ///
    /// On first attach `untrusted` is read from the host and fixed for the
    /// element's lifetime. Without content, the host's inner markup is
    /// captured as local content. Indentation is normalized, then the
    /// element renders.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if parsing or sanitization fails.
    pub async fn attach(&mut self) -> Result<bool, RenderError> {
        self.host.set_connected(true);

        if !self.untrusted_locked {
            let untrusted = self.host.has_attribute(UNTRUSTED_ATTR);
            self.config = std::mem::take(&mut self.config).with_untrusted(untrusted);
            self.untrusted_locked = true;
        }

        let source = match &self.content {
            Some(content) => content.normalized(),
            None => ContentSource::local(self.host.inner_html()).normalized(),
        };
        self.content = Some(source);

        self.render().await
    }

    /// Disconnect from the document. Later renders are no-ops until re-attached.
    pub fn detach(&mut self) {
        self.host.set_connected(false);
    }

    /// Run the pipeline and replace the host's output.
    ///
    /// Returns `Ok(false)` without doing anything when the element is
    /// detached or has no content.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if parsing or sanitization fails; the host
    /// keeps its previous output.
    pub async fn render(&mut self) -> Result<bool, RenderError> {
        if !self.host.is_connected() {
            return Ok(false);
        }
        let Some(content) = &self.content else {
            return Ok(false);
        };

        let ctx = RenderContext::new(&self.config, content.origin());
        let text = content.text();
        let rules = &self.variant.rules;
        let html = match self.variant.entry {
            ParseEntry::Inline => self.engine.parse_inline(text, rules, &ctx)?,
            ParseEntry::Block => self.engine.parse_block(text, rules, &ctx)?,
        };
        let origin = content.origin();

        let html = if self.config.untrusted() {
            self.sanitizer.sanitize(&html).await?
        } else {
            html
        };

        tracing::debug!(?origin, bytes = html.len(), "Rendered markdown");
        self.host.set_inner_html(html.clone());
        self.host.set_attribute(RENDERED_ATTR, "");
        // No subscribers is fine
        let _ = self.notifier.send(RenderComplete { html });
        Ok(true)
    }

    /// Replace the content with raw text and re-render.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if parsing or sanitization fails.
    pub async fn set_content(&mut self, text: impl Into<String>) -> Result<bool, RenderError> {
        self.replace_content(ContentSource::assigned(text));
        self.render().await
    }

    pub(crate) fn replace_content(&mut self, content: ContentSource) {
        self.content = Some(content);
    }

    pub fn content(&self) -> Option<&ContentSource> {
        self.content.as_ref()
    }

    pub fn config(&self) -> &RenderConfiguration {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut RenderConfiguration {
        &mut self.config
    }

    pub fn host(&self) -> &HostElement {
        &self.host
    }

    pub(crate) fn host_mut(&mut self) -> &mut HostElement {
        &mut self.host
    }

    /// Whether a render has completed since creation.
    pub fn is_rendered(&self) -> bool {
        self.host.has_attribute(RENDERED_ATTR)
    }

    pub fn state(&self) -> ElementState {
        if !self.host.is_connected() {
            ElementState::Unattached
        } else if self.content.is_none() {
            ElementState::AttachedEmpty
        } else if self.is_rendered() {
            ElementState::Rendered
        } else {
            ElementState::Pending
        }
    }

    /// Receive a [`RenderComplete`] after every successful render.
    pub fn subscribe(&self) -> broadcast::Receiver<RenderComplete> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mdblock_renderer::{Origin, PulldownEngine};
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::*;
    use crate::error::SanitizeError;

    pub(crate) fn host(inner: &str) -> HostElement {
        HostElement::new(Url::parse("https://example.com/docs/page.html").unwrap())
            .with_inner_html(inner)
    }

    /// Sanitizer that counts calls and wraps output in a marker.
    #[derive(Default)]
    pub(crate) struct MarkingSanitizer {
        pub(crate) calls: AtomicUsize,
    }

    impl Sanitizer for MarkingSanitizer {
        async fn sanitize(&self, html: &str) -> Result<String, SanitizeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[clean]{html}"))
        }
    }

    struct FailingSanitizer;

    impl Sanitizer for FailingSanitizer {
        async fn sanitize(&self, _html: &str) -> Result<String, SanitizeError> {
            Err(SanitizeError::Init("policy unavailable".to_owned()))
        }
    }

    fn element<S: Sanitizer>(host: HostElement, variant: Variant, sanitizer: S) -> MarkdownElement<S> {
        MarkdownElement::new(host, variant, Arc::new(PulldownEngine::new()), Arc::new(sanitizer))
    }

    #[tokio::test]
    async fn test_render_before_attach_is_noop() {
        let mut el = element(host("# Title"), Variant::block(), MarkingSanitizer::default());
        assert_eq!(el.state(), ElementState::Unattached);
        assert!(!el.render().await.unwrap());
        assert_eq!(el.host().inner_html(), "# Title");
        assert!(!el.is_rendered());
    }

    #[tokio::test]
    async fn test_attach_captures_local_content() {
        let mut el = element(host("# Title"), Variant::block(), MarkingSanitizer::default());
        assert!(el.attach().await.unwrap());

        assert_eq!(el.host().inner_html(), r#"<h1 id="title">Title</h1>"#);
        assert_eq!(el.content().unwrap().origin(), Origin::Local);
        assert_eq!(el.state(), ElementState::Rendered);
        assert!(el.host().has_attribute(RENDERED_ATTR));
    }

    #[tokio::test]
    async fn test_attach_normalizes_indentation() {
        let markup = "\n    # Title\n\n    - item\n";
        let mut el = element(host(markup), Variant::block(), MarkingSanitizer::default());
        el.attach().await.unwrap();
        assert_eq!(
            el.host().inner_html(),
            r#"<h1 id="title">Title</h1><ul><li>item</li></ul>"#
        );
    }

    #[tokio::test]
    async fn test_empty_host_still_renders() {
        let mut el = element(host(""), Variant::block(), MarkingSanitizer::default());
        assert!(el.attach().await.unwrap());
        assert_eq!(el.host().inner_html(), "");
        assert_eq!(el.state(), ElementState::Rendered);
    }

    #[tokio::test]
    async fn test_local_codespan_entities() {
        let mut el = element(host("`&lt;b&gt;`"), Variant::span(), MarkingSanitizer::default());
        el.attach().await.unwrap();
        assert_eq!(el.host().inner_html(), "<code>&lt;b&gt;</code>");
    }

    #[tokio::test]
    async fn test_set_content_is_remote_origin() {
        let mut el = element(host(""), Variant::span(), MarkingSanitizer::default());
        el.attach().await.unwrap();
        el.set_content("`&lt;`").await.unwrap();
        assert_eq!(el.content().unwrap().origin(), Origin::Remote);
        assert_eq!(el.host().inner_html(), "<code>&amp;lt;</code>");
    }

    #[tokio::test]
    async fn test_set_content_before_attach_wins_over_markup() {
        let mut el = element(host("ignored"), Variant::span(), MarkingSanitizer::default());
        assert!(!el.set_content("*used*").await.unwrap());
        assert_eq!(el.state(), ElementState::Unattached);
        el.attach().await.unwrap();
        assert_eq!(el.host().inner_html(), "<em>used</em>");
    }

    #[tokio::test]
    async fn test_untrusted_is_sanitized() {
        let host = host("*a*").with_attribute(UNTRUSTED_ATTR, "");
        let mut el = element(host, Variant::span(), MarkingSanitizer::default());
        el.attach().await.unwrap();
        assert!(el.config().untrusted());
        assert_eq!(el.host().inner_html(), "[clean]<em>a</em>");
        assert_eq!(el.sanitizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_trusted_skips_sanitizer() {
        let mut el = element(host("*a*"), Variant::span(), MarkingSanitizer::default());
        el.attach().await.unwrap();
        assert_eq!(el.sanitizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_untrusted_is_fixed_at_first_attach() {
        let mut el = element(host("a"), Variant::span(), MarkingSanitizer::default());
        el.attach().await.unwrap();
        el.detach();
        el.host_mut().set_attribute(UNTRUSTED_ATTR, "");
        el.attach().await.unwrap();
        assert!(!el.config().untrusted());
    }

    #[tokio::test]
    async fn test_sanitize_error_propagates_and_keeps_output() {
        let host = host("*a*").with_attribute(UNTRUSTED_ATTR, "");
        let mut el = element(host, Variant::span(), FailingSanitizer);
        let err = el.attach().await.unwrap_err();
        assert!(matches!(err, RenderError::Sanitize(_)));
        assert_eq!(el.host().inner_html(), "*a*");
        assert_eq!(el.state(), ElementState::Pending);
    }

    #[tokio::test]
    async fn test_parse_error_propagates() {
        let engine = PulldownEngine::with_options(mdblock_renderer::EngineOptions {
            gfm: true,
            max_input_bytes: Some(2),
        });
        let mut el = MarkdownElement::new(
            host("too long"),
            Variant::block(),
            Arc::new(engine),
            Arc::new(MarkingSanitizer::default()),
        );
        assert!(matches!(
            el.attach().await.unwrap_err(),
            RenderError::Parse(_)
        ));
    }

    #[tokio::test]
    async fn test_detach_stops_rendering() {
        let mut el = element(host("a"), Variant::span(), MarkingSanitizer::default());
        el.attach().await.unwrap();
        el.detach();
        assert!(!el.set_content("b").await.unwrap());
        assert_eq!(el.host().inner_html(), "a");
        assert_eq!(el.state(), ElementState::Unattached);
    }

    #[tokio::test]
    async fn test_render_complete_notification() {
        let mut el = element(host("*a*"), Variant::span(), MarkingSanitizer::default());
        let mut rx = el.subscribe();
        el.attach().await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            RenderComplete {
                html: "<em>a</em>".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_render_is_repeatable() {
        let mut el = element(host("# A\n\n# A"), Variant::block(), MarkingSanitizer::default());
        el.attach().await.unwrap();
        let first = el.host().inner_html().to_owned();
        el.render().await.unwrap();
        assert_eq!(el.host().inner_html(), first);
    }
}

//! `<md-block>`: block markdown with live configuration and remote sources.

use std::num::NonZeroU32;
use std::sync::Arc;

use mdblock_renderer::{HeadingLinkMode, ParsingEngine, PulldownEngine};
use url::Url;

use crate::content::ContentSource;
use crate::element::{MarkdownElement, Variant};
use crate::error::{ConfigurationError, FetchError, RenderError};
use crate::fetch::{FetchResponse, Fetcher};
use crate::host::{HLINKS_ATTR, HMIN_ATTR, HostElement, SRC_ATTR};
use crate::sanitize::{AmmoniaSanitizer, Sanitizer};

/// A partial configuration change.
///
/// `None` fields are left as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigurationUpdate {
    pub src: Option<Url>,
    pub min_heading_level: Option<NonZeroU32>,
    pub heading_link_mode: Option<HeadingLinkMode>,
}

impl ConfigurationUpdate {
    /// Interpret an attribute change.
    ///
    /// `src` is resolved against `base`; removing it is not a change.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] for unresolvable URLs, heading levels
    /// that are not positive integers, and attributes that are not observed.
    pub fn from_attribute(
        name: &str,
        value: Option<&str>,
        base: &Url,
    ) -> Result<Self, ConfigurationError> {
        match name {
            SRC_ATTR => Ok(Self {
                src: value.map(|v| resolve_src(v, base)).transpose()?,
                ..Self::default()
            }),
            HMIN_ATTR => {
                let raw = value.unwrap_or_default();
                let level = raw
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .and_then(NonZeroU32::new)
                    .ok_or_else(|| ConfigurationError::InvalidHeadingLevel(raw.to_owned()))?;
                Ok(Self {
                    min_heading_level: Some(level),
                    ..Self::default()
                })
            }
            HLINKS_ATTR => Ok(Self {
                heading_link_mode: Some(HeadingLinkMode::from_attribute(value)),
                ..Self::default()
            }),
            other => Err(ConfigurationError::UnknownAttribute(other.to_owned())),
        }
    }
}

/// Resolve a `src` value against the document URL.
///
/// Empty values and values containing whitespace or control characters are
/// rejected before resolution.
fn resolve_src(value: &str, base: &Url) -> Result<Url, ConfigurationError> {
    let invalid = |source| ConfigurationError::InvalidUrl {
        value: value.to_owned(),
        source,
    };
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid(None));
    }
    base.join(trimmed).map_err(|e| invalid(Some(e)))
}

/// A fetch the element wants performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Sequence number; only the latest request's outcome is applied.
    pub seq: u64,
    pub url: Url,
}

impl FetchRequest {
    /// Perform the request with `fetcher`.
    pub async fn run<F: Fetcher>(self, fetcher: &F) -> FetchOutcome {
        let result = fetcher.fetch(&self.url).await;
        FetchOutcome {
            seq: self.seq,
            url: self.url,
            result,
        }
    }
}

/// Result of a [`FetchRequest`], fed back through
/// [`MarkdownBlockElement::complete_fetch`].
#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub url: Url,
    pub result: Result<FetchResponse, FetchError>,
}

/// What a configuration change did.
#[derive(Debug)]
#[must_use]
pub struct UpdateOutcome {
    /// Fetch to start for a changed `src`.
    pub fetch: Option<FetchRequest>,
    /// Result of the re-render: `Ok(false)` if none was needed or possible.
    pub render: Result<bool, RenderError>,
}

impl UpdateOutcome {
    fn unchanged() -> Self {
        Self {
            fetch: None,
            render: Ok(false),
        }
    }
}

/// Block markdown element.
///
/// Observes `src`, `hmin` and `hlinks`. Invalid values are ignored and the
/// previous state kept. A changed `src` produces a [`FetchRequest`]; the
/// caller performs it and hands the [`FetchOutcome`] back to
/// [`complete_fetch`](Self::complete_fetch), which applies only the result
/// of the most recent request.
pub struct MarkdownBlockElement<S = AmmoniaSanitizer> {
    inner: MarkdownElement<S>,
    src: Option<Url>,
    fetch_seq: u64,
}

impl MarkdownBlockElement {
    /// Create a block element with the default engine and sanitizer.
    #[must_use]
    pub fn new(host: HostElement) -> Self {
        Self::with_parts(host, Arc::new(PulldownEngine::new()), Arc::new(AmmoniaSanitizer))
    }
}

impl<S: Sanitizer> MarkdownBlockElement<S> {
    #[must_use]
    pub fn with_parts(host: HostElement, engine: Arc<dyn ParsingEngine>, sanitizer: Arc<S>) -> Self {
        Self {
            inner: MarkdownElement::new(host, Variant::block(), engine, sanitizer),
            src: None,
            fetch_seq: 0,
        }
    }

    /// Apply the host's `hmin`, `hlinks` and `src` attributes, then attach.
    ///
    /// The returned outcome carries the initial fetch, if `src` is set.
    pub async fn attach(&mut self) -> UpdateOutcome {
        let mut update = ConfigurationUpdate::default();
        for name in [HMIN_ATTR, HLINKS_ATTR, SRC_ATTR] {
            let Some(value) = self.inner.host().attribute(name) else {
                continue;
            };
            let base = self.inner.host().base_url();
            match ConfigurationUpdate::from_attribute(name, Some(value), base) {
                Ok(partial) => update.merge(partial),
                Err(error) => tracing::debug!(attribute = name, %error, "Ignoring attribute"),
            }
        }

        // Detached: applies configuration without rendering
        let UpdateOutcome { fetch, .. } = self.update_configuration(update).await;
        let render = self.inner.attach().await;
        UpdateOutcome { fetch, render }
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
    /// Fetches still in flight are superseded and their results discarded.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if parsing or sanitization fails.
    pub async fn set_content(&mut self, text: impl Into<String>) -> Result<bool, RenderError> {
        self.fetch_seq += 1;
        self.inner.set_content(text).await
    }

    /// Write an attribute on the host and react to the change.
    ///
    /// `None` removes the attribute.
    pub async fn set_attribute(&mut self, name: &str, value: Option<&str>) -> UpdateOutcome {
        let host = self.inner.host_mut();
        let old = match value {
            Some(value) => host.set_attribute(name, value),
            None => host.remove_attribute(name),
        };
        self.attribute_changed(name, old.as_deref(), value).await
    }

    /// React to an attribute change on the host.
    ///
    /// Identical values, unobserved attributes and invalid values are ignored.
    pub async fn attribute_changed(
        &mut self,
        name: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) -> UpdateOutcome {
        if old == new {
            return UpdateOutcome::unchanged();
        }
        let base = self.inner.host().base_url();
        match ConfigurationUpdate::from_attribute(name, new, base) {
            Ok(update) => self.update_configuration(update).await,
            Err(error) => {
                tracing::debug!(attribute = name, %error, "Ignoring attribute change");
                UpdateOutcome::unchanged()
            }
        }
    }

    /// Apply a partial configuration.
    ///
    /// Re-renders at most once, and only if the heading level or link mode
    /// actually changed. A `src` different from the current one yields a
    /// new [`FetchRequest`].
    pub async fn update_configuration(&mut self, update: ConfigurationUpdate) -> UpdateOutcome {
        let config = self.inner.config_mut();
        let mut changed = false;
        if let Some(level) = update.min_heading_level {
            changed |= config.set_min_heading_level(level);
        }
        if let Some(mode) = update.heading_link_mode {
            changed |= config.set_heading_link_mode(mode);
        }

        let fetch = update.src.and_then(|url| self.request_fetch(url));
        let render = if changed {
            self.inner.render().await
        } else {
            Ok(false)
        };
        UpdateOutcome { fetch, render }
    }

    fn request_fetch(&mut self, url: Url) -> Option<FetchRequest> {
        if self.src.as_ref() == Some(&url) {
            return None;
        }
        self.fetch_seq += 1;
        self.src = Some(url.clone());
        tracing::info!(%url, seq = self.fetch_seq, "Fetching markdown");
        Some(FetchRequest {
            seq: self.fetch_seq,
            url,
        })
    }

    /// Apply a finished fetch.
    ///
    /// Outcomes of superseded requests are discarded. Failures and non-2xx
    /// responses keep the previous content and are not returned.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if rendering the fetched content fails.
    pub async fn complete_fetch(&mut self, outcome: FetchOutcome) -> Result<bool, RenderError> {
        let FetchOutcome { seq, url, result } = outcome;
        if seq != self.fetch_seq {
            tracing::debug!(%url, seq, latest = self.fetch_seq, "Discarding stale fetch result");
            return Ok(false);
        }

        match result.and_then(FetchResponse::into_success) {
            Ok(body) => {
                self.inner.replace_content(ContentSource::remote(body, url));
                self.inner.render().await
            }
            Err(error) => {
                tracing::warn!(%url, %error, "Failed to fetch markdown");
                Ok(false)
            }
        }
    }

    /// Resolved source URL, once a valid `src` has been seen.
    pub fn src(&self) -> Option<&Url> {
        self.src.as_ref()
    }

    /// Set `src` through the attribute protocol.
    pub async fn set_src(&mut self, value: &str) -> UpdateOutcome {
        self.set_attribute(SRC_ATTR, Some(value)).await
    }

    pub fn min_heading_level(&self) -> NonZeroU32 {
        self.inner.config().min_heading_level()
    }

    /// Set `hmin` through the attribute protocol.
    pub async fn set_min_heading_level(&mut self, level: u32) -> UpdateOutcome {
        self.set_attribute(HMIN_ATTR, Some(&level.to_string())).await
    }

    pub fn heading_link_mode(&self) -> &HeadingLinkMode {
        self.inner.config().heading_link_mode()
    }

    /// Set or remove `hlinks` through the attribute protocol.
    pub async fn set_heading_links(&mut self, value: Option<&str>) -> UpdateOutcome {
        self.set_attribute(HLINKS_ATTR, value).await
    }

    pub fn element(&self) -> &MarkdownElement<S> {
        &self.inner
    }
}

impl ConfigurationUpdate {
    fn merge(&mut self, other: Self) {
        if other.src.is_some() {
            self.src = other.src;
        }
        if other.min_heading_level.is_some() {
            self.min_heading_level = other.min_heading_level;
        }
        if other.heading_link_mode.is_some() {
            self.heading_link_mode = other.heading_link_mode;
        }
    }
}

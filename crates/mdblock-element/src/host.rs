//! In-memory host node an element renders into.

use std::collections::BTreeMap;

use url::Url;

/// Source URL of remote markdown, resolved against the document URL.
pub const SRC_ATTR: &str = "src";
/// Minimum heading level.
pub const HMIN_ATTR: &str = "hmin";
/// Heading link decoration.
pub const HLINKS_ATTR: &str = "hlinks";
/// Sanitize output; read once, on first attach.
pub const UNTRUSTED_ATTR: &str = "untrusted";
/// Set after every successful render.
pub const RENDERED_ATTR: &str = "rendered";

/// A host node: inner markup, attributes and the document it lives in.
///
/// # Example
///
/// ```
/// use mdblock_element::HostElement;
/// use url::Url;
///
/// let host = HostElement::new(Url::parse("https://example.com/docs/").unwrap())
///     .with_inner_html("# Hello")
///     .with_attribute("hmin", "2");
/// assert_eq!(host.attribute("hmin"), Some("2"));
/// assert!(!host.is_connected());
/// ```
#[derive(Clone, Debug)]
pub struct HostElement {
    inner_html: String,
    attributes: BTreeMap<String, String>,
    base_url: Url,
    connected: bool,
}

impl HostElement {
    /// Create an empty, detached host in the document at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            inner_html: String::new(),
            attributes: BTreeMap::new(),
            base_url,
            connected: false,
        }
    }

    #[must_use]
    pub fn with_inner_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = html.into();
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    pub fn set_inner_html(&mut self, html: String) {
        self.inner_html = html;
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Set an attribute, returning the previous value.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Option<String> {
        self.attributes.insert(name.to_owned(), value.to_owned())
    }

    /// Remove an attribute, returning the previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// Document URL relative `src` values resolve against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

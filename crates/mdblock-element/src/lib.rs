//! Reactive markdown elements.
//!
//! An element owns a [`HostElement`] and re-renders its markdown into the
//! host whenever content or configuration changes:
//!
//! 1. capture the host's inner markup (or use assigned/fetched text)
//! 2. normalize indentation
//! 3. parse with the element's [`Variant`] (entry point + rule table)
//! 4. sanitize when the host is `untrusted`
//! 5. replace the host's output, set `rendered`, notify subscribers
//!
//! [`MarkdownSpanElement`] renders inline markdown. [`MarkdownBlockElement`]
//! renders documents and observes `src`, `hmin` and `hlinks`.
//! [`ElementRuntime`] drives a block element from a queue of events and runs
//! its fetches in the background.
//!
//! # Example
//!
//! ```
//! use mdblock_element::{HostElement, MarkdownBlockElement};
//! use url::Url;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let host = HostElement::new(Url::parse("https://example.com/").unwrap())
//!     .with_inner_html("\n    # Intro\n\n    Hello *world*\n")
//!     .with_attribute("hmin", "2");
//! let mut block = MarkdownBlockElement::new(host);
//! block.attach().await.render.unwrap();
//! assert_eq!(
//!     block.element().host().inner_html(),
//!     r#"<h2 id="intro">Intro</h2><p>Hello <em>world</em></p>"#
//! );
//! # });
//! ```

mod block;
mod content;
mod element;
mod error;
mod fetch;
mod host;
mod notify;
mod runtime;
mod sanitize;
mod span;

pub use block::{
    ConfigurationUpdate, FetchOutcome, FetchRequest, MarkdownBlockElement, UpdateOutcome,
};
pub use content::{ContentSource, normalize_indentation};
pub use element::{ElementState, MarkdownElement, ParseEntry, Variant};
pub use error::{ConfigurationError, FetchError, RenderError, RuntimeClosed, SanitizeError};
pub use fetch::{DEFAULT_BODY_LIMIT, FetchResponse, Fetcher, UreqFetcher};
pub use host::{HLINKS_ATTR, HMIN_ATTR, HostElement, RENDERED_ATTR, SRC_ATTR, UNTRUSTED_ATTR};
pub use notify::RenderComplete;
pub use runtime::{ElementEvent, ElementRuntime, RuntimeHandle};
pub use sanitize::{AmmoniaSanitizer, Sanitizer};
pub use span::MarkdownSpanElement;

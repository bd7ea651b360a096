//! Render configuration read by the rendering rules.

use std::num::NonZeroU32;

/// Deepest heading level HTML can express.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Provenance of the markdown text.
///
/// The same byte sequence inside code must be escaped differently depending
/// on where it came from, see [`escape_code_for_origin`](crate::escape_code_for_origin).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Origin {
    /// Captured from the host element's own markup (already HTML-decoded once).
    #[default]
    Local,
    /// Raw text fetched from a URL or assigned programmatically.
    Remote,
}

/// How rendered headings are decorated with anchor links.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HeadingLinkMode {
    /// Plain headings.
    #[default]
    None,
    /// The whole heading text links to its own anchor.
    SelfLink,
    /// A linked symbol precedes the heading text.
    PrefixSymbol(String),
}

impl HeadingLinkMode {
    /// Interpret the `hlinks` attribute value.
    ///
    /// Absent means no links, an empty value means self links, and anything
    /// else is used as the prefix symbol.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdblock_renderer::HeadingLinkMode;
    ///
    /// assert_eq!(HeadingLinkMode::from_attribute(None), HeadingLinkMode::None);
    /// assert_eq!(HeadingLinkMode::from_attribute(Some("")), HeadingLinkMode::SelfLink);
    /// assert_eq!(
    ///     HeadingLinkMode::from_attribute(Some("§")),
    ///     HeadingLinkMode::PrefixSymbol("§".to_owned())
    /// );
    /// ```
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            None => Self::None,
            Some("") => Self::SelfLink,
            Some(symbol) => Self::PrefixSymbol(symbol.to_owned()),
        }
    }

    /// The attribute value that produces this mode.
    #[must_use]
    pub fn as_attribute(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::SelfLink => Some(""),
            Self::PrefixSymbol(symbol) => Some(symbol),
        }
    }
}

/// Options an element renders with.
///
/// `untrusted` can only be set through [`with_untrusted`](Self::with_untrusted);
/// elements fix it once at attach time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderConfiguration {
    min_heading_level: NonZeroU32,
    heading_link_mode: HeadingLinkMode,
    untrusted: bool,
}

impl Default for RenderConfiguration {
    fn default() -> Self {
        Self {
            min_heading_level: NonZeroU32::MIN,
            heading_link_mode: HeadingLinkMode::None,
            untrusted: false,
        }
    }
}

impl RenderConfiguration {
    /// Create the default configuration (`hmin = 1`, no heading links, trusted).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_min_heading_level(mut self, level: NonZeroU32) -> Self {
        self.min_heading_level = level;
        self
    }

    #[must_use]
    pub fn with_heading_link_mode(mut self, mode: HeadingLinkMode) -> Self {
        self.heading_link_mode = mode;
        self
    }

    #[must_use]
    pub fn with_untrusted(mut self, untrusted: bool) -> Self {
        self.untrusted = untrusted;
        self
    }

    pub fn min_heading_level(&self) -> NonZeroU32 {
        self.min_heading_level
    }

    pub fn heading_link_mode(&self) -> &HeadingLinkMode {
        &self.heading_link_mode
    }

    /// Whether rendered output must be sanitized.
    pub fn untrusted(&self) -> bool {
        self.untrusted
    }

    /// Update the minimum heading level. Returns `true` if it changed.
    pub fn set_min_heading_level(&mut self, level: NonZeroU32) -> bool {
        let changed = self.min_heading_level != level;
        self.min_heading_level = level;
        changed
    }

    /// Update the heading link mode. Returns `true` if it changed.
    pub fn set_heading_link_mode(&mut self, mode: HeadingLinkMode) -> bool {
        let changed = self.heading_link_mode != mode;
        self.heading_link_mode = mode;
        changed
    }

    /// Output level for a heading parsed at `level`: `min(6, level + hmin - 1)`.
    pub fn effective_heading_level(&self, level: u8) -> u8 {
        let shifted = u32::from(level).saturating_add(self.min_heading_level.get() - 1);
        let capped = shifted.min(u32::from(MAX_HEADING_LEVEL));
        u8::try_from(capped).unwrap_or(MAX_HEADING_LEVEL)
    }
}

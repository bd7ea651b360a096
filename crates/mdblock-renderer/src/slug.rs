//! Heading slugs, unique within one render pass.

use std::collections::HashMap;

/// Slug used when heading text has no alphanumeric characters.
const FALLBACK_SLUG: &str = "heading";

/// Produces unique, URL-safe anchor ids for headings.
///
/// A fresh slugger is created for every parse, so ids are unique per render
/// and restart on the next one.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug `text`, disambiguating repeats with `-1`, `-2`, ...
    ///
    /// # Examples
    ///
    /// ```
    /// use mdblock_renderer::Slugger;
    ///
    /// let mut slugger = Slugger::new();
    /// assert_eq!(slugger.slug("FAQ"), "faq");
    /// assert_eq!(slugger.slug("FAQ"), "faq-1");
    /// ```
    pub fn slug(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            FALLBACK_SLUG.clone_into(&mut base);
        }

        let mut slug = base.clone();
        if let Some(&count) = self.seen.get(&base) {
            let mut count = count;
            loop {
                count += 1;
                slug = format!("{base}-{count}");
                if !self.seen.contains_key(&slug) {
                    break;
                }
            }
            self.seen.insert(base, count);
        }
        self.seen.insert(slug.clone(), 0);
        slug
    }
}

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single dashes,
/// and removes other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

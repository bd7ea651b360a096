//! Shared helpers for the HTML writer.

use pulldown_cmark::{CodeBlockKind, HeadingLevel};

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Language of a code block: the first word of a fence info string.
///
/// Indented blocks and empty info strings have no language.
pub(crate) fn code_block_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_owned),
        CodeBlockKind::Indented => None,
    }
}

#[cfg(test)]
mod tests {
    use pulldown_cmark::CowStr;

    use super::*;

    fn fenced(info: &str) -> CodeBlockKind<'_> {
        CodeBlockKind::Fenced(CowStr::Borrowed(info))
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading_level_to_num(HeadingLevel::H1), 1);
        assert_eq!(heading_level_to_num(HeadingLevel::H6), 6);
    }

    #[test]
    fn test_language_only() {
        assert_eq!(code_block_language(&fenced("rust")).as_deref(), Some("rust"));
    }

    #[test]
    fn test_language_with_attributes() {
        assert_eq!(
            code_block_language(&fenced("js title=app.js")).as_deref(),
            Some("js")
        );
    }

    #[test]
    fn test_empty_info() {
        assert_eq!(code_block_language(&fenced("   ")), None);
        assert_eq!(code_block_language(&CodeBlockKind::Indented), None);
    }
}

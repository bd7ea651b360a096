//! HTML escaping and the origin-dependent code escaping policy.

use std::borrow::Cow;

use crate::options::Origin;

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Adjust engine-escaped code text for where the markdown came from.
///
/// `code` is code span or code block content as handed to a rule, i.e.
/// already passed through [`escape_html`] by the engine.
///
/// - [`Origin::Local`]: the host markup had to encode `<` and `>` as
///   `&lt;`/`&gt;`, and the engine escaped those ampersands again. Every
///   `&amp;` directly followed by `lt;` or `gt;` is turned back into `&`.
/// - [`Origin::Remote`]: the text is raw. Any `<` left unescaped is
///   escaped so it shows as text instead of opening a tag.
///
/// # Examples
///
/// ```
/// use mdblock_renderer::{Origin, escape_code_for_origin};
///
/// assert_eq!(escape_code_for_origin("&amp;lt;b&amp;gt;", Origin::Local), "&lt;b&gt;");
/// assert_eq!(escape_code_for_origin("a <b>", Origin::Remote), "a &lt;b>");
/// ```
#[must_use]
pub fn escape_code_for_origin(code: &str, origin: Origin) -> Cow<'_, str> {
    match origin {
        Origin::Local => {
            if code.contains("&amp;") {
                Cow::Owned(code.replace("&amp;lt;", "&lt;").replace("&amp;gt;", "&gt;"))
            } else {
                Cow::Borrowed(code)
            }
        }
        Origin::Remote => {
            if code.contains('<') {
                Cow::Owned(code.replace('<', "&lt;"))
            } else {
                Cow::Borrowed(code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_local_unescapes_double_encoded_brackets() {
        let engine_output = escape_html("&lt;div&gt;");
        assert_eq!(engine_output, "&amp;lt;div&amp;gt;");
        assert_eq!(
            escape_code_for_origin(&engine_output, Origin::Local),
            "&lt;div&gt;"
        );
    }

    #[test]
    fn test_local_keeps_other_ampersands_escaped() {
        let engine_output = escape_html("a && b &amp; c");
        assert_eq!(
            escape_code_for_origin(&engine_output, Origin::Local),
            "a &amp;&amp; b &amp;amp; c"
        );
    }

    #[test]
    fn test_local_only_touches_lt_and_gt() {
        assert_eq!(
            escape_code_for_origin("&amp;quot;&amp;lt;", Origin::Local),
            "&amp;quot;&lt;"
        );
    }

    #[test]
    fn test_remote_escapes_raw_angle_brackets() {
        assert_eq!(
            escape_code_for_origin("<b>bold</b>", Origin::Remote),
            "&lt;b>bold&lt;/b>"
        );
    }

    #[test]
    fn test_remote_leaves_engine_escaped_text_alone() {
        let engine_output = escape_html("<b>");
        assert_eq!(
            escape_code_for_origin(&engine_output, Origin::Remote),
            "&lt;b&gt;"
        );
    }

    #[test]
    fn test_borrowed_when_nothing_to_do() {
        assert!(matches!(
            escape_code_for_origin("plain", Origin::Local),
            Cow::Borrowed(_)
        ));
        assert!(matches!(
            escape_code_for_origin("plain", Origin::Remote),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_same_bytes_escape_differently_by_origin() {
        let code = escape_html("&lt;");
        assert_eq!(escape_code_for_origin(&code, Origin::Local), "&lt;");
        assert_eq!(escape_code_for_origin(&code, Origin::Remote), "&amp;lt;");
    }
}

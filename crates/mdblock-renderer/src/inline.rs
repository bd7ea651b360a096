//! Inline-only parsing support.
//!
//! pulldown-cmark always parses block structure. For inline parsing each line
//! has its leading indentation removed and any block marker at its start
//! backslash-escaped, so the parser sees nothing but paragraphs.
//!
//! Lines that continue an open code span are joined to the previous line
//! with a space (the line ending a code span renders as anyway), so their
//! text reaches the code span untouched.

use std::borrow::Cow;

/// Prefixed to lines opening with `<` so they cannot start an HTML block.
/// The inline writer drops it from the start of text.
pub(crate) const LINE_GUARD: char = '\u{E000}';

/// Escape block-level markers at the start of every line.
///
/// # Examples
///
/// ```
/// use mdblock_renderer::protect_block_markers;
///
/// assert_eq!(protect_block_markers("# not a heading"), r"\# not a heading");
/// assert_eq!(protect_block_markers("1. one"), r"1\. one");
/// assert_eq!(protect_block_markers("*emphasis*"), "*emphasis*");
/// assert_eq!(protect_block_markers("`a\n# b`"), "`a # b`");
/// ```
#[must_use]
pub fn protect_block_markers(text: &str) -> Cow<'_, str> {
    let continued = code_span_continuations(text);
    let untouched = text
        .split('\n')
        .zip(&continued)
        .all(|(line, &cont)| !cont && !needs_protection(line));
    if untouched {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for (i, (line, &cont)) in text.split('\n').zip(&continued).enumerate() {
        if cont {
            out.push(' ');
            out.push_str(line);
            continue;
        }
        if i > 0 {
            out.push('\n');
        }
        protect_line(line, &mut out);
    }
    Cow::Owned(out)
}

fn needs_protection(line: &str) -> bool {
    line.starts_with([' ', '\t', '<']) || marker_position(line).is_some()
}

fn protect_line(line: &str, out: &mut String) {
    let line = line.trim_start_matches([' ', '\t']);
    if line.starts_with('<') {
        out.push(LINE_GUARD);
        out.push_str(line);
        return;
    }
    match marker_position(line) {
        Some(pos) => {
            out.push_str(&line[..pos]);
            out.push('\\');
            out.push_str(&line[pos..]);
        }
        None => out.push_str(line),
    }
}

/// For each line, whether it starts inside a code span opened on an earlier line.
fn code_span_continuations(text: &str) -> Vec<bool> {
    let bytes = text.as_bytes();
    let mut continued = vec![false];
    let mut open: Option<usize> = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                continued.push(open.is_some());
                i += 1;
            }
            b'\\' if open.is_none() && bytes.get(i + 1).is_some_and(|&b| b != b'\n') => i += 2,
            b'`' => {
                let run = backtick_run(&bytes[i..]);
                open = match open {
                    Some(n) if n == run => None,
                    None if closes_later(&text[i + run..], run) => Some(run),
                    other => other,
                };
                i += run;
            }
            _ => i += 1,
        }
    }
    continued
}

/// Whether a backtick run of exactly `run` follows before the paragraph ends.
fn closes_later(rest: &str, run: usize) -> bool {
    for (i, line) in rest.split('\n').enumerate() {
        if i > 0 && line.trim().is_empty() {
            return false;
        }
        let bytes = line.as_bytes();
        let mut j = 0;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let n = backtick_run(&bytes[j..]);
                if n == run {
                    return true;
                }
                j += n;
            } else {
                j += 1;
            }
        }
    }
    false
}

fn backtick_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&b| b == b'`').count()
}

/// Byte offset where a backslash must be inserted, if `line` opens a block.
fn marker_position(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let first = *bytes.first()?;

    match first {
        b'#' | b'>' | b'=' | b'|' => Some(0),
        b'-' | b'+' | b'*' | b'_' => {
            let rest = &line[1..];
            let list_marker = first != b'_' && (rest.is_empty() || rest.starts_with([' ', '\t']));
            if list_marker || is_thematic_break(line) || is_setext_underline(line) {
                Some(0)
            } else {
                None
            }
        }
        b'`' => {
            // A backtick fence's info string cannot contain backticks
            let run = backtick_run(bytes);
            (run >= 3 && !line[run..].contains('`')).then_some(0)
        }
        b'~' => {
            let run = bytes.iter().take_while(|&&b| b == b'~').count();
            (run >= 3).then_some(0)
        }
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            match bytes.get(digits) {
                Some(b'.' | b')') => {
                    let after = &line[digits + 1..];
                    (digits <= 9 && (after.is_empty() || after.starts_with([' ', '\t'])))
                        .then_some(digits)
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// Three or more of the same `-`, `*` or `_`, optionally separated by spaces.
fn is_thematic_break(line: &str) -> bool {
    let mut marker = None;
    let mut count = 0;
    for c in line.chars() {
        match c {
            ' ' | '\t' => {}
            '-' | '*' | '_' if marker.is_none_or(|m| m == c) => {
                marker = Some(c);
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

/// A line of `-` (setext level 2) with optional trailing spaces.
fn is_setext_underline(line: &str) -> bool {
    let trimmed = line.trim_end();
    !trimmed.is_empty() && trimmed.bytes().all(|b| b == b'-')
}

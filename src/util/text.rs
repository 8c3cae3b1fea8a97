use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Terminal columns `s` occupies.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Fit `s` into `max_width` columns, ending with `…` when cut.
///
/// Wide characters are never split. Strings that already fit are returned
/// borrowed.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::with_capacity(s.len().min(max_width * 4));
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// Make API-provided text safe for a single table cell.
///
/// Escape sequences are dropped entirely, other control characters and line
/// breaks become spaces, and runs of whitespace collapse to one space.
pub fn clean_line(s: &str) -> Cow<'_, str> {
    let clean = !s.chars().any(|c| c.is_control())
        && !s.contains("  ")
        && s.trim().len() == s.len();
    if clean {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    let mut pending_space = false;
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            skip_escape(&mut chars);
            continue;
        }
        if c.is_control() || c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Consume the rest of a CSI (`ESC [ ... final`) or OSC (`ESC ] ... BEL|ST`)
/// sequence. A bare ESC consumes nothing more.
fn skip_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    match chars.peek() {
        Some('[') => {
            chars.next();
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
        }
        Some(']') => {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '\x07' {
                    break;
                }
                if c == '\x1b' && chars.peek() == Some(&'\\') {
                    chars.next();
                    break;
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fits_is_borrowed() {
        assert!(matches!(truncate_to_width("BBC News", 8), Cow::Borrowed("BBC News")));
    }

    #[test]
    fn test_truncates_with_ellipsis() {
        assert_eq!(truncate_to_width("Breaking headline", 9), "Breaking…");
        assert_eq!(truncate_to_width("abc", 0), "");
        assert_eq!(truncate_to_width("abc", 1), "…");
    }

    #[test]
    fn test_wide_chars_not_split() {
        // Each ideograph is two columns wide.
        assert_eq!(truncate_to_width("新闻报道", 6), "新闻…");
        assert_eq!(truncate_to_width("新闻报道", 5), "新闻…");
    }

    #[test]
    fn test_clean_line_passthrough() {
        assert!(matches!(clean_line("Plain title"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_clean_line_collapses_whitespace() {
        assert_eq!(clean_line("  Line one\n\nline\ttwo  "), "Line one line two");
    }

    #[test]
    fn test_clean_line_strips_escapes() {
        assert_eq!(clean_line("\x1b[31mRed\x1b[0m title"), "Red title");
        assert_eq!(clean_line("\x1b]0;pwned\x07Title"), "Title");
        assert_eq!(clean_line("\x1b]8;;http://x\x1b\\Link"), "Link");
        assert_eq!(clean_line("bell\x07here"), "bell here");
    }

    proptest! {
        #[test]
        fn prop_truncate_respects_width(s in "\\PC{0,40}", width in 0usize..30) {
            let out = truncate_to_width(&s, width);
            prop_assert!(display_width(&out) <= width);
        }

        #[test]
        fn prop_clean_line_has_no_controls(s in any::<String>()) {
            let out = clean_line(&s);
            prop_assert!(!out.chars().any(|c| c.is_control()));
        }
    }
}

/// Check whether a character survives scraping cleanup
///
/// Control characters and invisible formatting characters (zero-width spaces,
/// bidi overrides, byte order marks) are dropped; everything else, including
/// non-ASCII letters, is kept.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() {
        return false;
    }
    !matches!(c,
        '\u{00AD}'
        | '\u{200B}'..='\u{200F}'
        | '\u{202A}'..='\u{202E}'
        | '\u{2060}'..='\u{2064}'
        | '\u{FEFF}')
}

/// Remove non-printable characters from scraped text and trim the result
///
/// Tabs and line breaks become spaces so words split across lines stay apart.
///
/// # Example
/// ```
/// use lastfmbot::helpers::sanitize::printable;
/// assert_eq!(printable("  Bj\u{200B}örk\n"), "Björk");
/// ```
pub fn printable(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_whitespace() && c.is_control() { ' ' } else { c })
        .filter(|c| is_printable(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Safely truncate a UTF-8 string to a maximum number of characters
///
/// Truncation happens at character boundaries, not byte boundaries.
pub fn safe_truncate(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &input[..byte_index],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_strips_control_characters() {
        assert_eq!(printable("Daft\tPunk\r\n"), "Daft Punk");
        assert_eq!(printable("\u{0007}Bell"), "Bell");
        assert_eq!(printable(""), "");
    }

    #[test]
    fn test_printable_line_breaks_separate_words() {
        assert_eq!(printable("Massive\nAttack"), "Massive Attack");
        assert_eq!(printable("\n   Teardrop\r\n"), "Teardrop");
    }

    #[test]
    fn test_printable_strips_invisible_formatting() {
        assert_eq!(printable("\u{FEFF}Sigur R\u{00F3}s\u{200E}"), "Sigur Rós");
        assert_eq!(printable("\u{202E}evil"), "evil");
    }

    #[test]
    fn test_printable_keeps_inner_spaces() {
        assert_eq!(printable("   The  National  "), "The  National");
    }

    #[test]
    fn test_safe_truncate_utf8() {
        let input = "Hello, 世界!";
        assert_eq!(safe_truncate(input, 8), "Hello, 世");
        assert_eq!(safe_truncate(input, 7), "Hello, ");
        assert_eq!(safe_truncate(input, 15), "Hello, 世界!");
        assert_eq!(safe_truncate("", 0), "");
    }
}

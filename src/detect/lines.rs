//! Best-effort line attribution.
//!
//! Detectors report the first line that contains a related substring. This
//! is a heuristic: when the substring also appears earlier for an unrelated
//! reason, the earlier line wins.

use regex::Regex;

/// 1-based number of the first line containing `needle`.
pub fn find_line(code: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    code.lines()
        .position(|line| line.contains(needle))
        .map(|idx| idx + 1)
}

/// Like [`find_line`], ignoring ASCII case.
pub fn find_line_ignore_case(code: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let needle = needle.to_lowercase();
    code.lines()
        .position(|line| line.to_lowercase().contains(&needle))
        .map(|idx| idx + 1)
}

/// 1-based number of the first line matching `pattern`.
pub fn find_line_matching(code: &str, pattern: &Regex) -> Option<usize> {
    code.lines()
        .position(|line| pattern.is_match(line))
        .map(|idx| idx + 1)
}

/// First line among several candidates, tried in order.
pub fn find_first_of(code: &str, needles: &[&str]) -> Option<usize> {
    needles.iter().find_map(|n| find_line(code, n))
}

/// Check whether `word` occurs in `text` as a standalone identifier.
///
/// Identifier characters are ASCII alphanumerics, `_` and `$`, so
/// `ButtonBuilder` does not match inside `LinkButtonBuilder`.
pub fn contains_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(pos) = text[start..].find(word) {
        let begin = start + pos;
        let end = begin + word.len();
        let before_ok = begin == 0 || !is_ident_byte(bytes[begin - 1]);
        let after_ok = end == bytes.len() || !is_ident_byte(bytes[end]);
        if before_ok && after_ok {
            return true;
        }
        start = begin + 1;
        while !text.is_char_boundary(start) {
            start += 1;
        }
    }
    false
}

/// 1-based number of the first line containing `word` as a standalone identifier.
pub fn find_word_line(code: &str, word: &str) -> Option<usize> {
    code.lines()
        .position(|line| contains_word(line, word))
        .map(|idx| idx + 1)
}

/// Check whether any line within `radius` lines of `line` (1-based) contains `needle`.
pub fn window_contains(code: &str, line: usize, radius: usize, needle: &str) -> bool {
    if line == 0 {
        return false;
    }
    let idx = line - 1;
    let from = idx.saturating_sub(radius);
    code.lines()
        .enumerate()
        .skip(from)
        .take_while(|(i, _)| *i <= idx + radius)
        .any(|(_, l)| l.contains(needle))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODE: &str = "const a = 1;\nconst client = new Client({});\nclient.login(token);\n";

    #[test]
    fn test_find_line() {
        assert_eq!(find_line(CODE, "new Client"), Some(2));
        assert_eq!(find_line(CODE, "login"), Some(3));
        assert_eq!(find_line(CODE, "missing"), None);
        assert_eq!(find_line(CODE, ""), None);
        assert_eq!(find_line("", "x"), None);
    }

    #[test]
    fn test_find_line_ignore_case() {
        assert_eq!(find_line_ignore_case(CODE, "NEW CLIENT"), Some(2));
    }

    #[test]
    fn test_first_match_wins_even_if_unrelated() {
        let code = "// uses new Client later\nconst c = new Client({});";
        assert_eq!(find_line(code, "new Client"), Some(1));
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("new ButtonBuilder()", "ButtonBuilder"));
        assert!(!contains_word("new ButtonBuilderX()", "ButtonBuilder"));
        assert!(!contains_word("LinkButtonBuilder", "ButtonBuilder"));
        assert!(contains_word("a LinkButtonBuilder ButtonBuilder", "ButtonBuilder"));
        assert!(!contains_word("anything", ""));
    }

    #[test]
    fn test_contains_word_with_multibyte_text() {
        assert!(contains_word("é ButtonBuilder", "ButtonBuilder"));
        assert!(!contains_word("éButtonBuilderé", "Builderz"));
    }

    #[test]
    fn test_window_contains() {
        let code = (1..=30)
            .map(|i| if i == 20 { "row.addComponents(x)".to_string() } else { format!("line {}", i) })
            .collect::<Vec<_>>()
            .join("\n");

        assert!(window_contains(&code, 10, 10, "addComponents("));
        assert!(!window_contains(&code, 9, 10, "addComponents("));
        assert!(window_contains(&code, 30, 10, "addComponents("));
        assert!(!window_contains(&code, 0, 10, "addComponents("));
    }
}

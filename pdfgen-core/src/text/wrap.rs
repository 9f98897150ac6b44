/// Split text into alternating runs of whitespace and non-whitespace.
///
/// Concatenating the runs gives back the input.
pub fn split_into_words(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut prev_space: Option<bool> = None;

    for (i, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        if prev_space.is_some_and(|prev| prev != is_space) {
            runs.push(&text[start..i]);
            start = i;
        }
        prev_space = Some(is_space);
    }

    if start < text.len() {
        runs.push(&text[start..]);
    }
    runs
}

/// Greedy word wrap.
///
/// Breaks at whitespace where possible; a word wider than `max_width` is
/// broken between characters. Trailing whitespace is dropped from every line
/// and leading whitespace from continuation lines. Blank input yields no
/// lines; anything else yields at least one.
pub fn wrap_text<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    if text.trim().is_empty() {
        return lines;
    }

    let mut current = String::new();
    for run in split_into_words(text) {
        let is_space = run.starts_with(char::is_whitespace);
        if is_space && current.is_empty() && !lines.is_empty() {
            continue;
        }

        let candidate = format!("{current}{run}");
        if measure(&candidate) <= max_width {
            current = candidate;
            continue;
        }

        if is_space {
            if !current.trim().is_empty() {
                lines.push(current.trim_end().to_string());
            }
            current.clear();
            continue;
        }

        if !current.trim().is_empty() {
            lines.push(current.trim_end().to_string());
        }
        current.clear();

        if measure(run) <= max_width {
            current.push_str(run);
            continue;
        }

        for ch in run.chars() {
            let mut candidate = current.clone();
            candidate.push(ch);
            if !current.is_empty() && measure(&candidate) > max_width {
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            } else {
                current = candidate;
            }
        }
    }

    if !current.trim().is_empty() {
        lines.push(current.trim_end().to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Every character is 10 units wide.
    fn mono(text: &str) -> f64 {
        text.chars().count() as f64 * 10.0
    }

    #[test]
    fn test_split_into_words() {
        assert_eq!(split_into_words("Hello  world"), vec!["Hello", "  ", "world"]);
        assert_eq!(split_into_words("  lead"), vec!["  ", "lead"]);
        assert_eq!(split_into_words("tail\t"), vec!["tail", "\t"]);
        assert!(split_into_words("").is_empty());
    }

    #[test]
    fn test_split_round_trip() {
        let text = " a  bb\tccc d ";
        assert_eq!(split_into_words(text).concat(), text);
    }

    #[test]
    fn test_short_line_is_unchanged() {
        assert_eq!(wrap_text("Line1", 100.0, mono), vec!["Line1"]);
    }

    #[test]
    fn test_blank_line_has_no_sub_lines() {
        assert!(wrap_text("", 100.0, mono).is_empty());
        assert!(wrap_text("   ", 100.0, mono).is_empty());
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        // 10 chars per line
        let lines = wrap_text("the quick brown fox jumps", 100.0, mono);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_exact_fit() {
        assert_eq!(wrap_text("abcde fghi", 100.0, mono), vec!["abcde fghi"]);
    }

    #[test]
    fn test_long_word_breaks_by_character() {
        let lines = wrap_text("abcdefghijklmnopqrstuvwxy", 100.0, mono);
        assert_eq!(lines, vec!["abcdefghij", "klmnopqrst", "uvwxy"]);
    }

    #[test]
    fn test_text_without_spaces_breaks_by_character() {
        let lines = wrap_text("機密文件機密文件機密文件", 40.0, mono);
        assert_eq!(lines, vec!["機密文件", "機密文件", "機密文件"]);
    }

    #[test]
    fn test_long_word_after_short_word() {
        let lines = wrap_text("ab cdefghijklmn", 100.0, mono);
        assert_eq!(lines, vec!["ab", "cdefghijkl", "mn"]);
    }

    #[test]
    fn test_leading_indent_kept_on_first_line() {
        assert_eq!(wrap_text("  indented", 200.0, mono), vec!["  indented"]);
    }

    #[test]
    fn test_no_line_exceeds_width() {
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do";
        for line in wrap_text(text, 120.0, mono) {
            assert!(mono(&line) <= 120.0, "{line:?} too wide");
        }
    }
}

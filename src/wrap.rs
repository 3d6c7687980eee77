//! Plain-text wrapping.
//!
//! Three generations of the same layout contract live behind one entry
//! point, selected by [`WrapMode`]. The overall behavior mimics
//! mainstream label controls: a line never starts with whitespace
//! unless it follows a hard break or is the very first line, trailing
//! whitespace before a wrap point stays in the current line's range,
//! and explicit newlines flush unconditionally.
//!
//! Errors here are lenient: a glyph the font cannot measure is logged
//! and treated as zero width. The styled pipeline in [`crate::pipeline`]
//! takes the opposite, fail-fast stance.

use serde::{Deserialize, Serialize};

use crate::{
    font::Font,
    line::TextLine,
    linebreak::BreakCursor,
    width::{measure_str, metrics_or_zero, CharacterMetrics, WidthAccum},
};

/// Selects the line-breaking algorithm.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapMode {
    /// Fixed-width splitting at character boundaries, with no word
    /// awareness at all.
    Characters,
    /// Greedy word-based wrap: breaks at the last completed word
    /// boundary, flushes on explicit newlines, and falls back to
    /// per-character splitting for a single word wider than the
    /// maximum width.
    Words,
    /// Wrap driven by UAX #14 break opportunities instead of word
    /// scanning. Mandatory breaks get no special treatment in this
    /// mode; use the styled pipeline when hard breaks must force a
    /// flush.
    BreakCursor,
}

impl Default for WrapMode {
    fn default() -> Self {
        WrapMode::Words
    }
}

/// Settings for [`wrap`].
#[derive(Clone, Debug)]
pub struct WrapOptions {
    /// Maximum line advance in pixels. A line may exceed this only when
    /// it holds a single unsplittable character.
    pub max_width: i32,
    /// Extra advance applied to every character.
    pub tracking: i32,
    /// Wrapping stops once this many lines have been produced.
    pub max_lines: usize,
    pub mode: WrapMode,
}

impl WrapOptions {
    pub fn new(max_width: i32) -> Self {
        Self {
            max_width,
            tracking: 0,
            max_lines: 256,
            mode: WrapMode::default(),
        }
    }

    pub fn tracking(mut self, tracking: i32) -> Self {
        self.tracking = tracking;
        self
    }

    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    pub fn mode(mut self, mode: WrapMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Splits `text` into lines whose advance fits `options.max_width`.
///
/// The returned lines' untrimmed ranges partition the input text;
/// display trimming is available on each [`TextLine`].
pub fn wrap<'a>(font: &dyn Font, text: &'a str, options: &WrapOptions) -> Vec<TextLine<'a>> {
    if text.is_empty() {
        return Vec::new();
    }
    match options.mode {
        WrapMode::Characters => wrap_characters(font, text, options),
        WrapMode::Words => wrap_words(font, text, options),
        WrapMode::BreakCursor => wrap_breaks(font, text, options),
    }
}

fn wrap_characters<'a>(
    font: &dyn Font,
    text: &'a str,
    options: &WrapOptions,
) -> Vec<TextLine<'a>> {
    let height = font.height();
    let mut lines = Vec::new();
    let mut accum = WidthAccum::new();
    let mut line_start = 0;

    for (i, c) in text.char_indices() {
        let metrics = metrics_or_zero(font, c);
        let advance = metrics.advance + options.tracking;
        if accum.width() + advance > options.max_width && !accum.is_empty() {
            lines.push(TextLine::new(text, line_start..i, height, accum.take()));
            if lines.len() >= options.max_lines {
                return lines;
            }
            line_start = i;
        }
        accum.push(
            c.is_whitespace(),
            CharacterMetrics {
                width: metrics.frame.x,
                advance,
            },
            advance,
        );
    }
    if !accum.is_empty() {
        lines.push(TextLine::new(
            text,
            line_start..text.len(),
            height,
            accum.finish(),
        ));
    }
    lines
}

fn wrap_words<'a>(font: &dyn Font, text: &'a str, options: &WrapOptions) -> Vec<TextLine<'a>> {
    let height = font.height();
    let mut lines = Vec::new();

    // `line` covers [line_start..word_start): completed words plus the
    // whitespace run after the last one. `word` covers the partial word
    // from word_start onward.
    let mut line = WidthAccum::new();
    let mut word = WidthAccum::new();
    let mut line_start = 0;
    let mut word_start = 0;
    let mut has_word = false;

    for (i, c) in text.char_indices() {
        let metrics = metrics_or_zero(font, c);
        let advance = metrics.advance + options.tracking;
        let char_metrics = CharacterMetrics {
            width: metrics.frame.x,
            advance,
        };

        if c == '\n' {
            // Hard flush regardless of fit. The newline itself stays in
            // the flushed range as trailing whitespace.
            line.absorb(std::mem::take(&mut word));
            line.push(true, char_metrics, advance);
            let end = i + c.len_utf8();
            lines.push(TextLine::new(text, line_start..end, height, line.take()));
            if lines.len() >= options.max_lines {
                return lines;
            }
            line_start = end;
            word_start = end;
            has_word = false;
            continue;
        }

        if c.is_whitespace() {
            if !word.is_empty() {
                line.absorb(std::mem::take(&mut word));
                has_word = true;
            }
            line.push(true, char_metrics, advance);
            word_start = i + c.len_utf8();
            continue;
        }

        if line.width() + word.width() + advance > options.max_width {
            if has_word {
                // Break at the last completed word boundary. The
                // whitespace run after it stays in this line's range.
                lines.push(TextLine::new(
                    text,
                    line_start..word_start,
                    height,
                    line.take(),
                ));
                if lines.len() >= options.max_lines {
                    return lines;
                }
                line_start = word_start;
                has_word = false;
            } else if i > line_start {
                // No completed word to go back to: split inside the
                // word at the character granularity.
                line.absorb(std::mem::take(&mut word));
                lines.push(TextLine::new(text, line_start..i, height, line.take()));
                if lines.len() >= options.max_lines {
                    return lines;
                }
                line_start = i;
                word_start = i;
            }
            // A single character wider than the maximum width is kept
            // on its own line.
        }
        word.push(false, char_metrics, advance);
    }

    line.absorb(word);
    if !line.is_empty() {
        lines.push(TextLine::new(
            text,
            line_start..text.len(),
            height,
            line.finish(),
        ));
    }
    lines
}

fn wrap_breaks<'a>(font: &dyn Font, text: &'a str, options: &WrapOptions) -> Vec<TextLine<'a>> {
    let height = font.height();
    let mut result = Vec::new();
    let mut cursor = BreakCursor::new(text);
    let mut previous = cursor.first();
    let mut last_line: Option<TextLine<'a>> = None;

    // Mandatory breaks are not handled specially here; see `WrapMode`.
    while let Some(next) = cursor.next() {
        let info = measure_str(font, &text[previous..next], options.tracking);
        last_line = Some(match last_line.take() {
            Some(line) => {
                if line.width() + info.width > options.max_width {
                    result.push(line);
                    if result.len() >= options.max_lines {
                        return result;
                    }
                    TextLine::new(text, previous..next, height, info)
                } else {
                    line.append(next, &info)
                }
            }
            None => TextLine::new(text, previous..next, height, info),
        });
        previous = next;
    }
    if let Some(line) = last_line {
        result.push(line);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_util::FixedFont;

    fn words(text: &str, max_width: i32) -> Vec<TextLine<'_>> {
        wrap(&FixedFont::new(), text, &WrapOptions::new(max_width))
    }

    fn texts<'a>(lines: &[TextLine<'a>]) -> Vec<&'a str> {
        lines.iter().map(|l| l.trimmed_text()).collect()
    }

    #[test]
    fn empty_input_yields_no_lines() {
        for mode in [WrapMode::Characters, WrapMode::Words, WrapMode::BreakCursor] {
            let lines = wrap(&FixedFont::new(), "", &WrapOptions::new(100).mode(mode));
            assert!(lines.is_empty());
        }
    }

    #[test]
    fn word_priority_over_character_split() {
        // "aaa " fits (40 <= 45), "aaa b" does not.
        let lines = words("aaa bbb", 45);
        assert_eq!(texts(&lines), vec!["aaa", "bbb"]);
    }

    #[test]
    fn hard_break_forces_flush() {
        let lines = words("ab\ncd", 1000);
        assert_eq!(texts(&lines), vec!["ab", "cd"]);
    }

    #[test]
    fn consecutive_newlines_produce_blank_lines() {
        let lines = words("a\n\nb", 1000);
        assert_eq!(texts(&lines), vec!["a", "", "b"]);
    }

    #[test]
    fn oversized_word_splits_by_character() {
        let lines = words("abcdefgh", 30);
        assert_eq!(texts(&lines), vec!["abc", "def", "gh"]);
        for line in &lines {
            assert!(line.width() <= 30);
        }
    }

    #[test]
    fn oversized_word_after_fitting_word() {
        let lines = words("ab cdefgh", 40);
        assert_eq!(texts(&lines), vec!["ab", "cdef", "gh"]);
    }

    #[test]
    fn single_character_wider_than_max_is_kept() {
        let lines = words("ab", 5);
        assert_eq!(texts(&lines), vec!["a", "b"]);
    }

    #[test]
    fn lines_cover_the_input_exactly() {
        let inputs = [
            "the quick brown fox jumps over the lazy dog",
            "  leading spaces",
            "trailing spaces   ",
            "multi\nline\ntext with words",
            "wordslongerthanthemaximumwidth every so often",
        ];
        for input in inputs {
            for max_width in [25, 40, 90, 10_000] {
                let lines = words(input, max_width);
                let joined: String = lines.iter().map(|l| l.text()).collect();
                assert_eq!(joined, input, "max_width={}", max_width);
            }
        }
    }

    #[test]
    fn random_text_coverage() {
        fastrand::seed(0x5eed);
        for _ in 0..200 {
            let len = fastrand::usize(0..60);
            let text: String = (0..len)
                .map(|_| match fastrand::u8(0..10) {
                    0 => ' ',
                    1 => '\n',
                    2 => 'é',
                    _ => fastrand::alphanumeric(),
                })
                .collect();
            let max_width = fastrand::i32(10..200);
            let lines = words(&text, max_width);
            let joined: String = lines.iter().map(|l| l.text()).collect();
            assert_eq!(joined, text);
        }
    }

    #[test]
    fn no_line_starts_with_whitespace_after_soft_wrap() {
        let lines = words("one two three four five six seven", 45);
        assert!(lines.len() > 1);
        for line in &lines[1..] {
            assert!(!line.text().starts_with(char::is_whitespace));
        }
    }

    #[test]
    fn trimmed_lines_never_end_in_whitespace() {
        for text in ["one two  three\nfour  ", "a\n\nb", "  \n"] {
            for line in words(text, 60) {
                assert!(!line.text_trimming_end_space().ends_with(char::is_whitespace));
                assert!(!line.trimmed_text().starts_with(char::is_whitespace));
            }
        }
    }

    #[test]
    fn blank_lines_end_trim_to_nothing() {
        let lines = words("a\n\nb", 1000);
        assert_eq!(lines[1].text(), "\n");
        assert_eq!(lines[1].text_trimming_end_space(), "");
        assert_eq!(lines[1].width_trimming_end_space(), 0);
    }

    #[test]
    fn rewrapping_a_trimmed_line_is_idempotent() {
        let lines = words("one two three four", 75);
        for line in &lines {
            let again = words(line.trimmed_text(), 75);
            assert_eq!(again.len(), 1);
            assert_eq!(again[0].text(), line.trimmed_text());
        }
    }

    #[test]
    fn character_mode_ignores_words() {
        let lines = wrap(
            &FixedFont::new(),
            "aa bb",
            &WrapOptions::new(30).mode(WrapMode::Characters),
        );
        let all: Vec<&str> = lines.iter().map(|l| l.text()).collect();
        assert_eq!(all, vec!["aa ", "bb"]);
    }

    #[test]
    fn character_mode_skips_unmeasured_characters() {
        let font = FixedFont::new().failing_on('x');
        let lines = wrap(
            &font,
            "axb",
            &WrapOptions::new(1000).mode(WrapMode::Characters),
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width(), 20);
        assert_eq!(lines[0].text(), "axb");
    }

    #[test]
    fn break_cursor_mode_wraps_at_opportunities() {
        let lines = wrap(
            &FixedFont::new(),
            "aaa bbb ccc",
            &WrapOptions::new(85).mode(WrapMode::BreakCursor),
        );
        let all: Vec<&str> = lines.iter().map(|l| l.text()).collect();
        assert_eq!(all, vec!["aaa bbb ", "ccc"]);
        assert_eq!(lines[0].trimmed_text(), "aaa bbb");
    }

    #[test]
    fn break_cursor_mode_fits_on_equality() {
        // "aaa bbb" is exactly 70 wide; equality still fits.
        let lines = wrap(
            &FixedFont::new(),
            "aaa bbb",
            &WrapOptions::new(70).mode(WrapMode::BreakCursor),
        );
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn break_cursor_mode_does_not_honor_hard_breaks() {
        // Known gap in this mode: the newline does not force a flush.
        let lines = wrap(
            &FixedFont::new(),
            "ab\ncd",
            &WrapOptions::new(1000).mode(WrapMode::BreakCursor),
        );
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn max_lines_caps_output() {
        let lines = wrap(
            &FixedFont::new(),
            "a b c d e f g h",
            &WrapOptions::new(10).max_lines(3),
        );
        assert_eq!(lines.len(), 3);
    }
}

//! Line and segment entities produced by wrapping.
//!
//! All of these are immutable accumulation containers: `append` and
//! `appending` return new values, and nothing is mutated after being
//! handed to a caller.

use std::ops::Range;

use glam::IVec2;
use palette::Srgba;

use crate::{
    font::GlyphHandle,
    linebreak::LineBreak,
    width::StringWidth,
};

/// A wrapped line referencing a range of the original text buffer.
///
/// The line borrows the buffer rather than copying it; `range` is a
/// half-open byte range.
#[derive(Clone, Debug)]
pub struct TextLine<'a> {
    source: &'a str,
    range: Range<usize>,
    height: i32,
    width_info: StringWidth,
}

impl<'a> TextLine<'a> {
    pub(crate) fn new(
        source: &'a str,
        range: Range<usize>,
        height: i32,
        width_info: StringWidth,
    ) -> Self {
        Self {
            source,
            range,
            height,
            width_info,
        }
    }

    /// The full (untrimmed) text of the line.
    pub fn text(&self) -> &'a str {
        &self.source[self.range.clone()]
    }

    /// Byte range of the line within the original buffer.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Total advance of the line, including surrounding whitespace.
    pub fn width(&self) -> i32 {
        self.width_info.width
    }

    pub fn width_info(&self) -> &StringWidth {
        &self.width_info
    }

    /// Extends the line through `end`, taking the appended span's
    /// trailing whitespace run. O(1) in the line length.
    pub(crate) fn append(&self, end: usize, end_info: &StringWidth) -> TextLine<'a> {
        TextLine {
            source: self.source,
            range: self.range.start..end,
            height: self.height,
            width_info: self.width_info.appending(end_info),
        }
    }

    /// The line text without its trailing whitespace run. An
    /// all-whitespace line trims to nothing.
    pub fn text_trimming_end_space(&self) -> &'a str {
        let text = self.text();
        &text[..offset_from_end(text, self.width_info.end_trim().count)]
    }

    pub fn width_trimming_end_space(&self) -> i32 {
        self.width_info.width - self.width_info.end_trim().width
    }

    /// The line text without leading and trailing whitespace runs.
    pub fn trimmed_text(&self) -> &'a str {
        let text = self.text();
        let start = offset_from_start(text, self.width_info.start.count);
        let end = offset_from_end(text, self.width_info.end.count);
        &text[start..end.max(start)]
    }

    pub fn width_trimming_space(&self) -> i32 {
        self.width_info.width - self.width_info.start.width - self.width_info.end.width
    }

    /// Maps an x-coordinate within the line to a character index.
    pub fn index_of_position(&self, x: i32) -> usize {
        self.width_info.index_of_position(x)
    }
}

/// Byte offset after skipping `count` characters from the front.
fn offset_from_start(s: &str, count: usize) -> usize {
    s.char_indices().nth(count).map_or(s.len(), |(i, _)| i)
}

/// Byte offset after dropping `count` characters from the back.
fn offset_from_end(s: &str, count: usize) -> usize {
    let mut end = s.len();
    for _ in 0..count {
        match s[..end].char_indices().next_back() {
            Some((i, _)) => end = i,
            None => break,
        }
    }
    end
}

/// A measured, styled character ready for rendering.
#[derive(Clone, Debug)]
pub struct RenderableCharacter {
    /// Handle to the glyph bitmap; `None` for whitespace, which draws
    /// nothing.
    pub image: Option<GlyphHandle>,
    /// Advance (including kerning/tracking) and line height.
    pub size: IVec2,
    pub baseline: i32,
    pub foreground: Srgba<u8>,
    pub background: Option<Srgba<u8>>,
    /// Set on the character immediately preceding a break opportunity.
    pub line_break_after: Option<LineBreak>,
}

impl RenderableCharacter {
    pub fn is_whitespace(&self) -> bool {
        self.image.is_none()
    }
}

/// The glyphs between two consecutive break opportunities.
///
/// A segment is never split further, except when it alone exceeds the
/// maximum line width.
#[derive(Clone, Debug)]
pub struct Segment {
    pub characters: Vec<RenderableCharacter>,
    pub width_info: StringWidth,
    pub height: i32,
    /// Whether the break terminating this segment was mandatory.
    pub is_hard_break: bool,
}

impl Segment {
    pub fn width(&self) -> i32 {
        self.width_info.width
    }
}

/// The styled counterpart of [`TextLine`]: owns its glyph list instead
/// of referencing a text buffer.
#[derive(Clone, Debug, Default)]
pub struct StyledLine {
    characters: Vec<RenderableCharacter>,
    max_height: i32,
    baseline_pos: i32,
    width_info: StringWidth,
}

impl StyledLine {
    pub(crate) fn from_segment(segment: Segment) -> Self {
        let baseline_pos = max_baseline(&segment.characters);
        Self {
            characters: segment.characters,
            max_height: segment.height,
            baseline_pos,
            width_info: segment.width_info,
        }
    }

    /// Returns a new line with `segment` appended.
    pub(crate) fn appending(&self, segment: &Segment) -> StyledLine {
        let mut characters =
            Vec::with_capacity(self.characters.len() + segment.characters.len());
        characters.extend_from_slice(&self.characters);
        characters.extend_from_slice(&segment.characters);
        StyledLine {
            characters,
            max_height: self.max_height.max(segment.height),
            baseline_pos: self.baseline_pos.max(max_baseline(&segment.characters)),
            width_info: self.width_info.appending(&segment.width_info),
        }
    }

    pub fn characters(&self) -> &[RenderableCharacter] {
        &self.characters
    }

    /// Tallest character height across the appended segments.
    pub fn max_height(&self) -> i32 {
        self.max_height
    }

    pub fn baseline_pos(&self) -> i32 {
        self.baseline_pos
    }

    pub fn width(&self) -> i32 {
        self.width_info.width
    }

    pub fn width_info(&self) -> &StringWidth {
        &self.width_info
    }

    pub fn characters_trimming_end_space(&self) -> &[RenderableCharacter] {
        &self.characters[..self.characters.len() - self.width_info.end_trim().count]
    }

    pub fn width_trimming_end_space(&self) -> i32 {
        self.width_info.width - self.width_info.end_trim().width
    }

    pub fn trimmed_characters(&self) -> &[RenderableCharacter] {
        let end = self.characters.len() - self.width_info.end.count;
        &self.characters[self.width_info.start.count..end]
    }

    pub fn width_trimming_space(&self) -> i32 {
        self.width_info.width - self.width_info.start.width - self.width_info.end.width
    }

    pub fn index_of_position(&self, x: i32) -> usize {
        self.width_info.index_of_position(x)
    }
}

fn max_baseline(characters: &[RenderableCharacter]) -> i32 {
    characters.iter().map(|c| c.baseline).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{font::Font, tests_util::FixedFont, width::measure_str};

    fn line<'a>(source: &'a str, range: Range<usize>) -> TextLine<'a> {
        let font = FixedFont::new();
        let info = measure_str(&font, &source[range.clone()], 0);
        TextLine::new(source, range, font.height(), info)
    }

    #[test]
    fn trim_accessors() {
        let l = line("  hi  ", 0..6);
        assert_eq!(l.text(), "  hi  ");
        assert_eq!(l.text_trimming_end_space(), "  hi");
        assert_eq!(l.trimmed_text(), "hi");
        assert_eq!(l.width(), 60);
        assert_eq!(l.width_trimming_end_space(), 40);
        assert_eq!(l.width_trimming_space(), 20);
    }

    #[test]
    fn trimmed_text_of_all_whitespace_line_is_empty() {
        let l = line("   ", 0..3);
        assert_eq!(l.trimmed_text(), "");
        assert_eq!(l.text_trimming_end_space(), "");
        assert_eq!(l.width_trimming_end_space(), 0);
        assert_eq!(l.width_trimming_space(), 0);
    }

    #[test]
    fn append_combines_adjacent_ranges() {
        let font = FixedFont::new();
        let source = "ab cd ";
        let first = line(source, 0..3);
        let tail = measure_str(&font, &source[3..6], 0);
        let combined = first.append(6, &tail);
        assert_eq!(combined.text(), "ab cd ");
        assert_eq!(combined.width(), 60);
        assert_eq!(combined.width_info().end.count, 1);
        assert_eq!(combined.trimmed_text(), "ab cd");
    }

    #[test]
    fn multibyte_trimming() {
        let l = line(" é ", 0..4);
        assert_eq!(l.trimmed_text(), "é");
    }
}

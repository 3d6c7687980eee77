//! Styled text layout.
//!
//! A five-stage pull pipeline turns styled runs into positioned,
//! colored glyph descriptors grouped into width-bounded lines:
//!
//! 1. run resolution (style inheritance + font lookup),
//! 2. character walking with break classification,
//! 3. glyph measurement,
//! 4. segment accumulation between break opportunities,
//! 5. line accumulation bounded by the maximum width.
//!
//! Each stage produces exactly what the next one pulls; only the
//! segment stage holds a growing buffer, bounded by one break interval.
//! For an overview of the text layout hierarchy,
//! see https://raphlinus.github.io/text/2020/10/26/text-layout.html.
//!
//! Unlike the plain wrappers, failures here are fatal to the remaining
//! layout: downstream segments assume every prior position was
//! measured, so a silent gap would corrupt cumulative width math.

use glam::IVec2;
use palette::Srgba;

use crate::{
    font::{Font, FontSource, MissingFont, MissingGlyph},
    line::{RenderableCharacter, Segment, StyledLine},
    linebreak::{BreakChecker, LineBreak},
    text::{Text, TextContext, TextSection},
    width::{CharacterMetrics, WidthAccum},
};

/// Maximum number of lines produced by [`wrap_styled`].
pub const MAX_LINES: usize = 99;

/// A lookup failure inside the styled pipeline.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error(transparent)]
    MissingFont(#[from] MissingFont),
    #[error(transparent)]
    MissingGlyph(#[from] MissingGlyph),
}

/// Stage 1: resolves each styled run into a run context.
struct RunIter<'a> {
    sections: std::slice::Iter<'a, TextSection>,
    fonts: &'a dyn FontSource,
    base: &'a TextContext,
    /// Byte offset of the next section within the flat text.
    offset: usize,
}

/// The attributes stage 3 needs from a resolved run, detached from the
/// run context so characters can be handed onward by value.
#[derive(Copy, Clone)]
struct CharStyle {
    kern: f32,
    tracking: f32,
    foreground: Srgba<u8>,
    background: Option<Srgba<u8>>,
}

struct RunContext<'a> {
    chars: std::str::CharIndices<'a>,
    /// Byte offset of this run within the flat text.
    offset: usize,
    font: &'a dyn Font,
    style: CharStyle,
}

impl<'a> RunIter<'a> {
    fn next_run(&mut self) -> Result<Option<RunContext<'a>>, LayoutError> {
        let Some(section) = self.sections.next() else {
            return Ok(None);
        };
        let context = self.base.resolve(&section.style);
        let font = self.fonts.resolve(&context.font)?;
        let run = RunContext {
            chars: section.text.char_indices(),
            offset: self.offset,
            font,
            style: CharStyle {
                kern: context.kern,
                tracking: context.tracking,
                foreground: context.foreground,
                background: context.background,
            },
        };
        self.offset += section.text.len();
        Ok(Some(run))
    }
}

/// Stage 2: walks characters across runs, attaching the break
/// classification to the character immediately preceding each break
/// opportunity. Pulls the next run context automatically when a run is
/// exhausted.
struct CharIter<'a> {
    runs: RunIter<'a>,
    current: Option<RunContext<'a>>,
    breaks: BreakChecker,
}

struct StyledChar<'a> {
    c: char,
    font: &'a dyn Font,
    style: CharStyle,
    line_break: Option<LineBreak>,
}

impl<'a> CharIter<'a> {
    fn next_char(&mut self) -> Result<Option<StyledChar<'a>>, LayoutError> {
        loop {
            if let Some(run) = &mut self.current {
                if let Some((i, c)) = run.chars.next() {
                    let end = run.offset + i + c.len_utf8();
                    let line_break = self.breaks.break_after(end);
                    return Ok(Some(StyledChar {
                        c,
                        font: run.font,
                        style: run.style,
                        line_break,
                    }));
                }
            }
            match self.runs.next_run()? {
                Some(run) => self.current = Some(run),
                None => return Ok(None),
            }
        }
    }
}

/// Stage 3: measures each styled character into a renderable glyph.
struct GlyphIter<'a> {
    chars: CharIter<'a>,
}

impl GlyphIter<'_> {
    fn next_glyph(
        &mut self,
    ) -> Result<Option<(RenderableCharacter, CharacterMetrics)>, LayoutError> {
        let Some(styled) = self.chars.next_char()? else {
            return Ok(None);
        };
        let metrics = styled.font.glyph_metrics(styled.c)?;
        // Kerning and tracking are specified in fractional pixels but
        // advances are integral; the fraction is truncated.
        let advance = metrics.advance + styled.style.kern as i32 + styled.style.tracking as i32;
        let size = IVec2::new(advance, styled.font.height());

        let character = if styled.c.is_whitespace() {
            RenderableCharacter {
                image: None,
                size,
                baseline: 0,
                foreground: styled.style.foreground,
                background: styled.style.background,
                line_break_after: styled.line_break,
            }
        } else {
            let image = styled.font.glyph(styled.c)?;
            RenderableCharacter {
                image: Some(image),
                size,
                baseline: styled.font.descent(),
                foreground: styled.style.foreground,
                background: styled.style.background,
                line_break_after: styled.line_break,
            }
        };
        // Cursor placement works off the same extended advance the
        // renderer steps by.
        let character_metrics = CharacterMetrics {
            width: metrics.frame.x,
            advance,
        };
        Ok(Some((character, character_metrics)))
    }
}

/// Stage 4: accumulates glyphs into the segment between two consecutive
/// break opportunities, stopping (inclusive) at the first character
/// carrying a break classification.
struct SegmentIter<'a> {
    glyphs: GlyphIter<'a>,
}

impl SegmentIter<'_> {
    fn next_segment(&mut self) -> Result<Option<Segment>, LayoutError> {
        let mut characters = Vec::new();
        let mut accum = WidthAccum::new();
        let mut height = 0;
        let mut is_hard_break = false;

        while let Some((character, metrics)) = self.glyphs.next_glyph()? {
            height = height.max(character.size.y);
            accum.push(character.is_whitespace(), metrics, character.size.x);
            let line_break = character.line_break_after;
            characters.push(character);
            if let Some(line_break) = line_break {
                is_hard_break = line_break == LineBreak::Hard;
                break;
            }
        }

        if characters.is_empty() {
            return Ok(None);
        }
        Ok(Some(Segment {
            characters,
            width_info: accum.finish(),
            height,
            is_hard_break,
        }))
    }
}

/// Stage 5: groups segments into lines.
///
/// Yields `Result`s: the first lookup failure ends the sequence, and
/// the lines pulled before it remain valid. This is the one wrapper
/// generation that honors hard breaks: a segment terminated by a
/// mandatory break seals its line immediately after being appended.
pub struct LineIter<'a> {
    segments: SegmentIter<'a>,
    max_width: Option<i32>,
    /// An overflowing segment already pulled from stage 4, waiting to
    /// open the next line, along with its hard-break flag.
    pending: Option<(StyledLine, bool)>,
    done: bool,
}

impl<'a> LineIter<'a> {
    pub fn new(
        text: &'a Text,
        fonts: &'a dyn FontSource,
        base: &'a TextContext,
        max_width: Option<i32>,
    ) -> Self {
        let flat = text.to_unstyled_string();
        let runs = RunIter {
            sections: text.sections().iter(),
            fonts,
            base,
            offset: 0,
        };
        let chars = CharIter {
            runs,
            current: None,
            breaks: BreakChecker::new(&flat),
        };
        Self {
            segments: SegmentIter {
                glyphs: GlyphIter { chars },
            },
            max_width,
            pending: None,
            done: false,
        }
    }

    fn next_line(&mut self) -> Result<Option<StyledLine>, LayoutError> {
        let Some(max_width) = self.max_width else {
            return self.next_line_unbounded();
        };

        let (mut line, opened_hard) = match self.pending.take() {
            Some(pending) => pending,
            None => match self.segments.next_segment()? {
                Some(segment) => {
                    let hard = segment.is_hard_break;
                    (StyledLine::from_segment(segment), hard)
                }
                None => return Ok(None),
            },
        };
        if opened_hard {
            return Ok(Some(line));
        }

        while let Some(segment) = self.segments.next_segment()? {
            if line.width() + segment.width() > max_width {
                let hard = segment.is_hard_break;
                self.pending = Some((StyledLine::from_segment(segment), hard));
                return Ok(Some(line));
            }
            let hard = segment.is_hard_break;
            line = line.appending(&segment);
            if hard {
                return Ok(Some(line));
            }
        }
        Ok(Some(line))
    }

    /// Degenerate unbounded mode: every segment lands on one line.
    fn next_line_unbounded(&mut self) -> Result<Option<StyledLine>, LayoutError> {
        let mut line: Option<StyledLine> = None;
        while let Some(segment) = self.segments.next_segment()? {
            line = Some(match line {
                Some(line) => line.appending(&segment),
                None => StyledLine::from_segment(segment),
            });
        }
        Ok(line)
    }
}

impl Iterator for LineIter<'_> {
    type Item = Result<StyledLine, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Lays out styled text into lines, stopping at the first failure.
///
/// At most [`MAX_LINES`] lines are produced. To keep the lines laid
/// out before an error instead of discarding them, pull from
/// [`LineIter`] directly.
pub fn wrap_styled(
    text: &Text,
    fonts: &dyn FontSource,
    base: &TextContext,
    max_width: Option<i32>,
) -> Result<Vec<StyledLine>, LayoutError> {
    let mut lines = Vec::new();
    for line in LineIter::new(text, fonts, base, max_width) {
        lines.push(line?);
        if lines.len() >= MAX_LINES {
            break;
        }
    }
    Ok(lines)
}

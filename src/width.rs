//! Width accounting for spans of measured characters.
//!
//! Everything here is pure arithmetic: running totals of glyph advance
//! plus the leading and trailing whitespace runs of a span. The wrap
//! algorithms lean on [`StringWidth::appending`] to grow lines in O(1)
//! instead of rescanning.

use crate::font::Font;

/// A contiguous run of whitespace characters at one end of a span.
///
/// Resets to zero the instant a non-whitespace character is seen at
/// that end.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SpaceInfo {
    /// Number of consecutive whitespace characters in the run.
    pub count: usize,
    /// Summed advance of exactly those characters.
    pub width: i32,
}

impl SpaceInfo {
    pub const ZERO: Self = Self { count: 0, width: 0 };

    pub fn increment(&mut self, width: i32) {
        self.count += 1;
        self.width += width;
    }
}

/// Glyph ink width vs. total horizontal advance.
///
/// `advance >= width` for normal glyphs; the advance can include
/// kerning and tracking.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterMetrics {
    pub width: i32,
    pub advance: i32,
}

/// Measured widths of a span: total advance, per-character metrics, and
/// the whitespace runs at both ends of the span.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringWidth {
    pub start: SpaceInfo,
    pub end: SpaceInfo,
    pub width: i32,
    pub metrics: Vec<CharacterMetrics>,
}

impl StringWidth {
    /// Combines two adjacent spans: keeps this span's leading run, takes
    /// the appended span's trailing run, and sums the widths.
    pub fn appending(&self, other: &StringWidth) -> StringWidth {
        let mut metrics = Vec::with_capacity(self.metrics.len() + other.metrics.len());
        metrics.extend_from_slice(&self.metrics);
        metrics.extend_from_slice(&other.metrics);
        StringWidth {
            start: self.start,
            end: other.end,
            width: self.width + other.width,
            metrics,
        }
    }

    /// The whitespace run removed by end-trimming.
    ///
    /// An all-whitespace span is accounted entirely in `start`, but
    /// end-trimming still has to drop it, so the single run counts as
    /// trailing here.
    pub fn end_trim(&self) -> SpaceInfo {
        if self.start.count == self.metrics.len() {
            self.start
        } else {
            self.end
        }
    }

    /// Maps an x-coordinate to a character index for cursor placement.
    ///
    /// Returns the index of the first glyph whose horizontal center
    /// exceeds `x`, or the character count when `x` is past every glyph.
    pub fn index_of_position(&self, x: i32) -> usize {
        Self::index_in(&self.metrics, x)
    }

    /// Like [`index_of_position`](Self::index_of_position), but relative
    /// to the trimmed span.
    pub fn index_of_position_in_trim(&self, x: i32) -> usize {
        let end = self.metrics.len() - self.end.count;
        Self::index_in(&self.metrics[self.start.count..end], x)
    }

    fn index_in(metrics: &[CharacterMetrics], x: i32) -> usize {
        let mut cur = 0;
        for (index, m) in metrics.iter().enumerate() {
            cur += m.advance;
            let outer_space = m.advance - m.width;
            let center = cur - outer_space - m.width / 2;
            if x < center {
                return index;
            }
        }
        metrics.len()
    }
}

/// Single-pass accumulator behind [`measure_str`] and the wrappers.
///
/// Tracks the same start/end whitespace runs as [`StringWidth`] while
/// characters stream in.
#[derive(Debug, Default)]
pub(crate) struct WidthAccum {
    start: SpaceInfo,
    end: SpaceInfo,
    width: i32,
    metrics: Vec<CharacterMetrics>,
    seen_glyph: bool,
}

impl WidthAccum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one measured character. `advance` is the full advance
    /// including any spacing, which is what line fitting accumulates.
    pub fn push(&mut self, is_whitespace: bool, metrics: CharacterMetrics, advance: i32) {
        self.width += advance;
        self.metrics.push(metrics);
        if is_whitespace {
            if self.seen_glyph {
                self.end.increment(advance);
            } else {
                self.start.increment(advance);
            }
        } else {
            self.seen_glyph = true;
            self.end = SpaceInfo::ZERO;
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Concatenates another accumulated span onto this one, extending
    /// whichever whitespace run is open at the boundary.
    pub fn absorb(&mut self, other: WidthAccum) {
        if other.metrics.is_empty() {
            return;
        }
        self.width += other.width;
        if other.seen_glyph {
            if !self.seen_glyph {
                self.start.count += other.start.count;
                self.start.width += other.start.width;
            }
            self.end = other.end;
            self.seen_glyph = true;
        } else {
            // The absorbed span is all whitespace; its characters all
            // live in `other.start`.
            if self.seen_glyph {
                self.end.count += other.start.count;
                self.end.width += other.start.width;
            } else {
                self.start.count += other.start.count;
                self.start.width += other.start.width;
            }
        }
        self.metrics.extend(other.metrics);
    }

    pub fn finish(self) -> StringWidth {
        StringWidth {
            start: self.start,
            end: self.end,
            width: self.width,
            metrics: self.metrics,
        }
    }

    /// Returns the accumulated span and resets for the next one.
    pub fn take(&mut self) -> StringWidth {
        std::mem::take(self).finish()
    }
}

/// Measures a span of text in a single pass.
///
/// A character the font cannot measure is logged and contributes zero
/// width; label layout degrades gracefully rather than aborting on one
/// bad glyph.
pub fn measure_str(font: &dyn Font, s: &str, tracking: i32) -> StringWidth {
    let mut accum = WidthAccum::new();
    for c in s.chars() {
        let metrics = metrics_or_zero(font, c);
        let advance = metrics.advance + tracking;
        accum.push(
            c.is_whitespace(),
            CharacterMetrics {
                width: metrics.frame.x,
                advance,
            },
            advance,
        );
    }
    accum.finish()
}

/// Lenient glyph lookup used by the plain wrappers.
pub(crate) fn metrics_or_zero(font: &dyn Font, c: char) -> crate::font::GlyphMetrics {
    match font.glyph_metrics(c) {
        Ok(metrics) => metrics,
        Err(err) => {
            log::warn!("couldn't measure character {:?}: {}", c, err);
            Default::default()
        }
    }
}

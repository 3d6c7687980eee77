//! Line-break detection.
//!
//! Break opportunities come from the UAX #14 line breaking algorithm
//! (via the `unicode-linebreak` crate) and are consumed through a
//! forward-only cursor. Line breaking is much more complex than it
//! looks: https://www.unicode.org/reports/tr14/

use serde::{Deserialize, Serialize};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Classification of a break opportunity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineBreak {
    /// An optional wrap point.
    Soft,
    /// A mandatory break (explicit newline or other forced break).
    Hard,
}

/// Forward-only cursor over the break opportunities of a text buffer.
///
/// Positions are byte offsets into the buffer, produced in strictly
/// increasing order. The final opportunity always lands at the end of
/// the text and is mandatory.
pub struct BreakCursor {
    breaks: Vec<(usize, BreakOpportunity)>,
    next: usize,
    hard: bool,
}

impl BreakCursor {
    pub fn new(text: &str) -> Self {
        Self {
            breaks: linebreaks(text).collect(),
            next: 0,
            hard: false,
        }
    }

    /// Position of the first boundary: the start of the text.
    pub fn first(&self) -> usize {
        0
    }

    /// Advances to the next break opportunity, returning its byte
    /// position, or `None` once the text is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<usize> {
        let (pos, opportunity) = *self.breaks.get(self.next)?;
        self.next += 1;
        self.hard = matches!(opportunity, BreakOpportunity::Mandatory);
        Some(pos)
    }

    /// Classification of the opportunity last returned by
    /// [`next`](Self::next).
    pub fn classification(&self) -> LineBreak {
        if self.hard {
            LineBreak::Hard
        } else {
            LineBreak::Soft
        }
    }

    pub fn is_hard(&self) -> bool {
        self.hard
    }
}

/// Forward-only per-position break query.
///
/// The styled pipeline walks characters one at a time and asks, for
/// each position, whether a break opportunity lands exactly there.
/// Positions must be queried in increasing order.
pub struct BreakChecker {
    cursor: BreakCursor,
    position: Option<usize>,
}

impl BreakChecker {
    pub fn new(text: &str) -> Self {
        let mut cursor = BreakCursor::new(text);
        let position = cursor.next();
        Self { cursor, position }
    }

    /// Returns the classification of the break opportunity at
    /// `byte_pos`, if one lands exactly there.
    pub fn break_after(&mut self, byte_pos: usize) -> Option<LineBreak> {
        while let Some(position) = self.position {
            if position >= byte_pos {
                break;
            }
            self.position = self.cursor.next();
        }
        match self.position {
            Some(position) if position == byte_pos => {
                let classification = self.cursor.classification();
                self.position = self.cursor.next();
                Some(classification)
            }
            _ => None,
        }
    }
}

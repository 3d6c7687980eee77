//! Unicode-aware word wrapping and styled text layout for label-style
//! controls.
//!
//! Two surfaces are exposed:
//!
//! - [`wrap`] splits a plain string into [`TextLine`]s referencing the
//!   original buffer, with the algorithm generation selected by
//!   [`WrapMode`]. Glyph lookup failures degrade gracefully.
//! - [`wrap_styled`] (and the underlying [`LineIter`]) runs styled
//!   [`Text`] through a five-stage pipeline into [`StyledLine`]s of
//!   positioned, colored glyph descriptors. Lookup failures there are
//!   fatal to the remaining layout.
//!
//! Fonts are consumed through the [`Font`] and [`FontSource`] traits;
//! rasterization and caching live with the implementor.

#![allow(dead_code)]

mod font;
mod line;
mod linebreak;
mod pipeline;
mod text;
mod width;
mod wrap;

pub use font::{
    Font, FontId, FontSource, Fonts, GlyphHandle, GlyphMetrics, MissingFont, MissingGlyph, Query,
    Style, Weight,
};
pub use line::{RenderableCharacter, Segment, StyledLine, TextLine};
pub use linebreak::{BreakChecker, BreakCursor, LineBreak};
pub use pipeline::{wrap_styled, LayoutError, LineIter, MAX_LINES};
pub use text::{default_color, Text, TextContext, TextSection, TextStyle};
pub use width::{measure_str, CharacterMetrics, SpaceInfo, StringWidth};
pub use wrap::{wrap, WrapMode, WrapOptions};

pub use palette::Srgba;
use smartstring::LazyCompact;

pub type SmartString = smartstring::SmartString<LazyCompact>;

#[cfg(test)]
pub(crate) mod tests_util {
    use std::cell::RefCell;

    use glam::IVec2;
    use slotmap::SlotMap;

    use crate::font::{Font, GlyphHandle, GlyphMetrics, MissingGlyph};

    /// A font with fixed metrics: every glyph advances 10px with an 8px
    /// ink width, on a 16px line with a 4px descent.
    pub struct FixedFont {
        fail_on: Option<char>,
        glyphs: RefCell<SlotMap<GlyphHandle, char>>,
    }

    impl FixedFont {
        pub fn new() -> Self {
            Self {
                fail_on: None,
                glyphs: RefCell::new(SlotMap::with_key()),
            }
        }

        /// Makes lookups for `c` fail, to exercise error paths.
        pub fn failing_on(mut self, c: char) -> Self {
            self.fail_on = Some(c);
            self
        }
    }

    impl Font for FixedFont {
        fn height(&self) -> i32 {
            16
        }

        fn descent(&self) -> i32 {
            4
        }

        fn glyph_metrics(&self, c: char) -> Result<GlyphMetrics, MissingGlyph> {
            if self.fail_on == Some(c) {
                return Err(MissingGlyph(c));
            }
            Ok(GlyphMetrics {
                advance: 10,
                frame: IVec2::new(8, 16),
            })
        }

        fn glyph(&self, c: char) -> Result<GlyphHandle, MissingGlyph> {
            if self.fail_on == Some(c) {
                return Err(MissingGlyph(c));
            }
            Ok(self.glyphs.borrow_mut().insert(c))
        }
    }
}

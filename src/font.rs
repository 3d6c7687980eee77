//! Font query and glyph metrics surface.
//!
//! Font parsing, glyph rasterization, and texture caching live outside
//! this crate. Layout consumes fonts through the [`Font`] and
//! [`FontSource`] traits and never touches raster data: rasterized
//! glyphs are referenced by opaque [`GlyphHandle`]s.

use ahash::AHashMap;
use glam::IVec2;
use serde::{Deserialize, Serialize};
use smartstring::{LazyCompact, SmartString};

/// A font weight, indicating how dark it appears.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Weight {
    Thin,
    ExtraLight,
    Light,
    Normal,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
}

impl Default for Weight {
    fn default() -> Self {
        Self::Normal
    }
}

/// Font style: normal or italic. We do not support
/// oblique fonts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    Normal,
    Italic,
}

impl Default for Style {
    fn default() -> Self {
        Self::Normal
    }
}

/// A font query. Specifies which fonts can
/// be used in a given context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    /// The font family to use. If `None`, we'll use the default family
    /// configured on the [`Fonts`] registry.
    pub family: Option<SmartString<LazyCompact>>,
    pub style: Style,
    pub weight: Weight,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            family: None,
            style: Style::Normal,
            weight: Weight::Normal,
        }
    }
}

impl Query {
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }

    pub fn family(mut self, family: &str) -> Self {
        self.family = Some(family.into());
        self
    }
}

slotmap::new_key_type! {
    /// Handle to a rasterized glyph owned by the font implementation.
    ///
    /// Whitespace characters carry no handle at all.
    pub struct GlyphHandle;
}

/// Metrics for a single glyph under a resolved style.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Horizontal advance, excluding kerning and tracking.
    pub advance: i32,
    /// Size of the glyph bounding box.
    pub frame: IVec2,
}

#[derive(Debug, thiserror::Error)]
#[error("no glyph for character {0:?}")]
pub struct MissingGlyph(pub char);

#[derive(Debug, thiserror::Error)]
#[error("no font satisfied the query {0:#?}")]
pub struct MissingFont(pub Query);

/// A resolved font at a fixed size, able to measure and rasterize
/// single characters.
pub trait Font {
    /// Line height in pixels.
    fn height(&self) -> i32;

    /// Distance from the baseline to the bottom of the line box.
    fn descent(&self) -> i32;

    fn glyph_metrics(&self, c: char) -> Result<GlyphMetrics, MissingGlyph>;

    /// Rasterizes `c`, returning a handle to the glyph bitmap.
    fn glyph(&self, c: char) -> Result<GlyphHandle, MissingGlyph>;
}

/// Resolves font queries, typically backed by a [`Fonts`] registry.
pub trait FontSource {
    fn resolve(&self, query: &Query) -> Result<&dyn Font, MissingFont>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FontId(usize);

struct RegisteredFont {
    style: Style,
    weight: Weight,
    font: Box<dyn Font>,
}

/// The fonts available to layout.
#[derive(Default)]
pub struct Fonts {
    fonts: Vec<RegisteredFont>,
    by_family: AHashMap<SmartString<LazyCompact>, Vec<FontId>>,
    default_family: Option<SmartString<LazyCompact>>,
}

impl Fonts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        family: impl Into<SmartString<LazyCompact>>,
        style: Style,
        weight: Weight,
        font: Box<dyn Font>,
    ) -> FontId {
        let family = family.into();
        let id = FontId(self.fonts.len());
        self.fonts.push(RegisteredFont {
            style,
            weight,
            font,
        });
        self.by_family.entry(family.clone()).or_default().push(id);
        log::info!("Loaded font '{}'", family);
        id
    }

    pub fn set_default_family(&mut self, family: impl Into<SmartString<LazyCompact>>) {
        self.default_family = Some(family.into());
    }

    pub fn get(&self, id: FontId) -> &dyn Font {
        &*self.fonts[id.0].font
    }

    pub fn query(&self, query: &Query) -> Result<FontId, MissingFont> {
        let family = query
            .family
            .as_ref()
            .or(self.default_family.as_ref())
            .ok_or_else(|| MissingFont(query.clone()))?;
        self.by_family
            .get(family)
            .and_then(|ids| {
                ids.iter().copied().find(|id| {
                    let font = &self.fonts[id.0];
                    font.style == query.style && font.weight == query.weight
                })
            })
            .ok_or_else(|| MissingFont(query.clone()))
    }
}

impl FontSource for Fonts {
    fn resolve(&self, query: &Query) -> Result<&dyn Font, MissingFont> {
        let id = self.query(query)?;
        Ok(self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_util::FixedFont;

    #[test]
    fn query_falls_back_to_default_family() {
        let mut fonts = Fonts::new();
        let id = fonts.add(
            "Merriweather",
            Style::Normal,
            Weight::Normal,
            Box::new(FixedFont::new()),
        );
        fonts.set_default_family("Merriweather");

        assert_eq!(fonts.query(&Query::default()).ok(), Some(id));
        assert_eq!(
            fonts.query(&Query::default().family("Merriweather")).ok(),
            Some(id)
        );
    }

    #[test]
    fn query_matches_style_and_weight() {
        let mut fonts = Fonts::new();
        fonts.add(
            "Merriweather",
            Style::Normal,
            Weight::Normal,
            Box::new(FixedFont::new()),
        );
        let bold = fonts.add(
            "Merriweather",
            Style::Normal,
            Weight::Bold,
            Box::new(FixedFont::new()),
        );

        let query = Query::default().family("Merriweather").weight(Weight::Bold);
        assert_eq!(fonts.query(&query).ok(), Some(bold));
        assert!(fonts
            .query(&query.clone().style(Style::Italic))
            .is_err());
    }

    #[test]
    fn missing_family_is_an_error() {
        let fonts = Fonts::new();
        let err = fonts.query(&Query::default().family("Nope")).unwrap_err();
        assert!(err.to_string().contains("no font satisfied"));
    }
}

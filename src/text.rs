//! Rich text representation.
//!
//! Styled text is a list of [`TextSection`]s: maximal runs of
//! characters sharing one set of style overrides. Unset attributes
//! inherit from a base [`TextContext`] at layout time.

use palette::Srgba;
use smallvec::SmallVec;
use smartstring::{LazyCompact, SmartString};

use crate::font::Query;

pub fn default_color() -> Srgba<u8> {
    Srgba::new(0, 0, 0, u8::MAX)
}

/// Some rich text. Implemented as a list of [`TextSection`]s.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    sections: SmallVec<[TextSection; 1]>,
}

impl Text {
    pub fn from_sections(sections: impl IntoIterator<Item = TextSection>) -> Self {
        Self {
            sections: sections.into_iter().collect(),
        }
    }

    pub fn extend(&mut self, other: Text) {
        self.sections.extend(other.sections);
    }

    pub fn sections(&self) -> &[TextSection] {
        &self.sections
    }

    /// Flat character view covering the whole text, for break analysis.
    pub fn to_unstyled_string(&self) -> SmartString<LazyCompact> {
        let mut s = SmartString::new();
        for section in &self.sections {
            s.push_str(&section.text);
        }
        s
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Text::from(s.as_str())
    }
}

impl<'a> From<&'a str> for Text {
    fn from(s: &'a str) -> Self {
        Text::from_sections([TextSection {
            text: s.into(),
            style: Default::default(),
        }])
    }
}

/// A run of text sharing one style override set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextSection {
    pub text: SmartString<LazyCompact>,
    pub style: TextStyle,
}

impl TextSection {
    pub fn new(text: impl Into<SmartString<LazyCompact>>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Style overrides for a section.
///
/// Fields set to `None` inherit the base [`TextContext`] value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextStyle {
    pub font: Option<Query>,
    /// Text color.
    pub foreground: Option<Srgba<u8>>,
    pub background: Option<Srgba<u8>>,
    /// Extra advance between individual characters, in pixels.
    pub kern: Option<f32>,
    /// Extra advance applied over the whole run, in pixels per character.
    pub tracking: Option<f32>,
}

/// A fully resolved style: the effective attributes for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextContext {
    pub font: Query,
    pub foreground: Srgba<u8>,
    pub background: Option<Srgba<u8>>,
    pub kern: f32,
    pub tracking: f32,
}

impl Default for TextContext {
    fn default() -> Self {
        Self {
            font: Query::default(),
            foreground: default_color(),
            background: None,
            kern: 0.,
            tracking: 0.,
        }
    }
}

impl TextContext {
    /// Applies a run's overrides on top of this base style.
    pub fn resolve(&self, overrides: &TextStyle) -> TextContext {
        TextContext {
            font: overrides.font.clone().unwrap_or_else(|| self.font.clone()),
            foreground: overrides.foreground.unwrap_or(self.foreground),
            background: overrides.background.or(self.background),
            kern: overrides.kern.unwrap_or(self.kern),
            tracking: overrides.tracking.unwrap_or(self.tracking),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unstyled_string_concatenates_sections() {
        let text = Text::from_sections([
            TextSection::new("Hello, ", TextStyle::default()),
            TextSection::new("world", TextStyle::default()),
        ]);
        assert_eq!(text.to_unstyled_string(), "Hello, world");
    }

    #[test]
    fn resolve_inherits_unset_attributes() {
        let base = TextContext {
            kern: 2.,
            ..Default::default()
        };
        let resolved = base.resolve(&TextStyle::default());
        assert_eq!(resolved.kern, 2.);
        assert_eq!(resolved.foreground, default_color());
    }

    #[test]
    fn resolve_prefers_overrides() {
        let base = TextContext::default();
        let red = Srgba::new(255, 0, 0, 255);
        let resolved = base.resolve(&TextStyle {
            foreground: Some(red),
            tracking: Some(1.5),
            ..Default::default()
        });
        assert_eq!(resolved.foreground, red);
        assert_eq!(resolved.tracking, 1.5);
        assert_eq!(resolved.background, None);
    }
}

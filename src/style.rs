//! Style descriptors attached to content blocks.
//!
//! Styles are plain values: they name a font family and face, a size, the line
//! leading and the vertical spacing around a block. They do not reference the
//! rendering crate, so a story can be inspected or rendered by any
//! [`Renderer`](crate::render::Renderer).

use crate::model::HeadingLevel;

/// Font family token used for every block. Renderers map it to a concrete font.
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";

/// An RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Pure black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Mid grey used for table grid lines.
    pub const GREY: Color = Color::rgb(128, 128, 128);
    /// Light grey used to shade table headers.
    pub const LIGHT_GREY: Color = Color::rgb(211, 211, 211);

    /// Creates a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Weight of the font face used by a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontFace {
    /// Regular weight.
    #[default]
    Regular,
    /// Bold weight.
    Bold,
}

impl FontFace {
    /// Returns `true` for [`FontFace::Bold`].
    pub fn is_bold(self) -> bool {
        matches!(self, FontFace::Bold)
    }
}

/// Immutable style of a text block.
///
/// Lengths are in PDF points. `leading` is the baseline-to-baseline distance,
/// so `leading / size` is the line spacing factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockStyle {
    family: &'static str,
    face: FontFace,
    size: u8,
    leading: f64,
    space_before: f64,
    space_after: f64,
    color: Color,
}

impl BlockStyle {
    /// Creates a regular black style with no spacing around the block.
    pub const fn new(size: u8, leading: f64) -> Self {
        Self {
            family: DEFAULT_FONT_FAMILY,
            face: FontFace::Regular,
            size,
            leading,
            space_before: 0.0,
            space_after: 0.0,
            color: Color::BLACK,
        }
    }

    /// Sets the font face and returns the updated style.
    pub const fn with_face(mut self, face: FontFace) -> Self {
        self.face = face;
        self
    }

    /// Sets the spacing above the block and returns the updated style.
    pub const fn with_space_before(mut self, points: f64) -> Self {
        self.space_before = points;
        self
    }

    /// Sets the spacing below the block and returns the updated style.
    pub const fn with_space_after(mut self, points: f64) -> Self {
        self.space_after = points;
        self
    }

    /// Sets the text color and returns the updated style.
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Font family token.
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Font face.
    pub fn face(&self) -> FontFace {
        self.face
    }

    /// Font size in points.
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Baseline-to-baseline distance in points.
    pub fn leading(&self) -> f64 {
        self.leading
    }

    /// Leading expressed as a multiple of the font size.
    pub fn line_spacing(&self) -> f64 {
        if self.size == 0 {
            1.0
        } else {
            self.leading / f64::from(self.size)
        }
    }

    /// Spacing above the block in points.
    pub fn space_before(&self) -> f64 {
        self.space_before
    }

    /// Spacing below the block in points.
    pub fn space_after(&self) -> f64 {
        self.space_after
    }

    /// Text color.
    pub fn color(&self) -> Color {
        self.color
    }
}

const HEADING_1: BlockStyle = BlockStyle::new(16, 20.0)
    .with_face(FontFace::Bold)
    .with_space_after(8.0);
const HEADING_2: BlockStyle = BlockStyle::new(13, 16.0)
    .with_face(FontFace::Bold)
    .with_space_before(6.0)
    .with_space_after(6.0);
const HEADING_3: BlockStyle = BlockStyle::new(11, 14.0)
    .with_face(FontFace::Bold)
    .with_space_before(4.0)
    .with_space_after(4.0);
const BODY: BlockStyle = BlockStyle::new(10, 14.0).with_space_after(4.0);

/// The styles available to one composition session.
///
/// A sheet is built once per [`DocumentComposer`](crate::composer::DocumentComposer)
/// and every block copies its style out of it.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSheet {
    headings: [BlockStyle; 3],
    body: BlockStyle,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            headings: [HEADING_1, HEADING_2, HEADING_3],
            body: BODY,
        }
    }
}

impl StyleSheet {
    /// Creates the default sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Style of a heading at the given level.
    pub fn heading(&self, level: HeadingLevel) -> BlockStyle {
        match level {
            HeadingLevel::H1 => self.headings[0],
            HeadingLevel::H2 => self.headings[1],
            HeadingLevel::H3 => self.headings[2],
        }
    }

    /// Style shared by paragraphs and bullet items.
    pub fn body(&self) -> BlockStyle {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::{FontFace, StyleSheet};
    use crate::model::HeadingLevel;

    #[test]
    fn heading_sizes_shrink_with_level() {
        let sheet = StyleSheet::new();
        let h1 = sheet.heading(HeadingLevel::H1);
        let h2 = sheet.heading(HeadingLevel::H2);
        let h3 = sheet.heading(HeadingLevel::H3);

        assert!(h1.size() > h2.size());
        assert!(h2.size() > h3.size());
        assert!(h3.size() > sheet.body().size());
    }

    #[test]
    fn headings_are_bold_and_body_is_regular() {
        let sheet = StyleSheet::new();
        for level in HeadingLevel::ALL {
            assert_eq!(sheet.heading(level).face(), FontFace::Bold);
        }
        assert_eq!(sheet.body().face(), FontFace::Regular);
    }

    #[test]
    fn line_spacing_is_leading_over_size() {
        let body = StyleSheet::new().body();
        assert!((body.line_spacing() - 1.4).abs() < 1e-9);
    }
}

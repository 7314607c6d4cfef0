//! `genpdf` elements used to lay out story blocks.
//!
//! The layout engine splits paragraphs wherever a page ends and refuses words that
//! are wider than a line. The elements in this module measure and wrap text
//! themselves so a block can be moved to the next page as a whole and long tokens
//! such as JSON payloads are broken at character boundaries.

use genpdf::error::Error;
use genpdf::style::{Color as PdfColor, Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Size};
use log::debug;

use crate::style::{BlockStyle, Color};

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;
/// Distance between the strokes used to shade a cell. Strokes are 1pt wide.
const SHADE_STEP_MM: f64 = 0.3;
const EPSILON_MM: f64 = 0.01;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

pub(crate) fn pt_to_mm(points: f64) -> f64 {
    points * MM_PER_INCH / POINTS_PER_INCH
}

pub(crate) fn pdf_color(color: Color) -> PdfColor {
    PdfColor::Rgb(color.r, color.g, color.b)
}

/// Converts a block style into a `genpdf` style.
pub(crate) fn pdf_style(style: &BlockStyle) -> Style {
    let mut pdf = Style::new()
        .with_font_size(style.size())
        .with_line_spacing(style.line_spacing())
        .with_color(pdf_color(style.color()));
    if style.face().is_bold() {
        pdf.set_bold();
    }
    pdf
}

fn text_width(context: &genpdf::Context, text: &str, style: Style) -> f64 {
    mm_to_f64(StyledString::new(text.to_owned(), style).width(&context.font_cache))
}

fn line_height(context: &genpdf::Context, style: Style) -> f64 {
    mm_to_f64(style.line_height(&context.font_cache))
}

/// Splits `word` into chunks that each fit into `width`.
///
/// Every chunk holds at least one character, so a column narrower than a single
/// glyph still makes progress.
fn break_word(context: &genpdf::Context, word: &str, style: Style, width: f64) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if current.chars().count() > 1 && text_width(context, &current, style) > width {
            current.pop();
            chunks.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Greedy word wrap of `text` into lines no wider than `width` millimetres.
///
/// Runs of whitespace collapse into single spaces.
pub(crate) fn wrap_lines(
    context: &genpdf::Context,
    text: &str,
    style: Style,
    width: f64,
) -> Vec<String> {
    let space = text_width(context, " ", style);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        let word_width = text_width(context, word, style);
        if current.is_empty() {
            if word_width > width {
                let mut chunks = break_word(context, word, style, width);
                let last = chunks.pop().unwrap_or_default();
                lines.extend(chunks);
                current_width = text_width(context, &last, style);
                current = last;
            } else {
                current.push_str(word);
                current_width = word_width;
            }
        } else if current_width + space + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += space + word_width;
        } else {
            lines.push(std::mem::take(&mut current));
            if word_width > width {
                let mut chunks = break_word(context, word, style, width);
                let last = chunks.pop().unwrap_or_default();
                lines.extend(chunks);
                current_width = text_width(context, &last, style);
                current = last;
            } else {
                current.push_str(word);
                current_width = word_width;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Elements that can report their full height before rendering.
pub(crate) trait Measure {
    /// Height in millimetres the element needs when rendered into `width`.
    fn measure(&mut self, context: &genpdf::Context, width: Mm, style: Style) -> f64;
}

/// Wrapped text with spacing above and below, used for headings, paragraphs and
/// bullet items.
pub(crate) struct TextElement {
    text: String,
    style: Style,
    space_before: f64,
    space_after: f64,
    layout: Option<(f64, Vec<String>)>,
    next_line: usize,
}

impl TextElement {
    pub(crate) fn new(text: impl Into<String>, style: &BlockStyle) -> Self {
        Self {
            text: text.into(),
            style: pdf_style(style),
            space_before: pt_to_mm(style.space_before()),
            space_after: pt_to_mm(style.space_after()),
            layout: None,
            next_line: 0,
        }
    }

    fn lines(&mut self, context: &genpdf::Context, width: f64, style: Style) -> &[String] {
        let stale = match &self.layout {
            Some((cached, _)) => (cached - width).abs() > EPSILON_MM,
            None => true,
        };
        if stale {
            let lines = wrap_lines(context, &self.text, style, width);
            self.layout = Some((width, lines));
        }
        self.layout
            .as_ref()
            .map(|(_, lines)| lines.as_slice())
            .unwrap_or_default()
    }
}

impl Measure for TextElement {
    fn measure(&mut self, context: &genpdf::Context, width: Mm, style: Style) -> f64 {
        let style = style.and(self.style);
        let line = line_height(context, style);
        let count = self.lines(context, mm_to_f64(width), style).len();
        self.space_before + line * count as f64 + self.space_after
    }
}

impl Element for TextElement {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let style = style.and(self.style);
        let line = line_height(context, style);
        let width = mm_to_f64(area.size().width);
        let mut used = 0.0;
        let mut result = RenderResult::default();

        if self.next_line == 0 && self.space_before > 0.0 {
            let gap = self.space_before.min(mm_to_f64(area.size().height));
            area.add_offset(Position::new(0, mm_from_f64(gap)));
            used += gap;
        }

        let lines = self.lines(context, width, style).to_vec();
        while self.next_line < lines.len() {
            if line > mm_to_f64(area.size().height) + EPSILON_MM {
                result.has_more = true;
                break;
            }
            match area.text_section(&context.font_cache, Position::new(0, 0), style) {
                Some(mut section) => section.print_str(&lines[self.next_line], style)?,
                None => {
                    result.has_more = true;
                    break;
                }
            }
            area.add_offset(Position::new(0, mm_from_f64(line)));
            used += line;
            self.next_line += 1;
        }

        if !result.has_more {
            used += self.space_after.min(mm_to_f64(area.size().height).max(0.0));
        }

        result.size = Size::new(area.size().width, mm_from_f64(used));
        Ok(result)
    }
}

/// Fixed vertical gap. Collapses to the remaining space at the bottom of a page.
pub(crate) struct GapElement {
    height: f64,
}

impl GapElement {
    pub(crate) fn from_points(points: f64) -> Self {
        Self {
            height: pt_to_mm(points),
        }
    }
}

impl Measure for GapElement {
    fn measure(&mut self, _context: &genpdf::Context, _width: Mm, _style: Style) -> f64 {
        0.0
    }
}

impl Element for GapElement {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let height = self.height.min(mm_to_f64(area.size().height).max(0.0));
        let mut result = RenderResult::default();
        result.size = Size::new(0, mm_from_f64(height));
        Ok(result)
    }
}

/// A fully resolved table cell ready for rendering.
pub(crate) struct GridCell {
    pub(crate) text: String,
    pub(crate) style: Style,
    pub(crate) background: Option<Color>,
    pub(crate) grid: Option<Color>,
    /// Padding in millimetres as top, right, bottom, left.
    pub(crate) padding: [f64; 4],
}

/// Table with shaded and gridlined cells.
///
/// Each row is measured before it is drawn so the shading can go underneath the
/// text. Rows never split; a row that does not fit moves to the next page.
pub(crate) struct GridTable {
    rows: Vec<Vec<GridCell>>,
    widths: Vec<f64>,
    page_height: f64,
    next_row: usize,
}

impl GridTable {
    pub(crate) fn new(rows: Vec<Vec<GridCell>>, widths: Vec<f64>, page_height: f64) -> Self {
        Self {
            rows,
            widths,
            page_height,
            next_row: 0,
        }
    }

    /// Left offset and width of every column in millimetres.
    ///
    /// Columns keep their nominal widths and shrink proportionally when the
    /// table is wider than `width`.
    fn columns(&self, width: f64) -> Vec<(f64, f64)> {
        let total: f64 = self.widths.iter().sum();
        let scale = if total > width { width / total } else { 1.0 };
        let mut x = 0.0;
        self.widths
            .iter()
            .map(|weight| {
                let column_width = weight * scale;
                let column = (x, column_width);
                x += column_width;
                column
            })
            .collect()
    }

    fn cell_lines(
        context: &genpdf::Context,
        cell: &GridCell,
        column_width: f64,
        style: Style,
    ) -> Vec<String> {
        let [_, right, _, left] = cell.padding;
        let inner = (column_width - left - right).max(0.0);
        wrap_lines(context, &cell.text, style.and(cell.style), inner)
    }

    fn row_height(
        context: &genpdf::Context,
        row: &[GridCell],
        columns: &[(f64, f64)],
        style: Style,
    ) -> f64 {
        row.iter()
            .zip(columns)
            .map(|(cell, (_, width))| {
                let cell_style = style.and(cell.style);
                let lines = Self::cell_lines(context, cell, *width, style).len().max(1);
                let [top, _, bottom, _] = cell.padding;
                top + line_height(context, cell_style) * lines as f64 + bottom
            })
            .fold(0.0, f64::max)
    }

    fn shade(area: &render::Area<'_>, x: f64, width: f64, height: f64, color: Color) {
        let stroke = Style::new().with_color(pdf_color(color));
        let mut y = SHADE_STEP_MM / 2.0;
        while y < height {
            area.draw_line(
                vec![
                    Position::new(mm_from_f64(x), mm_from_f64(y)),
                    Position::new(mm_from_f64(x + width), mm_from_f64(y)),
                ],
                stroke,
            );
            y += SHADE_STEP_MM;
        }
    }

    fn frame(area: &render::Area<'_>, x: f64, width: f64, height: f64, color: Color) {
        let stroke = Style::new().with_color(pdf_color(color));
        let (left, right) = (mm_from_f64(x), mm_from_f64(x + width));
        let (top, bottom) = (mm_from_f64(0.0), mm_from_f64(height));
        area.draw_line(
            vec![
                Position::new(left, top),
                Position::new(right, top),
                Position::new(right, bottom),
                Position::new(left, bottom),
                Position::new(left, top),
            ],
            stroke,
        );
    }
}

impl Measure for GridTable {
    fn measure(&mut self, context: &genpdf::Context, width: Mm, style: Style) -> f64 {
        let columns = self.columns(mm_to_f64(width));
        self.rows[self.next_row..]
            .iter()
            .map(|row| Self::row_height(context, row, &columns, style))
            .sum()
    }
}

impl Element for GridTable {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let columns = self.columns(mm_to_f64(area.size().width));
        let table_width = columns.last().map_or(0.0, |(x, width)| x + width);
        let mut result = RenderResult::default();
        let mut used = 0.0;
        let mut rendered = 0;

        while self.next_row < self.rows.len() {
            let row = &self.rows[self.next_row];
            let height = Self::row_height(context, row, &columns, style);
            let available = mm_to_f64(area.size().height);
            let fresh_page = available + EPSILON_MM >= self.page_height;
            if height > available + EPSILON_MM && (rendered > 0 || !fresh_page) {
                debug!(
                    "table row {} ({:.1} mm) continues on the next page",
                    self.next_row, height
                );
                result.has_more = true;
                break;
            }

            for (cell, (x, width)) in row.iter().zip(&columns) {
                if let Some(color) = cell.background {
                    Self::shade(&area, *x, *width, height, color);
                }
            }

            for (cell, (x, width)) in row.iter().zip(&columns) {
                let cell_style = style.and(cell.style);
                let line = line_height(context, cell_style);
                let [top, _, _, left] = cell.padding;
                let mut cell_area = area.clone();
                cell_area.add_offset(Position::new(mm_from_f64(x + left), mm_from_f64(top)));
                for text in Self::cell_lines(context, cell, *width, style) {
                    if let Some(mut section) =
                        cell_area.text_section(&context.font_cache, Position::new(0, 0), cell_style)
                    {
                        section.print_str(&text, cell_style)?;
                    }
                    cell_area.add_offset(Position::new(0, mm_from_f64(line)));
                }
            }

            for (cell, (x, width)) in row.iter().zip(&columns) {
                if let Some(color) = cell.grid {
                    Self::frame(&area, *x, *width, height, color);
                }
            }

            area.add_offset(Position::new(0, mm_from_f64(height)));
            used += height;
            rendered += 1;
            self.next_row += 1;
        }

        result.size = Size::new(mm_from_f64(table_width), mm_from_f64(used));
        Ok(result)
    }
}

/// Moves its element to the next page when it does not fit on the current one.
///
/// An element taller than an empty page is rendered where it is and continues
/// across pages.
pub(crate) struct KeepTogether<E> {
    inner: E,
    kind: &'static str,
    page_height: f64,
    started: bool,
}

impl<E: Element + Measure> KeepTogether<E> {
    pub(crate) fn new(inner: E, kind: &'static str, page_height: f64) -> Self {
        Self {
            inner,
            kind,
            page_height,
            started: false,
        }
    }
}

impl<E: Element + Measure> Element for KeepTogether<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        if !self.started {
            let needed = self.inner.measure(context, area.size().width, style);
            let available = mm_to_f64(area.size().height);
            let fresh_page = available + EPSILON_MM >= self.page_height;
            if needed > available + EPSILON_MM && !fresh_page {
                debug!(
                    "{} block needs {:.1} mm, {:.1} mm left; moving to next page",
                    self.kind, needed, available
                );
                let mut result = RenderResult::default();
                result.has_more = true;
                return Ok(result);
            }
            self.started = true;
        }
        self.inner.render(context, area, style)
    }
}

/// Any block of a story as a `genpdf` element.
pub(crate) enum BlockElement {
    Text(TextElement),
    Gap(GapElement),
    Table(GridTable),
}

impl Measure for BlockElement {
    fn measure(&mut self, context: &genpdf::Context, width: Mm, style: Style) -> f64 {
        match self {
            BlockElement::Text(element) => element.measure(context, width, style),
            BlockElement::Gap(element) => element.measure(context, width, style),
            BlockElement::Table(element) => element.measure(context, width, style),
        }
    }
}

impl Element for BlockElement {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        match self {
            BlockElement::Text(element) => element.render(context, area, style),
            BlockElement::Gap(element) => element.render(context, area, style),
            BlockElement::Table(element) => element.render(context, area, style),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{mm_from_f64, mm_to_f64, pdf_style, pt_to_mm};
    use crate::model::HeadingLevel;
    use crate::style::StyleSheet;

    #[test]
    fn points_convert_to_millimetres() {
        assert!((pt_to_mm(72.0) - 25.4).abs() < 1e-9);
        assert!((pt_to_mm(8.0) - 2.822_222).abs() < 1e-6);
    }

    #[test]
    fn mm_round_trips_through_layout_units() {
        assert!((mm_to_f64(mm_from_f64(17.4)) - 17.4).abs() < 1e-9);
    }

    #[test]
    fn heading_style_maps_size_and_weight() {
        let style = pdf_style(&StyleSheet::new().heading(HeadingLevel::H1));
        assert_eq!(style.font_size(), 16);
        assert!(style.is_bold());
    }
}

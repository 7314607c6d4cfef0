//! Data structures describing the logical content of a document.
//!
//! A [`Story`] is the ordered list of [`ContentBlock`] values that make up a
//! document body. Blocks are validated when they are constructed, so a story that
//! exists is always renderable. The types avoid referencing the rendering crate
//! directly so a story can be inspected in tests or handed to any renderer.

use std::fmt;
use std::slice;

use crate::error::ContentError;
use crate::style::{BlockStyle, Color, FontFace};

/// Literal prefix that turns a paragraph into a bullet item.
pub const BULLET_MARKER: &str = "- ";

/// Heading depth. Only three levels exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadingLevel {
    /// Document title.
    H1,
    /// Section heading.
    H2,
    /// Subsection heading.
    H3,
}

impl HeadingLevel {
    /// Every level in ascending depth.
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    /// Numeric level, starting at 1.
    pub fn number(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = ContentError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(HeadingLevel::H1),
            2 => Ok(HeadingLevel::H2),
            3 => Ok(HeadingLevel::H3),
            other => Err(ContentError::UnsupportedHeadingLevel(other)),
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.number())
    }
}

/// A run of text rendered with a single style.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    text: String,
    style: BlockStyle,
}

impl TextBlock {
    pub(crate) fn new(text: impl Into<String>, style: BlockStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Style resolved when the block was constructed.
    pub fn style(&self) -> &BlockStyle {
        &self.style
    }
}

/// Removes the bullet marker from a bullet item's text.
///
/// Returns `None` when the text does not start with [`BULLET_MARKER`].
pub fn strip_bullet(text: &str) -> Option<&str> {
    text.strip_prefix(BULLET_MARKER)
}

/// One discrete unit of document content.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentBlock {
    /// Heading text at a given level.
    Heading {
        /// Heading depth.
        level: HeadingLevel,
        /// Text and style.
        content: TextBlock,
    },
    /// Body text.
    Paragraph(TextBlock),
    /// Body text prefixed with [`BULLET_MARKER`].
    BulletItem(TextBlock),
    /// A grid of cells with a header row.
    Table(TableSpec),
    /// Fixed vertical gap.
    Spacer {
        /// Height of the gap in points.
        height_pt: f64,
    },
}

impl ContentBlock {
    /// Short name of the block kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Heading { .. } => "heading",
            ContentBlock::Paragraph(_) => "paragraph",
            ContentBlock::BulletItem(_) => "bullet",
            ContentBlock::Table(_) => "table",
            ContentBlock::Spacer { .. } => "spacer",
        }
    }

    /// Text and style of heading, paragraph and bullet blocks.
    pub fn text_block(&self) -> Option<&TextBlock> {
        match self {
            ContentBlock::Heading { content, .. }
            | ContentBlock::Paragraph(content)
            | ContentBlock::BulletItem(content) => Some(content),
            ContentBlock::Table(_) | ContentBlock::Spacer { .. } => None,
        }
    }
}

/// Ordered, append-only list of blocks forming a document body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Story {
    blocks: Vec<ContentBlock>,
}

impl Story {
    /// Creates an empty story.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block at the end of the story.
    pub fn push(&mut self, block: ContentBlock) {
        self.blocks.push(block);
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` when no block has been appended.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks in rendering order.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Iterates the blocks in rendering order.
    pub fn iter(&self) -> slice::Iter<'_, ContentBlock> {
        self.blocks.iter()
    }
}

impl Extend<ContentBlock> for Story {
    fn extend<I: IntoIterator<Item = ContentBlock>>(&mut self, iter: I) {
        self.blocks.extend(iter);
    }
}

impl IntoIterator for Story {
    type Item = ContentBlock;
    type IntoIter = std::vec::IntoIter<ContentBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.into_iter()
    }
}

impl<'a> IntoIterator for &'a Story {
    type Item = &'a ContentBlock;
    type IntoIter = slice::Iter<'a, ContentBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Rectangular region of a table addressed by `(column, row)` corners.
///
/// Indices are inclusive. Negative values count from the end, so `-1` is the
/// last column or row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    start: (isize, isize),
    end: (isize, isize),
}

impl CellRange {
    /// Creates a range from its `(column, row)` corners.
    pub const fn new(start: (isize, isize), end: (isize, isize)) -> Self {
        Self { start, end }
    }

    /// Every cell of the table.
    pub const fn all() -> Self {
        Self::new((0, 0), (-1, -1))
    }

    /// The header row.
    pub const fn header() -> Self {
        Self::new((0, 0), (-1, 0))
    }

    /// Every row below the header.
    pub const fn body() -> Self {
        Self::new((0, 1), (-1, -1))
    }

    fn resolve(index: isize, len: usize) -> Option<usize> {
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        (resolved < len).then_some(resolved)
    }

    /// Resolves the range against a table size.
    ///
    /// Returns inclusive `(first_column, first_row, last_column, last_row)` or
    /// `None` when the range is empty or outside the table.
    pub fn bounds(&self, columns: usize, rows: usize) -> Option<(usize, usize, usize, usize)> {
        let first_column = Self::resolve(self.start.0, columns)?;
        let first_row = Self::resolve(self.start.1, rows)?;
        let last_column = Self::resolve(self.end.0, columns)?;
        let last_row = Self::resolve(self.end.1, rows)?;
        (first_column <= last_column && first_row <= last_row)
            .then_some((first_column, first_row, last_column, last_row))
    }
}

/// A styling instruction applied to a [`CellRange`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TableCommand {
    /// Shade the cells.
    Background(Color),
    /// Text color.
    TextColor(Color),
    /// Bold or regular face.
    Bold(bool),
    /// Font size in points.
    FontSize(u8),
    /// Draw a grid line around each cell.
    Grid(Color),
    /// Left cell padding in points.
    LeftPadding(f64),
    /// Right cell padding in points.
    RightPadding(f64),
}

/// A command bound to the region it styles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableRule {
    /// Cells the command applies to.
    pub range: CellRange,
    /// The styling instruction.
    pub command: TableCommand,
}

/// Ordered list of table rules. Later rules win where ranges overlap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableStyle {
    rules: Vec<TableRule>,
}

impl TableStyle {
    /// Creates an empty rule list; cells use [`CellStyle::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Header shaded light grey and bold, 9pt text, grey grid and 4pt padding.
    pub fn standard() -> Self {
        Self::new()
            .with(CellRange::header(), TableCommand::Background(Color::LIGHT_GREY))
            .with(CellRange::header(), TableCommand::TextColor(Color::BLACK))
            .with(CellRange::header(), TableCommand::Bold(true))
            .with(CellRange::all(), TableCommand::FontSize(9))
            .with(CellRange::all(), TableCommand::Grid(Color::GREY))
            .with(CellRange::all(), TableCommand::LeftPadding(4.0))
            .with(CellRange::all(), TableCommand::RightPadding(4.0))
    }

    /// Appends a rule and returns the updated style.
    pub fn with(mut self, range: CellRange, command: TableCommand) -> Self {
        self.rules.push(TableRule { range, command });
        self
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[TableRule] {
        &self.rules
    }
}

impl From<Vec<TableRule>> for TableStyle {
    fn from(rules: Vec<TableRule>) -> Self {
        Self { rules }
    }
}

/// Resolved appearance of one table cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellStyle {
    /// Shading behind the cell, if any.
    pub background: Option<Color>,
    /// Text color.
    pub text_color: Color,
    /// Font face.
    pub face: FontFace,
    /// Font size in points.
    pub font_size: u8,
    /// Grid line color, if the cell is gridlined.
    pub grid: Option<Color>,
    /// Left padding in points.
    pub left_padding: f64,
    /// Right padding in points.
    pub right_padding: f64,
    /// Top padding in points.
    pub top_padding: f64,
    /// Bottom padding in points.
    pub bottom_padding: f64,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            background: None,
            text_color: Color::BLACK,
            face: FontFace::Regular,
            font_size: 10,
            grid: None,
            left_padding: 6.0,
            right_padding: 6.0,
            top_padding: 3.0,
            bottom_padding: 3.0,
        }
    }
}

impl CellStyle {
    /// Baseline-to-baseline distance, 1.2 times the font size.
    pub fn leading(&self) -> f64 {
        f64::from(self.font_size) * 1.2
    }

    fn apply(&mut self, command: TableCommand) {
        match command {
            TableCommand::Background(color) => self.background = Some(color),
            TableCommand::TextColor(color) => self.text_color = color,
            TableCommand::Bold(true) => self.face = FontFace::Bold,
            TableCommand::Bold(false) => self.face = FontFace::Regular,
            TableCommand::FontSize(size) => self.font_size = size,
            TableCommand::Grid(color) => self.grid = Some(color),
            TableCommand::LeftPadding(points) => self.left_padding = points,
            TableCommand::RightPadding(points) => self.right_padding = points,
        }
    }
}

/// A validated table: header row, data rows, column widths and style rules.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSpec {
    rows: Vec<Vec<String>>,
    column_widths: Vec<f64>,
    style: TableStyle,
}

impl TableSpec {
    /// Validates and creates a table.
    ///
    /// `rows[0]` is the header. Every row must have the header's length, there
    /// must be one positive width (in millimetres) per column, and every rule
    /// must address cells inside the table.
    pub fn new<R, C>(
        rows: R,
        column_widths: impl Into<Vec<f64>>,
        style: impl Into<TableStyle>,
    ) -> Result<Self, ContentError>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let column_widths = column_widths.into();
        let style = style.into();

        let header = rows.first().ok_or(ContentError::EmptyTable)?;
        let columns = header.len();
        if columns == 0 {
            return Err(ContentError::EmptyHeader);
        }

        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns)
        {
            return Err(ContentError::RaggedRow {
                row,
                expected: columns,
                found: cells.len(),
            });
        }

        if column_widths.len() != columns {
            return Err(ContentError::ColumnWidthMismatch {
                expected: columns,
                found: column_widths.len(),
            });
        }

        if let Some((column, &width)) = column_widths
            .iter()
            .enumerate()
            .find(|(_, width)| !(width.is_finite() && **width > 0.0))
        {
            return Err(ContentError::InvalidColumnWidth { column, width });
        }

        if let Some(rule) = style
            .rules()
            .iter()
            .position(|rule| rule.range.bounds(columns, rows.len()).is_none())
        {
            return Err(ContentError::StyleRangeOutOfBounds {
                rule,
                columns,
                rows: rows.len(),
            });
        }

        Ok(Self {
            rows,
            column_widths,
            style,
        })
    }

    /// All rows, header first.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// The header row.
    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    /// Number of rows including the header.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    /// Column widths in millimetres.
    pub fn column_widths(&self) -> &[f64] {
        &self.column_widths
    }

    /// Style rules in application order.
    pub fn style(&self) -> &TableStyle {
        &self.style
    }

    /// Folds every rule covering `(column, row)` into a [`CellStyle`].
    pub fn cell_style(&self, column: usize, row: usize) -> CellStyle {
        let columns = self.column_count();
        let rows = self.row_count();
        let mut cell = CellStyle::default();
        for rule in self.style.rules() {
            if let Some((c0, r0, c1, r1)) = rule.range.bounds(columns, rows) {
                if (c0..=c1).contains(&column) && (r0..=r1).contains(&row) {
                    cell.apply(rule.command);
                }
            }
        }
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::{
        strip_bullet, CellRange, ContentBlock, HeadingLevel, Story, TableCommand, TableSpec,
        TableStyle, BULLET_MARKER,
    };
    use crate::error::ContentError;
    use crate::style::{Color, FontFace};

    fn schema_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Field", "Type", "Notes"],
            vec!["_id", "ObjectId", "Primary key"],
            vec!["name", "String", "User name"],
        ]
    }

    #[test]
    fn heading_level_accepts_one_to_three() {
        assert_eq!(HeadingLevel::try_from(1u8), Ok(HeadingLevel::H1));
        assert_eq!(HeadingLevel::try_from(3u8), Ok(HeadingLevel::H3));
        assert_eq!(
            HeadingLevel::try_from(0u8),
            Err(ContentError::UnsupportedHeadingLevel(0))
        );
        assert_eq!(
            HeadingLevel::try_from(4u8),
            Err(ContentError::UnsupportedHeadingLevel(4))
        );
    }

    #[test]
    fn table_keeps_row_count() {
        let table = TableSpec::new(schema_rows(), vec![45.0, 35.0, 82.0], TableStyle::standard())
            .expect("valid table");
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.header(), ["Field", "Type", "Notes"]);
    }

    #[test]
    fn ragged_row_is_rejected() {
        let err = TableSpec::new(
            vec![vec!["A", "B", "C"], vec!["1", "2"]],
            vec![1.0, 1.0, 1.0],
            TableStyle::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ContentError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn empty_rows_are_rejected() {
        let rows: Vec<Vec<String>> = Vec::new();
        assert_eq!(
            TableSpec::new(rows, Vec::<f64>::new(), TableStyle::new()).unwrap_err(),
            ContentError::EmptyTable
        );

        let header_only: Vec<Vec<String>> = vec![Vec::new()];
        assert_eq!(
            TableSpec::new(header_only, Vec::<f64>::new(), TableStyle::new()).unwrap_err(),
            ContentError::EmptyHeader
        );
    }

    #[test]
    fn width_count_must_match_columns() {
        let err = TableSpec::new(schema_rows(), vec![45.0, 35.0], TableStyle::new()).unwrap_err();
        assert_eq!(
            err,
            ContentError::ColumnWidthMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn non_positive_width_is_rejected() {
        let err =
            TableSpec::new(schema_rows(), vec![45.0, 0.0, 82.0], TableStyle::new()).unwrap_err();
        assert!(matches!(
            err,
            ContentError::InvalidColumnWidth { column: 1, .. }
        ));
    }

    #[test]
    fn rule_outside_table_is_rejected() {
        let style = TableStyle::new().with(
            CellRange::new((0, 5), (0, 5)),
            TableCommand::Bold(true),
        );
        let err = TableSpec::new(schema_rows(), vec![1.0, 1.0, 1.0], style).unwrap_err();
        assert!(matches!(
            err,
            ContentError::StyleRangeOutOfBounds { rule: 0, .. }
        ));
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        assert_eq!(CellRange::all().bounds(3, 4), Some((0, 0, 2, 3)));
        assert_eq!(CellRange::header().bounds(3, 4), Some((0, 0, 2, 0)));
        assert_eq!(CellRange::body().bounds(3, 1), None);
        assert_eq!(CellRange::new((-4, 0), (-1, 0)).bounds(3, 1), None);
    }

    #[test]
    fn standard_style_shades_and_bolds_the_header() {
        let table = TableSpec::new(schema_rows(), vec![45.0, 35.0, 82.0], TableStyle::standard())
            .expect("valid table");

        let header = table.cell_style(2, 0);
        assert_eq!(header.background, Some(Color::LIGHT_GREY));
        assert_eq!(header.face, FontFace::Bold);
        assert_eq!(header.font_size, 9);
        assert_eq!(header.grid, Some(Color::GREY));
        assert_eq!(header.left_padding, 4.0);

        let body = table.cell_style(0, 2);
        assert_eq!(body.background, None);
        assert_eq!(body.face, FontFace::Regular);
        assert_eq!(body.grid, Some(Color::GREY));
    }

    #[test]
    fn later_rules_override_earlier_ones() {
        let style = TableStyle::new()
            .with(CellRange::all(), TableCommand::FontSize(9))
            .with(CellRange::new((1, 1), (1, 1)), TableCommand::FontSize(12));
        let table = TableSpec::new(schema_rows(), vec![1.0, 1.0, 1.0], style).expect("valid");
        assert_eq!(table.cell_style(1, 1).font_size, 12);
        assert_eq!(table.cell_style(0, 1).font_size, 9);
        assert_eq!(table.cell_style(0, 1).left_padding, 6.0);
    }

    #[test]
    fn strip_bullet_requires_marker() {
        let text = format!("{}item", BULLET_MARKER);
        assert_eq!(strip_bullet(&text), Some("item"));
        assert_eq!(strip_bullet("item"), None);
    }

    #[test]
    fn story_preserves_append_order() {
        let mut story = Story::new();
        story.push(ContentBlock::Spacer { height_pt: 1.0 });
        story.push(ContentBlock::Spacer { height_pt: 2.0 });
        story.push(ContentBlock::Spacer { height_pt: 3.0 });

        let heights: Vec<f64> = story
            .iter()
            .map(|block| match block {
                ContentBlock::Spacer { height_pt } => *height_pt,
                other => panic!("unexpected block {}", other.kind()),
            })
            .collect();
        assert_eq!(heights, vec![1.0, 2.0, 3.0]);
    }
}

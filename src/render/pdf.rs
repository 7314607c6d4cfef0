//! [`Renderer`] backed by `genpdf`.

use std::path::PathBuf;

use log::{debug, info};

use super::document::DocumentBuilder;
use super::elements::{BlockElement, GapElement, GridCell, GridTable, KeepTogether, TextElement};
use super::elements::{pdf_style, pt_to_mm};
use super::Renderer;
use crate::config::PageConfig;
use crate::error::RenderError;
use crate::model::{ContentBlock, Story, TableSpec};
use crate::style::BlockStyle;

#[cfg(feature = "bookmarks")]
use crate::bookmarks::{self, HeadingMark};
#[cfg(feature = "bookmarks")]
use crate::model::HeadingLevel;
#[cfg(feature = "bookmarks")]
use std::{cell::RefCell, rc::Rc};

/// Renders stories to PDF with `genpdf`.
///
/// Text uses the builtin Helvetica family with metrics from the fonts found by
/// [`crate::fonts::resolve_font_directory`].
#[derive(Clone, Debug, Default)]
pub struct GenpdfRenderer {
    fonts_dir: Option<PathBuf>,
    #[cfg(feature = "bookmarks")]
    bookmarks: bool,
}

impl GenpdfRenderer {
    /// Creates a renderer that searches the default font locations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches `dir` for fonts before the default locations.
    pub fn with_fonts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fonts_dir = Some(dir.into());
        self
    }

    /// Embeds an outline with one entry per level-1 and level-2 heading.
    #[cfg(feature = "bookmarks")]
    pub fn with_bookmarks(mut self, enabled: bool) -> Self {
        self.bookmarks = enabled;
        self
    }
}

fn table_element(table: &TableSpec, page_height: f64) -> GridTable {
    let rows = table
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(column, text)| {
                    let cell = table.cell_style(column, row);
                    let style = BlockStyle::new(cell.font_size, cell.leading())
                        .with_face(cell.face)
                        .with_color(cell.text_color);
                    GridCell {
                        text: text.clone(),
                        style: pdf_style(&style),
                        background: cell.background,
                        grid: cell.grid,
                        padding: [
                            pt_to_mm(cell.top_padding),
                            pt_to_mm(cell.right_padding),
                            pt_to_mm(cell.bottom_padding),
                            pt_to_mm(cell.left_padding),
                        ],
                    }
                })
                .collect()
        })
        .collect();

    GridTable::new(rows, table.column_widths().to_vec(), page_height)
}

fn block_element(block: &ContentBlock, page_height: f64) -> BlockElement {
    match block {
        ContentBlock::Heading { content, .. }
        | ContentBlock::Paragraph(content)
        | ContentBlock::BulletItem(content) => {
            BlockElement::Text(TextElement::new(content.text(), content.style()))
        }
        ContentBlock::Table(table) => BlockElement::Table(table_element(table, page_height)),
        ContentBlock::Spacer { height_pt } => {
            BlockElement::Gap(GapElement::from_points(*height_pt))
        }
    }
}

impl Renderer for GenpdfRenderer {
    fn render(&mut self, config: &PageConfig, story: Story) -> Result<Vec<u8>, RenderError> {
        let builder = DocumentBuilder::new(config).with_fonts_dir(self.fonts_dir.clone());
        let pages = builder.page_counter();
        let mut document = builder.build().map_err(RenderError::FontLoad)?;

        let page_height = config.body_height();
        let block_count = story.len();
        debug!(
            "rendering {} blocks, {:.1} mm of body height per page",
            block_count, page_height
        );

        #[cfg(feature = "bookmarks")]
        let marks: Rc<RefCell<Vec<HeadingMark>>> = Rc::default();

        for block in &story {
            let element =
                KeepTogether::new(block_element(block, page_height), block.kind(), page_height);

            #[cfg(feature = "bookmarks")]
            if let ContentBlock::Heading {
                level: HeadingLevel::H1 | HeadingLevel::H2,
                content,
            } = block
            {
                if self.bookmarks {
                    document.push(bookmarks::Marked::new(
                        element,
                        content.text().to_owned(),
                        pages.clone(),
                        Rc::clone(&marks),
                    ));
                    continue;
                }
            }

            document.push(element);
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(RenderError::Layout)?;
        info!(
            "rendered {} blocks onto {} pages ({} bytes)",
            block_count,
            pages.current(),
            bytes.len()
        );

        #[cfg(feature = "bookmarks")]
        let bytes = if self.bookmarks {
            let marks = marks.borrow();
            debug!("embedding {} outline entries", marks.len());
            bookmarks::apply_heading_bookmarks(&bytes, &marks).map_err(RenderError::Outline)?
        } else {
            bytes
        };

        Ok(bytes)
    }
}

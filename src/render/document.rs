//! Construction of `genpdf::Document` instances from a [`PageConfig`].

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use genpdf::error::{Error, ErrorKind};
use genpdf::style;
use genpdf::{Margins, Mm, PageDecorator, Size};
use log::trace;

use crate::config::PageConfig;
use crate::fonts;

/// Number of pages started so far, shared between the page decorator and the
/// elements that need to know where they were placed.
#[derive(Clone, Debug, Default)]
pub(crate) struct PageCounter(Rc<Cell<usize>>);

impl PageCounter {
    /// One-based number of the page currently being filled.
    pub(crate) fn current(&self) -> usize {
        self.0.get()
    }

    fn advance(&self) -> usize {
        let page = self.0.get() + 1;
        self.0.set(page);
        page
    }
}

/// Builder for `genpdf::Document` instances configured from a [`PageConfig`].
pub(crate) struct DocumentBuilder<'a> {
    config: &'a PageConfig,
    fonts_dir: Option<PathBuf>,
    pages: PageCounter,
}

impl<'a> DocumentBuilder<'a> {
    pub(crate) fn new(config: &'a PageConfig) -> Self {
        Self {
            config,
            fonts_dir: None,
            pages: PageCounter::default(),
        }
    }

    /// Searches `dir` for fonts before the default locations.
    pub(crate) fn with_fonts_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.fonts_dir = dir;
        self
    }

    /// Counter that tracks the page being filled while the document renders.
    pub(crate) fn page_counter(&self) -> PageCounter {
        self.pages.clone()
    }

    /// Loads fonts and returns a document with paper size, margins and title set.
    ///
    /// Font failures are returned separately from layout failures so callers can
    /// tell a missing font installation from a broken document.
    pub(crate) fn build(self) -> Result<genpdf::Document, Error> {
        let font_family = fonts::default_font_family(self.fonts_dir.as_deref())?;
        let mut document = genpdf::Document::new(font_family);

        let paper = self.config.paper();
        document.set_paper_size(Size::new(paper.width, paper.height));
        document.set_title(self.config.title());
        document.set_font_size(10);

        let margins = self.config.margins();
        let decorator = MarginDecorator {
            margins: Margins::trbl(margins.top, margins.right, margins.bottom, margins.left),
            pages: self.pages,
        };
        document.set_page_decorator(decorator);

        Ok(document)
    }
}

struct MarginDecorator {
    margins: Margins,
    pages: PageCounter,
}

impl PageDecorator for MarginDecorator {
    fn decorate_page<'a>(
        &mut self,
        _context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        _style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        let page = self.pages.advance();
        area.add_margins(self.margins);

        let size = area.size();
        if size.width <= Mm::default() || size.height <= Mm::default() {
            return Err(Error::new(
                format!("Margins leave no printable area on page {}", page),
                ErrorKind::InvalidData,
            ));
        }

        trace!("starting page {}", page);
        Ok(area)
    }
}

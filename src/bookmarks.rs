//! Heading outline embedding built on top of `lopdf`.
//!
//! While a story renders, [`Marked`] records the page on which each outlined
//! heading lands. [`apply_heading_bookmarks`] then reopens the rendered bytes and
//! adds a flat `/Outlines` tree pointing at those pages.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use genpdf::error::Error;
use genpdf::style::Style;
use genpdf::{render, Element, Mm, RenderResult};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::render::document::PageCounter;

/// A heading title and the one-based page it was placed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingMark {
    /// Heading text shown in the outline.
    pub title: String,
    /// Page the heading starts on.
    pub page: usize,
}

/// Failures while adding the outline to rendered bytes.
#[derive(Debug, thiserror::Error)]
pub enum BookmarkError {
    /// `lopdf` could not read or write the document.
    #[error("cannot process rendered PDF")]
    Pdf(#[from] lopdf::Error),
    /// The trailer has no usable `/Root` reference.
    #[error("document catalog is missing")]
    MissingCatalog,
    /// `/Root` does not point at a dictionary.
    #[error("document catalog is not a dictionary")]
    InvalidCatalog,
    /// A heading was recorded on a page the document does not have.
    #[error("heading {title:?} points at page {page}, which does not exist")]
    MissingPage {
        /// Heading text.
        title: String,
        /// One-based page number.
        page: usize,
    },
}

/// Records the page an element is placed on.
///
/// A render pass that reports more content without drawing anything means the
/// element moved to the next page, so nothing is recorded for it.
pub(crate) struct Marked<E> {
    inner: E,
    title: String,
    pages: PageCounter,
    marks: Rc<RefCell<Vec<HeadingMark>>>,
    recorded: bool,
}

impl<E: Element> Marked<E> {
    pub(crate) fn new(
        inner: E,
        title: String,
        pages: PageCounter,
        marks: Rc<RefCell<Vec<HeadingMark>>>,
    ) -> Self {
        Self {
            inner,
            title,
            pages,
            marks,
            recorded: false,
        }
    }
}

impl<E: Element> Element for Marked<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.inner.render(context, area, style)?;
        let placed = !result.has_more || result.size.height > Mm::default();
        if placed && !self.recorded {
            self.recorded = true;
            self.marks.borrow_mut().push(HeadingMark {
                title: self.title.clone(),
                page: self.pages.current(),
            });
        }
        Ok(result)
    }
}

/// Applies a flat outline mapping headings to the pages they start on.
///
/// The function opens the provided PDF bytes using `lopdf`, builds an `/Outlines`
/// dictionary, and associates each heading with a `/Dest [page /Fit]` entry.
pub fn apply_heading_bookmarks(
    pdf_bytes: &[u8],
    marks: &[HeadingMark],
) -> Result<Vec<u8>, BookmarkError> {
    if marks.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;

    let pages = document.get_pages();
    let mut outline_entries = collect_outline_entries(&mut document, marks, &pages)?;

    let outlines_id = document.new_object_id();
    link_outline_entries(outlines_id, &mut document, &mut outline_entries);

    insert_outlines_root(outlines_id, &mut document, &outline_entries)?;

    let mut buffer = Vec::new();
    document
        .save_to(&mut buffer)
        .map_err(|err| BookmarkError::Pdf(err.into()))?;
    Ok(buffer)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn collect_outline_entries(
    document: &mut Document,
    marks: &[HeadingMark],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    marks
        .iter()
        .map(|mark| {
            let page_ref = u32::try_from(mark.page)
                .ok()
                .and_then(|page| pages.get(&page).copied())
                .ok_or_else(|| BookmarkError::MissingPage {
                    title: mark.title.clone(),
                    page: mark.page,
                })?;

            Ok(OutlineEntry {
                object_id: document.new_object_id(),
                page_ref,
                title: mark.title.clone(),
            })
        })
        .collect()
}

fn link_outline_entries(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &mut [OutlineEntry],
) {
    for index in 0..entries.len() {
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", Object::string_literal(entries[index].title.as_str()));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entries[index].page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }

        if index + 1 < entries.len() {
            dictionary.set("Next", Object::Reference(entries[index + 1].object_id));
        }

        document
            .objects
            .insert(entries[index].object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }

    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_heading_bookmarks, HeadingMark};

    #[test]
    fn no_marks_returns_input_unchanged() {
        let bytes = b"%PDF-1.3 not parsed".to_vec();
        let output = apply_heading_bookmarks(&bytes, &[]).expect("no-op");
        assert_eq!(output, bytes);
    }

    #[test]
    fn garbage_input_is_a_parse_error() {
        let marks = [HeadingMark {
            title: "Overview".into(),
            page: 1,
        }];
        let err = apply_heading_bookmarks(b"not a pdf", &marks).unwrap_err();
        assert!(matches!(err, super::BookmarkError::Pdf(_)));
    }
}

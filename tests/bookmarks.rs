#![cfg(feature = "bookmarks")]

use std::collections::BTreeMap;

use apidoc_composer::fonts;
use apidoc_composer::reference::restro_api_story;
use apidoc_composer::{DocumentComposer, GenpdfRenderer, PageConfig, Renderer};
use chrono::NaiveDate;
use lopdf::{Dictionary, Document, Object, ObjectId};

const SKIP_HINT: &str =
    "fonts missing. Set APIDOC_FONTS_DIR or copy assets/fonts next to the binary.";

/// The document title plus sections 1 to 8.
const EXPECTED_ENTRIES: usize = 9;

fn alphanumeric(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

fn reference_pdf() -> Vec<u8> {
    let generated_at = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("timestamp");
    let mut composer = DocumentComposer::new(PageConfig::default());
    restro_api_story(&mut composer, generated_at).expect("story");

    GenpdfRenderer::new()
        .with_bookmarks(true)
        .render(composer.config(), composer.story().clone())
        .expect("reference renders")
}

fn reference_to(object: &Object) -> ObjectId {
    object.as_reference().expect("indirect reference")
}

/// Walks `/Outlines` from `/First` along `/Next`.
fn outline_entries(document: &Document) -> Vec<&Dictionary> {
    let root = reference_to(document.trailer.get(b"Root").expect("trailer root"));
    let catalog = document.get_dictionary(root).expect("catalog");
    let outlines_id = reference_to(catalog.get(b"Outlines").expect("catalog outlines"));
    let outlines = document.get_dictionary(outlines_id).expect("outlines");

    let mut entries = Vec::new();
    let mut next = outlines.get(b"First").ok().map(reference_to);
    while let Some(id) = next {
        let entry = document.get_dictionary(id).expect("outline entry");
        next = entry.get(b"Next").ok().map(reference_to);
        entries.push(entry);
    }

    let count = outlines
        .get(b"Count")
        .and_then(Object::as_i64)
        .expect("outline count");
    assert_eq!(count, entries.len() as i64);
    entries
}

#[test]
fn outline_titles_appear_on_their_destination_pages() {
    if !fonts::default_fonts_available(None) {
        eprintln!("Skipping outline_titles_appear_on_their_destination_pages: {SKIP_HINT}");
        return;
    }

    let bytes = reference_pdf();
    let document = Document::load_mem(&bytes).expect("rendered PDF parses");
    let page_numbers: BTreeMap<ObjectId, u32> = document
        .get_pages()
        .into_iter()
        .map(|(number, id)| (id, number))
        .collect();

    let entries = outline_entries(&document);
    assert_eq!(entries.len(), EXPECTED_ENTRIES);

    let mut previous_page = 0;
    for entry in entries {
        let title = entry
            .get(b"Title")
            .and_then(Object::as_str)
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .expect("outline title");
        let destination = entry
            .get(b"Dest")
            .and_then(Object::as_array)
            .expect("outline destination");
        let page_id = reference_to(destination.first().expect("destination page"));
        let page = *page_numbers.get(&page_id).expect("destination is a page");

        let text = document.extract_text(&[page]).expect("page text");
        assert!(
            alphanumeric(&text).contains(&alphanumeric(&title)),
            "outline entry {title:?} points at page {page}, which does not show it"
        );
        assert!(page >= previous_page, "outline entries out of page order");
        previous_page = page;
    }
}

#[test]
fn outline_is_absent_without_the_flag() {
    if !fonts::default_fonts_available(None) {
        eprintln!("Skipping outline_is_absent_without_the_flag: {SKIP_HINT}");
        return;
    }

    let mut composer = DocumentComposer::new(PageConfig::default());
    composer.push(composer.heading("Only heading", 1).expect("heading"));
    let bytes = GenpdfRenderer::new()
        .render(composer.config(), composer.story().clone())
        .expect("renders");

    let document = Document::load_mem(&bytes).expect("rendered PDF parses");
    let root = reference_to(document.trailer.get(b"Root").expect("trailer root"));
    let catalog = document.get_dictionary(root).expect("catalog");
    assert!(catalog.get(b"Outlines").is_err());
}

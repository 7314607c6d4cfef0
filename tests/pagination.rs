use apidoc_composer::fonts;
use apidoc_composer::{DocumentComposer, GenpdfRenderer, PageConfig, Renderer, TableStyle};
use lopdf::Document;

const SKIP_HINT: &str =
    "fonts missing. Set APIDOC_FONTS_DIR or copy assets/fonts next to the binary.";

const TABLE_ROWS: usize = 12;

/// Text of every page, keeping only alphanumeric characters.
///
/// Line breaks, kerning offsets and glyph encoding differ between text runs,
/// so tokens are compared without any separators.
fn page_texts(bytes: &[u8]) -> Vec<String> {
    let document = Document::load_mem(bytes).expect("rendered PDF parses");
    document
        .get_pages()
        .keys()
        .map(|&number| {
            let text = document.extract_text(&[number]).expect("page text");
            text.chars().filter(|c| c.is_alphanumeric()).collect()
        })
        .collect()
}

/// One-based page that contains `token`, if any.
fn page_of(pages: &[String], token: &str) -> Option<usize> {
    pages
        .iter()
        .position(|text| text.contains(token))
        .map(|index| index + 1)
}

fn row_token(row: usize) -> String {
    format!("RowToken{row:02}")
}

fn render(composer: &DocumentComposer) -> Vec<u8> {
    GenpdfRenderer::new()
        .render(composer.config(), composer.story().clone())
        .expect("story renders")
}

fn fillers_then_table(fillers: usize) -> Vec<u8> {
    let mut composer = DocumentComposer::new(PageConfig::default());
    for index in 0..fillers {
        composer.push(composer.paragraph(format!("Filler paragraph {index} pads the page.")));
    }

    let mut rows = vec![vec!["HeaderAlpha".to_owned(), "HeaderBeta".to_owned()]];
    for row in 1..TABLE_ROWS - 1 {
        rows.push(vec![row_token(row), format!("value {row}")]);
    }
    rows.push(vec!["LastOmega".to_owned(), "closing row".to_owned()]);

    let table = composer
        .table(rows, vec![60.0, 100.0], TableStyle::standard())
        .expect("table");
    composer.push(table);
    render(&composer)
}

#[test]
fn table_moves_whole_across_the_page_boundary() {
    if !fonts::default_fonts_available(None) {
        eprintln!("Skipping table_moves_whole_across_the_page_boundary: {SKIP_HINT}");
        return;
    }

    let mut starts = Vec::new();
    for fillers in 0..=60 {
        let pages = page_texts(&fillers_then_table(fillers));
        let header = page_of(&pages, "HeaderAlpha").expect("header row rendered");
        let last = page_of(&pages, "LastOmega").expect("last row rendered");
        assert_eq!(
            header, last,
            "table split after {fillers} fillers: header on page {header}, last row on {last}"
        );
        for row in 1..TABLE_ROWS - 1 {
            assert_eq!(
                page_of(&pages, &row_token(row)),
                Some(header),
                "row {row} left its table after {fillers} fillers"
            );
        }
        starts.push(header);
    }

    assert_eq!(starts.first(), Some(&1));
    assert!(
        starts.iter().any(|&page| page > 1),
        "sixty fillers never pushed the table off the first page"
    );
    assert!(
        starts.windows(2).all(|pair| pair[0] <= pair[1]),
        "more fillers never move the table back: {starts:?}"
    );
}

#[test]
fn paragraph_taller_than_a_page_continues() {
    if !fonts::default_fonts_available(None) {
        eprintln!("Skipping paragraph_taller_than_a_page_continues: {SKIP_HINT}");
        return;
    }

    let mut text = String::from("StartToken");
    for index in 0..1500 {
        text.push_str(&format!(" word{index}"));
    }
    text.push_str(" EndToken");

    let mut composer = DocumentComposer::new(PageConfig::default());
    composer.push(composer.heading("Long section", 2).expect("heading"));
    composer.push(composer.paragraph(text));
    let pages = page_texts(&render(&composer));

    let start = page_of(&pages, "StartToken").expect("paragraph start rendered");
    let end = page_of(&pages, "EndToken").expect("paragraph end rendered");
    assert!(
        end > start,
        "paragraph should continue past page {start}, ended on {end}"
    );
    assert_eq!(page_of(&pages, "word750").map(|page| page >= start), Some(true));
}

//! Block construction and the single render entry point.
//!
//! [`DocumentComposer`] resolves styles from its [`StyleSheet`] while blocks are
//! built, so every block carries its final appearance and malformed content is
//! rejected before anything is rendered. [`compose`] hands the finished story to
//! a [`Renderer`] exactly once and writes the returned bytes to disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::PageConfig;
use crate::error::{ComposeError, ContentError, RenderError};
use crate::model::{
    ContentBlock, HeadingLevel, Story, TableSpec, TableStyle, TextBlock, BULLET_MARKER,
};
use crate::render::Renderer;
use crate::style::StyleSheet;

/// The file produced by a successful composition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Where the document was written.
    pub path: PathBuf,
    /// Size of the written document.
    pub bytes_written: usize,
}

/// Builds styled blocks and collects them into a [`Story`].
///
/// ```no_run
/// use apidoc_composer::{DocumentComposer, GenpdfRenderer, PageConfig, TableStyle};
///
/// # fn main() -> Result<(), apidoc_composer::ComposeError> {
/// let mut composer = DocumentComposer::new(PageConfig::default());
/// let title = composer.heading("Title", 1)?;
/// let body = composer.paragraph("Body text");
/// let table = composer.table(
///     vec![vec!["A", "B"], vec!["1", "2"]],
///     vec![80.0, 80.0],
///     TableStyle::standard(),
/// )?;
/// composer.push(title).push(body).push(table);
/// composer.compose(GenpdfRenderer::new(), "out/doc.pdf")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct DocumentComposer {
    config: PageConfig,
    styles: StyleSheet,
    story: Story,
}

impl DocumentComposer {
    /// Starts an empty session for pages described by `config`.
    pub fn new(config: PageConfig) -> Self {
        Self::with_styles(config, StyleSheet::default())
    }

    /// Starts an empty session with a custom style sheet.
    pub fn with_styles(config: PageConfig, styles: StyleSheet) -> Self {
        Self {
            config,
            styles,
            story: Story::new(),
        }
    }

    /// Page settings every page of the document uses.
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Styles blocks are resolved against.
    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Blocks appended so far, in rendering order.
    pub fn story(&self) -> &Story {
        &self.story
    }

    /// Creates a heading. Levels other than 1, 2 and 3 are rejected.
    pub fn heading(
        &self,
        text: impl Into<String>,
        level: u8,
    ) -> Result<ContentBlock, ContentError> {
        let level = HeadingLevel::try_from(level)?;
        Ok(ContentBlock::Heading {
            level,
            content: TextBlock::new(text, self.styles.heading(level)),
        })
    }

    /// Creates a body paragraph.
    pub fn paragraph(&self, text: impl Into<String>) -> ContentBlock {
        ContentBlock::Paragraph(TextBlock::new(text, self.styles.body()))
    }

    /// Creates a body paragraph prefixed with [`BULLET_MARKER`].
    pub fn bullet(&self, text: impl AsRef<str>) -> ContentBlock {
        let text = format!("{}{}", BULLET_MARKER, text.as_ref());
        ContentBlock::BulletItem(TextBlock::new(text, self.styles.body()))
    }

    /// Creates a table. See [`TableSpec::new`] for the validation rules.
    pub fn table<R, C>(
        &self,
        rows: R,
        column_widths: impl Into<Vec<f64>>,
        style: impl Into<TableStyle>,
    ) -> Result<ContentBlock, ContentError>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        TableSpec::new(rows, column_widths, style).map(ContentBlock::Table)
    }

    /// Creates a fixed vertical gap of `height_pt` points.
    pub fn spacer(&self, height_pt: f64) -> Result<ContentBlock, ContentError> {
        if !(height_pt.is_finite() && height_pt >= 0.0) {
            return Err(ContentError::InvalidSpacer(height_pt));
        }
        Ok(ContentBlock::Spacer { height_pt })
    }

    /// Appends `block` to the end of the story.
    pub fn push(&mut self, block: ContentBlock) -> &mut Self {
        debug!("appending {} block #{}", block.kind(), self.story.len());
        self.story.push(block);
        self
    }

    /// Appends every block of `blocks` in order.
    pub fn extend(&mut self, blocks: impl IntoIterator<Item = ContentBlock>) -> &mut Self {
        for block in blocks {
            self.push(block);
        }
        self
    }

    /// Renders the story and writes the result to `output`, consuming the session.
    pub fn compose<R: Renderer>(
        self,
        renderer: R,
        output: impl AsRef<Path>,
    ) -> Result<Artifact, ComposeError> {
        compose(&self.config, self.story, renderer, output.as_ref())
    }
}

/// Renders `story` once with `renderer` and writes the bytes to `output`.
///
/// The output file is only created after rendering succeeded, so a failed
/// render never leaves a partial artifact behind. Missing parent directories
/// are created. An existing file is overwritten.
pub fn compose<R: Renderer>(
    config: &PageConfig,
    story: Story,
    mut renderer: R,
    output: &Path,
) -> Result<Artifact, ComposeError> {
    let block_count = story.len();
    info!(
        "composing {} blocks into {} ({})",
        block_count,
        output.display(),
        config.title()
    );

    let bytes = renderer.render(config, story)?;
    write_artifact(output, &bytes)?;

    info!("wrote {} bytes to {}", bytes.len(), output.display());
    Ok(Artifact {
        path: output.to_path_buf(),
        bytes_written: bytes.len(),
    })
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let io_error = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut file = File::create(path).map_err(io_error)?;
    file.write_all(bytes).map_err(io_error)?;
    file.flush().map_err(io_error)
}

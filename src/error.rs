//! Error types for the apidoc_composer crate.
//!
//! Content problems are detected while blocks are constructed and surface as
//! [`ContentError`]. Everything that goes wrong once the story has been handed to
//! a renderer is a [`RenderError`]. [`ComposeError`] joins both for callers that
//! drive a whole composition session.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Malformed content rejected at block-construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    /// Heading levels are limited to 1, 2 and 3.
    #[error("unsupported heading level {0}; expected 1, 2 or 3")]
    UnsupportedHeadingLevel(u8),

    /// A table needs at least a header row with one column.
    #[error("table has no rows")]
    EmptyTable,

    /// A header row without any cells.
    #[error("table header has no columns")]
    EmptyHeader,

    /// A data row whose length differs from the header.
    #[error("table row {row} has {found} cells but the header has {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row (the header is row 0).
        row: usize,
        /// Column count of the header row.
        expected: usize,
        /// Column count of the offending row.
        found: usize,
    },

    /// The number of column widths does not match the header.
    #[error("table declares {found} column widths but has {expected} columns")]
    ColumnWidthMismatch {
        /// Column count of the header row.
        expected: usize,
        /// Number of widths provided.
        found: usize,
    },

    /// Column widths must be positive, finite lengths.
    #[error("column {column} has invalid width {width} mm")]
    InvalidColumnWidth {
        /// Zero-based column index.
        column: usize,
        /// The rejected width.
        width: f64,
    },

    /// A style rule addresses cells outside the table.
    #[error("style rule {rule} addresses cells outside a {columns}x{rows} table")]
    StyleRangeOutOfBounds {
        /// Index of the rule in the rule list.
        rule: usize,
        /// Column count of the table.
        columns: usize,
        /// Row count of the table, header included.
        rows: usize,
    },

    /// Spacer heights must be finite and non-negative.
    #[error("invalid spacer height {0} pt")]
    InvalidSpacer(f64),
}

/// Invalid page configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Paper dimensions must be positive and finite.
    #[error("invalid paper size {width} x {height} mm")]
    InvalidPaperSize {
        /// Requested width in millimetres.
        width: f64,
        /// Requested height in millimetres.
        height: f64,
    },

    /// Margins must be non-negative and finite.
    #[error("invalid {side} margin {value} mm")]
    InvalidMargin {
        /// Which margin was rejected.
        side: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The margins leave no room for content.
    #[error("margins leave no printable area on a {width} x {height} mm page")]
    NoPrintableArea {
        /// Paper width in millimetres.
        width: f64,
        /// Paper height in millimetres.
        height: f64,
    },

    /// The document title must not be blank.
    #[error("document title is empty")]
    EmptyTitle,

    /// A configuration file could not be read.
    #[error("failed to read page configuration from {path}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A configuration file could not be parsed or failed validation.
    #[error("failed to parse page configuration")]
    Parse(#[from] serde_json::Error),
}

/// Failures raised by a [`Renderer`](crate::render::Renderer) or while writing its output.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The font family required for text measurement could not be loaded.
    #[error("failed to load fonts")]
    FontLoad(#[source] genpdf::error::Error),

    /// The layout engine rejected the document.
    #[error("layout engine failed")]
    Layout(#[source] genpdf::error::Error),

    /// The heading outline could not be embedded into the rendered bytes.
    #[cfg(feature = "bookmarks")]
    #[error("failed to embed heading outline")]
    Outline(#[source] crate::bookmarks::BookmarkError),

    /// Writing the artifact failed.
    #[error("failed to write {path}")]
    Io {
        /// Destination of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Renderer-specific failure not covered above.
    #[error("{0}")]
    Backend(String),
}

/// Any failure of a composition session.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// A block could not be constructed.
    #[error("invalid content")]
    Content(#[from] ContentError),

    /// The page configuration is invalid.
    #[error("invalid page configuration")]
    Config(#[from] ConfigError),

    /// The renderer or the artifact write failed.
    #[error("rendering failed")]
    Render(#[from] RenderError),
}

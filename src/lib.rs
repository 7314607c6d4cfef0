//! Core entry point for the apidoc_composer crate.
//!
//! Build blocks with a [`DocumentComposer`], collect them into a [`Story`] and
//! hand the story to a [`Renderer`] through [`compose`]. The default renderer,
//! [`GenpdfRenderer`], lays blocks out on fixed-size PDF pages and moves any block
//! that does not fit the rest of a page to the next one.

pub mod composer;
pub mod config;
pub mod error;
pub mod fonts;
pub mod model;
pub mod reference;
pub mod render;
pub mod style;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use composer::{compose, Artifact, DocumentComposer};
pub use config::{PageConfig, PageConfigBuilder, PageMargins, PaperSize};
pub use error::{ComposeError, ConfigError, ContentError, RenderError};
pub use model::{
    CellRange, ContentBlock, HeadingLevel, Story, TableCommand, TableRule, TableSpec, TableStyle,
    TextBlock,
};
pub use render::{GenpdfRenderer, Renderer};
pub use style::{BlockStyle, Color, FontFace, StyleSheet};

//! Rendering of a [`Story`] onto fixed-size pages.
//!
//! [`Renderer`] is the seam between the composer and the layout engine. The
//! composer validates content and owns the output file; a renderer only turns a
//! page configuration and an ordered story into the bytes of a document.

pub(crate) mod document;
pub(crate) mod elements;
mod pdf;

pub use pdf::GenpdfRenderer;

use crate::config::PageConfig;
use crate::error::RenderError;
use crate::model::Story;

/// Lays a story out on pages and returns the encoded document.
///
/// Implementations must keep the story order and must not write to the output
/// path themselves.
pub trait Renderer {
    /// Renders `story` with the page settings from `config`.
    fn render(&mut self, config: &PageConfig, story: Story) -> Result<Vec<u8>, RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render(&mut self, config: &PageConfig, story: Story) -> Result<Vec<u8>, RenderError> {
        (**self).render(config, story)
    }
}

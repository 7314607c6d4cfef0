//! Page configuration shared by every page of a document.
//!
//! A [`PageConfig`] is validated when it is built or deserialized and cannot be
//! changed afterwards. Lengths are millimetres.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Title used when none is configured.
pub const DEFAULT_TITLE: &str = "Restro Backend SaaS Documentation";

/// A4 paper size in millimetres.
pub const A4: PaperSize = PaperSize {
    width: 210.0,
    height: 297.0,
};

/// Paper dimensions in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaperSize {
    /// Page width.
    pub width: f64,
    /// Page height.
    pub height: f64,
}

/// Page margins in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    /// Top margin.
    pub top: f64,
    /// Right margin.
    pub right: f64,
    /// Bottom margin.
    pub bottom: f64,
    /// Left margin.
    pub left: f64,
}

impl PageMargins {
    /// Creates margins from top, right, bottom and left values.
    pub const fn trbl(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl Default for PageMargins {
    fn default() -> Self {
        Self::trbl(15.0, 18.0, 15.0, 18.0)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPageConfig {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default = "default_paper")]
    paper: PaperSize,
    #[serde(default)]
    margins: PageMargins,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_paper() -> PaperSize {
    A4
}

/// Page size, margins and document title.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPageConfig")]
pub struct PageConfig {
    title: String,
    paper: PaperSize,
    margins: PageMargins,
}

impl TryFrom<RawPageConfig> for PageConfig {
    type Error = ConfigError;

    fn try_from(raw: RawPageConfig) -> Result<Self, Self::Error> {
        PageConfig::builder()
            .title(raw.title)
            .paper(raw.paper)
            .margins(raw.margins)
            .build()
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            paper: A4,
            margins: PageMargins::default(),
        }
    }
}

impl PageConfig {
    /// Starts a builder seeded with the defaults.
    pub fn builder() -> PageConfigBuilder {
        PageConfigBuilder::default()
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Document title stored in the PDF metadata.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Paper size.
    pub fn paper(&self) -> PaperSize {
        self.paper
    }

    /// Page margins.
    pub fn margins(&self) -> PageMargins {
        self.margins
    }

    /// Width available to content between the left and right margins.
    pub fn body_width(&self) -> f64 {
        self.paper.width - self.margins.left - self.margins.right
    }

    /// Height available to content between the top and bottom margins.
    pub fn body_height(&self) -> f64 {
        self.paper.height - self.margins.top - self.margins.bottom
    }
}

/// Builder for [`PageConfig`].
#[derive(Clone, Debug)]
pub struct PageConfigBuilder {
    title: String,
    paper: PaperSize,
    margins: PageMargins,
}

impl Default for PageConfigBuilder {
    fn default() -> Self {
        let defaults = PageConfig::default();
        Self {
            title: defaults.title,
            paper: defaults.paper,
            margins: defaults.margins,
        }
    }
}

impl PageConfigBuilder {
    /// Sets the document title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the paper size.
    pub fn paper(mut self, paper: PaperSize) -> Self {
        self.paper = paper;
        self
    }

    /// Sets the page margins.
    pub fn margins(mut self, margins: PageMargins) -> Self {
        self.margins = margins;
        self
    }

    /// Validates the settings and freezes them into a [`PageConfig`].
    pub fn build(self) -> Result<PageConfig, ConfigError> {
        let PaperSize { width, height } = self.paper;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidPaperSize { width, height });
        }

        let margins = self.margins;
        for (side, value) in [
            ("top", margins.top),
            ("right", margins.right),
            ("bottom", margins.bottom),
            ("left", margins.left),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidMargin { side, value });
            }
        }

        if self.title.trim().is_empty() {
            return Err(ConfigError::EmptyTitle);
        }

        let config = PageConfig {
            title: self.title,
            paper: self.paper,
            margins,
        };
        if config.body_width() <= 0.0 || config.body_height() <= 0.0 {
            return Err(ConfigError::NoPrintableArea { width, height });
        }

        Ok(config)
    }
}

//! Font loading for the layout engine.
//!
//! Documents use the PDF builtin Helvetica family, so no font is embedded. The
//! layout engine still needs glyph metrics to measure and wrap text; those come
//! from the metric-compatible Liberation Sans TrueType files. DejaVu Sans is
//! accepted when Liberation Sans is not installed. Its glyphs are wider, so
//! lines wrap earlier than they would with exact Helvetica metrics.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};
use printpdf::BuiltinFont;

/// Environment variable that points at a directory with the metric fonts.
pub const FONTS_DIR_ENV: &str = "APIDOC_FONTS_DIR";

/// Name of the font family whose files provide the metrics.
pub const METRIC_FONT_FAMILY_NAME: &str = "LiberationSans";

/// A TrueType family that can stand in for Helvetica metrics.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricFamily {
    /// Family name used in diagnostics.
    pub name: &'static str,
    /// Regular, bold, italic and bold italic file names.
    pub files: [&'static str; 4],
}

/// Metric families in order of preference.
pub const METRIC_FAMILIES: &[MetricFamily] = &[
    MetricFamily {
        name: METRIC_FONT_FAMILY_NAME,
        files: [
            "LiberationSans-Regular.ttf",
            "LiberationSans-Bold.ttf",
            "LiberationSans-Italic.ttf",
            "LiberationSans-BoldItalic.ttf",
        ],
    },
    MetricFamily {
        name: "DejaVuSans",
        files: [
            "DejaVuSans.ttf",
            "DejaVuSans-Bold.ttf",
            "DejaVuSans-Oblique.ttf",
            "DejaVuSans-BoldOblique.ttf",
        ],
    },
];

const BUILTIN_FACES: [BuiltinFont; 4] = [
    BuiltinFont::Helvetica,
    BuiltinFont::HelveticaBold,
    BuiltinFont::HelveticaOblique,
    BuiltinFont::HelveticaBoldOblique,
];

const SYSTEM_FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/dejavu-sans-fonts",
    "/usr/share/fonts/TTF",
    "/usr/local/share/fonts",
];

/// A directory holding every file of one metric family.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricFonts {
    /// Directory the files were found in.
    pub directory: PathBuf,
    /// Family the files belong to.
    pub family: &'static MetricFamily,
}

impl MetricFonts {
    /// Whether the preferred Liberation Sans metrics were found.
    pub fn is_preferred(&self) -> bool {
        self.family.name == METRIC_FONT_FAMILY_NAME
    }
}

/// Directory holding the fonts shipped with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn push_unique(candidates: &mut Vec<PathBuf>, candidate: PathBuf) {
    if !candidates.iter().any(|existing| existing == &candidate) {
        candidates.push(candidate);
    }
}

fn font_directory_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = explicit {
        push_unique(&mut candidates, path.to_path_buf());
    }

    if let Some(value) = env::var_os(FONTS_DIR_ENV) {
        if !value.is_empty() {
            push_unique(&mut candidates, PathBuf::from(value));
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push_unique(&mut candidates, bin_dir.join("assets/fonts"));
        }
    }

    push_unique(&mut candidates, bundled_fonts_source_dir());

    for dir in SYSTEM_FONT_DIRECTORIES {
        push_unique(&mut candidates, PathBuf::from(dir));
    }

    candidates
}

fn missing_font_files(path: &Path, family: &MetricFamily) -> Vec<PathBuf> {
    family
        .files
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

/// Finds a candidate directory that contains every file of a metric family.
///
/// Liberation Sans is searched in every candidate before DejaVu Sans is
/// considered. Search order: `explicit`, `$APIDOC_FONTS_DIR`, `assets/fonts`
/// next to the executable, `assets/fonts` in the crate sources, then common
/// system locations.
pub fn resolve_font_directory(explicit: Option<&Path>) -> Result<MetricFonts, Error> {
    let candidates = font_directory_candidates(explicit);
    let mut attempts = Vec::new();

    for family in METRIC_FAMILIES {
        for candidate in &candidates {
            if !candidate.is_dir() {
                continue;
            }
            let missing = missing_font_files(candidate, family);
            if missing.is_empty() {
                return Ok(MetricFonts {
                    directory: candidate.clone(),
                    family,
                });
            }
            if family.name == METRIC_FONT_FAMILY_NAME {
                let missing_list = missing
                    .iter()
                    .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(", ");
                attempts.push(format!(
                    "{} (missing files [{}])",
                    candidate.display(),
                    missing_list
                ));
            }
        }
    }

    for candidate in candidates.iter().filter(|candidate| !candidate.is_dir()) {
        attempts.push(format!("{} (directory missing)", candidate.display()));
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} fonts. Checked: {}. Install Liberation Sans or set {}.",
            METRIC_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "metric fonts not found"),
    ))
}

fn load_face(path: &Path, builtin: BuiltinFont) -> Result<FontData, Error> {
    FontData::load(path, Some(builtin)).map_err(|err| {
        Error::new(
            format!("Failed to load font metrics from {}: {}", path.display(), err),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

/// Loads the font family used for every document.
///
/// Text is emitted as builtin Helvetica; the files found by
/// [`resolve_font_directory`] only provide the metrics.
pub fn default_font_family(explicit: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let fonts = resolve_font_directory(explicit)?;
    if fonts.is_preferred() {
        debug!("loading font metrics from {}", fonts.directory.display());
    } else {
        warn!(
            "{} not found, measuring text with {} from {}",
            METRIC_FONT_FAMILY_NAME,
            fonts.family.name,
            fonts.directory.display()
        );
    }

    let [regular, bold, italic, bold_italic] = fonts.family.files;
    let [regular_face, bold_face, italic_face, bold_italic_face] = BUILTIN_FACES;
    Ok(FontFamily {
        regular: load_face(&fonts.directory.join(regular), regular_face)?,
        bold: load_face(&fonts.directory.join(bold), bold_face)?,
        italic: load_face(&fonts.directory.join(italic), italic_face)?,
        bold_italic: load_face(&fonts.directory.join(bold_italic), bold_italic_face)?,
    })
}

/// Indicates whether any metric font family can be found.
pub fn default_fonts_available(explicit: Option<&Path>) -> bool {
    resolve_font_directory(explicit).is_ok()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{missing_font_files, resolve_font_directory, METRIC_FAMILIES};

    fn write_family(dir: &std::path::Path, files: &[&str]) {
        for name in files {
            fs::write(dir.join(name), b"").expect("write placeholder");
        }
    }

    #[test]
    fn explicit_directory_with_all_files_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_family(dir.path(), &METRIC_FAMILIES[0].files);
        let resolved = resolve_font_directory(Some(dir.path())).expect("resolved");
        assert_eq!(resolved.directory, dir.path());
        assert!(resolved.is_preferred());
    }

    #[test]
    fn incomplete_directory_reports_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let liberation = &METRIC_FAMILIES[0];
        write_family(dir.path(), &liberation.files[..1]);
        let missing = missing_font_files(dir.path(), liberation);
        assert_eq!(missing.len(), liberation.files.len() - 1);
    }

    #[test]
    fn dejavu_directory_is_a_metric_fallback() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dejavu = &METRIC_FAMILIES[1];
        write_family(dir.path(), &dejavu.files);

        let resolved = resolve_font_directory(Some(dir.path())).expect("resolved");
        if resolved.is_preferred() {
            // Liberation Sans installed elsewhere outranks any fallback.
            assert_ne!(resolved.directory, dir.path());
        } else {
            assert_eq!(resolved.directory, dir.path());
            assert_eq!(resolved.family, dejavu);
        }
    }
}

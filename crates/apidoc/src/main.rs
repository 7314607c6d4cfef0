use std::error::Error;
use std::path::PathBuf;

use apidoc_composer::reference::{self, DEFAULT_OUTPUT};
use apidoc_composer::{ComposeError, DocumentComposer, GenpdfRenderer, PageConfig};
use clap::Parser;
use log::debug;

/// Renders the Restro backend SaaS documentation to PDF.
///
/// Text measurement needs Liberation Sans, or DejaVu Sans as a fallback. They
/// are looked up in `--fonts-dir`, `$APIDOC_FONTS_DIR`, `assets/fonts` next to
/// the binary or the crate, and common system font directories.
#[derive(Parser)]
#[command(author, version, about = "Render the Restro backend API documentation")]
struct Cli {
    /// Where to write the PDF. Parent directories are created.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// JSON file with page size, margins and title.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing the Liberation Sans or DejaVu Sans TTF files.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Embed an outline entry for every section heading.
    #[cfg(feature = "bookmarks")]
    #[arg(long)]
    bookmarks: bool,
}

fn run(cli: Cli) -> Result<PathBuf, ComposeError> {
    let config = match &cli.config {
        Some(path) => PageConfig::from_json_file(path)?,
        None => PageConfig::default(),
    };
    debug!("page configuration: {:?}", config);

    let mut composer = DocumentComposer::new(config);
    reference::restro_api_story(&mut composer, chrono::Local::now().naive_local())?;

    let mut renderer = GenpdfRenderer::new();
    if let Some(dir) = cli.fonts_dir {
        renderer = renderer.with_fonts_dir(dir);
    }
    #[cfg(feature = "bookmarks")]
    {
        renderer = renderer.with_bookmarks(cli.bookmarks);
    }

    let artifact = composer.compose(renderer, &cli.output)?;
    Ok(artifact.path)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(path) => println!("{}", path.display()),
        Err(err) => {
            eprintln!("Error: {}", err);
            print_error_sources(&err);
            std::process::exit(1);
        }
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

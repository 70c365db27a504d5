//! Font loading utilities for the `servicedesk_docs` crate.
//!
//! The manual is written with the built-in PDF Helvetica faces, so no font
//! program is embedded in the output. `genpdf` still needs TrueType metrics to
//! lay out text, which is why a Helvetica-compatible family (Liberation Sans,
//! or Arial on Windows) has to be found on disk.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, Builtin, FontData, FontFamily};
use log::{debug, warn};
use printpdf::BuiltinFont;

/// Name of the metric-compatible font family searched for on disk.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "LiberationSans";

/// Environment variable pointing at a directory with the Liberation Sans files.
pub const FONTS_DIR_ENV: &str = "SERVICE_DESK_DOCS_FONTS_DIR";

/// Environment variable pointing at a directory with the Windows Arial files.
pub const WINDOWS_FONTS_DIR_ENV: &str = "SERVICE_DESK_DOCS_WINDOWS_FONTS_DIR";

const FONT_FILES: &[&str] = &[
    "LiberationSans-Regular.ttf",
    "LiberationSans-Bold.ttf",
    "LiberationSans-Italic.ttf",
    "LiberationSans-BoldItalic.ttf",
];

const SYSTEM_FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/TTF",
    "/usr/local/share/fonts",
    "/Library/Fonts",
];

const WINDOWS_FALLBACK_FAMILY_NAME: &str = "Arial";

struct WindowsFontFiles {
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const WINDOWS_FONT_FILES: WindowsFontFiles = WindowsFontFiles {
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

fn push_unique(candidates: &mut Vec<PathBuf>, candidate: PathBuf) {
    if !candidates.iter().any(|existing| existing == &candidate) {
        candidates.push(candidate);
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates(preferred: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = preferred {
        push_unique(&mut candidates, path.to_path_buf());
    }

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push_unique(&mut candidates, path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push_unique(&mut candidates, bin_dir.join("assets/fonts"));
        }
    }

    push_unique(
        &mut candidates,
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"),
    );

    for directory in SYSTEM_FONT_DIRECTORIES {
        push_unique(&mut candidates, PathBuf::from(directory));
    }

    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn resolve_font_directory(preferred: Option<&Path>) -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates(preferred) {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate);

        if exists && missing.is_empty() {
            debug!("Using font metrics from {}", candidate.display());
            return Ok(candidate);
        }

        let reason = if !exists {
            format!("directory missing at {}", candidate.display())
        } else {
            let missing_list = missing
                .iter()
                .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
                .collect::<Vec<_>>()
                .join(", ");
            format!("missing files [{}]", missing_list)
        };

        attempts.push(format!("{} ({})", candidate.display(), reason));
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} font files. Checked: {}. See assets/fonts/README.md or set {}.",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "font directory not found"),
    ))
}

fn load_liberation_font_family(preferred: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory(preferred)?;

    fonts::from_files(&directory, DEFAULT_FONT_FAMILY_NAME, Some(Builtin::Helvetica)).map_err(
        |err| {
            Error::new(
                format!(
                    "Failed to load font family '{}' from {}: {}",
                    DEFAULT_FONT_FAMILY_NAME,
                    directory.display(),
                    err
                ),
                io::Error::new(io::ErrorKind::Other, err.to_string()),
            )
        },
    )
}

fn windows_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path(WINDOWS_FONTS_DIR_ENV) {
        return Some(path);
    }

    for var in ["WINDIR", "SystemRoot"] {
        if let Some(root) = env_path(var) {
            let candidate = root.join("Fonts");
            if candidate.is_dir() {
                return Some(candidate);
            }
        }
    }

    None
}

fn load_windows_font(
    directory: &Path,
    file: &str,
    builtin: BuiltinFont,
    style: &str,
) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, Some(builtin)).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!(
                "Failed to load Windows fallback {} font at {}: {}",
                style,
                path.display(),
                err
            ),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn windows_fallback_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = windows_font_directory().ok_or_else(|| {
        Error::new(
            "Windows font directory not found for fallback",
            io::Error::new(io::ErrorKind::NotFound, "windows fonts directory not found"),
        )
    })?;

    let files = &WINDOWS_FONT_FILES;
    Ok(FontFamily {
        regular: load_windows_font(&directory, files.regular, BuiltinFont::Helvetica, "regular")?,
        bold: load_windows_font(&directory, files.bold, BuiltinFont::HelveticaBold, "bold")?,
        italic: load_windows_font(
            &directory,
            files.italic,
            BuiltinFont::HelveticaOblique,
            "italic",
        )?,
        bold_italic: load_windows_font(
            &directory,
            files.bold_italic,
            BuiltinFont::HelveticaBoldOblique,
            "bold italic",
        )?,
    })
}

fn windows_fonts_present() -> bool {
    let files = &WINDOWS_FONT_FILES;
    windows_font_directory().map_or(false, |directory| {
        [files.regular, files.bold, files.italic, files.bold_italic]
            .iter()
            .all(|file| directory.join(file).is_file())
    })
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Returns a Helvetica-mapped font family, searching `preferred` first.
///
/// Falls back to the Windows Arial files when no Liberation Sans directory is found.
pub fn font_family(preferred: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    match load_liberation_font_family(preferred) {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match windows_fallback_font_family() {
            Ok(fallback) => {
                warn!(
                    "Liberation Sans unavailable ({}); falling back to Windows '{}' family.",
                    err, WINDOWS_FALLBACK_FAMILY_NAME
                );
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!(
                    "Liberation Sans unavailable ({}); Windows fallback failed: {}",
                    err, fallback_err
                );
                Err(Error::new(
                    format!(
                        "{}. Windows fallback failed as well: {}",
                        err, fallback_err
                    ),
                    io::Error::new(io::ErrorKind::NotFound, "no usable fonts available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Indicates whether [`font_family`] can find font metrics for the given preference.
pub fn fonts_available(preferred: Option<&Path>) -> bool {
    resolve_font_directory(preferred).is_ok() || windows_fonts_present()
}

//! Options controlling where and how the manual is written.

use std::path::{Path, PathBuf};

/// Output path used when none is configured, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "docs/Service_Desk_Documentacion.pdf";

/// Environment variable that overrides the output path in the CLI.
pub const OUTPUT_PATH_ENV: &str = "SERVICE_DESK_DOCS_OUTPUT";

/// Settings for a single build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    output: PathBuf,
    fonts_dir: Option<PathBuf>,
    bookmarks: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            fonts_dir: None,
            bookmarks: false,
        }
    }
}

impl BuildOptions {
    /// Creates options with the default output path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the file the PDF is written to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Returns the font directory searched before the built-in candidates.
    pub fn fonts_dir(&self) -> Option<&Path> {
        self.fonts_dir.as_deref()
    }

    /// Returns whether a section outline is embedded.
    pub fn bookmarks(&self) -> bool {
        self.bookmarks
    }

    /// Sets the output file and returns the updated options.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Sets the preferred font directory and returns the updated options.
    pub fn with_fonts_dir(mut self, fonts_dir: impl Into<Option<PathBuf>>) -> Self {
        self.fonts_dir = fonts_dir.into();
        self
    }

    /// Enables or disables the section outline.
    pub fn with_bookmarks(mut self, bookmarks: bool) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    /// Line printed to stdout once the file has been written.
    pub fn confirmation_message(&self) -> String {
        format!("PDF creado: {}", self.output.display())
    }
}

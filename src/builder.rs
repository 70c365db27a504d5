//! Document construction for the Service Desk manual.
//!
//! [`DocumentBuilder`] lays a [`Manual`] out on `genpdf` pages: a centred
//! title block, then every section as a bold heading followed by its body
//! lines. [`generate`] runs the whole procedure described by [`BuildOptions`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use genpdf::elements::{Break, Paragraph};
use genpdf::error::Error;
use genpdf::style::Style;
use genpdf::{
    self, render, Alignment, Element, Margins, Mm, PageDecorator, PaperSize, RenderResult, Size,
};
use log::{debug, info};

use crate::bookmarks::{self, BookmarkError};
use crate::config::BuildOptions;
use crate::content;
use crate::encoding;
use crate::fonts;
use crate::model::{Manual, Section};

const TITLE_FONT_SIZE: u8 = 16;
const HEADING_FONT_SIZE: u8 = 12;
const BODY_FONT_SIZE: u8 = 10;
// 10pt lines spaced to 5 mm.
const BODY_LINE_SPACING: f64 = 1.42;
const DEFAULT_MARGIN_MM: i32 = 10;

/// Errors raised while building or writing the manual.
#[derive(Debug)]
pub enum BuildError {
    /// No usable font metrics could be loaded.
    FontLoad(Error),
    /// `genpdf` failed while laying out or serializing the document.
    Render(Error),
    /// Text strings of built-in fonts could not be rewritten to single-byte codes.
    Encoding(lopdf::Error),
    /// The section outline could not be embedded.
    Bookmarks(BookmarkError),
    /// The rendered bytes could not be written to the output path.
    Write {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying filesystem error.
        source: std::io::Error,
    },
}

impl From<BookmarkError> for BuildError {
    fn from(err: BookmarkError) -> Self {
        Self::Bookmarks(err)
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(_) => write!(f, "Failed to load fonts for the manual"),
            Self::Render(_) => write!(f, "Failed to render the manual"),
            Self::Encoding(_) => write!(f, "Failed to re-encode text for built-in fonts"),
            Self::Bookmarks(_) => write!(f, "Failed to embed section bookmarks"),
            Self::Write { path, .. } => write!(f, "Failed to write PDF to {}", path.display()),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Render(err) => Some(err),
            Self::Encoding(err) => Some(err),
            Self::Bookmarks(err) => Some(err),
            Self::Write { source, .. } => Some(source),
        }
    }
}

/// Output of a successful render.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    /// Serialized PDF document.
    pub bytes: Vec<u8>,
    /// Number of pages produced by the layout.
    pub page_count: usize,
    /// 1-indexed page on which each section heading was printed.
    pub section_pages: Vec<Option<usize>>,
}

impl RenderedPdf {
    /// Writes the PDF to `path` in a single call.
    ///
    /// Parent directories are not created; a missing directory is an error.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), BuildError> {
        let path = path.as_ref();
        fs::write(path, &self.bytes).map_err(|source| BuildError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Builder that renders a [`Manual`] into PDF bytes.
pub struct DocumentBuilder {
    manual: Manual,
    fonts_dir: Option<PathBuf>,
    paper_size: Size,
    margins: Margins,
    bookmarks: bool,
}

impl DocumentBuilder {
    /// Creates a builder for `manual` using A4 paper and 10 mm margins.
    pub fn new(manual: Manual) -> Self {
        Self {
            manual,
            fonts_dir: None,
            paper_size: PaperSize::A4.into(),
            margins: Margins::all(DEFAULT_MARGIN_MM),
            bookmarks: false,
        }
    }

    /// Returns the manual that will be rendered.
    pub fn manual(&self) -> &Manual {
        &self.manual
    }

    /// Sets the directory searched first for font metrics.
    pub fn with_fonts_dir(mut self, fonts_dir: impl Into<Option<PathBuf>>) -> Self {
        self.fonts_dir = fonts_dir.into();
        self
    }

    /// Sets the paper size used for every page.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = paper_size.into();
        self
    }

    /// Sets the page margins.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = margins.into();
        self
    }

    /// Embeds an outline entry for every section when enabled.
    pub fn with_bookmarks(mut self, bookmarks: bool) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    /// Lays out the manual and returns the serialized document.
    pub fn render(&self) -> Result<RenderedPdf, BuildError> {
        let font_family =
            fonts::font_family(self.fonts_dir.as_deref()).map_err(BuildError::FontLoad)?;

        let mut document = genpdf::Document::new(font_family);
        document.set_title(self.manual.title());
        document.set_minimal_conformance();
        document.set_paper_size(self.paper_size);
        document.set_font_size(BODY_FONT_SIZE);
        document.set_line_spacing(BODY_LINE_SPACING);

        let current_page = Rc::new(Cell::new(0));
        document.set_page_decorator(CountingPageDecorator::new(
            self.margins,
            Rc::clone(&current_page),
        ));

        let section_pages = Rc::new(RefCell::new(vec![None; self.manual.sections().len()]));

        document.push(
            Paragraph::new(self.manual.title())
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(TITLE_FONT_SIZE)),
        );
        document.push(Break::new(1));

        let last = self.manual.sections().len().saturating_sub(1);
        for (index, section) in self.manual.sections().iter().enumerate() {
            push_section(
                &mut document,
                section,
                SectionAnchor::new(
                    index,
                    heading_element(section),
                    Rc::clone(&current_page),
                    Rc::clone(&section_pages),
                ),
            );
            if index < last {
                document.push(Break::new(1));
            }
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(BuildError::Render)?;
        let bytes = encoding::narrow_simple_font_text(&bytes).map_err(BuildError::Encoding)?;

        let page_count = current_page.get();
        let section_pages = section_pages.borrow().clone();
        debug!(
            "Rendered {} bytes over {} page(s); section pages {:?}",
            bytes.len(),
            page_count,
            section_pages
        );

        let bytes = if self.bookmarks {
            bookmarks::apply_section_bookmarks(&bytes, self.manual.sections(), &section_pages)?
        } else {
            bytes
        };

        Ok(RenderedPdf {
            bytes,
            page_count,
            section_pages,
        })
    }
}

fn heading_element(section: &Section) -> impl Element {
    Paragraph::new(section.heading())
        .styled(Style::new().bold().with_font_size(HEADING_FONT_SIZE))
}

fn push_section<E>(document: &mut genpdf::Document, section: &Section, heading: SectionAnchor<E>)
where
    E: Element + 'static,
{
    document.push(heading);
    // Bodies open with an empty line below the heading.
    document.push(Break::new(1));
    for line in section.body_lines() {
        if line.trim().is_empty() {
            document.push(Break::new(1));
        } else {
            document.push(Paragraph::new(line));
        }
    }
}

/// Renders the Service Desk manual and writes it to the configured output path.
pub fn generate(options: &BuildOptions) -> Result<RenderedPdf, BuildError> {
    let manual = content::service_desk_manual();
    info!(
        "Building '{}' with {} sections",
        manual.title(),
        manual.sections().len()
    );

    let pdf = DocumentBuilder::new(manual)
        .with_fonts_dir(options.fonts_dir().map(Path::to_path_buf))
        .with_bookmarks(options.bookmarks())
        .render()?;
    pdf.write_to(options.output())?;

    info!(
        "Wrote {} ({} bytes, {} page(s))",
        options.output().display(),
        pdf.bytes.len(),
        pdf.page_count
    );
    Ok(pdf)
}

/// Applies margins and keeps the shared page counter in sync with the layout.
struct CountingPageDecorator {
    margins: Margins,
    current_page: Rc<Cell<usize>>,
}

impl CountingPageDecorator {
    fn new(margins: Margins, current_page: Rc<Cell<usize>>) -> Self {
        Self {
            margins,
            current_page,
        }
    }
}

impl PageDecorator for CountingPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        _context: &genpdf::Context,
        mut area: render::Area<'a>,
        _style: Style,
    ) -> Result<render::Area<'a>, Error> {
        self.current_page.set(self.current_page.get() + 1);
        area.add_margins(self.margins);
        Ok(area)
    }
}

/// Wraps a heading and records the page it is first printed on.
struct SectionAnchor<E> {
    index: usize,
    inner: E,
    current_page: Rc<Cell<usize>>,
    section_pages: Rc<RefCell<Vec<Option<usize>>>>,
}

impl<E> SectionAnchor<E> {
    fn new(
        index: usize,
        inner: E,
        current_page: Rc<Cell<usize>>,
        section_pages: Rc<RefCell<Vec<Option<usize>>>>,
    ) -> Self {
        Self {
            index,
            inner,
            current_page,
            section_pages,
        }
    }
}

impl<E: Element> Element for SectionAnchor<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.inner.render(context, area, style)?;

        // A heading pushed to the next page reports an empty size here.
        if result.size.height > Mm::default() {
            let mut pages = self.section_pages.borrow_mut();
            if let Some(slot) = pages.get_mut(self.index) {
                slot.get_or_insert(self.current_page.get());
            }
        }

        Ok(result)
    }
}

//! Data structures describing the logical content of the generated manual.
//!
//! The values here carry no rendering state. [`crate::builder`] turns them into
//! `genpdf` elements and [`crate::bookmarks`] reuses the headings for the
//! outline.

/// A heading together with the block of text printed underneath it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Section {
    heading: &'static str,
    body: &'static str,
}

impl Section {
    /// Creates a section from its heading and body text.
    pub const fn new(heading: &'static str, body: &'static str) -> Self {
        Self { heading, body }
    }

    /// Returns the heading printed in bold above the body.
    pub fn heading(&self) -> &'static str {
        self.heading
    }

    /// Returns the raw body text.
    pub fn body(&self) -> &'static str {
        self.body
    }

    /// Returns the body split into printable lines.
    ///
    /// A single leading and a single trailing line break are dropped so that
    /// literals can start and end on their own line. Interior blank lines are
    /// kept and render as vertical space.
    pub fn body_lines(&self) -> Vec<&'static str> {
        let body = self.body.strip_prefix('\n').unwrap_or(self.body);
        let body = body.strip_suffix('\n').unwrap_or(body);
        if body.is_empty() {
            return Vec::new();
        }
        body.split('\n').collect()
    }
}

/// The complete manual: a title block followed by sections in reading order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manual {
    title: String,
    sections: Vec<Section>,
}

impl Manual {
    /// Creates a manual with the given title and no sections.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Returns the title rendered at the top of the first page.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the sections in presentation order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns the section headings in presentation order.
    pub fn headings(&self) -> Vec<&'static str> {
        self.sections.iter().map(Section::heading).collect()
    }

    /// Appends a section and returns the updated manual.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Extends the manual with additional sections.
    pub fn with_sections<I>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = Section>,
    {
        self.sections.extend(sections);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Manual, Section};

    #[test]
    fn body_lines_strip_outer_breaks_only() {
        let section = Section::new("Intro", "\nfirst\n\nsecond\n");
        assert_eq!(section.body_lines(), vec!["first", "", "second"]);
    }

    #[test]
    fn body_lines_of_empty_body_are_empty() {
        assert!(Section::new("Empty", "\n").body_lines().is_empty());
        assert!(Section::new("Empty", "").body_lines().is_empty());
    }

    #[test]
    fn manual_keeps_insertion_order() {
        let manual = Manual::new("Title")
            .with_section(Section::new("B", "b"))
            .with_sections([Section::new("A", "a"), Section::new("C", "c")]);

        assert_eq!(manual.title(), "Title");
        assert_eq!(manual.headings(), vec!["B", "A", "C"]);
    }
}

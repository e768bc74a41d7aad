use folio_core::StaticLayout;
use folio_core::model::Content;
use folio_protocol::SectionId;

/// Vertical pixels represented by one terminal row. Keeps the page
/// geometry on the same scale as the browser, so the default tracker
/// margins behave alike.
pub const ROW_PX: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Blank,
    Title,
    Heading,
    Body,
    Accent,
    Muted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub text: String,
    pub kind: RowKind,
    /// Index of the project this row describes, if any.
    pub project: Option<usize>,
}

impl Row {
    fn new(kind: RowKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            project: None,
        }
    }

    fn blank() -> Self {
        Self::new(RowKind::Blank, "")
    }
}

#[derive(Debug, Clone)]
pub struct SectionSpan {
    pub id: SectionId,
    pub start: usize,
    pub rows: usize,
}

/// The whole page flattened into terminal rows.
#[derive(Debug, Clone)]
pub struct Document {
    rows: Vec<Row>,
    spans: Vec<SectionSpan>,
}

impl Document {
    /// Lay out `content` for a terminal `width` columns wide. The first
    /// section fills at least `viewport_rows`, like a full-height hero.
    pub fn build(content: &Content, width: u16, viewport_rows: usize) -> Self {
        let width = usize::from(width.max(20)) - 4;
        let mut rows = Vec::new();
        let mut spans = Vec::new();

        for (index, section) in content.sections.iter().enumerate() {
            let start = rows.len();
            let mut body = match &*section.id {
                "home" => hero_rows(content, width),
                "about" => about_rows(content, width),
                "projects" => project_rows(content, width),
                "contact" => contact_rows(content),
                _ => vec![Row::new(RowKind::Heading, section.label.clone())],
            };
            body.push(Row::blank());
            body.push(Row::blank());
            if index == 0 && body.len() < viewport_rows {
                body.resize(viewport_rows, Row::blank());
            }
            rows.extend(body);
            spans.push(SectionSpan {
                id: section.id.clone(),
                start,
                rows: rows.len() - start,
            });
        }

        Self { rows, spans }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn spans(&self) -> &[SectionSpan] {
        &self.spans
    }

    /// Geometry for the tracker, scrolled to `scroll_y`.
    pub fn layout(&self, viewport_rows: usize, scroll_y: f64) -> StaticLayout {
        StaticLayout::stacked(
            viewport_rows as f64 * ROW_PX,
            self.spans.iter().map(|s| (&s.id, s.rows as f64 * ROW_PX)),
        )
        .scrolled_to(scroll_y)
    }

    /// First project with a row inside the visible window.
    pub fn visible_project(&self, first_row: usize, viewport_rows: usize) -> Option<usize> {
        self.rows
            .iter()
            .skip(first_row)
            .take(viewport_rows)
            .find_map(|row| row.project)
    }
}

fn hero_rows(content: &Content, width: usize) -> Vec<Row> {
    let owner = &content.owner;
    let mut rows = vec![
        Row::blank(),
        Row::new(RowKind::Title, owner.name.clone()),
        Row::new(RowKind::Accent, owner.headline.clone()),
        Row::blank(),
    ];
    rows.extend(wrap(&owner.tagline, width).map(|l| Row::new(RowKind::Body, l)));
    rows.push(Row::blank());
    rows.push(Row::new(
        RowKind::Muted,
        "Tab: next section   m: menu   d: demo   q: quit",
    ));
    rows
}

fn about_rows(content: &Content, width: usize) -> Vec<Row> {
    let mut rows = vec![Row::new(RowKind::Heading, "About Me"), Row::blank()];
    rows.extend(wrap(&content.owner.about, width).map(|l| Row::new(RowKind::Body, l)));

    if !content.highlights.is_empty() {
        rows.push(Row::blank());
        rows.push(Row::new(RowKind::Accent, "Highlights"));
        rows.extend(
            content
                .highlights
                .iter()
                .map(|h| Row::new(RowKind::Body, format!("  • {h}"))),
        );
    }

    if !content.skills.is_empty() {
        rows.push(Row::blank());
        rows.push(Row::new(RowKind::Accent, "Skills"));
        for category in content.skill_categories() {
            let names: Vec<&str> = content
                .skills
                .iter()
                .filter(|s| s.category == category)
                .map(|s| s.name.as_str())
                .collect();
            rows.push(Row::new(
                RowKind::Body,
                format!("  {category}: {}", names.join(", ")),
            ));
        }
    }
    rows
}

fn project_rows(content: &Content, width: usize) -> Vec<Row> {
    let mut rows = vec![Row::new(RowKind::Heading, "Projects")];
    for (index, project) in content.projects.iter().enumerate() {
        let mut block = vec![
            Row::blank(),
            Row::new(
                RowKind::Title,
                format!("{} · {}", project.title, project.status),
            ),
            Row::new(RowKind::Accent, project.role.clone()),
        ];
        block.extend(wrap(&project.description, width).map(|l| Row::new(RowKind::Body, l)));
        if !project.technologies.is_empty() {
            block.push(Row::new(
                RowKind::Muted,
                format!("[{}]", project.technologies.join("] [")),
            ));
        }
        if let Some(link) = project.external_link() {
            block.push(Row::new(RowKind::Muted, format!("↗ {link}")));
        }
        if project.video.is_some() {
            block.push(Row::new(RowKind::Muted, "▶ demo available (d)"));
        }
        for row in &mut block {
            row.project = Some(index);
        }
        rows.extend(block);
    }
    rows
}

fn contact_rows(content: &Content) -> Vec<Row> {
    let mut rows = vec![Row::new(RowKind::Heading, "Get In Touch"), Row::blank()];
    rows.extend(
        content
            .contacts
            .iter()
            .map(|c| {
                let marker = if c.is_external() { " ↗" } else { "" };
                Row::new(
                    RowKind::Body,
                    format!("  {:<10} {}{marker}", c.label, c.href),
                )
            }),
    );
    rows
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> impl Iterator<Item = String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.into_iter()
}

#[cfg(test)]
mod tests {
    use folio_core::PageLayout;

    use super::*;

    fn builtin() -> Content {
        Content::builtin().unwrap()
    }

    #[test]
    fn spans_cover_every_row_in_order() {
        let doc = Document::build(&builtin(), 80, 30);
        let ids: Vec<&str> = doc.spans().iter().map(|s| &*s.id).collect();
        assert_eq!(ids, ["home", "about", "projects", "contact"]);

        let mut expected_start = 0;
        for span in doc.spans() {
            assert_eq!(span.start, expected_start);
            expected_start += span.rows;
        }
        assert_eq!(expected_start, doc.rows().len());
    }

    #[test]
    fn hero_fills_viewport() {
        let doc = Document::build(&builtin(), 80, 40);
        assert_eq!(doc.spans()[0].rows, 40);
    }

    #[test]
    fn layout_uses_row_scale() {
        let doc = Document::build(&builtin(), 80, 30);
        let layout = doc.layout(30, 100.0);
        let metrics = layout.metrics();
        assert!((metrics.viewport_height - 600.0).abs() < f64::EPSILON);
        assert!((metrics.document_height - doc.rows().len() as f64 * ROW_PX).abs() < f64::EPSILON);

        let about = &doc.spans()[1];
        let top = layout.section_offset_top("about").unwrap();
        assert!((top - about.start as f64 * ROW_PX).abs() < f64::EPSILON);
        let client = layout.section_client_top("about").unwrap();
        assert!((client - (top - 100.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn narrow_terminal_grows_the_document() {
        let wide = Document::build(&builtin(), 200, 10);
        let narrow = Document::build(&builtin(), 30, 10);
        assert!(narrow.rows().len() > wide.rows().len());
    }

    #[test]
    fn visible_project_finds_first_in_window() {
        let doc = Document::build(&builtin(), 80, 20);
        let projects = &doc.spans()[2];
        assert_eq!(doc.visible_project(0, 20), None);
        assert_eq!(doc.visible_project(projects.start, 20), Some(0));
    }

    #[test]
    fn placeholder_links_are_not_shown() {
        let doc = Document::build(&builtin(), 80, 20);
        let links = doc
            .rows()
            .iter()
            .filter(|r| r.text.starts_with('↗'))
            .count();
        assert_eq!(links, 2);
    }

    #[test]
    fn only_web_contacts_are_marked_external() {
        let content = builtin();
        let doc = Document::build(&content, 80, 20);
        let contact = doc.spans().last().unwrap();
        let rows = &doc.rows()[contact.start..contact.start + contact.rows];
        for link in &content.contacts {
            let row = rows.iter().find(|r| r.text.contains(&link.href)).unwrap();
            assert_eq!(row.text.ends_with('↗'), link.is_external(), "{}", link.href);
        }
    }

    #[test]
    fn wrap_respects_width() {
        let lines: Vec<String> = wrap("one two three four five", 9).collect();
        assert_eq!(lines, ["one two", "three", "four five"]);
        assert!(wrap("", 10).next().is_none());
        let long: Vec<String> = wrap("abcdefghijkl x", 5).collect();
        assert_eq!(long, ["abcdefghijkl", "x"]);
    }
}

use std::collections::HashSet;

use folio_protocol::SectionId;
use serde::{Deserialize, Serialize};

use super::content::ContentError;

/// One navigable, vertically stacked region of the page.
///
/// The section's vertical offset is deliberately absent: layout can change
/// at any time (resize, late image loads), so it is read from the live
/// [`PageLayout`](crate::layout::PageLayout) on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    /// Text shown in the navigation bar.
    pub label: String,
    /// Glyph reference, opaque to the core (e.g. `"user"`, `"briefcase"`).
    #[serde(default)]
    pub icon: String,
}

impl Section {
    pub fn new(id: impl Into<SectionId>, label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: icon.into(),
        }
    }
}

/// The fixed, ordered, non-empty sequence of sections declared at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Section>", into = "Vec<Section>")]
pub struct SectionList {
    sections: Vec<Section>,
}

impl SectionList {
    /// Validate and freeze a section sequence.
    ///
    /// Rejects an empty list, empty ids, and duplicate ids.
    pub fn new(sections: Vec<Section>) -> Result<Self, ContentError> {
        if sections.is_empty() {
            return Err(ContentError::NoSections);
        }
        let mut seen = HashSet::with_capacity(sections.len());
        for (index, section) in sections.iter().enumerate() {
            if section.id.is_empty() {
                return Err(ContentError::EmptySectionId { index });
            }
            if !seen.insert(section.id.as_str()) {
                return Err(ContentError::DuplicateSection(section.id.to_string()));
            }
        }
        Ok(Self { sections })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Top-most section; the fallback when nothing else matches.
    pub fn first(&self) -> &Section {
        &self.sections[0]
    }

    /// Bottom-most section; forced active at the end of the document.
    pub fn last(&self) -> &Section {
        &self.sections[self.sections.len() - 1]
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

impl TryFrom<Vec<Section>> for SectionList {
    type Error = ContentError;

    fn try_from(sections: Vec<Section>) -> Result<Self, Self::Error> {
        Self::new(sections)
    }
}

impl From<SectionList> for Vec<Section> {
    fn from(list: SectionList) -> Self {
        list.sections
    }
}

impl<'a> IntoIterator for &'a SectionList {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Vec<Section> {
        vec![
            Section::new("home", "Home", "user"),
            Section::new("about", "About", "user"),
            Section::new("projects", "Projects", "briefcase"),
            Section::new("contact", "Contact", "message-circle"),
        ]
    }

    #[test]
    fn keeps_declared_order() {
        let list = SectionList::new(standard()).unwrap_or_else(|e| unreachable!("{e}"));
        let ids: Vec<&str> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["home", "about", "projects", "contact"]);
        assert_eq!(list.first().id, "home");
        assert_eq!(list.last().id, "contact");
        assert_eq!(list.position("projects"), Some(2));
        assert!(!list.contains("blog"));
    }

    #[test]
    fn rejects_empty_list() {
        assert!(matches!(
            SectionList::new(Vec::new()),
            Err(ContentError::NoSections)
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut sections = standard();
        sections.push(Section::new("about", "About again", ""));
        match SectionList::new(sections) {
            Err(ContentError::DuplicateSection(id)) => assert_eq!(id, "about"),
            other => unreachable!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_id() {
        let sections = vec![Section::new("home", "Home", ""), Section::new("", "?", "")];
        assert!(matches!(
            SectionList::new(sections),
            Err(ContentError::EmptySectionId { index: 1 })
        ));
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::section::SectionList;

/// Content bundled with the crate, used when a host supplies none.
pub const BUILTIN_CONTENT: &str = include_str!("../../assets/content.json");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid content json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("content declares no sections")]
    NoSections,
    #[error("section at index {index} has an empty id")]
    EmptySectionId { index: usize },
    #[error("duplicate section id: {0}")]
    DuplicateSection(String),
}

/// Everything the page displays. Produced externally, consumed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub owner: Owner,
    pub sections: SectionList,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    /// Short "currently working on" bullet points for the about section.
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub contacts: Vec<ContactLink>,
}

impl Content {
    /// Parse content from JSON, validating the section list.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json(BUILTIN_CONTENT)
    }

    /// Distinct skill categories in first-seen order.
    pub fn skill_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for skill in &self.skills {
            if !categories.contains(&skill.category.as_str()) {
                categories.push(&skill.category);
            }
        }
        categories
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    pub headline: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub about: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    /// Cover image reference.
    #[serde(default)]
    pub image: Option<String>,
    /// Demo video reference handed to the demo overlay.
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub link: String,
    pub status: String,
    pub role: String,
}

impl Project {
    /// External project link, or `None` for the `"#"` placeholder.
    pub fn external_link(&self) -> Option<&str> {
        match self.link.trim() {
            "" | "#" => None,
            link => Some(link),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactLink {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub icon: String,
}

impl ContactLink {
    /// Whether the link leaves the page (and should open in a new tab).
    pub fn is_external(&self) -> bool {
        self.href.starts_with("http://") || self.href.starts_with("https://")
    }
}

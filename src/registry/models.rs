use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::page::derived_pdf_name;

/// The fixed set of subject listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Main,
    DataScience,
    Cyber,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Main, Category::DataScience, Category::Cyber];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Main => "main",
            Category::DataScience => "data-science",
            Category::Cyber => "cyber",
        }
    }

    /// Hand-maintained listing page the registry is bootstrapped from.
    pub fn listing_page(self) -> &'static str {
        match self {
            Category::Main => "index.html",
            Category::DataScience => "data-science.html",
            Category::Cyber => "cybersecurity.html",
        }
    }

    /// `id` of the `<ul>` holding this category's links on its listing page.
    pub fn container_id(self) -> &'static str {
        match self {
            Category::Main => "main-subjects-list",
            Category::DataScience => "data-science-subjects",
            Category::Cyber => "cyber-subjects",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One listed topic and its generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub title: String,
    /// Generated page, relative to the site root.
    pub filename: String,
    /// Explicit PDF reference. Documents written before this field existed
    /// leave it out and fall back to the naming convention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
}

impl Subject {
    /// The PDF this subject points at.
    pub fn pdf_name(&self) -> String {
        self.pdf
            .clone()
            .unwrap_or_else(|| derived_pdf_name(&self.filename))
    }
}

/// The persisted category → subjects document.
///
/// Filenames are unique within a category; the same filename may appear
/// under several categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub main: Vec<Subject>,
    #[serde(default, rename = "data-science")]
    pub data_science: Vec<Subject>,
    #[serde(default)]
    pub cyber: Vec<Subject>,
    /// Keys this service has no category for. Carried through rewrites
    /// untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Registry {
    pub fn subjects(&self, category: Category) -> &[Subject] {
        match category {
            Category::Main => &self.main,
            Category::DataScience => &self.data_science,
            Category::Cyber => &self.cyber,
        }
    }

    pub fn subjects_mut(&mut self, category: Category) -> &mut Vec<Subject> {
        match category {
            Category::Main => &mut self.main,
            Category::DataScience => &mut self.data_science,
            Category::Cyber => &mut self.cyber,
        }
    }

    pub fn contains(&self, category: Category, filename: &str) -> bool {
        self.subjects(category).iter().any(|s| s.filename == filename)
    }

    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.subjects(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the registry keeping only subjects whose title contains
    /// `query` (case-insensitive). Every category stays present.
    pub fn filtered(&self, query: &str) -> Registry {
        let needle = query.to_lowercase();
        let mut out = Registry::default();
        for category in Category::ALL {
            *out.subjects_mut(category) = self
                .subjects(category)
                .iter()
                .filter(|s| s.title.to_lowercase().contains(&needle))
                .cloned()
                .collect();
        }
        out
    }
}

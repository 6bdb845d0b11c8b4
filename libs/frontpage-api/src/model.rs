use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FrontpageError;

/// Longest accepted value for any user supplied text field.
pub const MAX_FIELD_LEN: usize = 120;

/// Code printed for subjects that have none configured.
pub const NO_SUBJECT_CODE: &str = "N/A";

/// Trim `value` and check it is a non-empty string of at most [`MAX_FIELD_LEN`] chars.
pub fn validate_field<'a>(label: &str, value: &'a str) -> Result<&'a str, FrontpageError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FrontpageError::validation(format!("'{label}' is required")));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(FrontpageError::validation(format!(
            "'{label}' must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(value)
}

// ════════════════════════════════════════════════════════════════
//  Category
// ════════════════════════════════════════════════════════════════

/// Subject category. `general` is the legacy wire name of [`Category::Cs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "general")]
    Cs,
    Ece,
    Aiml,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Cs, Category::Ece, Category::Aiml];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Cs => "cs",
            Category::Ece => "ece",
            Category::Aiml => "aiml",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = FrontpageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cs" | "general" => Ok(Category::Cs),
            "ece" => Ok(Category::Ece),
            "aiml" => Ok(Category::Aiml),
            other => Err(FrontpageError::validation(format!(
                "'category' must be 'cs', 'ece' or 'aiml', got '{other}'"
            ))),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Config Document
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub category: Category,
    pub name: String,
}

/// Subject names per category, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectLists {
    #[serde(default)]
    pub cs: Vec<String>,
    #[serde(default)]
    pub ece: Vec<String>,
    #[serde(default)]
    pub aiml: Vec<String>,
}

impl SubjectLists {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Cs => &self.cs,
            Category::Ece => &self.ece,
            Category::Aiml => &self.aiml,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Cs => &mut self.cs,
            Category::Ece => &mut self.ece,
            Category::Aiml => &mut self.aiml,
        }
    }

    /// True if any category lists `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        Category::ALL
            .iter()
            .any(|c| self.get(*c).iter().any(|n| n == name))
    }
}

/// The persisted admin configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub subjects: SubjectLists,
    #[serde(default)]
    pub subject_codes: BTreeMap<String, String>,
    #[serde(default)]
    pub streams: Vec<String>,
}

impl ConfigDocument {
    /// Check the document invariants: no blank entries, no duplicate
    /// names within a category, no duplicate stream labels.
    pub fn validate(&self) -> Result<(), FrontpageError> {
        for category in Category::ALL {
            check_unique(&format!("subjects.{category}"), self.subjects.get(category))?;
        }
        check_unique("streams", &self.streams)
    }

    pub fn has_subject(&self, name: &str) -> bool {
        self.subjects.contains_name(name)
    }

    pub fn has_stream(&self, label: &str) -> bool {
        self.streams.iter().any(|s| s == label)
    }

    pub fn subject_code(&self, name: &str) -> &str {
        self.subject_codes
            .get(name)
            .map(String::as_str)
            .unwrap_or(NO_SUBJECT_CODE)
    }
}

fn check_unique(section: &str, items: &[String]) -> Result<(), FrontpageError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.trim().is_empty() || item.trim() != item {
            return Err(FrontpageError::internal(format!(
                "{section}: invalid entry '{item}'"
            )));
        }
        if !seen.insert(item.as_str()) {
            return Err(FrontpageError::internal(format!(
                "{section}: duplicate entry '{item}'"
            )));
        }
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════
//  Generation log
// ════════════════════════════════════════════════════════════════

/// One completed frontpage generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub roll: String,
    #[serde(alias = "reg")]
    pub registration: String,
    pub subject: String,
    pub stream: String,
    pub semester: String,
}

/// Semester number 1..=8, displayed in the ordinal form printed on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Semester(u8);

impl Semester {
    pub fn new(n: u8) -> Result<Self, FrontpageError> {
        if (1..=8).contains(&n) {
            Ok(Self(n))
        } else {
            Err(FrontpageError::validation("'semester' must be between 1 and 8"))
        }
    }
}

impl FromStr for Semester {
    type Err = FrontpageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| FrontpageError::validation("'semester' must be a number"))?;
        Self::new(n)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.0 {
            1 => "ST",
            2 => "ND",
            3 => "RD",
            _ => "TH",
        };
        write!(f, "{}{suffix}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_accepts_legacy_name() {
        assert_eq!("general".parse::<Category>().unwrap(), Category::Cs);
        assert_eq!(" ECE ".parse::<Category>().unwrap(), Category::Ece);
        assert!("physics".parse::<Category>().is_err());

        let c: Category = serde_json::from_str("\"general\"").unwrap();
        assert_eq!(c, Category::Cs);
        assert_eq!(serde_json::to_string(&Category::Aiml).unwrap(), "\"aiml\"");
    }

    #[test]
    fn semester_ordinals() {
        let rendered: Vec<String> = (1..=8)
            .map(|n| Semester::new(n).unwrap().to_string())
            .collect();
        assert_eq!(rendered, ["1ST", "2ND", "3RD", "4TH", "5TH", "6TH", "7TH", "8TH"]);
        assert!(Semester::new(0).is_err());
        assert!("9".parse::<Semester>().is_err());
        assert!("third".parse::<Semester>().is_err());
    }

    #[test]
    fn validate_field_trims_and_bounds() {
        assert_eq!(validate_field("name", "  Ada  ").unwrap(), "Ada");
        assert!(validate_field("name", "   ").is_err());
        let long = "x".repeat(MAX_FIELD_LEN + 1);
        assert!(validate_field("name", &long).is_err());
    }

    #[test]
    fn document_rejects_duplicates_per_category() {
        let mut doc = ConfigDocument::default();
        doc.subjects.cs = vec!["Maths".into(), "Maths".into()];
        assert!(doc.validate().is_err());

        doc.subjects.cs = vec!["Maths".into()];
        doc.subjects.ece = vec!["Maths".into()];
        assert!(doc.validate().is_ok());

        doc.streams = vec!["CSE".into(), "CSE".into()];
        assert!(doc.validate().is_err());
    }

    #[test]
    fn subject_code_defaults() {
        let mut doc = ConfigDocument::default();
        doc.subject_codes.insert("Maths".into(), "MA101".into());
        assert_eq!(doc.subject_code("Maths"), "MA101");
        assert_eq!(doc.subject_code("Physics"), NO_SUBJECT_CODE);
    }

    #[test]
    fn record_reads_legacy_reg_key() {
        let line = r#"{"timestamp":"2024-01-02T03:04:05Z","name":"A","roll":"1","reg":"R1","subject":"S","stream":"CSE","semester":"3RD"}"#;
        let record: GenerationRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.registration, "R1");
    }
}

use frontpage_api::{validate_field, FrontpageError};

/// The values printed on a cover page, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverFields {
    pub name: String,
    pub roll: String,
    pub registration: String,
    pub stream: String,
    pub semester: String,
    pub subject_code: String,
    pub subject: String,
}

impl CoverFields {
    /// The lines in drawing order, each trimmed and length checked.
    pub fn lines(&self) -> Result<[&str; 7], FrontpageError> {
        Ok([
            validate_field("name", &self.name)?,
            validate_field("roll", &self.roll)?,
            validate_field("registration", &self.registration)?,
            validate_field("stream", &self.stream)?,
            validate_field("semester", &self.semester)?,
            validate_field("subject_code", &self.subject_code)?,
            validate_field("subject", &self.subject)?,
        ])
    }
}

use std::path::{Path, PathBuf};

use frontpage_api::{validate_field, Category, ConfigDocument, FrontpageError, Subject};

// ════════════════════════════════════════════════════════════════
//  ConfigStore
// ════════════════════════════════════════════════════════════════

/// Handle to the Config Document on disk. Every call re-reads the file.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the document. A missing file reads as empty.
    pub fn get(&self) -> Result<ConfigDocument, FrontpageError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "config file missing, using empty document");
                return Ok(ConfigDocument::default());
            }
            Err(e) => {
                return Err(FrontpageError::internal(format!(
                    "read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let doc: ConfigDocument = serde_json::from_str(&text).map_err(|e| {
            FrontpageError::internal(format!("parse {}: {e}", self.path.display()))
        })?;
        doc.validate()
            .map_err(|e| e.with_context(self.path.display()))?;
        Ok(doc)
    }

    /// Overwrite the file with `doc`, pretty-printed.
    pub fn save(&self, doc: &ConfigDocument) -> Result<(), FrontpageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| FrontpageError::internal(format!("mkdir {}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, json)
            .map_err(|e| FrontpageError::internal(format!("write {}: {e}", self.path.display())))
    }

    // ── Subjects ──

    pub fn add_subject(
        &self,
        category: Category,
        name: &str,
        code: Option<&str>,
    ) -> Result<Subject, FrontpageError> {
        let name = validate_field("name", name)?;
        let code = normalize_code(code)?;

        self.update(|doc| {
            let list = doc.subjects.get_mut(category);
            if list.iter().any(|n| n == name) {
                return Err(FrontpageError::conflict(format!(
                    "subject '{name}' already exists in {category}"
                )));
            }
            list.push(name.to_string());
            if let Some(code) = code {
                doc.subject_codes.insert(name.to_string(), code.to_string());
            }
            Ok(Subject { category, name: name.to_string() })
        })
    }

    /// Rename a subject in place. The code follows the subject unless a new
    /// one is given.
    pub fn edit_subject(
        &self,
        category: Category,
        old_name: &str,
        new_name: &str,
        code: Option<&str>,
    ) -> Result<Subject, FrontpageError> {
        let old_name = validate_field("oldName", old_name)?;
        let new_name = validate_field("newName", new_name)?;
        let code = normalize_code(code)?;

        self.update(|doc| {
            let list = doc.subjects.get_mut(category);
            let idx = list.iter().position(|n| n == old_name).ok_or_else(|| {
                FrontpageError::not_found(format!("subject '{old_name}' not found in {category}"))
            })?;
            if new_name != old_name && list.iter().any(|n| n == new_name) {
                return Err(FrontpageError::conflict(format!(
                    "subject '{new_name}' already exists in {category}"
                )));
            }
            list[idx] = new_name.to_string();

            let previous = doc.subject_codes.get(old_name).cloned();
            if !doc.subjects.contains_name(old_name) {
                doc.subject_codes.remove(old_name);
            }
            // an existing code for new_name wins over the one carried from old_name
            let carried = previous.filter(|_| !doc.subject_codes.contains_key(new_name));
            if let Some(code) = code.map(str::to_string).or(carried) {
                doc.subject_codes.insert(new_name.to_string(), code);
            }
            Ok(Subject { category, name: new_name.to_string() })
        })
    }

    pub fn delete_subject(&self, category: Category, name: &str) -> Result<Subject, FrontpageError> {
        let name = validate_field("name", name)?;

        self.update(|doc| {
            let list = doc.subjects.get_mut(category);
            let before = list.len();
            list.retain(|n| n != name);
            if list.len() == before {
                return Err(FrontpageError::not_found(format!(
                    "subject '{name}' not found in {category}"
                )));
            }
            if !doc.subjects.contains_name(name) {
                doc.subject_codes.remove(name);
            }
            Ok(Subject { category, name: name.to_string() })
        })
    }

    // ── Streams ──

    pub fn add_stream(&self, label: &str) -> Result<String, FrontpageError> {
        let label = validate_field("label", label)?;

        self.update(|doc| {
            if doc.has_stream(label) {
                return Err(FrontpageError::conflict(format!("stream '{label}' already exists")));
            }
            doc.streams.push(label.to_string());
            Ok(label.to_string())
        })
    }

    pub fn delete_stream(&self, label: &str) -> Result<String, FrontpageError> {
        let label = validate_field("label", label)?;

        self.update(|doc| {
            let before = doc.streams.len();
            doc.streams.retain(|s| s != label);
            if doc.streams.len() == before {
                return Err(FrontpageError::not_found(format!("stream '{label}' not found")));
            }
            Ok(label.to_string())
        })
    }

    /// Read-modify-write of the whole document. Nothing is written when `f` fails.
    fn update<T>(
        &self,
        f: impl FnOnce(&mut ConfigDocument) -> Result<T, FrontpageError>,
    ) -> Result<T, FrontpageError> {
        let mut doc = self.get()?;
        let out = f(&mut doc)?;
        self.save(&doc)?;
        Ok(out)
    }
}

fn normalize_code(code: Option<&str>) -> Result<Option<&str>, FrontpageError> {
    match code.map(str::trim) {
        None | Some("") => Ok(None),
        Some(c) => validate_field("code", c).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontpage_api::ErrorKind;

    fn store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("admin_config.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_is_empty_document() {
        let (_dir, store) = store();
        assert_eq!(store.get().unwrap(), ConfigDocument::default());
    }

    #[test]
    fn add_subject_then_duplicate_conflicts() {
        let (_dir, store) = store();
        store.add_subject(Category::Cs, "Operating Systems", Some("CS301")).unwrap();

        let err = store.add_subject(Category::Cs, " Operating Systems ", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let doc = store.get().unwrap();
        assert_eq!(doc.subjects.cs, vec!["Operating Systems".to_string()]);
        assert_eq!(doc.subject_code("Operating Systems"), "CS301");
    }

    #[test]
    fn same_name_allowed_in_other_category() {
        let (_dir, store) = store();
        store.add_subject(Category::Cs, "Signals", None).unwrap();
        store.add_subject(Category::Ece, "Signals", None).unwrap();

        let doc = store.get().unwrap();
        assert_eq!(doc.subjects.cs, vec!["Signals".to_string()]);
        assert_eq!(doc.subjects.ece, vec!["Signals".to_string()]);
    }

    #[test]
    fn edit_subject_keeps_position_and_moves_code() {
        let (_dir, store) = store();
        store.add_subject(Category::Aiml, "ML", Some("AI201")).unwrap();
        store.add_subject(Category::Aiml, "NLP", None).unwrap();

        store.edit_subject(Category::Aiml, "ML", "Machine Learning", None).unwrap();

        let doc = store.get().unwrap();
        assert_eq!(doc.subjects.aiml, vec!["Machine Learning".to_string(), "NLP".to_string()]);
        assert_eq!(doc.subject_code("Machine Learning"), "AI201");
        assert!(!doc.subject_codes.contains_key("ML"));
    }

    #[test]
    fn edit_subject_keeps_existing_code_of_same_name() {
        let (_dir, store) = store();
        store.add_subject(Category::Ece, "Maths", Some("EC100")).unwrap();
        store.add_subject(Category::Cs, "Algebra", Some("CS200")).unwrap();

        store.edit_subject(Category::Cs, "Algebra", "Maths", None).unwrap();
        let doc = store.get().unwrap();
        assert_eq!(doc.subject_code("Maths"), "EC100");
        assert!(!doc.subject_codes.contains_key("Algebra"));
        assert_eq!(doc.subjects.cs, ["Maths"]);

        store.edit_subject(Category::Cs, "Maths", "Maths", Some("CS300")).unwrap();
        assert_eq!(store.get().unwrap().subject_code("Maths"), "CS300");
    }

    #[test]
    fn edit_subject_errors() {
        let (_dir, store) = store();
        store.add_subject(Category::Cs, "A", None).unwrap();
        store.add_subject(Category::Cs, "B", None).unwrap();

        let missing = store.edit_subject(Category::Cs, "Z", "Y", None).unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);

        let taken = store.edit_subject(Category::Cs, "A", "B", None).unwrap_err();
        assert_eq!(taken.kind, ErrorKind::Conflict);

        store.edit_subject(Category::Cs, "A", "A", Some("CS1")).unwrap();
        assert_eq!(store.get().unwrap().subject_code("A"), "CS1");
    }

    #[test]
    fn delete_subject_missing_is_not_found() {
        let (_dir, store) = store();
        let err = store.delete_subject(Category::Ece, "Nothing").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(!store.path().exists());
    }

    #[test]
    fn delete_subject_keeps_code_used_elsewhere() {
        let (_dir, store) = store();
        store.add_subject(Category::Cs, "Maths", Some("MA1")).unwrap();
        store.add_subject(Category::Ece, "Maths", None).unwrap();

        store.delete_subject(Category::Cs, "Maths").unwrap();
        assert_eq!(store.get().unwrap().subject_code("Maths"), "MA1");

        store.delete_subject(Category::Ece, "Maths").unwrap();
        assert!(store.get().unwrap().subject_codes.is_empty());
    }

    #[test]
    fn streams_add_and_delete() {
        let (_dir, store) = store();
        store.add_stream("CSE").unwrap();
        assert_eq!(store.add_stream("CSE").unwrap_err().kind, ErrorKind::Conflict);
        assert_eq!(store.delete_stream("ECE").unwrap_err().kind, ErrorKind::NotFound);
        store.delete_stream("CSE").unwrap();
        assert!(store.get().unwrap().streams.is_empty());
    }

    #[test]
    fn blank_input_is_validation_error() {
        let (_dir, store) = store();
        assert_eq!(store.add_stream("  ").unwrap_err().kind, ErrorKind::Validation);
        assert_eq!(
            store.add_subject(Category::Cs, "", None).unwrap_err().kind,
            ErrorKind::Validation
        );
    }

    #[test]
    fn save_then_reload_round_trips() {
        let (_dir, store) = store();
        let mut doc = ConfigDocument::default();
        doc.subjects.cs = vec!["DSA".into(), "DBMS".into()];
        doc.subjects.aiml = vec!["Deep Learning".into()];
        doc.subject_codes.insert("DSA".into(), "CS201".into());
        doc.streams = vec!["CSE".into(), "AIML".into()];

        store.save(&doc).unwrap();
        assert_eq!(store.get().unwrap(), doc);
    }

    #[test]
    fn corrupt_document_is_rejected_on_load() {
        let (_dir, store) = store();
        std::fs::write(store.path(), r#"{"streams": ["CSE", "CSE"]}"#).unwrap();
        assert_eq!(store.get().unwrap_err().kind, ErrorKind::Internal);

        std::fs::write(store.path(), "not json").unwrap();
        assert_eq!(store.get().unwrap_err().kind, ErrorKind::Internal);
    }
}

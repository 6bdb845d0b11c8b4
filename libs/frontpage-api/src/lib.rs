pub mod error;
pub mod model;

pub use error::{ErrorKind, FrontpageError};
pub use model::{
    validate_field, Category, ConfigDocument, GenerationRecord, Semester, Subject, SubjectLists,
    MAX_FIELD_LEN, NO_SUBJECT_CODE,
};

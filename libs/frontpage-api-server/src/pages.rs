use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::Utc;
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

use frontpage_api::{
    validate_field, Category, ErrorKind, FrontpageError, GenerationRecord, Semester, MAX_FIELD_LEN,
};
use frontpage_render::CoverFields;

use crate::{ApiError, AppState};

pub(crate) fn templates() -> Result<Environment<'static>, FrontpageError> {
    let mut env = Environment::new();
    env.add_template("index.html", include_str!("../templates/index.html"))
        .map_err(|e| FrontpageError::internal(format!("template index.html: {e}")))?;
    env.add_template("admin.html", include_str!("../templates/admin.html"))
        .map_err(|e| FrontpageError::internal(format!("template admin.html: {e}")))?;
    Ok(env)
}

// --- GET / ---

pub(crate) async fn index() -> Redirect {
    Redirect::to("/frontpages")
}

// --- GET /admin/dashboard ---

pub(crate) async fn dashboard(State(state): State<AppState>) -> Response {
    match render_page(&state, "admin.html", context! {}) {
        Ok(html) => Html(html).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

// --- GET /frontpages ---

pub(crate) async fn form(State(state): State<AppState>) -> Response {
    form_response(&state, StatusCode::OK, None)
}

// --- POST /frontpages ---

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateForm {
    name: Option<String>,
    roll: Option<String>,
    #[serde(alias = "reg")]
    registration: Option<String>,
    subject: Option<String>,
    stream: Option<String>,
    semester: Option<String>,
}

pub(crate) async fn generate(
    State(state): State<AppState>,
    form: Result<Form<GenerateForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            let err = FrontpageError::validation(rejection.body_text());
            return form_response(&state, StatusCode::BAD_REQUEST, Some(err.message.as_str()));
        }
    };

    match produce(&state, &form).await {
        Ok(response) => response,
        Err(e) if e.is(ErrorKind::Validation) => {
            tracing::debug!(error = %e, "rejected frontpage submission");
            form_response(&state, StatusCode::BAD_REQUEST, Some(e.message.as_str()))
        }
        Err(e) => ApiError(e).into_response(),
    }
}

async fn produce(state: &AppState, form: &GenerateForm) -> Result<Response, FrontpageError> {
    let name = required("name", &form.name)?;
    let roll = required("roll", &form.roll)?;
    let registration = required("registration", &form.registration)?;
    let subject = required("subject", &form.subject)?;
    let stream = required("stream", &form.stream)?;
    let semester: Semester = required("semester", &form.semester)?.parse()?;

    let doc = state.config.get()?;
    if !doc.has_subject(subject) {
        return Err(FrontpageError::validation(format!("unknown subject '{subject}'")));
    }
    if !doc.has_stream(stream) {
        return Err(FrontpageError::validation(format!("unknown stream '{stream}'")));
    }

    let fields = CoverFields {
        name: name.to_string(),
        roll: roll.to_string(),
        registration: registration.to_string(),
        stream: stream.to_string(),
        semester: semester.to_string(),
        subject_code: doc.subject_code(subject).to_string(),
        subject: subject.to_string(),
    };
    let record = GenerationRecord {
        timestamp: Utc::now(),
        name: fields.name.clone(),
        roll: fields.roll.clone(),
        registration: fields.registration.clone(),
        subject: fields.subject.clone(),
        stream: fields.stream.clone(),
        semester: fields.semester.clone(),
    };

    let renderer = state.renderer.clone();
    let png = tokio::task::spawn_blocking(move || renderer.render(&fields))
        .await
        .map_err(|e| FrontpageError::internal(format!("render task: {e}")))??;

    state.logs.append(&record)?;
    tracing::info!(
        name = %record.name,
        subject = %record.subject,
        stream = %record.stream,
        semester = %record.semester,
        bytes = png.len(),
        "generated frontpage"
    );

    let disposition = format!(
        "attachment; filename=\"{}\"",
        download_name(&record.name, &record.subject)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        png,
    )
        .into_response())
}

fn required<'a>(label: &str, value: &'a Option<String>) -> Result<&'a str, FrontpageError> {
    validate_field(label, value.as_deref().unwrap_or(""))
}

/// `<name>-<subject>-FrontPageCover.png`, restricted to a header-safe charset.
pub(crate) fn download_name(name: &str, subject: &str) -> String {
    let raw = format!("{name}-{}-FrontPageCover.png", subject.replace(' ', "-"));
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════
//  Page rendering
// ════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct SubjectGroup<'a> {
    label: String,
    subjects: &'a [String],
}

fn form_response(state: &AppState, status: StatusCode, error: Option<&str>) -> Response {
    let html = state.config.get().and_then(|doc| {
        let subject_groups: Vec<SubjectGroup<'_>> = Category::ALL
            .iter()
            .map(|c| SubjectGroup {
                label: c.as_str().to_ascii_uppercase(),
                subjects: doc.subjects.get(*c),
            })
            .filter(|g| !g.subjects.is_empty())
            .collect();
        render_page(
            state,
            "index.html",
            context! {
                error => error,
                streams => &doc.streams,
                subject_groups => subject_groups,
                semesters => (1u8..=8).collect::<Vec<_>>(),
                max_len => MAX_FIELD_LEN,
            },
        )
    });

    match html {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

fn render_page(
    state: &AppState,
    name: &str,
    ctx: minijinja::Value,
) -> Result<String, FrontpageError> {
    state
        .pages
        .get_template(name)
        .and_then(|t| t.render(ctx))
        .map_err(|e| FrontpageError::internal(format!("render {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_name_is_header_safe() {
        assert_eq!(
            download_name("Ada Lovelace", "Data Structures & Algorithms"),
            "Ada-Lovelace-Data-Structures---Algorithms-FrontPageCover.png"
        );
        assert_eq!(download_name("a\"b", "OS"), "a-b-OS-FrontPageCover.png");
    }

    #[test]
    fn templates_parse() {
        let env = templates().unwrap();
        assert!(env.get_template("index.html").is_ok());
        assert!(env.get_template("admin.html").is_ok());
    }
}

//! Axum route handlers for the persisted screening workflow.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::matching::fuzzy::SkillMatch;
use crate::matching::handlers::run_pipeline;
use crate::matching::jd_parser::{parse_jd, JobRequirement};
use crate::matching::scorer::{MatchReport, Verdict};
use crate::models::screening::{
    decode_missing, split_title, JobDescriptionRow, ShortlistRow, TitleParts,
};
use crate::screening::store::{
    get_job_description, list_evaluations, list_job_descriptions, save_evaluation,
    save_job_description, EvaluationFilter,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct JdCreatedResponse {
    pub jd_id: Uuid,
    pub requirement: JobRequirement,
}

#[derive(Debug, Serialize)]
pub struct JdDetailResponse {
    pub job_description: JobDescriptionRow,
    pub requirement: JobRequirement,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub evaluation_id: Uuid,
    pub jd_id: Uuid,
    pub resume_identifier: String,
    pub requirement: JobRequirement,
    pub matches: Vec<SkillMatch>,
    pub report: MatchReport,
}

#[derive(Debug, Deserialize)]
pub struct EvaluationQuery {
    pub jd_id: Option<Uuid>,
    pub verdict: Option<String>,
    pub shortlisted: Option<bool>,
    pub title: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShortlistEntry {
    pub id: Uuid,
    pub jd_id: Uuid,
    pub jd_title: String,
    pub role: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub resume_identifier: String,
    pub final_score: f64,
    pub verdict: String,
    pub shortlisted: bool,
    pub missing: Vec<String>,
}

impl ShortlistEntry {
    fn from_row(row: ShortlistRow) -> Result<Self, AppError> {
        let missing = decode_missing(&row.missing).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "evaluation {} has a corrupt missing list: {e}",
                row.id
            ))
        })?;
        let shortlisted = row
            .verdict
            .parse::<Verdict>()
            .map(|v| v.is_shortlisted())
            .unwrap_or(false);
        let TitleParts {
            role,
            company,
            location,
        } = split_title(&row.jd_title);
        Ok(Self {
            id: row.id,
            jd_id: row.jd_id,
            jd_title: row.jd_title,
            role,
            company,
            location,
            resume_identifier: row.resume_identifier,
            final_score: row.final_score,
            verdict: row.verdict,
            shortlisted,
            missing,
        })
    }
}

/// One uploaded form field, buffered.
struct FormField {
    name: String,
    file_name: Option<String>,
    bytes: Vec<u8>,
}

async fn read_form(mut multipart: Multipart) -> Result<Vec<FormField>, AppError> {
    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read field '{name}': {e}")))?;
        fields.push(FormField {
            name,
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Ok(fields)
}

fn take_field(fields: &mut Vec<FormField>, name: &str) -> Option<FormField> {
    let index = fields.iter().position(|f| f.name == name)?;
    Some(fields.swap_remove(index))
}

fn field_text(field: &FormField) -> String {
    String::from_utf8_lossy(&field.bytes).trim().to_string()
}

/// Extracts text from an uploaded file on the blocking pool (PDF and DOCX parsing is CPU-bound).
async fn extract_upload(field: FormField, fallback_name: &str) -> Result<(String, String), AppError> {
    let file_name = field
        .file_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| fallback_name.to_string());
    let name = file_name.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(&name, &field.bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;
    Ok((file_name, text))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jds
///
/// Multipart: `title` plus either `jd_text` or an uploaded `jd_file` (.txt/.md/.pdf/.docx).
pub async fn handle_upload_jd(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<JdCreatedResponse>, AppError> {
    let mut fields = read_form(multipart).await?;

    let title = take_field(&mut fields, "title")
        .map(|f| field_text(&f))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("title is required".to_string()))?;

    let content = match take_field(&mut fields, "jd_file") {
        Some(file) => extract_upload(file, "jd.txt").await?.1,
        None => take_field(&mut fields, "jd_text")
            .map(|f| field_text(&f))
            .unwrap_or_default(),
    };

    if content.trim().is_empty() {
        return Err(AppError::Validation(
            "provide jd_text or a non-empty jd_file".to_string(),
        ));
    }

    let row = save_job_description(&state.db, &title, &content).await?;
    let requirement = parse_jd(&row.content);

    Ok(Json(JdCreatedResponse {
        jd_id: row.id,
        requirement,
    }))
}

/// GET /api/v1/jds
pub async fn handle_list_jds(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobDescriptionRow>>, AppError> {
    Ok(Json(list_job_descriptions(&state.db).await?))
}

/// GET /api/v1/jds/:id
pub async fn handle_get_jd(
    State(state): State<AppState>,
    Path(jd_id): Path<Uuid>,
) -> Result<Json<JdDetailResponse>, AppError> {
    let job_description = get_job_description(&state.db, jd_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job description {jd_id} not found")))?;
    let requirement = parse_jd(&job_description.content);

    Ok(Json(JdDetailResponse {
        job_description,
        requirement,
    }))
}

/// POST /api/v1/evaluations
///
/// Multipart: `jd_id` and `resume_file` (.pdf/.docx/.txt/.md). Scores the résumé against the
/// stored JD with the configured weights and persists the result.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluationResponse>, AppError> {
    let mut fields = read_form(multipart).await?;

    let jd_id = take_field(&mut fields, "jd_id")
        .map(|f| field_text(&f))
        .ok_or_else(|| AppError::Validation("jd_id is required".to_string()))?;
    let jd_id = Uuid::parse_str(&jd_id)
        .map_err(|_| AppError::Validation(format!("jd_id '{jd_id}' is not a valid id")))?;

    let resume = take_field(&mut fields, "resume_file")
        .ok_or_else(|| AppError::Validation("resume_file is required".to_string()))?;

    let jd = get_job_description(&state.db, jd_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job description {jd_id} not found")))?;

    let (resume_identifier, resume_text) = extract_upload(resume, "resume.txt").await?;
    info!(jd_id = %jd_id, resume = %resume_identifier, "Evaluating resume");

    let evaluation = run_pipeline(&state, resume_text, jd.content, state.weights).await?;
    let row = save_evaluation(&state.db, jd_id, &resume_identifier, &evaluation.report).await?;

    Ok(Json(EvaluationResponse {
        evaluation_id: row.id,
        jd_id,
        resume_identifier,
        requirement: evaluation.requirement,
        matches: evaluation.matches,
        report: evaluation.report,
    }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /api/v1/evaluations?jd_id=&verdict=&shortlisted=&title=&location=
///
/// Shortlist view: evaluations joined with their JD title, best scores first. `title` is a
/// case-insensitive substring; `location` matches the third `|` segment of the title.
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Json<Vec<ShortlistEntry>>, AppError> {
    let verdict = query
        .verdict
        .as_deref()
        .map(str::parse::<Verdict>)
        .transpose()
        .map_err(AppError::Validation)?;

    let filter = EvaluationFilter {
        jd_id: query.jd_id,
        verdict,
        shortlisted: query.shortlisted,
        title: non_blank(query.title),
        location: non_blank(query.location),
    };

    let rows = list_evaluations(&state.db, &filter).await?;
    let entries = rows
        .into_iter()
        .map(ShortlistEntry::from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(entries))
}

//! Persistence for job descriptions and evaluation records.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::matching::scorer::{MatchReport, Verdict};
use crate::models::screening::{encode_missing, EvaluationRow, JobDescriptionRow, ShortlistRow};

pub async fn save_job_description(
    pool: &PgPool,
    title: &str,
    content: &str,
) -> Result<JobDescriptionRow, sqlx::Error> {
    let row = sqlx::query_as::<_, JobDescriptionRow>(
        r#"
        INSERT INTO job_descriptions (id, title, content, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(title)
    .bind(content)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    info!(jd_id = %row.id, title, "Job description stored");
    Ok(row)
}

pub async fn get_job_description(
    pool: &PgPool,
    jd_id: Uuid,
) -> Result<Option<JobDescriptionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobDescriptionRow>("SELECT * FROM job_descriptions WHERE id = $1")
        .bind(jd_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_job_descriptions(pool: &PgPool) -> Result<Vec<JobDescriptionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobDescriptionRow>(
        "SELECT * FROM job_descriptions ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn save_evaluation(
    pool: &PgPool,
    jd_id: Uuid,
    resume_identifier: &str,
    report: &MatchReport,
) -> Result<EvaluationRow, sqlx::Error> {
    let row = sqlx::query_as::<_, EvaluationRow>(
        r#"
        INSERT INTO evaluations
            (id, jd_id, resume_identifier, final_score, hard_score, soft_score,
             verdict, missing, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(jd_id)
    .bind(resume_identifier)
    .bind(report.final_score)
    .bind(report.hard_score)
    .bind(report.soft_score)
    .bind(report.verdict.as_str())
    .bind(encode_missing(&report.missing))
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    info!(
        evaluation_id = %row.id,
        jd_id = %jd_id,
        verdict = %report.verdict,
        "Evaluation stored"
    );
    Ok(row)
}

/// Optional filters for the shortlist view. `None` means "any".
#[derive(Debug, Clone, Default)]
pub struct EvaluationFilter {
    pub jd_id: Option<Uuid>,
    pub verdict: Option<Verdict>,
    /// true → High or Medium only, false → Low only.
    pub shortlisted: Option<bool>,
    /// Case-insensitive substring of the JD title.
    pub title: Option<String>,
    /// Case-insensitive match on the location segment of `Role | Company | Location`.
    pub location: Option<String>,
}

/// `ILIKE` pattern matching `needle` anywhere, with its wildcards taken literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn list_evaluations(
    pool: &PgPool,
    filter: &EvaluationFilter,
) -> Result<Vec<ShortlistRow>, sqlx::Error> {
    sqlx::query_as::<_, ShortlistRow>(
        r#"
        SELECT e.id, e.jd_id, j.title AS jd_title, e.resume_identifier,
               e.final_score, e.verdict, e.missing, e.created_at
        FROM evaluations e
        JOIN job_descriptions j ON j.id = e.jd_id
        WHERE ($1::uuid IS NULL OR e.jd_id = $1)
          AND ($2::text IS NULL OR e.verdict = $2)
          AND ($3::bool IS NULL OR (e.verdict IN ('High', 'Medium')) = $3)
          AND ($4::text IS NULL OR j.title ILIKE $4)
          AND ($5::text IS NULL OR lower(trim(split_part(j.title, '|', 3))) = lower($5))
        ORDER BY e.final_score DESC, e.created_at DESC
        "#,
    )
    .bind(filter.jd_id)
    .bind(filter.verdict.map(|v| v.as_str()))
    .bind(filter.shortlisted)
    .bind(filter.title.as_deref().map(contains_pattern))
    .bind(filter.location.as_deref().map(str::trim))
    .fetch_all(pool)
    .await
}

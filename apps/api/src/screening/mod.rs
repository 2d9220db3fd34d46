// Screening workflow: stored job descriptions, persisted evaluations, shortlist queries.
// Wraps the matching core with text extraction and PostgreSQL persistence.

pub mod handlers;
pub mod store;

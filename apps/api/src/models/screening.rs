use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobDescriptionRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationRow {
    pub id: Uuid,
    pub jd_id: Uuid,
    pub resume_identifier: String,
    pub final_score: f64,
    pub hard_score: f64,
    pub soft_score: f64,
    pub verdict: String,
    /// JSON array string, see `encode_missing`.
    pub missing: String,
    pub created_at: DateTime<Utc>,
}

/// Evaluation joined with its JD title, as shown on the shortlist.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShortlistRow {
    pub id: Uuid,
    pub jd_id: Uuid,
    pub jd_title: String,
    pub resume_identifier: String,
    pub final_score: f64,
    pub verdict: String,
    pub missing: String,
    pub created_at: DateTime<Utc>,
}

/// A JD title split on the `Role | Company | Location` convention. Segments are trimmed;
/// absent or blank segments are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleParts {
    pub role: String,
    pub company: Option<String>,
    pub location: Option<String>,
}

pub fn split_title(title: &str) -> TitleParts {
    let mut segments = title.split('|').map(str::trim);
    let mut next = || {
        segments
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let role = next().unwrap_or_else(|| title.trim().to_string());
    TitleParts {
        role,
        company: next(),
        location: next(),
    }
}

/// Serializes the ordered missing-skill list for storage.
pub fn encode_missing(missing: &[String]) -> String {
    // A Vec<String> always serializes
    serde_json::to_string(missing).unwrap_or_else(|_| "[]".to_string())
}

pub fn decode_missing(encoded: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_title_on_pipes() {
        let parts = split_title("Data Scientist | Acme Corp | Hyderabad");
        assert_eq!(parts.role, "Data Scientist");
        assert_eq!(parts.company.as_deref(), Some("Acme Corp"));
        assert_eq!(parts.location.as_deref(), Some("Hyderabad"));
    }

    #[test]
    fn test_split_title_without_pipes() {
        let parts = split_title("  Backend Engineer ");
        assert_eq!(parts.role, "Backend Engineer");
        assert_eq!(parts.company, None);
        assert_eq!(parts.location, None);
    }

    #[test]
    fn test_split_title_blank_segments() {
        let parts = split_title("ML Engineer |  | Pune");
        assert_eq!(parts.company, None);
        assert_eq!(parts.location.as_deref(), Some("Pune"));
    }

    #[test]
    fn test_missing_round_trips_in_order() {
        let missing = vec![
            "AWS".to_string(),
            "Apache \"Spark\"".to_string(),
            "C++, C#".to_string(),
            "AWS".to_string(),
        ];
        let encoded = encode_missing(&missing);
        assert_eq!(decode_missing(&encoded).unwrap(), missing);
    }

    #[test]
    fn test_empty_missing_encodes_as_empty_array() {
        assert_eq!(encode_missing(&[]), "[]");
        assert!(decode_missing("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_non_list() {
        assert!(decode_missing("AWS, SQL").is_err());
    }
}

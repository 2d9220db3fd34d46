//! The matching pipeline: JD parse → fuzzy skill match → semantic similarity → aggregate.
//!
//! Synchronous and side-effect free apart from the engine's one-time model load. Async
//! callers should run it inside `spawn_blocking`.

use serde::Serialize;
use tracing::info;

use crate::matching::fuzzy::{match_skills, SkillMatch};
use crate::matching::jd_parser::{parse_jd, JobRequirement};
use crate::matching::scorer::{score, MatchReport, ScoreWeights};
use crate::matching::similarity::SimilarityEngine;
use crate::matching::text::normalize_text;

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub requirement: JobRequirement,
    pub matches: Vec<SkillMatch>,
    pub report: MatchReport,
}

pub fn evaluate(
    resume_text: &str,
    jd_text: &str,
    engine: &SimilarityEngine,
    weights: &ScoreWeights,
) -> Evaluation {
    let resume = normalize_text(resume_text);
    let requirement = parse_jd(jd_text);
    let matches = match_skills(&resume, &requirement);
    let similarity = engine.similarity(&resume, jd_text);
    let report = score(&matches, similarity.value, similarity.backend, weights);

    info!(
        role = %requirement.role_title,
        skills = requirement.skill_count(),
        hard_score = report.hard_score,
        soft_score = report.soft_score,
        final_score = report.final_score,
        verdict = report.verdict.as_str(),
        backend = similarity.backend.as_str(),
        "Evaluation complete"
    );

    Evaluation {
        requirement,
        matches,
        report,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::matching::scorer::{Verdict, DEFAULT_WEIGHTS};
    use crate::matching::similarity::embedding::fakes::letters;
    use crate::matching::similarity::{EmbeddingError, SimilarityBackend};

    const JD: &str = "Data Scientist\nMust Have\n- Python\n- SQL\nGood to Have\n- AWS";
    const RESUME: &str = "Jane Doe\n\nExperienced in   Python and SQL.\nBuilt dashboards.";

    #[test]
    fn test_data_scientist_scenario() {
        let engine = SimilarityEngine::lexical_only();
        let evaluation = evaluate(RESUME, JD, &engine, &DEFAULT_WEIGHTS);

        assert_eq!(evaluation.requirement.must_have, vec!["Python", "SQL"]);
        assert_eq!(evaluation.requirement.good_to_have, vec!["AWS"]);
        assert_eq!(evaluation.matches[0].score, 100);
        assert_eq!(evaluation.matches[1].score, 100);
        assert!(evaluation.matches[2].score < 50);

        let report = &evaluation.report;
        assert!(report.missing.contains(&"AWS".to_string()));
        assert!(!report.missing.contains(&"Python".to_string()));
        assert!(!report.missing.contains(&"SQL".to_string()));
        assert!((0.0..=100.0).contains(&report.final_score));
    }

    #[test]
    fn test_both_texts_empty() {
        let engine = SimilarityEngine::lexical_only();
        let evaluation = evaluate("", "", &engine, &DEFAULT_WEIGHTS);
        assert_eq!(evaluation.requirement.role_title, "Unknown Role");
        assert_eq!(evaluation.report.final_score, 0.0);
        assert_eq!(evaluation.report.verdict, Verdict::Low);
        assert!(evaluation.report.missing.is_empty());
    }

    #[test]
    fn test_jd_without_skills_has_zero_hard_score() {
        let engine = SimilarityEngine::lexical_only();
        let evaluation = evaluate(
            "Python SQL AWS everything",
            "Generalist\nWe like people.",
            &engine,
            &DEFAULT_WEIGHTS,
        );
        assert!(evaluation.matches.is_empty());
        assert_eq!(evaluation.report.hard_score, 0.0);
    }

    #[test]
    fn test_embedding_backend_is_reported() {
        let engine = SimilarityEngine::with_loader(Box::new(|| Ok(letters())));
        let evaluation = evaluate(RESUME, JD, &engine, &DEFAULT_WEIGHTS);
        assert_eq!(
            evaluation.report.similarity_backend,
            SimilarityBackend::Embedding
        );
    }

    #[test]
    fn test_failed_model_still_produces_report() {
        let engine = SimilarityEngine::with_loader(Box::new(|| {
            Err(EmbeddingError::Unavailable("offline".to_string()))
        }));
        let evaluation = evaluate(RESUME, JD, &engine, &DEFAULT_WEIGHTS);
        assert_eq!(evaluation.report.similarity_backend, SimilarityBackend::Lexical);
        assert!((0.0..=100.0).contains(&evaluation.report.soft_score));
    }

    #[test]
    fn test_engine_can_be_shared_across_threads() {
        let engine = Arc::new(SimilarityEngine::with_loader(Box::new(|| Ok(letters()))));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || evaluate(RESUME, JD, &engine, &DEFAULT_WEIGHTS))
            })
            .collect();
        let finals: Vec<f64> = handles
            .into_iter()
            .map(|h| h.join().unwrap().report.final_score)
            .collect();
        assert!(finals.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-9));
    }
}

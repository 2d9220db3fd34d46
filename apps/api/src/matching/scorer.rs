//! Score aggregation: folds fuzzy skill matches and semantic similarity into a verdict.

use serde::{Deserialize, Serialize};

use crate::matching::fuzzy::SkillMatch;
use crate::matching::similarity::SimilarityBackend;

/// Skills scoring below this are reported as missing.
pub const MISSING_THRESHOLD: u32 = 50;
pub const HIGH_THRESHOLD: f64 = 75.0;
pub const MEDIUM_THRESHOLD: f64 = 50.0;

/// Relative weight of hard (fuzzy skill) and soft (semantic) evidence.
/// Expected to sum to 1; not enforced, the final score is clamped either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub hard: f64,
    pub soft: f64,
}

pub const DEFAULT_WEIGHTS: ScoreWeights = ScoreWeights {
    hard: 0.6,
    soft: 0.4,
};

impl Default for ScoreWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl ScoreWeights {
    pub fn is_normalized(&self) -> bool {
        (self.hard + self.soft - 1.0).abs() < 1e-6
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    High,
    Medium,
    Low,
}

impl Verdict {
    pub fn from_score(final_score: f64) -> Self {
        if final_score >= HIGH_THRESHOLD {
            Verdict::High
        } else if final_score >= MEDIUM_THRESHOLD {
            Verdict::Medium
        } else {
            Verdict::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::High => "High",
            Verdict::Medium => "Medium",
            Verdict::Low => "Low",
        }
    }

    /// High and Medium candidates make the shortlist.
    pub fn is_shortlisted(&self) -> bool {
        matches!(self, Verdict::High | Verdict::Medium)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Verdict::High),
            "medium" => Ok(Verdict::Medium),
            "low" => Ok(Verdict::Low),
            other => Err(format!("unknown verdict '{other}'")),
        }
    }
}

/// Outcome of one résumé/JD evaluation. All scores are 0 – 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub hard_score: f64,
    pub soft_score: f64,
    pub final_score: f64,
    pub verdict: Verdict,
    /// Skills with a fuzzy score below `MISSING_THRESHOLD`, in requirement order.
    pub missing: Vec<String>,
    pub similarity_backend: SimilarityBackend,
}

/// Combines skill matches and a [0, 1] similarity into a `MatchReport`.
///
/// 1. hard = mean of match scores, or 0 when there are no matches
/// 2. soft = similarity × 100
/// 3. final = clamp(hard × w.hard + soft × w.soft, 0, 100)
/// 4. verdict by thresholds 75 / 50
/// 5. missing = skills scoring below 50
pub fn score(
    matches: &[SkillMatch],
    similarity: f64,
    similarity_backend: SimilarityBackend,
    weights: &ScoreWeights,
) -> MatchReport {
    let hard_score = if matches.is_empty() {
        0.0
    } else {
        let total: f64 = matches.iter().map(|m| m.score.min(100) as f64).sum();
        total / matches.len() as f64
    };

    let soft_score = (similarity.clamp(0.0, 1.0) * 100.0).clamp(0.0, 100.0);

    let weighted = hard_score * weights.hard + soft_score * weights.soft;
    // NaN weights would otherwise survive clamp()
    let final_score = if weighted.is_nan() {
        0.0
    } else {
        weighted.clamp(0.0, 100.0)
    };

    let missing = matches
        .iter()
        .filter(|m| m.score < MISSING_THRESHOLD)
        .map(|m| m.skill.clone())
        .collect();

    MatchReport {
        hard_score,
        soft_score,
        final_score,
        verdict: Verdict::from_score(final_score),
        missing,
        similarity_backend,
    }
}

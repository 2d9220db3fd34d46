//! Lexical fallback: TF-IDF cosine similarity over exactly the two input documents.
//!
//! No external knowledge, so it only rewards shared vocabulary. Used when no embedding
//! model is available.

use std::collections::{BTreeSet, HashMap};

use super::{SimilarityError, SimilarityStrategy};

#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalFallbackStrategy;

impl SimilarityStrategy for LexicalFallbackStrategy {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        Ok(tfidf_cosine(a, b))
    }
}

/// Lower-cased word tokens of two or more word characters.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

fn term_counts(tokens: &[String]) -> HashMap<&str, f64> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine similarity of the L2-normalized TF-IDF vectors of `a` and `b`, in [0, 1].
///
/// IDF is smoothed over the two-document corpus: `ln((1 + n) / (1 + df)) + 1`, so terms
/// shared by both documents weigh 1.0 and terms unique to one weigh `1 + ln(3/2)`.
pub fn tfidf_cosine(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let tf_a = term_counts(&tokens_a);
    let tf_b = term_counts(&tokens_b);

    // Sorted vocabulary keeps the float summation order deterministic.
    let vocabulary: BTreeSet<&str> = tf_a.keys().chain(tf_b.keys()).copied().collect();

    let n_docs = 2.0_f64;
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for term in vocabulary {
        let in_a = tf_a.get(term).copied().unwrap_or(0.0);
        let in_b = tf_b.get(term).copied().unwrap_or(0.0);
        let df = (in_a > 0.0) as u8 as f64 + (in_b > 0.0) as u8 as f64;
        let idf = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;

        let wa = in_a * idf;
        let wb = in_b * idf;
        dot += wa * wb;
        norm_a += wa * wa;
        norm_b += wb * wb;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

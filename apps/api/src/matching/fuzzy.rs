//! Fuzzy skill matching: approximate substring scoring of JD skills against résumé text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

use crate::matching::jd_parser::JobRequirement;

/// Fuzzy score of one required skill against the résumé (0 – 100).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill: String,
    pub score: u32,
}

/// Best-aligned substring similarity between `a` and `b`, 0 – 100.
///
/// The shorter string is compared against windows of the same character length in the
/// longer one; each window is scored by normalized Levenshtein similarity and the best
/// window wins. Only windows anchored on a shared character bigram (or a single shared
/// character when no bigram is shared) are scored, which keeps long résumés close to
/// linear. A verbatim substring scores 100. Either side
/// empty scores 0.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    if long.contains(short) {
        return 100;
    }

    let short_chars: Vec<char> = short.chars().collect();
    let long_chars: Vec<char> = long.chars().collect();
    // Byte offsets of every char boundary, plus the end of the string.
    let bounds: Vec<usize> = long
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(long.len()))
        .collect();
    let window = short_chars.len();

    let mut starts = anchored_starts(&short_chars, &long_chars, 2.min(window));
    if starts.is_empty() && window > 1 {
        starts = anchored_starts(&short_chars, &long_chars, 1);
    }

    let mut best = 0.0_f64;
    for start in starts {
        let candidate = &long[bounds[start]..bounds[start + window]];
        let similarity = normalized_levenshtein(short, candidate);
        if similarity > best {
            best = similarity;
            if best >= 1.0 {
                break;
            }
        }
    }

    (best * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Window starts in `long` that line up a `gram`-char slice of `short` with an equal
/// slice of `long`, clamped into range, deduplicated and ascending.
fn anchored_starts(short: &[char], long: &[char], gram: usize) -> Vec<usize> {
    let last_start = long.len() - short.len();
    let mut offsets: HashMap<&[char], Vec<usize>> = HashMap::new();
    for (k, slice) in short.windows(gram).enumerate() {
        offsets.entry(slice).or_default().push(k);
    }

    let mut seen = vec![false; last_start + 1];
    for (p, slice) in long.windows(gram).enumerate() {
        let Some(ks) = offsets.get(slice) else {
            continue;
        };
        for &k in ks {
            seen[p.saturating_sub(k).min(last_start)] = true;
        }
    }

    seen.iter()
        .enumerate()
        .filter_map(|(start, &hit)| hit.then_some(start))
        .collect()
}

/// Scores every skill in `jd` (must-have first, then good-to-have) against `resume_text`.
///
/// The résumé is lower-cased once; each skill is scored independently, so output order is
/// exactly input order. An empty requirement set yields an empty vector.
pub fn match_skills(resume_text: &str, jd: &JobRequirement) -> Vec<SkillMatch> {
    let resume_lower = resume_text.to_lowercase();
    jd.skills()
        .map(|skill| SkillMatch {
            skill: skill.to_string(),
            score: partial_ratio(&skill.to_lowercase(), &resume_lower),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::jd_parser::parse_jd;

    fn requirement(must: &[&str], good: &[&str]) -> JobRequirement {
        JobRequirement {
            role_title: "Engineer".to_string(),
            must_have: must.iter().map(|s| s.to_string()).collect(),
            good_to_have: good.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_verbatim_substring_scores_100() {
        assert_eq!(partial_ratio("python", "experienced in python and sql"), 100);
    }

    #[test]
    fn test_partial_ratio_is_symmetric_in_argument_order() {
        let text = "built data pipelines in apache spark";
        assert_eq!(partial_ratio("spark", text), partial_ratio(text, "spark"));
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(partial_ratio("", "anything"), 0);
        assert_eq!(partial_ratio("rust", ""), 0);
    }

    #[test]
    fn test_near_miss_scores_high_but_not_perfect() {
        // one substitution in a 10-char window
        let score = partial_ratio("kubernetes", "deployed on kubernetis clusters");
        assert!((80..100).contains(&score), "score was {score}");
    }

    fn exhaustive_ratio(short: &str, long: &str) -> u32 {
        let chars: Vec<char> = long.chars().collect();
        let window = short.chars().count();
        let best = (0..=chars.len() - window)
            .map(|start| {
                let candidate: String = chars[start..start + window].iter().collect();
                normalized_levenshtein(short, &candidate)
            })
            .fold(0.0_f64, f64::max);
        (best * 100.0).round() as u32
    }

    #[test]
    fn test_anchored_windows_find_the_best_alignment() {
        let cases = [
            ("kubernetes", "deployed on kubernetis clusters"),
            ("postgres", "tuned postgrs indexes"),
            ("aws", "experienced in python and sql"),
            ("münchen", "worked in munchen"),
        ];
        for (skill, text) in cases {
            assert_eq!(
                partial_ratio(skill, text),
                exhaustive_ratio(skill, text),
                "{skill} vs {text}"
            );
        }
    }

    #[test]
    fn test_no_shared_characters_scores_zero() {
        assert_eq!(partial_ratio("xyz", "abc def"), 0);
    }

    #[test]
    fn test_near_miss_in_large_resume() {
        let mut resume = "lorem ipsum dolor sit amet consectetur ".repeat(25_000);
        resume.push_str("deployed on kubernetis clusters");
        let score = partial_ratio("kubernetes", &resume);
        assert_eq!(score, 90);
    }

    #[test]
    fn test_unrelated_skill_scores_low() {
        let score = partial_ratio("aws", "experienced in python and sql");
        assert!(score < 50, "score was {score}");
    }

    #[test]
    fn test_handles_multibyte_text() {
        let score = partial_ratio("café", "worked at a café in münchen");
        assert_eq!(score, 100);
        let score = partial_ratio("naïve", "münchen résumé");
        assert!(score <= 100);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let jd = requirement(&["PostgreSQL"], &[]);
        let matches = match_skills("Tuned POSTGRESQL indexes", &jd);
        assert_eq!(matches[0].score, 100);
    }

    #[test]
    fn test_match_preserves_order_must_then_good() {
        let jd = requirement(&["SQL", "Python"], &["AWS", "Docker"]);
        let matches = match_skills("python sql docker", &jd);
        let skills: Vec<_> = matches.iter().map(|m| m.skill.as_str()).collect();
        assert_eq!(skills, vec!["SQL", "Python", "AWS", "Docker"]);
    }

    #[test]
    fn test_empty_requirement_yields_empty_matches() {
        let matches = match_skills("I know everything", &requirement(&[], &[]));
        assert!(matches.is_empty());
    }

    #[test]
    fn test_data_scientist_scenario() {
        let jd = parse_jd("Data Scientist\nMust Have\n- Python\n- SQL\nGood to Have\n- AWS");
        let matches = match_skills("Experienced in Python and SQL", &jd);
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0], SkillMatch { skill: "Python".into(), score: 100 });
        assert_eq!(matches[1], SkillMatch { skill: "SQL".into(), score: 100 });
        assert_eq!(matches[2].skill, "AWS");
        assert!(matches[2].score < 50);
    }
}

//! Whitespace normalization applied to extracted text before matching.

/// Collapses every run of whitespace to a single space and trims both ends.
/// Case is preserved; callers that compare case-insensitively lower-case themselves.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(normalize_text("  Senior \n\n Rust\tEngineer  "), "Senior Rust Engineer");
    }

    #[test]
    fn test_normalize_whitespace_only_is_empty() {
        assert_eq!(normalize_text(" \n\t "), "");
    }
}

//! Expansion error types with spelling suggestions

use thiserror::Error;

/// Errors raised while expanding `${{ name }}` references
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    /// Referenced variable doesn't exist
    #[error("undefined variable '{name}'{}", .suggestion.as_ref().map(|s| format!(", did you mean '{}'?", s)).unwrap_or_default())]
    MissingVariable {
        name: String,
        suggestion: Option<String>,
    },

    /// References nested deeper than the configured bound
    #[error("variable references nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

impl ExpansionError {
    /// Create a missing variable error, suggesting the closest known name
    pub fn missing_variable(name: impl Into<String>, known: &[&str]) -> Self {
        let name = name.into();
        let suggestion = suggest_correction(&name, known);
        Self::MissingVariable { name, suggestion }
    }
}

/// Suggest a correction for a typo using Levenshtein distance
pub fn suggest_correction(typo: &str, candidates: &[&str]) -> Option<String> {
    if typo.is_empty() {
        return None;
    }

    let max_distance = (typo.len() / 2).max(2);

    candidates
        .iter()
        .map(|candidate| (levenshtein_distance(typo, candidate), *candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.to_string())
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a.chars().enumerate() {
        let mut current = Vec::with_capacity(b_chars.len() + 1);
        current.push(i + 1);
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != *b_char);
            let value = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
            current.push(value);
        }
        previous = current;
    }

    previous[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("version", "verison"), 2);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("same", "same"), 0);
    }

    #[test]
    fn test_suggest_correction() {
        let candidates = ["version", "package", "output"];

        assert_eq!(
            suggest_correction("verison", &candidates),
            Some("version".into())
        );
        assert_eq!(
            suggest_correction("packge", &candidates),
            Some("package".into())
        );
        assert_eq!(suggest_correction("completely_different", &candidates), None);
        assert_eq!(suggest_correction("anything", &[]), None);
        assert_eq!(suggest_correction("", &candidates), None);
    }

    #[test]
    fn test_error_display() {
        let err = ExpansionError::missing_variable("verison", &["version", "name"]);
        let msg = err.to_string();
        assert!(msg.contains("undefined variable 'verison'"));
        assert!(msg.contains("did you mean 'version'"));

        let err = ExpansionError::missing_variable("zzz", &["version"]);
        assert_eq!(err.to_string(), "undefined variable 'zzz'");

        let err = ExpansionError::TooDeep { limit: 4 };
        assert!(err.to_string().contains("4 levels"));
    }
}

//! Answer accuracy evaluation against expected responses.
//!
//! A lightweight word-overlap score used to demo answer quality against
//! a known-good set of expected responses (supplied as a second PDF).

use crate::document::load_pdf;
use crate::error::Result;
use std::collections::HashSet;
use std::path::Path;

/// Compute the accuracy of an answer against expected text.
///
/// Score is the percentage of expected words that also appear in the
/// answer, rounded to two decimals. An empty expected set scores 0.
pub fn accuracy_score(answer: &str, expected: &str) -> f64 {
    let answer_words: HashSet<&str> = answer.split_whitespace().collect();
    let expected_words: HashSet<&str> = expected.split_whitespace().collect();

    if expected_words.is_empty() {
        return 0.0;
    }

    let common = answer_words.intersection(&expected_words).count();
    let accuracy = common as f64 / expected_words.len() as f64 * 100.0;
    (accuracy * 100.0).round() / 100.0
}

/// Append the accuracy line to an answer.
pub fn append_accuracy(answer: &str, expected: &str) -> String {
    format!(
        "{}\n\nAccuracy compared to expected response: {}%",
        answer,
        accuracy_score(answer, expected)
    )
}

/// Load expected-response text from a PDF file.
pub fn load_expected_text(path: &Path) -> Result<String> {
    let doc = load_pdf(path)?;
    Ok(doc.full_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_full_overlap() {
        assert!((accuracy_score("the quick brown fox", "the quick brown fox") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_partial_overlap() {
        // 2 of 4 expected words present
        assert!((accuracy_score("the fox ran", "the quick brown fox") - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_no_overlap() {
        assert_eq!(accuracy_score("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn test_accuracy_empty_expected() {
        assert_eq!(accuracy_score("anything", ""), 0.0);
    }

    #[test]
    fn test_accuracy_rounds_to_two_decimals() {
        // 1 of 3 expected words -> 33.333... -> 33.33
        let score = accuracy_score("alpha", "alpha beta gamma");
        assert!((score - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_duplicates_count_once() {
        // Word sets, not word counts
        let score = accuracy_score("alpha alpha alpha", "alpha beta");
        assert!((score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_append_accuracy() {
        let out = append_accuracy("the answer", "the answer");
        assert!(out.starts_with("the answer\n\n"));
        assert!(out.ends_with("Accuracy compared to expected response: 100%"));
    }
}

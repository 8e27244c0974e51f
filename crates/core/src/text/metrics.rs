//! Word and character error rates between a reference text and a
//! recognizer hypothesis.

use crate::error::{EngineError, Result};

/// Edit distance (insertions, deletions, substitutions) between two
/// token sequences. Two-row dynamic program, O(b) space.
fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];

    for (i, ta) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, tb) in b.iter().enumerate() {
            let sub = prev[j] + usize::from(ta != tb);
            cur[j + 1] = sub.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Word error rate: edit distance over whitespace-separated words,
/// divided by the reference word count.
///
/// Comparison is case-sensitive and keeps punctuation. The rate can
/// exceed 1.0 when the hypothesis needs more edits than the reference
/// has words.
pub fn word_error_rate(reference: &str, hypothesis: &str) -> Result<f64> {
    let ref_words: Vec<&str> = reference.split_whitespace().collect();
    if ref_words.is_empty() {
        return Err(EngineError::InvalidInput(
            "reference text contains no words".into(),
        ));
    }
    let hyp_words: Vec<&str> = hypothesis.split_whitespace().collect();
    Ok(levenshtein(&ref_words, &hyp_words) as f64 / ref_words.len() as f64)
}

/// Character error rate over whitespace-normalized text: whitespace
/// runs collapse to one space, the ends are trimmed, and the remaining
/// characters (spaces included) form the edit alphabet.
pub fn character_error_rate(reference: &str, hypothesis: &str) -> Result<f64> {
    let ref_chars = normalized_chars(reference);
    if ref_chars.is_empty() {
        return Err(EngineError::InvalidInput(
            "reference text contains no characters".into(),
        ));
    }
    let hyp_chars = normalized_chars(hypothesis);
    Ok(levenshtein(&ref_chars, &hyp_chars) as f64 / ref_chars.len() as f64)
}

fn normalized_chars(text: &str) -> Vec<char> {
    let mut chars = Vec::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !chars.is_empty() {
            chars.push(' ');
        }
        chars.extend(word.chars());
    }
    chars
}

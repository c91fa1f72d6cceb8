use std::collections::HashMap;

use crate::segments::{normalize_word, summary_words};
use crate::types::WordScore;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreSummary {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub mean: f32,
    /// Summary words that received a score (multiset match, case-insensitive).
    pub covered: usize,
    pub summary_words: usize,
}

pub fn summarize_scores(scores: &[WordScore], summary: &str) -> ScoreSummary {
    let mut s = ScoreSummary::default();
    for w in scores {
        match w.score {
            n if n > 0 => s.positive += 1,
            0 => s.neutral += 1,
            _ => s.negative += 1,
        }
    }
    if !scores.is_empty() {
        s.mean = scores.iter().map(|w| w.score as f32).sum::<f32>() / scores.len() as f32;
    }

    let mut pool: HashMap<String, usize> = HashMap::new();
    for w in scores {
        *pool.entry(normalize_word(&w.word)).or_default() += 1;
    }
    let words = summary_words(summary);
    s.summary_words = words.len();
    for word in words {
        if let Some(n) = pool.get_mut(&normalize_word(word)).filter(|n| **n > 0) {
            *n -= 1;
            s.covered += 1;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_mean() {
        let scores = vec![WordScore::new("a", 1), WordScore::new("b", 0), WordScore::new("c", -1), WordScore::new("d", 1)];
        let s = summarize_scores(&scores, "");
        assert_eq!((s.positive, s.neutral, s.negative), (2, 1, 1));
        assert!((s.mean - 0.25).abs() < 1e-6);
    }

    #[test]
    fn coverage_respects_duplicates() {
        let scores = vec![WordScore::new("The", 0), WordScore::new("cat,", 1)];
        let s = summarize_scores(&scores, "the cat saw the dog");
        assert_eq!(s.summary_words, 5);
        assert_eq!(s.covered, 2);
    }

    #[test]
    fn empty_scores() {
        let s = summarize_scores(&[], "one two");
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.covered, 0);
        assert_eq!(s.summary_words, 2);
    }
}

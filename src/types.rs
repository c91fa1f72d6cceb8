use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub post: String,               // original post being summarised
    pub generated_summary: String,  // summary under evaluation
}

/// One word of the summary with its contribution score (-1, 0 or 1 when the
/// model behaves; not clamped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordScore {
    pub word: String,
    pub score: i64,
}

impl WordScore {
    pub fn new(word: impl Into<String>, score: i64) -> Self {
        Self { word: word.into(), score }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub textual_feedback: String,
    pub word_scores: Vec<WordScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub index: usize,
    pub original_post: String,
    pub generated_summary: String,
    pub model_response: String,     // raw decoded continuation, unparsed
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: u16,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { max_new_tokens: 512, temperature: 0.1 }
    }
}

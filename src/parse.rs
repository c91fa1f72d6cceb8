//! Best-effort recovery of feedback and word scores from critique output.
//!
//! The critique model is asked for a JSON object but regularly emits Python
//! tuples, stringified lists, renamed keys or prose around the object. Every
//! function here returns a (possibly empty) value instead of an error.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::{ParseResult, WordScore};

static FEEDBACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""textual_feedback"\s*:\s*"([^"]*)""#).unwrap());

static TUPLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\(["']?([^"',]+)["']?,\s*(-?\d+)\)"#).unwrap());

static BRACKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[["']?([^"',]+)["']?,\s*(-?\d+)\]"#).unwrap());

static OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\s*["']?word["']?\s*:\s*["']?([^"',]+)["']?\s*,\s*["']?score["']?\s*:\s*(-?\d+)\s*\}"#)
        .unwrap()
});

static EMBEDDED_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

static SIGNED_INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+").unwrap());

const WORD_SCORE_LIST: &str = "word_score_list";

/// Recognised layouts of the `word_score_list` value.
#[derive(Debug, PartialEq)]
enum ScoreListShape<'a> {
    /// The list was emitted as a string, e.g. `"(\"ok\", 1), (\"bad\", -1)"`.
    Stringified(&'a str),
    /// Objects keyed by `word` plus `score` (or `Score`).
    KeyedObjects { items: &'a [Value], word_key: &'static str, score_key: &'static str },
    /// Two-element arrays `[word, score]`.
    Pairs(&'a [Value]),
    Unrecognized,
}

impl<'a> ScoreListShape<'a> {
    fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Self::Stringified(s),
            Value::Array(items) => match items.first() {
                Some(Value::Object(first)) => {
                    if first.contains_key("word") && first.contains_key("score") {
                        Self::KeyedObjects { items, word_key: "word", score_key: "score" }
                    } else if first.contains_key("word") && first.contains_key("Score") {
                        Self::KeyedObjects { items, word_key: "word", score_key: "Score" }
                    } else {
                        Self::Unrecognized
                    }
                }
                Some(Value::Array(_)) => Self::Pairs(items),
                _ => Self::Unrecognized,
            },
            _ => Self::Unrecognized,
        }
    }

    /// Strict extraction for the recognised shape. `None` means some item did
    /// not fit and the lenient scan should take over.
    fn extract(&self) -> Option<Vec<WordScore>> {
        let scores = match self {
            Self::Stringified(s) => captures_to_scores(&TUPLE_RE, s),
            Self::KeyedObjects { items, word_key, score_key } => items
                .iter()
                .map(|item| {
                    let obj = item.as_object()?;
                    let word = value_text(obj.get(*word_key)?);
                    let score = strict_int(obj.get(*score_key)?)?;
                    Some(WordScore::new(word, score))
                })
                .collect::<Option<Vec<_>>>()?,
            Self::Pairs(items) => items
                .iter()
                .map(|item| {
                    let pair = item.as_array()?;
                    let word = value_text(pair.first()?);
                    let score = strict_int(pair.get(1)?)?;
                    Some(WordScore::new(word, score))
                })
                .collect::<Option<Vec<_>>>()?,
            Self::Unrecognized => return None,
        };
        match self {
            // an empty capture set from a string is still a definitive answer
            Self::Stringified(_) => Some(scores),
            _ if scores.is_empty() => None,
            _ => Some(scores),
        }
    }
}

/// Feedback text from a response, or `""` when none can be found.
pub fn extract_textual_feedback(response: &str) -> String {
    match serde_json::from_str::<Value>(response) {
        Ok(Value::Object(obj)) => obj
            .get("textual_feedback")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Ok(_) => String::new(),
        Err(_) => FEEDBACK_RE
            .captures(response)
            .map(|c| c[1].to_string())
            .unwrap_or_default(),
    }
}

/// Ordered word scores from a response, or an empty list when nothing
/// recognisable is present.
pub fn extract_word_scores(response: &str) -> Vec<WordScore> {
    match serde_json::from_str::<Value>(response) {
        Ok(Value::Object(obj)) => scores_from_object(&obj),
        _ => scores_from_text(response),
    }
}

pub fn parse_response(response: &str) -> ParseResult {
    ParseResult {
        textual_feedback: extract_textual_feedback(response),
        word_scores: extract_word_scores(response),
    }
}

fn scores_from_object(obj: &Map<String, Value>) -> Vec<WordScore> {
    let empty = Value::Array(Vec::new());
    let list = obj.get(WORD_SCORE_LIST).unwrap_or(&empty);
    let shape = ScoreListShape::classify(list);
    if let Some(scores) = shape.extract() {
        return scores;
    }
    warn!(kind = json_kind(list), "word_score_list in unexpected layout, using lenient scan");
    lenient_scan(list)
}

fn scores_from_text(response: &str) -> Vec<WordScore> {
    for re in [&*TUPLE_RE, &*BRACKET_RE, &*OBJECT_RE] {
        let scores = captures_to_scores(re, response);
        if !scores.is_empty() {
            return scores;
        }
    }

    if let Some(m) = EMBEDDED_OBJECT_RE.find(response) {
        let inner = m.as_str();
        if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(inner) {
            if obj.contains_key(WORD_SCORE_LIST) {
                debug!(offset = m.start(), "retrying on embedded JSON object");
                return extract_word_scores(inner);
            }
        }
    }

    Vec::new()
}

fn lenient_scan(list: &Value) -> Vec<WordScore> {
    let Some(items) = list.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Array(seq) if seq.len() >= 2 => {
                Some(WordScore::new(value_text(&seq[0]), loose_int(&seq[1])))
            }
            Value::Object(obj) if obj.len() >= 2 => {
                let word_key = find_key(obj, &["word", "token"])?;
                let score_key = find_key(obj, &["score", "value"])?;
                Some(WordScore::new(value_text(&obj[word_key]), loose_int(&obj[score_key])))
            }
            _ => None,
        })
        .collect()
}

fn find_key<'m>(obj: &'m Map<String, Value>, names: &[&str]) -> Option<&'m str> {
    obj.keys()
        .find(|k| names.contains(&k.to_lowercase().as_str()))
        .map(String::as_str)
}

fn captures_to_scores(re: &Regex, text: &str) -> Vec<WordScore> {
    re.captures_iter(text)
        .filter_map(|c| {
            let score = c[2].parse::<i64>().ok()?;
            Some(WordScore::new(&c[1], score))
        })
        .collect()
}

/// Integer coercion that accepts integers, finite floats (truncated),
/// booleans and integer text. Anything else is rejected.
fn strict_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Like [`strict_int`], but falls back to the first signed integer inside
/// text and finally to 0.
fn loose_int(value: &Value) -> i64 {
    if let Some(n) = strict_int(value) {
        return n;
    }
    match value {
        Value::String(s) => SIGNED_INT_RE
            .find(s)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

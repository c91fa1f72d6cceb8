//! Validation dataset loading and sampling.

use std::fmt;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::types::Sample;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("{} is not valid JSON: {source}", path.display())]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("expected a JSON object or array at the top level, found {0}")]
    NotACollection(&'static str),
    #[error("sample `{key}` is malformed: {source}")]
    InvalidSample { key: String, source: serde_json::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    /// Object of arbitrary ids to samples.
    Keyed,
    List,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { DatasetKind::Keyed => "mapping", DatasetKind::List => "array" })
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub kind: DatasetKind,
    /// Samples in document order, tagged with their key (or array index).
    pub entries: Vec<(String, Sample)>,
    first_raw: Option<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compact rendering of the first entry, capped at `max_chars`.
    pub fn first_item_preview(&self, max_chars: usize) -> Option<String> {
        self.first_raw.as_deref().map(|raw| truncate_chars(raw, max_chars))
    }

    /// Uniform sample of `min(max, len)` items without replacement.
    pub fn sample<R: Rng + ?Sized>(&self, max: usize, rng: &mut R) -> Vec<Sample> {
        let amount = max.min(self.entries.len());
        rand::seq::index::sample(rng, self.entries.len(), amount)
            .into_iter()
            .map(|i| self.entries[i].1.clone())
            .collect()
    }
}

pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| DatasetError::Io { path: path.to_path_buf(), source })?;
    parse_dataset(&text).map_err(|e| match e {
        DatasetError::Json { source, .. } => DatasetError::Json { path: path.to_path_buf(), source },
        other => other,
    })
}

pub fn parse_dataset(text: &str) -> Result<Dataset, DatasetError> {
    let root: Value = serde_json::from_str(text)
        .map_err(|source| DatasetError::Json { path: PathBuf::new(), source })?;
    let (kind, raw): (DatasetKind, Vec<(String, Value)>) = match root {
        Value::Object(map) => (DatasetKind::Keyed, map.into_iter().collect()),
        Value::Array(items) => (
            DatasetKind::List,
            items.into_iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
        ),
        Value::Null => return Err(DatasetError::NotACollection("null")),
        Value::Bool(_) => return Err(DatasetError::NotACollection("bool")),
        Value::Number(_) => return Err(DatasetError::NotACollection("number")),
        Value::String(_) => return Err(DatasetError::NotACollection("string")),
    };

    let first_raw = raw.first().map(|(k, v)| match kind {
        DatasetKind::Keyed => {
            let mut wrapped = serde_json::Map::new();
            wrapped.insert(k.clone(), v.clone());
            Value::Object(wrapped).to_string()
        }
        DatasetKind::List => v.to_string(),
    });

    let entries = raw
        .into_iter()
        .map(|(key, v)| match serde_json::from_value::<Sample>(v) {
            Ok(sample) => Ok((key, sample)),
            Err(source) => Err(DatasetError::InvalidSample { key, source }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Dataset { kind, entries, first_raw })
}

pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEYED: &str = r#"{
        "b7": {"post": "p1", "generated_summary": "s1", "id": 7},
        "a2": {"post": "p2", "generated_summary": "s2"},
        "c9": {"post": "p3", "generated_summary": "s3"}
    }"#;

    #[test]
    fn keyed_dataset_keeps_document_order() {
        let d = parse_dataset(KEYED).unwrap();
        assert_eq!(d.kind, DatasetKind::Keyed);
        let keys: Vec<_> = d.entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b7", "a2", "c9"]);
        assert!(d.first_item_preview(200).unwrap().starts_with(r#"{"b7":{"post":"p1""#));
    }

    #[test]
    fn array_dataset() {
        let d = parse_dataset(r#"[{"post":"p","generated_summary":"s"}]"#).unwrap();
        assert_eq!(d.kind, DatasetKind::List);
        assert_eq!(d.entries[0].0, "0");
        assert_eq!(d.entries[0].1.generated_summary, "s");
    }

    #[test]
    fn rejects_scalars_and_bad_samples() {
        assert!(matches!(parse_dataset("42"), Err(DatasetError::NotACollection("number"))));
        assert!(matches!(parse_dataset("{not json"), Err(DatasetError::Json { .. })));
        let err = parse_dataset(r#"{"k1": {"post": "only post"}}"#).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidSample { ref key, .. } if key == "k1"));
    }

    #[test]
    fn sample_is_capped_distinct_and_seeded() {
        let d = parse_dataset(KEYED).unwrap();
        let all = d.sample(10, &mut rng_from_seed(Some(1)));
        assert_eq!(all.len(), 3);
        let mut posts: Vec<_> = all.iter().map(|s| s.post.clone()).collect();
        posts.sort();
        assert_eq!(posts, vec!["p1", "p2", "p3"]);

        let a = d.sample(2, &mut rng_from_seed(Some(9)));
        let b = d.sample(2, &mut rng_from_seed(Some(9)));
        assert_eq!(a.len(), 2);
        assert_eq!(a, b);
        assert!(d.sample(0, &mut rng_from_seed(None)).is_empty());
    }

    #[test]
    fn load_reports_path_on_failure() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "[{{\"post\": \"x\", \"generated_summary\": \"y\"}}]").unwrap();
        assert_eq!(load_dataset(f.path()).unwrap().len(), 1);

        let missing = f.path().with_extension("missing");
        let err = load_dataset(&missing).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}

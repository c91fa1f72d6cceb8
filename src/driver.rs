//! Evaluation run: sample the dataset, critique it batch by batch, save the
//! raw responses.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use tracing::{error, info, info_span, warn, Instrument};

use crate::dataset::{load_dataset, rng_from_seed, truncate_chars};
use crate::llm::Generator;
use crate::parse::parse_response;
use crate::prompt::build_sample_prompt;
use crate::scoring::summarize_scores;
use crate::types::{EvaluationRecord, GenerationParams, Sample};

pub const BACKUP_PATH: &str = "./evaluation_results_backup.json";

const PREVIEW_WORDS: usize = 10;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: PathBuf,
    pub output_path: PathBuf,
    pub backup_path: PathBuf,
    pub batch_size: NonZeroUsize,
    pub max_samples: usize,
    pub params: GenerationParams,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Loading or sampling failed before any generation; nothing was written.
    Aborted { reason: String },
    Completed { records: usize, saved_to: Option<PathBuf> },
}

/// Critique one batch. Prints every response as it arrives.
pub async fn process_batch(generator: &dyn Generator, batch: &[Sample], params: &GenerationParams) -> Result<Vec<String>> {
    let prompts: Vec<String> = batch.iter().map(build_sample_prompt).collect();
    let responses = generator.generate(&prompts, params).await?;
    ensure!(
        responses.len() == prompts.len(),
        "generator returned {} responses for {} prompts", responses.len(), prompts.len()
    );
    for r in &responses {
        println!("{r}");
    }
    Ok(responses)
}

pub async fn run(generator: &dyn Generator, cfg: &RunConfig) -> Result<RunOutcome> {
    info!(path = %cfg.data_path.display(), "loading validation data");
    let dataset = match load_dataset(&cfg.data_path) {
        Ok(d) => d,
        Err(e) => {
            error!(error = %e, "error loading validation data");
            return Ok(RunOutcome::Aborted { reason: e.to_string() });
        }
    };
    info!(kind = %dataset.kind, total = dataset.len(), "validation data loaded");
    if let Some(first) = dataset.first_item_preview(200) {
        info!(first = %first, "first item structure");
    }

    let mut rng = rng_from_seed(cfg.seed);
    let sampled = dataset.sample(cfg.max_samples, &mut rng);
    info!(sampled = sampled.len(), "sampled items");

    let batch_size = cfg.batch_size.get();
    let batches = sampled.len().div_ceil(batch_size);
    let mut results = Vec::with_capacity(sampled.len());

    for (b, batch) in sampled.chunks(batch_size).enumerate() {
        let responses = process_batch(generator, batch, &cfg.params)
            .instrument(info_span!("batch", n = b + 1, of = batches))
            .await
            .with_context(|| format!("generation failed for batch {}", b + 1))?;

        print_preview(b + 1, &batch[0], &responses[0]);

        for (j, (sample, response)) in batch.iter().zip(responses).enumerate() {
            results.push(EvaluationRecord {
                index: b * batch_size + j,
                original_post: sample.post.clone(),
                generated_summary: sample.generated_summary.clone(),
                model_response: response,
            });
        }
        info!(done = results.len(), total = sampled.len(), "batch complete");
    }

    let saved_to = save_results(&results, &cfg.output_path, &cfg.backup_path);
    Ok(RunOutcome::Completed { records: results.len(), saved_to })
}

/// Console diagnostics for the first item of a batch. Word scores are only
/// ever shown here, never persisted.
fn print_preview(batch_no: usize, sample: &Sample, response: &str) {
    let rule = "=".repeat(50);
    println!("\n{rule}");
    println!("BATCH {batch_no} - FIRST PREDICTION:");
    println!("{}", "-".repeat(50));
    println!("Original Post: {}...", truncate_chars(&sample.post, 100));
    println!("Generated Summary: {}", sample.generated_summary);
    println!("Model Response: {}...", truncate_chars(response, 200));

    let parsed = parse_response(response);
    if !parsed.textual_feedback.is_empty() {
        println!("\nTextual Feedback: {}", parsed.textual_feedback);
    }
    println!("\nWord Scores:");
    for w in parsed.word_scores.iter().take(PREVIEW_WORDS) {
        println!("  • '{}': {}", w.word, w.score);
    }
    if parsed.word_scores.len() > PREVIEW_WORDS {
        println!("  ... and {} more words", parsed.word_scores.len() - PREVIEW_WORDS);
    }
    let s = summarize_scores(&parsed.word_scores, &sample.generated_summary);
    println!(
        "  (+{} / 0:{} / -{}, mean {:.2}, {} of {} summary words scored)",
        s.positive, s.neutral, s.negative, s.mean, s.covered, s.summary_words
    );
    println!("{rule}");
}

fn write_json(records: &[EvaluationRecord], path: &Path) -> Result<()> {
    let body = serde_json::to_string_pretty(records)?;
    std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

/// Write to `output`, falling back once to `backup`. Returns where the
/// records ended up, if anywhere.
pub fn save_results(records: &[EvaluationRecord], output: &Path, backup: &Path) -> Option<PathBuf> {
    match write_json(records, output) {
        Ok(()) => {
            info!(path = %output.display(), "results saved");
            return Some(output.to_path_buf());
        }
        Err(e) => error!(error = %format!("{e:#}"), "error saving results"),
    }
    match write_json(records, backup) {
        Ok(()) => {
            warn!(path = %backup.display(), "results saved to backup location");
            Some(backup.to_path_buf())
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to save results to backup location as well");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;
    #[async_trait::async_trait]
    impl Generator for Echo {
        async fn generate(&self, prompts: &[String], _p: &GenerationParams) -> Result<Vec<String>> {
            Ok(prompts.iter().map(|p| format!("len={}", p.len())).collect())
        }
    }

    struct Short;
    #[async_trait::async_trait]
    impl Generator for Short {
        async fn generate(&self, _prompts: &[String], _p: &GenerationParams) -> Result<Vec<String>> {
            Ok(vec![])
        }
    }

    fn sample(p: &str) -> Sample {
        Sample { post: p.into(), generated_summary: "s".into() }
    }

    #[tokio::test]
    async fn process_batch_keeps_order() {
        let batch = vec![sample("a"), sample("bbbb")];
        let out = process_batch(&Echo, &batch, &GenerationParams::default()).await.unwrap();
        let expect: Vec<String> = batch.iter().map(|s| format!("len={}", build_sample_prompt(s).len())).collect();
        assert_eq!(out, expect);
    }

    #[tokio::test]
    async fn process_batch_rejects_count_mismatch() {
        let err = process_batch(&Short, &[sample("a")], &GenerationParams::default()).await.unwrap_err();
        assert!(err.to_string().contains("0 responses for 1 prompts"));
    }

    #[test]
    fn save_falls_back_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("no/such/dir/out.json");
        let backup = dir.path().join("backup.json");
        let recs = vec![EvaluationRecord {
            index: 0, original_post: "p".into(), generated_summary: "s".into(), model_response: "r".into(),
        }];
        assert_eq!(save_results(&recs, &bad, &backup), Some(backup.clone()));
        let text = std::fs::read_to_string(&backup).unwrap();
        assert!(text.contains("\n  {\n    \"index\": 0,"));

        let also_bad = dir.path().join("missing/backup.json");
        assert_eq!(save_results(&recs, &bad, &also_bad), None);
    }
}

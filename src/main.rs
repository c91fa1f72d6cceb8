use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use critique_eval::driver::BACKUP_PATH;
use critique_eval::llm::openai::{CompletionClient, ModelConfig};
use critique_eval::llm::DeviceSet;
use critique_eval::*;
use tracing::info;

#[derive(Parser)]
#[command(name="critique-eval", version, about = "Run a word-level critique model over a validation set")]
struct Cli {
  /// Model checkpoint, as registered with the inference server
  #[arg(long, default_value="../ckpt/llama31-8B/0_4800_merge")] model_path: String,
  /// Validation data (JSON object or array of {post, generated_summary})
  #[arg(long, default_value="../SLF5K_label/validation_critique_processed.json")] data_path: PathBuf,
  /// Where to save the results
  #[arg(long, default_value="../QA_FS_EVAL/0_4800_res_span")] output_path: PathBuf,
  #[arg(long, default_value="24")] batch_size: NonZeroUsize,
  /// Maximum number of samples to process
  #[arg(long, default_value_t=500)] max_samples: usize,
  #[arg(long, default_value_t=512)] max_new_tokens: u16,
  /// Sampling temperature
  #[arg(long, default_value_t=0.1)] temperature: f32,
  /// Comma-separated accelerator ids the model is placed on
  #[arg(long, default_value="0,1,2,3")] gpu_ids: DeviceSet,
  /// OpenAI-compatible endpoint serving the model
  #[arg(long, env="CRITIQUE_EVAL_BASE_URL", default_value="http://localhost:8000/v1")] base_url: String,
  #[arg(long, env="OPENAI_API_KEY", hide_env_values=true)] api_key: Option<String>,
  /// Seed for sampling the dataset; random when omitted
  #[arg(long)] seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let generator = CompletionClient::load(ModelConfig {
    model_path: cli.model_path,
    base_url: cli.base_url,
    api_key: cli.api_key,
    devices: cli.gpu_ids,
  }).await?;

  let cfg = RunConfig {
    data_path: cli.data_path,
    output_path: cli.output_path,
    backup_path: PathBuf::from(BACKUP_PATH),
    batch_size: cli.batch_size,
    max_samples: cli.max_samples,
    params: GenerationParams { max_new_tokens: cli.max_new_tokens, temperature: cli.temperature },
    seed: cli.seed,
  };

  match run(&generator, &cfg).await? {
    RunOutcome::Aborted { reason } => info!(%reason, "run aborted before generation"),
    RunOutcome::Completed { records, saved_to: Some(path) } => info!(records, path = %path.display(), "run complete"),
    RunOutcome::Completed { records, saved_to: None } => info!(records, "run complete, results were not saved"),
  }
  Ok(())
}

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use critique_eval::llm::Generator;
use critique_eval::GenerationParams;

/// Stub model: answers each prompt through `handler` and records every
/// batch it was given.
pub struct FakeGenerator {
    pub handler: Box<dyn Fn(&str) -> String + Send + Sync>,
    pub batches: Mutex<Vec<usize>>,
}

impl FakeGenerator {
    pub fn new(handler: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self { handler: Box::new(handler), batches: Mutex::new(Vec::new()) }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, prompts: &[String], _params: &GenerationParams) -> Result<Vec<String>> {
        self.batches.lock().unwrap().push(prompts.len());
        Ok(prompts.iter().map(|p| (self.handler)(p)).collect())
    }
}

pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompts: &[String], _params: &GenerationParams) -> Result<Vec<String>> {
        anyhow::bail!("CUDA out of memory")
    }
}

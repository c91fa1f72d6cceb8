pub mod openai;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::types::GenerationParams;

/// Batched text generation against a causal language model.
///
/// Implementations return exactly one continuation per prompt, in prompt
/// order, holding only the newly generated text.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompts: &[String], params: &GenerationParams) -> Result<Vec<String>>;
}

/// Drop an echoed prompt from a backend output and trim the continuation.
pub fn strip_prompt(prompt: &str, output: &str) -> String {
    output.strip_prefix(prompt).unwrap_or(output).trim().to_string()
}

/// Accelerator ids the model should be placed on, e.g. `0,1,2,3`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceSet(Vec<u32>);

impl DeviceSet {
    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for DeviceSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u32>().map_err(|_| format!("invalid device id `{p}`")))
            .collect::<Result<Vec<_>, _>>()
            .map(DeviceSet)
    }
}

impl fmt::Display for DeviceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.0.iter().map(u32::to_string).collect();
        f.write_str(&ids.join(","))
    }
}

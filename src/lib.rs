pub mod dataset;
pub mod driver;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod scoring;
pub mod segments;
pub mod types;

pub use driver::{run, RunConfig, RunOutcome};
pub use parse::{extract_textual_feedback, extract_word_scores, parse_response};
pub use prompt::build_prompt;
pub use types::*;

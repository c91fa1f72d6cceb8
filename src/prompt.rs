//! Critique prompt rendering.
//!
//! The post and summary are pasted into a JSON-shaped block verbatim. Quotes,
//! backslashes and newlines are NOT escaped, so an input containing `"` makes
//! the embedded block invalid JSON. The checkpoint was trained on exactly this
//! template, so it is reproduced as-is and the defect is left in place.

use crate::types::Sample;

/// System turn. The doubled braces are literal text the model was trained on.
pub const SYSTEM_PROMPT: &str = r#"
Your should evaluate the generated summary based on the original post.
  1. Please firstly give textual feedback about the quality of the summary.
  2. After that, please assign scores to each word in the generated summary based on the textual feedback.

# The Scoring Rules is:
  - -1: The word has a negative contribution to summarizing the original content.
  - 0: The word has a neutral contribution to summarizing the original content.
  - 1: The word has a positive contribution to summarizing the original content.

# Input Format
Input data is structured as JSON with the following fields:
{{
  "original_post": "The text of the original Reddit post.",
  "generated_summary": "The text of the summary generated by the model.",
}}

# Output Format
{{
  "textual_feedback":"feedback indicating missing, incorrect, or unnecessary content in the generated summary.",
  "word_score_list":
    [
    ( "word1", "Score (-1 or 0 or 1)"),
    ( "word2", "Score (-1 or 0 or 1)"),
    ...
    ]
}}

"#;

const BEGIN_OF_TEXT: &str = "<|begin_of_text|>";
const EOT: &str = "<|eot_id|>";

fn header(role: &str) -> String {
    format!("<|start_header_id|>{role}<|end_header_id|>\n")
}

fn build_question(post: &str, summary: &str) -> String {
    format!(
        "# Input\n{{\n  \"original_post\": \"{post}\",\n  \"generated_summary\": \"{summary}\"\n}}\n\n# Output\nPlease score each word in generated_summary based on original_post and the feedback of generated_summary, and output the responses as a JSON Dictionary without any extra information:\n"
    )
}

/// Render the full chat-formatted prompt for one (post, summary) pair,
/// ending with an open assistant turn.
pub fn build_prompt(post: &str, summary: &str) -> String {
    let question = build_question(post, summary);
    let mut out = String::with_capacity(SYSTEM_PROMPT.len() + question.len() + 160);
    out.push_str(BEGIN_OF_TEXT);
    out.push_str(&header("system"));
    out.push_str(SYSTEM_PROMPT);
    out.push_str(EOT);
    out.push_str(&header("user"));
    out.push_str(&question);
    out.push_str(" \n");
    out.push_str(EOT);
    out.push_str(&header("assistant"));
    out
}

pub fn build_sample_prompt(sample: &Sample) -> String {
    build_prompt(&sample.post, &sample.generated_summary)
}

//! Prompt assembly and answer extraction.
//!
//! Layout of every prompt:
//!
//! ```text
//! <system prompt>
//!
//! Previous context:
//! User: ...
//! Assistant: ...
//!
//! Question: <question>
//! Answer:
//! ```
//!
//! The context block is omitted when there is no history. Prompts are fitted
//! to the mode's input budget by dropping the oldest context pairs first and
//! then shortening the question; the system prompt and the answer marker are
//! always kept.

/// Marker the model continues from; the answer is the text after its last occurrence.
pub const ANSWER_MARKER: &str = "Answer:";

const QUESTION_MARKER: &str = "Question:";
const CONTEXT_HEADER: &str = "Previous context:";

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 bytes of UTF-8. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// An assembled prompt plus what fitting had to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    /// Context lines that made it into the prompt
    pub context_lines: usize,
    /// Context lines dropped to fit the budget
    pub dropped_lines: usize,
    pub question_truncated: bool,
}

/// Build a prompt from the system prompt, prior context lines (oldest first)
/// and the question, fitted to `max_input_tokens`.
pub fn build_prompt(
    system_prompt: &str,
    context: impl IntoIterator<Item = String>,
    question: &str,
    max_input_tokens: usize,
) -> Prompt {
    let mut lines: Vec<String> = context.into_iter().collect();
    let mut dropped_lines = 0;

    // Oldest pairs go first
    while !lines.is_empty() && estimate_tokens(&assemble(system_prompt, &lines, question)) > max_input_tokens {
        let n = lines.len().min(2);
        lines.drain(..n);
        dropped_lines += n;
    }

    let mut question = question.to_string();
    let mut question_truncated = false;
    let budget_bytes = max_input_tokens.saturating_mul(4);
    let overhead = assemble(system_prompt, &lines, "").len();
    if overhead + question.len() > budget_bytes {
        let keep = budget_bytes.saturating_sub(overhead).max(MIN_QUESTION_BYTES);
        if keep < question.len() {
            truncate_at_char_boundary(&mut question, keep);
            question_truncated = true;
        }
    }

    Prompt {
        text: assemble(system_prompt, &lines, &question),
        context_lines: lines.len(),
        dropped_lines,
        question_truncated,
    }
}

/// Never shorten a question below this; the service truncates the rest.
const MIN_QUESTION_BYTES: usize = 64;

fn assemble(system_prompt: &str, lines: &[String], question: &str) -> String {
    let mut prompt = String::with_capacity(system_prompt.len() + question.len() + 64);
    prompt.push_str(system_prompt.trim_end());
    prompt.push_str("\n\n");
    if !lines.is_empty() {
        prompt.push_str(CONTEXT_HEADER);
        prompt.push('\n');
        for line in lines {
            prompt.push_str(line);
            prompt.push('\n');
        }
        prompt.push('\n');
    }
    prompt.push_str(QUESTION_MARKER);
    prompt.push(' ');
    prompt.push_str(question);
    prompt.push('\n');
    prompt.push_str(ANSWER_MARKER);
    prompt.push(' ');
    prompt
}

fn truncate_at_char_boundary(text: &mut String, max_bytes: usize) {
    let mut end = max_bytes.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

/// Extract the answer from raw model output.
///
/// Takes the text after the last [`ANSWER_MARKER`]; output without the marker
/// is used whole. The result is trimmed.
pub fn extract_answer(raw: &str) -> &str {
    raw.rsplit_once(ANSWER_MARKER)
        .map_or(raw, |(_, answer)| answer)
        .trim()
}

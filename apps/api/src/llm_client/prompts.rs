// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every grounded prompt: answers must come from the
/// supplied content, never from model-internal knowledge of the page.
pub const GROUNDING_INSTRUCTION: &str = "\
    Answer ONLY from the content provided above. \
    If the content does not contain the answer, say so plainly. \
    Do NOT invent facts, numbers, or requirements that are not in the content.";

/// Truncates a string to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

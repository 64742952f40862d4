//! Content Assembler - turns scraped markup (or pasted text) into one
//! plain-text blob under a fixed total-character budget.
//!
//! Markup conversion keeps anchor text and drops scripts, styles, images,
//! and link targets. Output that trims below a minimum length is flagged
//! "thin" (typical of auth walls and client-rendered pages); the fallback
//! substitutes the newest sufficiently-long user message from history.

use crate::chat::models::{ConversationMessage, Role};
use crate::scrape::client::ScrapeResult;

/// Total character ceiling across all assembled sources.
pub const CONTENT_BUDGET: usize = 100_000;
/// Below this many trimmed characters, content is considered thin.
pub const MIN_USEFUL_CONTENT: usize = 200;
/// A pasted or historical message longer than this counts as source content.
pub const PASTED_TEXT_THRESHOLD: usize = 500;

const TEXT_WIDTH: usize = 80;

/// Transient, derived content blob. Never persisted.
#[derive(Debug, Clone)]
pub struct AssembledContent {
    pub text: String,
    pub is_thin: bool,
}

/// Assembles scraped results: each page is converted to plain text, then
/// chunks are concatenated up to the budget.
pub fn assemble_results(results: &[ScrapeResult]) -> AssembledContent {
    let chunks: Vec<String> = results.iter().map(|r| html_to_text(&r.content)).collect();
    let text = concat_within_budget(&chunks, CONTENT_BUDGET);
    let is_thin = text.trim().chars().count() < MIN_USEFUL_CONTENT;
    AssembledContent { text, is_thin }
}

/// Assembles caller-pasted text directly (no markup conversion).
pub fn assemble_pasted(pasted: &str) -> AssembledContent {
    let text = concat_within_budget(&[pasted.to_string()], CONTENT_BUDGET);
    let is_thin = text.trim().chars().count() < MIN_USEFUL_CONTENT;
    AssembledContent { text, is_thin }
}

/// Thin-content fallback: replaces thin content with the newest user
/// message whose trimmed length clears the pasted-text threshold.
/// Non-thin content passes through untouched.
pub fn apply_history_fallback(
    content: AssembledContent,
    history: &[ConversationMessage],
) -> AssembledContent {
    if !content.is_thin {
        return content;
    }

    for message in history.iter().rev() {
        if message.role == Role::User
            && message.content.trim().chars().count() > PASTED_TEXT_THRESHOLD
        {
            return AssembledContent {
                text: message.content.clone(),
                is_thin: false,
            };
        }
    }

    content
}

/// Converts HTML to readable plain text. Scripts, styles, and images are
/// dropped; hyperlinks keep their anchor text only (the trivial decorator
/// skips the footnoted link targets the default renderer would emit).
pub fn html_to_text(html: &str) -> String {
    html2text::from_read_with_decorator(
        html.as_bytes(),
        TEXT_WIDTH,
        html2text::render::TrivialDecorator::new(),
    )
    .unwrap_or_else(|_| html.to_string())
}

/// Concatenates chunks up to `budget` characters total. The chunk that
/// crosses the budget is truncated to exactly fill the remainder; chunks
/// after it are dropped.
pub fn concat_within_budget(chunks: &[String], budget: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;

    for chunk in chunks {
        if used >= budget {
            break;
        }
        let remaining = budget - used;
        let take: String = chunk.chars().take(remaining).collect();
        used += take.chars().count();
        out.push_str(&take);
    }

    out
}

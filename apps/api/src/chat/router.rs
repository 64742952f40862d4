//! Prompt Router - maps a classified intent and its assembled content to a
//! prompt template and intent-specific generation settings, then invokes the
//! generation capability.

use crate::chat::intent::Intent;
use crate::chat::models::{ConversationMessage, Role};
use crate::chat::prompts::{
    CHAT_SYSTEM_TEMPLATE, EXTRACTION_PROMPT_TEMPLATE, FIT_PROMPT_TEMPLATE, FIT_SYSTEM,
    SUMMARY_PROMPT_TEMPLATE, SUMMARY_SYSTEM,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{truncate_chars, GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{strip_json_fences, GenerationOptions, LlmClient, Turn, TurnRole};

/// Caps applied to template inputs, in characters.
const PROFILE_BUDGET: usize = 6_000;
const CONTENT_BUDGET: usize = 100_000;

/// Structured outputs run cooler and shorter than narrative ones.
pub fn generation_settings(intent: Intent) -> GenerationOptions {
    match intent {
        Intent::Extraction => GenerationOptions {
            max_tokens: 1024,
            temperature: 0.2,
        },
        Intent::FitAssessment => GenerationOptions {
            max_tokens: 1536,
            temperature: 0.4,
        },
        Intent::ScrapeRequest => GenerationOptions {
            max_tokens: 1024,
            temperature: 0.7,
        },
        Intent::DefaultChat => GenerationOptions {
            max_tokens: 768,
            temperature: 0.8,
        },
    }
}

/// Generates a grounded response for a content-bearing intent.
/// `content` is the assembled source text; `message` is the user's ask.
pub async fn route_grounded(
    llm: &LlmClient,
    intent: Intent,
    content: &str,
    profile: &str,
    message: &str,
) -> Result<String, AppError> {
    let opts = generation_settings(intent);
    let content = truncate_chars(content, CONTENT_BUDGET);
    let profile = truncate_chars(profile, PROFILE_BUDGET);

    match intent {
        Intent::Extraction => {
            let prompt = format!(
                "{}\n\n{GROUNDING_INSTRUCTION}",
                EXTRACTION_PROMPT_TEMPLATE
                    .replace("{request}", message)
                    .replace("{content}", content)
            );
            let raw = llm.generate(&prompt, JSON_ONLY_SYSTEM, opts).await?;
            // Models occasionally fence JSON despite instructions.
            Ok(strip_json_fences(&raw).to_string())
        }
        Intent::FitAssessment => {
            let prompt = FIT_PROMPT_TEMPLATE
                .replace("{profile}", profile)
                .replace("{job_text}", content)
                .replace("{question}", message);
            Ok(llm.generate(&prompt, FIT_SYSTEM, opts).await?)
        }
        Intent::ScrapeRequest => {
            let prompt = format!(
                "{}\n\n{GROUNDING_INSTRUCTION}",
                SUMMARY_PROMPT_TEMPLATE
                    .replace("{request}", message)
                    .replace("{content}", content)
            );
            Ok(llm.generate(&prompt, SUMMARY_SYSTEM, opts).await?)
        }
        Intent::DefaultChat => {
            // Grounded routing is never called with DefaultChat; treat it
            // as a plain chat turn with no history.
            route_chat(llm, &[], message, None, profile).await
        }
    }
}

/// Generates a default chat continuation over the caller's history.
pub async fn route_chat(
    llm: &LlmClient,
    history: &[ConversationMessage],
    message: &str,
    extra_context: Option<&str>,
    profile: &str,
) -> Result<String, AppError> {
    let profile = truncate_chars(profile, PROFILE_BUDGET);
    let system = CHAT_SYSTEM_TEMPLATE.replace("{profile}", profile);

    let mut turns: Vec<Turn> = history
        .iter()
        .map(|m| Turn {
            role: match m.role {
                Role::User => TurnRole::User,
                Role::Model => TurnRole::Assistant,
            },
            content: m.content.clone(),
        })
        .collect();

    let content = match extra_context {
        Some(context) if !context.trim().is_empty() => {
            format!("{message}\n\n[Additional context from the visitor]\n{context}")
        }
        _ => message.to_string(),
    };
    turns.push(Turn {
        role: TurnRole::User,
        content,
    });

    Ok(llm
        .converse(&turns, &system, generation_settings(Intent::DefaultChat))
        .await?)
}

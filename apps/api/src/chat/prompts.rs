// All LLM prompt constants for the chat orchestration module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Extraction prompt template. Replace `{content}` and `{request}` before
/// sending. The system prompt is the shared llm_client JSON-only fragment.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract the data the user asked for from the content below.

USER REQUEST:
{request}

CONTENT:
{content}

Rules:
1. Return ONE JSON object (or array, if the user asked for rows/records).
2. Use the user's requested field names when given; otherwise choose short snake_case names.
3. Use null for fields the content does not support - NEVER guess values.
4. If the user asked for CSV, return a JSON object {"csv": "..."} with the CSV text as a single string.
5. No prose, no markdown, no code fences."#;

/// System prompt for fit assessment.
pub const FIT_SYSTEM: &str =
    "You are a rigorous, honest recruiting analyst. You compare one candidate's \
    profile against one job posting and produce a structured assessment. \
    You never inflate a verdict to be polite, and you never invent facts that \
    are not in the profile or the posting.";

/// Fit-assessment prompt template.
/// Replace: {profile}, {job_text}, {question}
pub const FIT_PROMPT_TEMPLATE: &str = r#"Assess whether the candidate below fits the role below.

CANDIDATE PROFILE (source of truth for the candidate - do not invent experience):
{profile}

JOB POSTING:
{job_text}

USER QUESTION:
{question}

Respond in exactly this structure:

Verdict: one of "Strong Fit" | "Possible Fit" | "Not a Fit"
Score: 0-100
Matched requirements: bullet list, each citing profile evidence
Gaps: bullet list of requirements the profile does not cover
Summary: 2-3 sentences

HARD RULE: identify the posting's hard requirements (must-haves, minimum
years, required credentials). If ANY hard requirement is clearly not met by
the profile, the Verdict MUST be "Not a Fit" regardless of the score or how
strong the other matches are."#;

/// System prompt for page summaries.
pub const SUMMARY_SYSTEM: &str =
    "You are a concise research assistant. You summarize scraped web content \
    faithfully, without adding outside knowledge about the page or its subject.";

/// Summary prompt template. Replace `{content}` and `{request}`.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Summarize the content below for the user.

USER REQUEST:
{request}

CONTENT:
{content}

Use exactly this outline:

## Overview
One short paragraph: what this page is.

## Key Points
3-7 bullets with the substance.

## Details Worth Knowing
Anything specific the user would regret missing (numbers, dates, names,
requirements). Omit this section only if the content is trivially short."#;

/// System prompt template for default chat. Replace `{profile}`.
pub const CHAT_SYSTEM_TEMPLATE: &str = "You are the assistant on a personal portfolio site, \
    answering visitors on behalf of the candidate described below. Be helpful, \
    specific, and brief. If you do not know something about the candidate, say so \
    rather than guessing.\n\nCANDIDATE PROFILE:\n{profile}";

/// Fixed reply when a grounded intent arrives with nothing to ground on.
pub const CLARIFY_REPLY: &str = "I'd be happy to help with that, but I need something to work \
    from. Paste the job posting or page text directly, or give me a link to it.";

/// Fixed reply template when scraping outlives the polling deadline.
/// Replace `{job_id}`.
pub const SCRAPE_PENDING_REPLY: &str = "I've started fetching that page, but it's taking longer \
    than expected (job {job_id}). Ask me again in a moment and I'll use the result.";

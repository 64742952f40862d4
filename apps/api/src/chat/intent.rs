//! Intent Classifier - ordered rule evaluation over the inbound message.
//!
//! The rules are deliberately heuristic (regex-driven) and their precedence
//! is load-bearing: fit phrasing beats extraction cues, extraction cues beat
//! the generic scrape verbs, and a bare URL still reads as a scrape request.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::scrape::assembler::PASTED_TEXT_THRESHOLD;

/// What the caller wants from this message. Derived per-request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    DefaultChat,
    ScrapeRequest,
    Extraction,
    FitAssessment,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::DefaultChat => "default_chat",
            Intent::ScrapeRequest => "scrape",
            Intent::Extraction => "extraction",
            Intent::FitAssessment => "fit_assessment",
        }
    }

    /// Whether this intent wants grounding content before generation.
    pub fn needs_content(self) -> bool {
        !matches!(self, Intent::DefaultChat)
    }
}

/// Classifier output: the intent plus any grounding source found in the
/// message itself.
#[derive(Debug, Clone)]
pub struct Classification {
    pub intent: Intent,
    /// Normalized absolute URL, if the message carried one.
    pub target_url: Option<String>,
    /// The message body, when it is itself the source content.
    pub pasted_text: Option<String>,
}

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("static regex must compile"));

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[A-Za-z0-9][A-Za-z0-9-]*\.)+[A-Za-z]{2,}(?:/\S*)?")
        .expect("static regex must compile")
});

static ACTION_VERB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(scrape|fetch|get|extract)\b").expect("static regex must compile"));

static FIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\bqualified\b|good fit|good candidate|strong candidate|\bfit\b|should i apply|am i a|would (i|he|she|they) be)",
    )
    .expect("static regex must compile")
});

static EXTRACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(json|csv|extract|fields)\b").expect("static regex must compile"));

static JOB_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(job description|responsibilities|requirements|qualifications|we are looking for|about the role)",
    )
    .expect("static regex must compile")
});

/// Classifies one message. Rule order is the contract; see module docs.
pub fn classify(message: &str) -> Classification {
    let target_url = extract_target(message);
    let pasted_text = detect_pasted_text(message);

    let intent = if FIT_RE.is_match(message) {
        Intent::FitAssessment
    } else if EXTRACT_RE.is_match(message) {
        Intent::Extraction
    } else if ACTION_VERB_RE.is_match(message) && target_url.is_some() {
        Intent::ScrapeRequest
    } else if target_url.is_some() && pasted_text.is_none() {
        // A bare URL with no verbs and no pasted body still reads as
        // "tell me about this page".
        Intent::ScrapeRequest
    } else if pasted_text.is_some() {
        // A pasted job posting with no question is the recruiter flow.
        Intent::FitAssessment
    } else {
        Intent::DefaultChat
    };

    Classification {
        intent,
        target_url,
        pasted_text,
    }
}

/// Finds an absolute URL or bare domain in the message, strips surrounding
/// quoting and punctuation, and normalizes to a secure scheme.
pub fn extract_target(message: &str) -> Option<String> {
    if let Some(found) = URL_RE.find(message) {
        let cleaned = clean_target(found.as_str());
        if !cleaned.is_empty() {
            return Some(cleaned);
        }
    }

    if let Some(found) = DOMAIN_RE.find(message) {
        let cleaned = clean_target(found.as_str());
        if !cleaned.is_empty() {
            return Some(format!("https://{cleaned}"));
        }
    }

    None
}

/// The message body counts as source content when its whitespace-normalized
/// length clears the pasted-text threshold or it carries a job-posting
/// marker phrase.
fn detect_pasted_text(message: &str) -> Option<String> {
    let normalized: String = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() > PASTED_TEXT_THRESHOLD || JOB_MARKER_RE.is_match(message) {
        Some(message.to_string())
    } else {
        None
    }
}

fn clean_target(raw: &str) -> String {
    raw.trim_matches(|c: char| "\"'`<>()[]{}".contains(c))
        .trim_end_matches(['.', ',', ';', ':', '!', '?'])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_verb_with_url_is_scrape_request() {
        let c = classify("scrape https://example.com");
        assert_eq!(c.intent, Intent::ScrapeRequest);
        assert_eq!(c.target_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_fit_phrasing_with_pasted_job_text_is_fit_assessment() {
        let message = format!(
            "Is Kareem a good fit for this role? {}",
            "The role requires building distributed systems at scale. ".repeat(12)
        );
        let c = classify(&message);
        assert_eq!(c.intent, Intent::FitAssessment);
        assert!(c.pasted_text.is_some());
    }

    #[test]
    fn test_fit_takes_precedence_over_scrape_when_url_present() {
        let c = classify("Is he a good fit? Please scrape https://example.com/job");
        assert_eq!(c.intent, Intent::FitAssessment);
        assert_eq!(c.target_url.as_deref(), Some("https://example.com/job"));
    }

    #[test]
    fn test_extraction_cues_without_fit_markers() {
        let c = classify("extract fields as json from https://example.com");
        assert_eq!(c.intent, Intent::Extraction);
        assert_eq!(c.target_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_extraction_beats_generic_scrape_verb() {
        let c = classify("fetch the csv from https://example.com/data");
        assert_eq!(c.intent, Intent::Extraction);
    }

    #[test]
    fn test_bare_url_is_scrape_request() {
        let c = classify("https://example.com/about");
        assert_eq!(c.intent, Intent::ScrapeRequest);
        assert_eq!(c.target_url.as_deref(), Some("https://example.com/about"));
    }

    #[test]
    fn test_bare_domain_gets_secure_scheme() {
        let c = classify("scrape example.com please");
        assert_eq!(c.intent, Intent::ScrapeRequest);
        assert_eq!(c.target_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_quoted_target_is_cleaned() {
        let c = classify(r#"fetch "https://example.com/jobs/42.""#);
        assert_eq!(
            c.target_url.as_deref(),
            Some("https://example.com/jobs/42")
        );
    }

    #[test]
    fn test_plain_chat_is_default() {
        let c = classify("What projects has Kareem worked on recently?");
        assert_eq!(c.intent, Intent::DefaultChat);
        assert!(c.target_url.is_none());
        assert!(c.pasted_text.is_none());
    }

    #[test]
    fn test_long_pasted_text_without_markers_is_fit_assessment() {
        let message = "We build infrastructure for payments teams. ".repeat(15);
        let c = classify(&message);
        assert_eq!(c.intent, Intent::FitAssessment);
        assert!(c.pasted_text.is_some());
    }

    #[test]
    fn test_job_marker_phrase_marks_pasted_text() {
        let message = "Responsibilities: design APIs. Requirements: 5 years Rust.";
        let c = classify(message);
        assert!(c.pasted_text.is_some());
    }

    #[test]
    fn test_fit_question_without_grounding_still_classifies_fit() {
        let c = classify("Would he be a good fit?");
        assert_eq!(c.intent, Intent::FitAssessment);
        assert!(c.target_url.is_none());
        assert!(c.pasted_text.is_none());
    }

    #[test]
    fn test_abbreviations_are_not_domains() {
        let c = classify("Tell me about his work, e.g. recent projects.");
        assert_eq!(c.intent, Intent::DefaultChat);
        assert!(c.target_url.is_none());
    }

    #[test]
    fn test_pasted_text_with_embedded_url_but_no_verb_is_fit_assessment() {
        let message = format!(
            "About the role: we build payment rails. Apply at https://example.com/careers. {}",
            "You will own services end to end. ".repeat(16)
        );
        let c = classify(&message);
        assert_eq!(c.intent, Intent::FitAssessment);
        assert!(c.target_url.is_some());
    }

    #[test]
    fn test_intent_labels() {
        assert_eq!(Intent::DefaultChat.as_str(), "default_chat");
        assert_eq!(Intent::FitAssessment.as_str(), "fit_assessment");
    }

    #[test]
    fn test_needs_content() {
        assert!(!Intent::DefaultChat.needs_content());
        assert!(Intent::ScrapeRequest.needs_content());
        assert!(Intent::Extraction.needs_content());
        assert!(Intent::FitAssessment.needs_content());
    }
}

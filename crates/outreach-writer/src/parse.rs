//! Parsing of free-form model output into a subject and body.

use std::sync::LazyLock;

use outreach_core::SenderProfile;
use regex::{Captures, Regex};

use crate::error::GenerationError;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[\s*(your|my|their|recipient)?\s*(company name|agency name|company|agency|name|title|website|email)\s*\]",
    )
    .expect("valid placeholder regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Draft {
    pub subject: String,
    pub body: String,
}

/// Splits model output into subject and body.
///
/// Accepts `Subject:` / `Body:` labels in any case, optionally wrapped in
/// markdown emphasis. Text without a subject label is taken whole as the
/// body. Bracket placeholders are filled from `sender` or dropped.
///
/// # Errors
///
/// Returns [`GenerationError::EmptyResponse`] when no body text remains.
pub(crate) fn parse_draft(
    text: &str,
    sender: &SenderProfile,
    company: &str,
) -> Result<Draft, GenerationError> {
    let mut subject: Option<String> = None;
    let mut preamble: Vec<&str> = Vec::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_body = false;

    for line in text.trim().lines() {
        if !in_body {
            if subject.is_none() {
                if let Some(rest) = strip_label(line, "subject") {
                    subject = Some(rest.to_owned());
                    continue;
                }
            }
            if let Some(rest) = strip_label(line, "body") {
                in_body = true;
                if !rest.is_empty() {
                    body_lines.push(rest);
                }
                continue;
            }
            if subject.is_none() {
                preamble.push(line);
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            in_body = true;
        }
        body_lines.push(line);
    }

    let raw_body = if subject.is_none() && body_lines.is_empty() {
        preamble.join("\n")
    } else {
        body_lines.join("\n")
    };

    let body = fill_placeholders(&raw_body, sender)
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned();
    if body.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let subject = subject
        .map(|s| fill_placeholders(&s, sender).trim().to_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default_subject(company));

    Ok(Draft { subject, body })
}

pub(crate) fn default_subject(company: &str) -> String {
    format!("Quick thought about {company}'s growth")
}

/// Returns the text after `label:` if `line` starts with that label.
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let t = line.trim_start().trim_start_matches(['*', '#', '_']).trim_start();
    let head = t.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let rest = t[label.len()..].trim_start_matches(['*', '_']).strip_prefix(':')?;
    Some(rest.trim_start_matches(['*', '_']).trim())
}

fn fill_placeholders(text: &str, sender: &SenderProfile) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let owner = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
            if matches!(owner.as_deref(), Some("their" | "recipient")) {
                return String::new();
            }
            let field = caps[2].to_ascii_lowercase();
            match field.as_str() {
                "name" => sender.name.clone(),
                "title" => sender.title.clone(),
                "company" | "company name" | "agency" | "agency name" => sender.company.clone(),
                _ => String::new(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> SenderProfile {
        SenderProfile {
            name: "John Smith".to_owned(),
            title: "Founder & CEO".to_owned(),
            company: "GrowthPulse".to_owned(),
            ..SenderProfile::default()
        }
    }

    #[test]
    fn parses_labelled_subject_and_body() {
        let text = "Subject: Faster picking at Acme\n\nBody:\nHi Jane,\n\nLoved the robots.\n\nJohn Smith";
        let draft = parse_draft(text, &sender(), "Acme").unwrap();
        assert_eq!(draft.subject, "Faster picking at Acme");
        assert_eq!(draft.body, "Hi Jane,\n\nLoved the robots.\n\nJohn Smith");
    }

    #[test]
    fn body_label_is_optional_after_subject() {
        let text = "subject: Hello\nHi there,\nGreat work.";
        let draft = parse_draft(text, &sender(), "Acme").unwrap();
        assert_eq!(draft.subject, "Hello");
        assert_eq!(draft.body, "Hi there,\nGreat work.");
    }

    #[test]
    fn markdown_labels_are_recognised() {
        let text = "**Subject:** Bold move\n**Body:**\nHi,\nThanks.";
        let draft = parse_draft(text, &sender(), "Acme").unwrap();
        assert_eq!(draft.subject, "Bold move");
        assert_eq!(draft.body, "Hi,\nThanks.");
    }

    #[test]
    fn missing_subject_gets_default_and_whole_text_is_body() {
        let draft = parse_draft("Hi Jane,\nLet's talk.", &sender(), "Acme").unwrap();
        assert_eq!(draft.subject, "Quick thought about Acme's growth");
        assert_eq!(draft.body, "Hi Jane,\nLet's talk.");
    }

    #[test]
    fn placeholders_are_filled_or_removed() {
        let text = "Subject: Hi from [Your Company]\nBody:\nHello [Recipient Name],\n\nBest,\n[Your Name]\n[Your Title]\n[Company Name]\n[Your Website]";
        let draft = parse_draft(text, &sender(), "Acme").unwrap();
        assert_eq!(draft.subject, "Hi from GrowthPulse");
        assert_eq!(
            draft.body,
            "Hello ,\n\nBest,\nJohn Smith\nFounder & CEO\nGrowthPulse"
        );
    }

    #[test]
    fn empty_body_is_an_error() {
        let result = parse_draft("Subject: Only a subject\nBody:\n   ", &sender(), "Acme");
        assert!(matches!(result, Err(GenerationError::EmptyResponse)));
        assert!(matches!(
            parse_draft("   ", &sender(), "Acme"),
            Err(GenerationError::EmptyResponse)
        ));
    }
}

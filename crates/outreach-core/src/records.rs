//! Prospect records and the campaign request that carries them.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("valid email regex")
});

/// One input row identifying a recipient and their company/website.
///
/// Immutable once read. Identity within a run is the email address,
/// compared case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectRecord {
    pub email: String,
    pub company_name: String,
    pub website_url: String,
}

impl ProspectRecord {
    pub fn new(
        email: impl Into<String>,
        company_name: impl Into<String>,
        website_url: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            company_name: company_name.into(),
            website_url: website_url.into(),
        }
    }

    /// Key used for de-duplication within a campaign run.
    #[must_use]
    pub fn identity(&self) -> String {
        self.email.trim().to_ascii_lowercase()
    }

    /// Company name trimmed for display in prompts and templates.
    #[must_use]
    pub fn display_company(&self) -> &str {
        let trimmed = self.company_name.trim();
        if trimmed.is_empty() {
            "your company"
        } else {
            trimmed
        }
    }
}

/// Stable reference to a record within one run: its 1-based input position
/// (first occurrence) and recipient address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub position: usize,
    pub email: String,
}

/// One campaign invocation: ordered records plus the free-text intent that
/// guides message generation. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRequest {
    pub records: Vec<ProspectRecord>,
    pub purpose: String,
}

impl CampaignRequest {
    pub fn new(records: Vec<ProspectRecord>, purpose: impl Into<String>) -> Self {
        Self {
            records,
            purpose: purpose.into(),
        }
    }
}

/// Returns `true` if `email` looks like a deliverable mailbox address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let trimmed = email.trim();
    !trimmed.is_empty() && trimmed.len() <= 254 && EMAIL_RE.is_match(trimmed)
}

/// Collapses duplicate emails, keeping the first occurrence, and pairs each
/// surviving record with its [`RecordRef`]. Input order is preserved.
#[must_use]
pub fn dedup_by_email(records: &[ProspectRecord]) -> Vec<(RecordRef, ProspectRecord)> {
    let mut seen = HashSet::new();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| seen.insert(record.identity()))
        .map(|(idx, record)| {
            (
                RecordRef {
                    position: idx + 1,
                    email: record.email.trim().to_owned(),
                },
                record.clone(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("jane.doe@acme.com"));
        assert!(is_valid_email("sales+eu@mail.acme.co.uk"));
        assert!(is_valid_email("  padded@acme.io  "));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing-domain@"));
        assert!(!is_valid_email("@acme.com"));
        assert!(!is_valid_email("two@@acme.com"));
        assert!(!is_valid_email("no-tld@acme"));
        assert!(!is_valid_email("spaces in@acme.com"));
    }

    #[test]
    fn dedup_keeps_first_occurrence_and_positions() {
        let records = vec![
            ProspectRecord::new("a@acme.com", "Acme", "acme.com"),
            ProspectRecord::new("b@beta.com", "Beta", "beta.com"),
            ProspectRecord::new("A@Acme.com ", "Acme Dup", "acme.org"),
            ProspectRecord::new("c@gamma.com", "Gamma", "gamma.com"),
        ];
        let unique = dedup_by_email(&records);
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[0].0.position, 1);
        assert_eq!(unique[0].1.company_name, "Acme");
        assert_eq!(unique[1].0.position, 2);
        assert_eq!(unique[2].0.position, 4);
        assert_eq!(unique[2].0.email, "c@gamma.com");
    }

    #[test]
    fn display_company_falls_back_when_blank() {
        let record = ProspectRecord::new("a@acme.com", "   ", "acme.com");
        assert_eq!(record.display_company(), "your company");
    }
}

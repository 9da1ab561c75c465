//! Built-in fallback messages. They use only record fields, the campaign
//! purpose and the sender profile, never website content.

use outreach_core::SenderProfile;

use crate::parse::Draft;

/// Used when nothing is known about the prospect's website.
pub(crate) fn without_insight(company: &str, purpose: &str, sender: &SenderProfile) -> Draft {
    Draft {
        subject: format!("Exploring partnership opportunities with {company}"),
        body: format!(
            "Hi,\n\n\
             I'm reaching out about {purpose}. I came across {company} and would love to \
             learn more about what you're working on.\n\n\
             At {sender_company} we focus on {services}. {value}.\n\n\
             Would you be open to a brief conversation?\n\n\
             Best regards,\n{signature}",
            sender_company = sender.company,
            services = sender.services_line(),
            value = sender.value_proposition.trim_end_matches('.'),
            signature = sender.signature(),
        ),
    }
}

/// Used when the generation service failed for a prospect we did research.
pub(crate) fn after_generation_failure(
    company: &str,
    purpose: &str,
    sender: &SenderProfile,
) -> Draft {
    Draft {
        subject: format!("Quick question about {company}"),
        body: format!(
            "Hi,\n\n\
             I came across {company} and was impressed by what you're doing. \
             I'd love to explore how we might work together on {purpose}.\n\n\
             Would you be open to a brief conversation?\n\n\
             Best regards,\n{signature}",
            signature = sender.signature(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_are_keyed_on_company_and_purpose() {
        let sender = SenderProfile::default();
        let a = without_insight("Acme", "a pilot project", &sender);
        assert_eq!(a.subject, "Exploring partnership opportunities with Acme");
        assert!(a.body.contains("I'm reaching out about a pilot project"));
        assert!(a.body.ends_with("Alex\nFounder\nOur Agency"));

        let b = after_generation_failure("Acme", "a pilot project", &sender);
        assert_eq!(b.subject, "Quick question about Acme");
        assert!(b.body.contains("work together on a pilot project"));
        assert!(b.body.ends_with(&sender.signature()));
    }

    #[test]
    fn templates_are_deterministic() {
        let sender = SenderProfile::default();
        assert_eq!(
            without_insight("Acme", "x", &sender),
            without_insight("Acme", "x", &sender)
        );
    }
}

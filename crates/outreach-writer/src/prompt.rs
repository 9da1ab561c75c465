use std::fmt::Write as _;

use outreach_core::{Insight, ProspectRecord, SenderProfile};

/// Builds the generation prompt for one prospect.
///
/// The website summary is included only for a usable insight. Otherwise the
/// model is told to reference nothing but the company name.
pub(crate) fn build_prompt(
    sender: &SenderProfile,
    prospect: &ProspectRecord,
    insight: &Insight,
    purpose: &str,
) -> String {
    let company = prospect.display_company();
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "You are an expert B2B email copywriter. Write one personalized, \
         authentic outreach email that reads as human-written.\n\n",
    );

    let _ = writeln!(prompt, "=== SENDER ===");
    let _ = writeln!(prompt, "- Name: {}", sender.name);
    let _ = writeln!(prompt, "- Title: {}", sender.title);
    let _ = writeln!(prompt, "- Company: {}", sender.company);
    let _ = writeln!(prompt, "- What we do: {}", sender.company_description);
    let _ = writeln!(prompt, "- Services: {}", sender.services_line());
    let _ = writeln!(prompt, "- Value proposition: {}", sender.value_proposition);
    prompt.push('\n');

    let _ = writeln!(prompt, "=== RECIPIENT ===");
    let _ = writeln!(prompt, "- Company: {company}");
    prompt.push('\n');

    if insight.is_usable() {
        let _ = writeln!(prompt, "=== WEBSITE INSIGHTS ===");
        let _ = writeln!(prompt, "{}", insight.summary);
        prompt.push('\n');
    }

    let _ = writeln!(prompt, "=== REQUIREMENTS ===");
    let _ = writeln!(prompt, "1. Purpose: {purpose}");
    let _ = writeln!(prompt, "2. Tone: professional, conversational, warm");
    let _ = writeln!(prompt, "3. Length: 150-200 words");
    if insight.is_usable() {
        let _ = writeln!(
            prompt,
            "4. Reference specific details from the website insights to show genuine research"
        );
    } else {
        let _ = writeln!(
            prompt,
            "4. Nothing is known about their website: refer to them only as {company} and do not invent details about their business"
        );
    }
    let _ = writeln!(prompt, "5. A clear, low-pressure call to action");
    let _ = writeln!(prompt, "6. Subject line under 60 characters");
    prompt.push('\n');

    let _ = writeln!(prompt, "=== RULES ===");
    let _ = writeln!(
        prompt,
        "- Sign with the real name \"{}\", title and company; never use placeholders or brackets",
        sender.name
    );
    let _ = writeln!(prompt, "- No cliches, no mention of research tools or AI, no URLs");
    prompt.push('\n');

    let _ = writeln!(prompt, "=== OUTPUT FORMAT ===");
    let _ = writeln!(prompt, "Subject: <subject line>");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Body:");
    let _ = writeln!(prompt, "<greeting, email body and signature>");

    prompt
}

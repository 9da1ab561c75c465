//! Reduces raw page content to a compact [`Insight`].

use outreach_core::{ExtractionStatus, Insight, RecordRef};
use serde_json::Value;

use crate::fetch::RawContent;
use crate::html;

const MAX_HEADINGS_PER_LEVEL: usize = 5;
const MAX_KEYWORDS: usize = 10;
const ABOUT_MARKERS: [&str; 3] = ["about us", "our company", "our mission"];
const SERVICES_MARKERS: [&str; 3] = ["services", "products", "solutions"];

/// Structured signals pulled out of one HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSignals {
    pub title: String,
    /// `<meta name="description">`, falling back to `og:description`.
    pub description: String,
    pub keywords: Vec<String>,
    pub headings: Vec<String>,
    /// Name and description of a JSON-LD organization node, if present.
    pub organization: Option<String>,
    /// Visible text of the main content region.
    pub main_text: String,
    /// The page mentions who the company is ("about us", "our mission", ...).
    pub has_about_section: bool,
    /// The page mentions what the company offers ("services", "products", ...).
    pub has_services_section: bool,
}

impl PageSignals {
    #[must_use]
    pub fn from_html(raw_html: &str) -> Self {
        let description = html::find_meta_content(raw_html, "name", "description")
            .or_else(|| html::find_meta_content(raw_html, "property", "og:description"))
            .unwrap_or_default();

        let keywords = html::find_meta_content(raw_html, "name", "keywords")
            .map(|k| {
                k.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .take(MAX_KEYWORDS)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let organization = html::json_ld_blocks(raw_html)
            .iter()
            .find_map(find_organization);

        let stripped = html::strip_non_content(raw_html);
        let headings = html::headings(&stripped, MAX_HEADINGS_PER_LEVEL);
        let main_text = html::clean_text(html::main_region(&stripped));
        let page_text = html::clean_text(&stripped).to_lowercase();
        let mentions = |markers: &[&str]| markers.iter().any(|m| page_text.contains(m));

        Self {
            title: html::title(raw_html),
            description,
            keywords,
            headings,
            organization,
            main_text,
            has_about_section: mentions(&ABOUT_MARKERS),
            has_services_section: mentions(&SERVICES_MARKERS),
        }
    }

    /// Characters of human-readable text the page carries.
    fn visible_len(&self) -> usize {
        self.title.chars().count()
            + self.description.chars().count()
            + self.main_text.chars().count()
            + self.headings.iter().map(|h| h.chars().count()).sum::<usize>()
    }
}

fn find_organization(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if looks_like_organization(map.get("@type")) {
                let name = map
                    .get("name")
                    .and_then(Value::as_str)
                    .map(html::clean_text)
                    .unwrap_or_default();
                let detail = map
                    .get("description")
                    .or_else(|| map.get("slogan"))
                    .and_then(Value::as_str)
                    .map(html::clean_text)
                    .unwrap_or_default();
                let combined = match (name.is_empty(), detail.is_empty()) {
                    (false, false) => format!("{name}: {detail}"),
                    (false, true) => name,
                    (true, false) => detail,
                    (true, true) => String::new(),
                };
                if !combined.is_empty() {
                    return Some(combined);
                }
            }
            map.values().find_map(find_organization)
        }
        Value::Array(items) => items.iter().find_map(find_organization),
        _ => None,
    }
}

fn looks_like_organization(node_type: Option<&Value>) -> bool {
    let is_org = |s: &str| {
        let lower = s.to_lowercase();
        lower.contains("organization") || lower.contains("corporation") || lower == "localbusiness"
    };
    match node_type {
        Some(Value::String(s)) => is_org(s),
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).any(is_org),
        _ => false,
    }
}

/// Turns fetched page content into a bounded textual summary.
#[derive(Debug, Clone)]
pub struct InsightExtractor {
    max_summary_chars: usize,
    min_text_chars: usize,
}

impl Default for InsightExtractor {
    fn default() -> Self {
        Self {
            max_summary_chars: 1500,
            min_text_chars: 40,
        }
    }
}

impl InsightExtractor {
    #[must_use]
    pub fn new(max_summary_chars: usize, min_text_chars: usize) -> Self {
        Self {
            max_summary_chars,
            min_text_chars,
        }
    }

    /// Extracts an insight for `record` from `raw`.
    ///
    /// Never fails: pages with too little visible text produce a
    /// `NO_CONTENT` insight with an empty summary.
    #[must_use]
    pub fn extract(&self, record: &RecordRef, raw: &RawContent) -> Insight {
        let signals = PageSignals::from_html(&raw.body);
        if signals.visible_len() < self.min_text_chars {
            tracing::debug!(
                position = record.position,
                url = %raw.url,
                "page carried no usable text"
            );
            return Insight::no_content(record.clone());
        }

        Insight {
            record: record.clone(),
            summary: self.summarize(&signals),
            status: ExtractionStatus::Ok,
        }
    }

    fn summarize(&self, signals: &PageSignals) -> String {
        let mut lines = Vec::new();
        if !signals.title.is_empty() {
            lines.push(format!("Title: {}", signals.title));
        }
        if !signals.description.is_empty() {
            lines.push(format!("Description: {}", signals.description));
        }
        if let Some(org) = &signals.organization {
            lines.push(format!("Organization: {org}"));
        }
        if !signals.keywords.is_empty() {
            lines.push(format!("Keywords: {}", signals.keywords.join(", ")));
        }
        if !signals.headings.is_empty() {
            lines.push(format!("Headings: {}", signals.headings.join(" | ")));
        }
        let business: Vec<&str> = [
            (signals.has_about_section, "about section"),
            (signals.has_services_section, "services section"),
        ]
        .into_iter()
        .filter_map(|(present, label)| present.then_some(label))
        .collect();
        if !business.is_empty() {
            lines.push(format!("Business signals: {}", business.join(", ")));
        }

        let header = lines.join("\n");
        let header_len = header.chars().count();
        if header_len >= self.max_summary_chars {
            return html::truncate_chars(&header, self.max_summary_chars);
        }

        if signals.main_text.is_empty() {
            return header;
        }
        // "Content: " plus the separating newline
        let overhead = if header.is_empty() { 9 } else { 10 };
        let budget = self.max_summary_chars.saturating_sub(header_len + overhead);
        if budget == 0 {
            return header;
        }
        let content = format!("Content: {}", html::truncate_chars(&signals.main_text, budget));
        if header.is_empty() {
            content
        } else {
            format!("{header}\n{content}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RecordRef {
        RecordRef {
            position: 1,
            email: "jane@acme.com".to_owned(),
        }
    }

    fn raw(body: &str) -> RawContent {
        RawContent {
            url: "https://acme.com/".to_owned(),
            body: body.to_owned(),
            truncated: false,
        }
    }

    const ACME_PAGE: &str = r#"<!doctype html>
<html><head>
<title>Acme Robotics | Warehouse Automation</title>
<meta name="description" content="Autonomous picking robots for mid-size warehouses.">
<meta name="keywords" content="robotics, automation , logistics">
<script type="application/ld+json">
{"@context":"https://schema.org","@graph":[{"@type":"WebSite","name":"Acme"},{"@type":"Organization","name":"Acme Robotics","description":"Founded in 2015 in Ohio."}]}
</script>
<style>body { color: red; }</style>
</head>
<body>
<nav><a href="/">Home</a><a href="/pricing">Pricing</a></nav>
<main>
<h1>Robots that pick, pack and ship</h1>
<h2>Trusted by 200 distribution centers</h2>
<p>Our fleet handles &amp; sorts over a million parcels every day.</p>
</main>
<footer>Copyright Acme</footer>
</body></html>"#;

    #[test]
    fn signals_capture_structured_fields() {
        let signals = PageSignals::from_html(ACME_PAGE);
        assert_eq!(signals.title, "Acme Robotics | Warehouse Automation");
        assert_eq!(
            signals.description,
            "Autonomous picking robots for mid-size warehouses."
        );
        assert_eq!(signals.keywords, vec!["robotics", "automation", "logistics"]);
        assert_eq!(
            signals.organization.as_deref(),
            Some("Acme Robotics: Founded in 2015 in Ohio.")
        );
        assert_eq!(
            signals.headings,
            vec![
                "Robots that pick, pack and ship",
                "Trusted by 200 distribution centers"
            ]
        );
        assert!(signals.main_text.contains("sorts over a million parcels"));
        assert!(!signals.main_text.contains("Pricing"));
        assert!(!signals.main_text.contains("Copyright"));
        assert!(!signals.main_text.contains("color: red"));
    }

    #[test]
    fn og_description_is_used_when_meta_description_missing() {
        let page = r#"<head><meta property="og:description" content="Fresh bread daily"></head>"#;
        let signals = PageSignals::from_html(page);
        assert_eq!(signals.description, "Fresh bread daily");
    }

    #[test]
    fn extract_builds_ok_insight() {
        let insight = InsightExtractor::default().extract(&record(), &raw(ACME_PAGE));
        assert_eq!(insight.status, ExtractionStatus::Ok);
        assert_eq!(insight.record, record());
        assert!(insight.summary.starts_with("Title: Acme Robotics"));
        assert!(insight.summary.contains("Organization: Acme Robotics"));
        assert!(insight.summary.contains("Content: "));
        assert!(insight.is_usable());
    }

    #[test]
    fn script_only_page_is_no_content() {
        let page = "<html><head><script>window.app = {};</script></head><body><div id=\"root\"></div></body></html>";
        let insight = InsightExtractor::default().extract(&record(), &raw(page));
        assert_eq!(insight.status, ExtractionStatus::NoContent);
        assert!(insight.summary.is_empty());
        assert!(!insight.is_usable());
    }

    #[test]
    fn empty_body_is_no_content() {
        let insight = InsightExtractor::default().extract(&record(), &raw(""));
        assert_eq!(insight.status, ExtractionStatus::NoContent);
    }

    #[test]
    fn summary_respects_character_cap() {
        let filler = "lorem ipsum dolor sit amet ".repeat(400);
        let page = format!("<title>Big Page</title><main><p>{filler}</p></main>");
        let extractor = InsightExtractor::new(200, 40);
        let insight = extractor.extract(&record(), &raw(&page));
        assert_eq!(insight.status, ExtractionStatus::Ok);
        assert!(insight.summary.chars().count() <= 200);
        assert!(insight.summary.starts_with("Title: Big Page\nContent: lorem"));
    }

    #[test]
    fn business_sections_are_detected_and_summarised() {
        let page = "<title>Bright Dental</title><main><h2>About us</h2>\
            <p>Our mission is healthy smiles. We offer cleaning services and whitening.</p></main>";
        let signals = PageSignals::from_html(page);
        assert!(signals.has_about_section);
        assert!(signals.has_services_section);

        let insight = InsightExtractor::default().extract(&record(), &raw(page));
        assert!(insight
            .summary
            .contains("Business signals: about section, services section"));
    }

    #[test]
    fn business_signals_absent_without_markers() {
        let signals = PageSignals::from_html(ACME_PAGE);
        assert!(!signals.has_about_section);
        assert!(!signals.has_services_section);
        let insight = InsightExtractor::default().extract(&record(), &raw(ACME_PAGE));
        assert!(!insight.summary.contains("Business signals"));
    }

    #[test]
    fn organization_type_array_is_recognised() {
        let value: Value = serde_json::json!({
            "@type": ["Thing", "LocalBusiness"],
            "name": "Corner Bakery"
        });
        assert_eq!(find_organization(&value).as_deref(), Some("Corner Bakery"));
    }
}

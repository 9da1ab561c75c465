//! Regex-based HTML helpers for visible-text extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta regex"));
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h([1-3])\b[^>]*>(.*?)</h[1-3]\s*>").expect("valid heading regex")
});
static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid json-ld script regex")
});
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x?)([0-9a-fA-F]{1,6});").expect("valid entity regex"));

/// Elements whose content is never visible page copy.
const NON_CONTENT_TAGS: [&str; 8] = [
    "script", "style", "noscript", "template", "svg", "nav", "header", "footer",
];

static NON_CONTENT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NON_CONTENT_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("valid block regex")
        })
        .collect()
});

/// Preferred content containers, most specific first.
static REGION_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["main", "article", "body"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}\s*>"))
                .expect("valid region regex")
        })
        .collect()
});

/// Removes comments and non-content elements (scripts, styles, navigation,
/// header and footer chrome).
pub(crate) fn strip_non_content(html: &str) -> String {
    let mut out = COMMENT_RE.replace_all(html, " ").into_owned();
    for re in NON_CONTENT_RES.iter() {
        out = re.replace_all(&out, " ").into_owned();
    }
    out
}

/// Returns the inner HTML of the first `<main>`, `<article>`, or `<body>`
/// element, falling back to the whole document.
pub(crate) fn main_region(html: &str) -> &str {
    REGION_RES
        .iter()
        .find_map(|re| re.captures(html).and_then(|c| c.get(1)))
        .map_or(html, |m| m.as_str())
}

/// Replaces tags with spaces, decodes common entities, and collapses
/// whitespace.
pub(crate) fn clean_text(input: &str) -> String {
    let no_tags = TAG_RE.replace_all(input, " ");
    decode_entities(&no_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn decode_entities(input: &str) -> String {
    let named = input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&rsquo;", "'")
        .replace("&lsquo;", "'")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-");
    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |caps: &regex::Captures<'_>| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(String::new, |c| c.to_string())
    });
    numeric.replace("&amp;", "&")
}

pub(crate) fn title(html: &str) -> String {
    TITLE_RE
        .captures(html)
        .map(|cap| clean_text(cap.get(1).map_or("", |m| m.as_str())))
        .unwrap_or_default()
}

/// First `max_per_level` non-empty h1–h3 headings per level, in document order.
pub(crate) fn headings(html: &str, max_per_level: usize) -> Vec<String> {
    let mut counts = [0usize; 3];
    let mut out = Vec::new();
    for cap in HEADING_RE.captures_iter(html) {
        let Some(level) = cap
            .get(1)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .and_then(|l| l.checked_sub(1))
        else {
            continue;
        };
        let text = clean_text(cap.get(2).map_or("", |m| m.as_str()));
        if text.is_empty() || counts[level] >= max_per_level {
            continue;
        }
        counts[level] += 1;
        out.push(text);
    }
    out
}

/// Content of the first `<meta>` whose `key_attr` equals `key_value`.
pub(crate) fn find_meta_content(html: &str, key_attr: &str, key_value: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let key = extract_attr(tag, key_attr)?;
        if key.eq_ignore_ascii_case(key_value) {
            extract_attr(tag, "content")
                .map(|v| clean_text(&v))
                .filter(|v| !v.is_empty())
        } else {
            None
        }
    })
}

fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)\b{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(attr)
    );
    let re = Regex::new(&pattern).expect("valid attr regex");
    re.captures(tag)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().trim().to_string())
}

/// Parsed JSON-LD blocks; unparsable blocks are skipped.
pub(crate) fn json_ld_blocks(html: &str) -> Vec<Value> {
    JSON_LD_RE
        .captures_iter(html)
        .filter_map(|cap| {
            let raw = cap.get(1).map_or("", |m| m.as_str()).trim();
            serde_json::from_str::<Value>(raw).ok()
        })
        .collect()
}

/// Cuts `input` to at most `max_chars` characters (ellipsis included),
/// preferring the last word boundary.
pub(crate) fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let keep = max_chars - 1;
    let cut: String = input.chars().take(keep).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > keep / 2 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end())
}

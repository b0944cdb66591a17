//! Scrape study references out of evidence page JSON

use crate::error::ImportError;
use crate::types::{PageRef, RowFailure};
use evidentia_domain::normalize_doi;
use regex::Regex;
use serde::Deserialize;

// `[n] ...` up to the end of its reference block
const REFERENCE_PATTERN: &str = r"(?s)\[(\d+)\]\s*(.*?)</div>";
const DOI_LINK_PATTERN: &str = r#"href="https://doi\.org/([^"]+)""#;
const TAG_PATTERN: &str = r"<[^>]+>";
const AUTHOR_YEAR_PATTERN: &str = r"^(.*?)\s*\((\d{4})\)";
const TITLE_PATTERN: &str = r#"["“]([^"”]+)["”]"#;

#[derive(Debug, Deserialize)]
struct EvidencePage {
    #[serde(default)]
    cards: Vec<EvidenceCard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvidenceCard {
    id: String,
    #[serde(default)]
    study_refs: Vec<String>,
}

struct Patterns {
    reference: Regex,
    doi_link: Regex,
    tag: Regex,
    author_year: Regex,
    title: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, ImportError> {
        let compile =
            |p: &str| Regex::new(p).map_err(|e| ImportError::Config(format!("bad pattern: {}", e)));
        Ok(Self {
            reference: compile(REFERENCE_PATTERN)?,
            doi_link: compile(DOI_LINK_PATTERN)?,
            tag: compile(TAG_PATTERN)?,
            author_year: compile(AUTHOR_YEAR_PATTERN)?,
            title: compile(TITLE_PATTERN)?,
        })
    }
}

/// References found on a page, plus the ones that could not be read
#[derive(Debug, Clone, Default)]
pub struct PageRefs {
    /// Decoded references, in card order
    pub refs: Vec<PageRef>,
    /// References missing an author line or year
    pub failures: Vec<RowFailure>,
}

/// Extract every reference from an evidence page document
///
/// The document is `{"cards": [{"id": "q1", "studyRefs": ["<html>", ...]}]}`.
/// Each reference block reads `[n] Authors (Year) "Title" ... <a
/// href="https://doi.org/<doi>">`; the DOI link and title are optional.
///
/// # Errors
///
/// [`ImportError::JsonParse`] when the document is not valid page JSON.
pub fn parse_evidence_page(json: &str) -> Result<PageRefs, ImportError> {
    let page: EvidencePage = serde_json::from_str(json)?;
    let patterns = Patterns::compile()?;
    let mut out = PageRefs::default();

    for card in &page.cards {
        for html in &card.study_refs {
            for caps in patterns.reference.captures_iter(html) {
                let number = caps[1].parse().unwrap_or(0);
                match parse_reference(&patterns, &card.id, number, &caps[2]) {
                    Ok(page_ref) => out.refs.push(page_ref),
                    Err(reason) => out.failures.push(RowFailure::at_card(&card.id, reason)),
                }
            }
        }
    }

    Ok(out)
}

fn parse_reference(
    patterns: &Patterns,
    card_id: &str,
    number: u32,
    html: &str,
) -> Result<PageRef, String> {
    let doi = patterns
        .doi_link
        .captures(html)
        .and_then(|caps| normalize_doi(&caps[1]));

    let text = decode_entities(patterns.tag.replace_all(html, "").trim());
    let caps = patterns
        .author_year
        .captures(&text)
        .ok_or_else(|| format!("reference [{}] has no (year)", number))?;

    let authors = caps[1].trim().trim_end_matches(',').trim().to_string();
    if authors.is_empty() {
        return Err(format!("reference [{}] has no authors", number));
    }
    let year: i32 = caps[2]
        .parse()
        .map_err(|_| format!("reference [{}] has a bad year", number))?;

    let title = patterns
        .title
        .captures(&text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|t| !t.is_empty());

    Ok(PageRef {
        card_id: card_id.to_string(),
        number,
        authors,
        year,
        title,
        doi,
    })
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "cards": [
            {
                "id": "q1",
                "studyRefs": [
                    "<div class=\"ref\">[1] Morton, Murphy &amp; Phillips (2018) \"A systematic review of protein supplementation\" <em>BJSM</em>. <a href=\"https://doi.org/10.1136/bjsports-2017-097608\">doi</a></div><div class=\"ref\">[2] Lee et al. (2020) no link here</div>"
                ]
            },
            {
                "id": "q2",
                "studyRefs": ["<div>[3] Anonymous report without a year</div>"]
            },
            { "id": "q3" }
        ]
    }"#;

    #[test]
    fn test_extracts_references() {
        let parsed = parse_evidence_page(PAGE).unwrap();
        assert_eq!(parsed.refs.len(), 2);

        let first = &parsed.refs[0];
        assert_eq!(first.card_id, "q1");
        assert_eq!(first.number, 1);
        assert_eq!(first.authors, "Morton, Murphy & Phillips");
        assert_eq!(first.year, 2018);
        assert_eq!(
            first.title.as_deref(),
            Some("A systematic review of protein supplementation")
        );
        assert_eq!(first.doi.as_deref(), Some("10.1136/bjsports-2017-097608"));

        let second = &parsed.refs[1];
        assert_eq!(second.authors, "Lee et al.");
        assert_eq!(second.doi, None);
        assert_eq!(second.title, None);
    }

    #[test]
    fn test_reference_without_year_is_a_failure() {
        let parsed = parse_evidence_page(PAGE).unwrap();
        assert_eq!(parsed.failures.len(), 1);
        assert_eq!(parsed.failures[0].location, "card q2");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_evidence_page("{ not json"),
            Err(ImportError::JsonParse(_))
        ));
    }
}

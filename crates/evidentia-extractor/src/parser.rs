//! Parse a markdown study registry into records

use crate::config::ImportConfig;
use crate::types::{ParsedRegistry, ParsedRow, RowFailure, UsageRef, VocabularyEntry};
use chrono::NaiveDate;
use evidentia_domain::{
    normalize_doi, ClaimId, Direction, Relevance, Score, Study, StudyId, StudyType, UsageRole,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Header of the claim vocabulary table's section
pub const VOCABULARY_HEADER: &str = "Claim Tag Vocabulary";

/// Minimum cells in a study row
pub const STUDY_COLUMNS: usize = 12;

const EMPTY_CELL: &str = "—";

static CLAIM_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("claim tag pattern compiles"));
static CARD_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"q\d+").expect("card id pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section<'a> {
    Other,
    Vocabulary,
    Studies(&'a str),
    Removed,
}

/// Decode the vocabulary table and every study table in `text`
///
/// Sections are `## <header>` blocks. The vocabulary section yields claims;
/// headers listed in [`ImportConfig::sections`] yield studies; any section
/// whose header mentions "Removed" is skipped. Rows that cannot be decoded
/// are returned as failures alongside the good ones.
pub fn parse_registry(text: &str, config: &ImportConfig, today: NaiveDate) -> ParsedRegistry {
    let mut parsed = ParsedRegistry::default();
    let mut section = Section::Other;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(header) = line.strip_prefix("## ") {
            let header = header.trim();
            section = if header.contains(VOCABULARY_HEADER) {
                Section::Vocabulary
            } else if let Some(page) = config.page_for(header) {
                Section::Studies(page)
            } else if header.contains("Removed") {
                Section::Removed
            } else {
                Section::Other
            };
            continue;
        }

        let Some(cells) = table_cells(line) else {
            continue;
        };
        if is_header_row(&cells) {
            continue;
        }

        match section {
            Section::Vocabulary => match parse_vocabulary_row(&cells) {
                Ok(Some(entry)) => parsed.vocabulary.push(entry),
                Ok(None) => {}
                Err(reason) => {
                    warn!(line = line_no, %reason, "skipping vocabulary row");
                    parsed.failures.push(RowFailure::at_line(line_no, reason));
                }
            },
            Section::Studies(page) => {
                match parse_study_row(&cells, page, config.reference_year, today) {
                    Ok((study, claims, usages)) => parsed.rows.push(ParsedRow {
                        line: line_no,
                        study,
                        claims,
                        usages,
                    }),
                    Err(reason) => {
                        warn!(line = line_no, %reason, "skipping study row");
                        parsed.failures.push(RowFailure::at_line(line_no, reason));
                    }
                }
            }
            Section::Other | Section::Removed => {}
        }
    }

    parsed
}

/// Cells of a `| a | b |` row, trimmed; `None` for non-table lines
fn table_cells(line: &str) -> Option<Vec<&str>> {
    let inner = line.trim().strip_prefix('|')?.strip_suffix('|')?;
    Some(inner.split('|').map(str::trim).collect())
}

fn is_header_row(cells: &[&str]) -> bool {
    let first = cells.first().copied().unwrap_or("");
    first == "Study"
        || first == "Tag"
        || cells
            .iter()
            .all(|c| !c.is_empty() && c.chars().all(|ch| matches!(ch, '-' | ':' | ' ')))
}

fn parse_vocabulary_row(cells: &[&str]) -> Result<Option<VocabularyEntry>, String> {
    if cells.len() < 2 {
        return Ok(None);
    }
    let tag = cells[0].trim_matches('`');
    if !is_claim_tag(tag) {
        return Ok(None);
    }

    let claim_id = ClaimId::parse(tag)?;
    let description = non_empty(cells[1]);
    Ok(Some(VocabularyEntry {
        claim_id,
        description,
    }))
}

fn parse_study_row(
    cells: &[&str],
    page: &str,
    reference_year: i32,
    today: NaiveDate,
) -> Result<(Study, Vec<ClaimId>, Vec<UsageRef>), String> {
    if cells.len() < STUDY_COLUMNS {
        return Err(format!(
            "expected at least {} columns, found {}",
            STUDY_COLUMNS,
            cells.len()
        ));
    }

    let authors = cells[0].trim_matches('*').trim();
    if authors.is_empty() {
        return Err("missing authors".to_string());
    }
    let year = parse_year(cells[1], reference_year)?;
    let direction = Direction::parse(cells[7])
        .ok_or_else(|| format!("unknown direction '{}'", cells[7]))?;
    let score = parse_score(cells[5])?;
    let claims = parse_claim_tags(cells[9])?;
    let usages = parse_used_in(cells[10], Some(page));

    let mut study = Study::new(
        StudyId::generate(authors, year),
        authors,
        year,
        score,
        direction,
    );
    study.doi = normalize_doi(cells[2]).filter(|doi| doi.starts_with("10."));
    study.study_type = non_empty(cells[3]).map(|t| StudyType::parse(&t));
    study.sample_size = non_empty(cells[4]);
    study.landmark = cells[6].eq_ignore_ascii_case("y");
    if let Some(population) = non_empty(cells[8]) {
        study.population = population;
    }
    study.key_finding = non_empty(cells[11]);
    study.verified_date = Some(today.format("%Y-%m").to_string());
    study.added_date = Some(today.format("%Y-%m-%d").to_string());

    Ok((study, claims, usages))
}

fn non_empty(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!cell.is_empty() && cell != EMPTY_CELL).then(|| cell.to_string())
}

fn is_claim_tag(token: &str) -> bool {
    token.contains(evidentia_domain::CLAIM_SEPARATOR) || token.contains("->")
}

/// Publication year from a year or an age column
///
/// Values of 1000 and above are years; smaller values are ages counted
/// back from `reference_year`.
pub fn parse_year(raw: &str, reference_year: i32) -> Result<i32, String> {
    let value: i32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid year or age '{}'", raw.trim()))?;
    match value {
        v if v >= 1000 => Ok(v),
        v if v >= 0 => Ok(reference_year - v),
        v => Err(format!("invalid year or age '{}'", v)),
    }
}

/// Reconstruct quality and relevance from a combined score cell
///
/// A whole number up to 14 is read as quality at full relevance; anything
/// else below 7 as a half-relevance final score; the rest as a final score
/// at full relevance. A cell that is not a number yields an unscored study.
pub fn parse_score(raw: &str) -> Result<Score, String> {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return Ok(Score::unscored());
    };

    let score = if value.fract() == 0.0 && value <= Score::MAX_QUALITY {
        Score::new(value, Relevance::Full)
    } else if value < 7.0 {
        Score::new(value * 2.0, Relevance::Half)
    } else {
        Score::new(value, Relevance::Full)
    };
    score.map_err(|e| e.to_string())
}

/// Claim tags quoted in backticks, e.g. `` `sleep→mortality` ``
pub fn parse_claim_tags(raw: &str) -> Result<Vec<ClaimId>, String> {
    let mut claims: Vec<ClaimId> = Vec::new();
    for caps in CLAIM_TAG.captures_iter(raw) {
        let token = &caps[1];
        if !is_claim_tag(token) {
            continue;
        }
        let claim = ClaimId::parse(token)?;
        if !claims.contains(&claim) {
            claims.push(claim);
        }
    }
    Ok(claims)
}

/// Decode the compact usage notation
///
/// `sleep#q1,q3(F), protein#q2` cites cards q1 and q3 on
/// `sleep-evidence.html` as featured and q2 on `protein-evidence.html` as
/// supporting. Cards after a `page#` prefix stay on that page; cards with no
/// page at all fall back to `section_page`.
pub fn parse_used_in(raw: &str, section_page: Option<&str>) -> Vec<UsageRef> {
    let raw = raw.trim();
    if raw.is_empty() || raw == EMPTY_CELL {
        return Vec::new();
    }

    // (page, body) where body still carries the role marker
    let mut groups: Vec<(Option<&str>, String)> = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.split_once('#') {
            Some((page, cards)) => groups.push((Some(page.trim()), cards.to_string())),
            None => match groups.last_mut() {
                Some((Some(_), body)) => {
                    body.push(',');
                    body.push_str(token);
                }
                _ => groups.push((None, token.to_string())),
            },
        }
    }

    let mut usages = Vec::new();
    for (page, body) in groups {
        let role = if body.contains("(F)") {
            UsageRole::Featured
        } else {
            UsageRole::Supporting
        };
        let page_file = match page.or(section_page) {
            Some(page) => format!("{}-evidence.html", page),
            None => "unknown.html".to_string(),
        };
        for card_id in card_ids(&body) {
            usages.push(UsageRef {
                page_file: page_file.clone(),
                card_id,
                role,
            });
        }
    }
    usages
}

/// Card anchors (`q` followed by digits) in order of appearance
fn card_ids(text: &str) -> Vec<String> {
    CARD_ID
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

//! Claim summary index as a markdown table

use crate::{SummaryRow, SynthesisError};
use regex::Regex;

/// Header row of the summary table
pub const TABLE_HEADER: &str = "| Claim | #+ | #− | #± | Best+ | Best− | Net | Confidence | Gap? |";

const TABLE_RULE: &str = "|-------|----|----|-----|-------|-------|-----|------------|------|";

// header, separator, then every following table row
const TABLE_PATTERN: &str = r"(\| Claim \| #\+ \|.*?\n\|[-|\s]+\n)((?:\|.*\n)*)";

/// Render rows as the summary table (trailing newline included)
pub fn render_summary_table(rows: &[SummaryRow]) -> String {
    let mut out = String::new();
    out.push_str(TABLE_HEADER);
    out.push('\n');
    out.push_str(TABLE_RULE);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "| `{}` | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            row.claim,
            row.n_plus,
            row.n_minus,
            row.n_mixed,
            row.best_plus,
            row.best_minus,
            row.net,
            row.confidence,
            row.gap
        ));
    }
    out
}

/// Replace the existing summary table in `document` with `table`
///
/// # Errors
///
/// [`SynthesisError::SummaryTableMissing`] when the document has no
/// `| Claim | #+ | ...` table.
pub fn splice_summary_table(document: &str, table: &str) -> Result<String, SynthesisError> {
    let pattern = Regex::new(TABLE_PATTERN).map_err(|e| SynthesisError::Pattern(e.to_string()))?;
    let found = pattern
        .find(document)
        .ok_or(SynthesisError::SummaryTableMissing)?;

    let mut out = String::with_capacity(document.len() + table.len());
    out.push_str(&document[..found.start()]);
    out.push_str(table);
    out.push_str(&document[found.end()..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Confidence;

    fn row(claim: &str) -> SummaryRow {
        SummaryRow {
            claim: claim.to_string(),
            n_plus: 1,
            n_minus: 0,
            n_mixed: 0,
            best_plus: "A 2020 (11)".to_string(),
            best_minus: "—".to_string(),
            net: "+".to_string(),
            confidence: Confidence::Moderate,
            gap: "Need contradicting study".to_string(),
        }
    }

    #[test]
    fn test_render() {
        let table = render_summary_table(&[row("x→y")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], TABLE_HEADER);
        assert_eq!(
            lines[2],
            "| `x→y` | 1 | 0 | 0 | A 2020 (11) | — | + | Moderate | Need contradicting study |"
        );
    }

    #[test]
    fn test_splice_replaces_only_the_table() {
        let document = format!(
            "# Registry\n\n## Claim Summary Index\n\n{}\n{}\n| `old→row` | 9 | 9 | 9 | a | b | + | Strong |  |\n\n## Next section\n| Other | table |\n",
            TABLE_HEADER, TABLE_RULE
        );
        let table = render_summary_table(&[row("x→y")]);
        let updated = splice_summary_table(&document, &table).unwrap();

        assert!(updated.starts_with("# Registry\n\n## Claim Summary Index\n\n"));
        assert!(updated.contains("`x→y`"));
        assert!(!updated.contains("old→row"));
        assert!(updated.ends_with("\n## Next section\n| Other | table |\n"));
    }

    #[test]
    fn test_splice_without_table_fails() {
        let result = splice_summary_table("# Nothing here\n", "table");
        assert!(matches!(result, Err(SynthesisError::SummaryTableMissing)));
    }
}

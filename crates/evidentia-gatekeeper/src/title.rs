//! Fuzzy title comparison

/// Normalized titles are cut to this many characters
pub const NORMALIZED_MAX_LEN: usize = 60;

/// Length of the prefix compared between two normalized titles
pub const PREFIX_LEN: usize = 40;

/// Lowercase, keep ASCII letters and digits only, cap the length
///
/// # Examples
///
/// ```
/// use evidentia_gatekeeper::normalize_title;
///
/// assert_eq!(normalize_title("Sleep & Mortality: A Review"), "sleepmortalityareview");
/// ```
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .take(NORMALIZED_MAX_LEN)
        .collect()
}

fn prefix(s: &str) -> &str {
    // normalized titles are ASCII, so byte slicing is safe
    &s[..s.len().min(PREFIX_LEN)]
}

/// Whether two titles plausibly name the same publication
///
/// True when the first 40 normalized characters agree or either normalized
/// title contains the other. A title that normalizes to nothing is contained
/// in every title, so a resolved record without a title still matches.
pub fn titles_match(expected: &str, resolved: &str) -> bool {
    let expected = normalize_title(expected);
    let resolved = normalize_title(resolved);

    prefix(&expected) == prefix(&resolved)
        || expected.contains(&resolved)
        || resolved.contains(&expected)
}

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// "6=" → "6". Every occurrence of the marker is removed.
pub fn strip_tie_marker(raw: &str, marker: char) -> String {
    clean_str(raw).replace(marker, "").trim().to_string()
}

/// Parse a score cell; anything that is not a finite number is `None`.
pub fn parse_score(raw: &str) -> Option<f64> {
    let c = clean_str(raw);
    if c.is_empty() {
        return None;
    }
    c.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an already-stripped rank cell. Fractional ranks are rounded to the
/// nearest integer, halves away from zero.
pub fn parse_rank(raw: &str) -> Option<i64> {
    let v = parse_score(raw)?;
    let r = v.round();
    if r < i64::MIN as f64 || r > i64::MAX as f64 {
        return None;
    }
    Some(r as i64)
}

/// True when a rank cell holds text that is not a rank, e.g. a restated
/// header such as "rank display". Empty cells are missing, not text.
pub fn is_non_numeric_rank(raw: &str, marker: char) -> bool {
    let stripped = strip_tie_marker(raw, marker);
    !stripped.is_empty() && parse_score(&stripped).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tie_marker_is_stripped() {
        assert_eq!(strip_tie_marker("6=", '='), "6");
        assert_eq!(strip_tie_marker(" =12 ", '='), "12");
        assert_eq!(strip_tie_marker("601-650", '='), "601-650");
        assert_eq!(strip_tie_marker("\"3=\"", '='), "3");
    }

    #[test]
    fn test_ranks_parse_or_become_none() {
        assert_eq!(parse_rank("7"), Some(7));
        assert_eq!(parse_rank("7.0"), Some(7));
        assert_eq!(parse_rank("6.5"), Some(7));
        assert_eq!(parse_rank("601-650"), None);
        assert_eq!(parse_rank(""), None);
        assert_eq!(parse_rank("NaN"), None);
    }

    #[test]
    fn test_scores_parse_or_become_none() {
        assert_eq!(parse_score("91.2"), Some(91.2));
        assert_eq!(parse_score(" 100 "), Some(100.0));
        assert_eq!(parse_score("-"), None);
        assert_eq!(parse_score("inf"), None);
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_non_numeric_rank("rank display", '='));
        assert!(!is_non_numeric_rank("6=", '='));
        assert!(!is_non_numeric_rank("", '='));
        assert!(!is_non_numeric_rank("12", '='));
    }
}

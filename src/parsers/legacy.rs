/// Extract entries from a plain-text 1.0 chart.
///
/// Every non-blank line is a comma separated record whose last field is the
/// display value, e.g. `12,Radiohead` or `1213031819,Artist – Track`.
pub fn parse_list(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.rsplit(',').next())
        .map(|field| field.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_field_is_kept() {
        let body = "321,Radiohead\n120,Portishead\n17,Massive Attack\n";
        assert_eq!(parse_list(body), vec!["Radiohead", "Portishead", "Massive Attack"]);
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        assert_eq!(parse_list("\n\nkrf\r\n\n"), vec!["krf"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_single_field_lines() {
        assert_eq!(parse_list("friend_one\nfriend_two"), vec!["friend_one", "friend_two"]);
    }
}

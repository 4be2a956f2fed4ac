use crate::domain::model::Identifier;

/// Splits a comma-separated list into identifiers, in input order.
/// Blank segments (trailing commas, `a,,b`) are dropped; duplicates are kept.
pub fn normalize(raw_input: &str) -> Vec<Identifier> {
    raw_input.split(',').filter_map(Identifier::parse).collect()
}

/// Same rule for input that arrives already split (JSON arrays, CSV rows).
pub fn normalize_all<I, S>(segments: I) -> Vec<Identifier>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .filter_map(|segment| Identifier::parse(segment.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(ids: &[Identifier]) -> Vec<&str> {
        ids.iter().map(Identifier::as_str).collect()
    }

    #[test]
    fn test_splits_and_trims() {
        let ids = normalize(" 15551230000 ,15559998888,  923001234567");
        assert_eq!(
            as_strings(&ids),
            vec!["15551230000", "15559998888", "923001234567"]
        );
    }

    #[test]
    fn test_drops_empty_segments() {
        let ids = normalize("15551230000,, ,15559998888,");
        assert_eq!(as_strings(&ids), vec!["15551230000", "15559998888"]);
        assert!(normalize("").is_empty());
        assert!(normalize(" , ,").is_empty());
    }

    #[test]
    fn test_keeps_duplicates_and_malformed_entries() {
        let ids = normalize("123,abc,123");
        assert_eq!(as_strings(&ids), vec!["123", "abc", "123"]);
    }

    #[test]
    fn test_never_produces_empty_identifiers() {
        let inputs = [",", "a,", ",a", " a , , b ", "\t,\n", "x,,,,y", "   "];
        for input in inputs {
            assert!(normalize(input).iter().all(|id| !id.as_str().is_empty()));
        }
    }

    #[test]
    fn test_normalize_all_matches_normalize() {
        let joined = normalize("1, 2,,3");
        let split = normalize_all(vec!["1", " 2", "", "3"]);
        assert_eq!(joined, split);
    }
}

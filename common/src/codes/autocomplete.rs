//! Substring search over the demo catalog.

use super::catalog;
use super::{CodeEntry, CodeType};

/// Queries shorter than this return nothing.
pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_RESULTS: usize = 10;

/// Case-insensitive substring match against code or description, in catalog
/// order, capped at `MAX_RESULTS`.
pub fn search(query: &str, code_type: CodeType) -> Vec<&'static CodeEntry> {
    let needle = query.trim().to_lowercase();
    if needle.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    catalog::entries_of(code_type)
        .filter(|entry| {
            entry.code.to_lowercase().contains(&needle)
                || entry.description.to_lowercase().contains(&needle)
        })
        .take(MAX_RESULTS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpt_99_is_capped_at_ten() {
        let results = search("99", CodeType::Cpt);
        assert_eq!(results.len(), MAX_RESULTS);
        for entry in &results {
            assert_eq!(entry.code_type, CodeType::Cpt);
            assert!(entry.code.contains("99") || entry.description.contains("99"));
        }
        assert_eq!(results[0].code, "99202");
    }

    #[test]
    fn short_query_returns_nothing() {
        assert!(search("9", CodeType::Cpt).is_empty());
        assert!(search("  J ", CodeType::Hcpcs).is_empty());
    }

    #[test]
    fn matches_description_case_insensitively() {
        let results = search("PNEUMONIA", CodeType::Icd10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "J18.9");
    }

    #[test]
    fn code_type_scopes_the_search() {
        assert!(search("J0585", CodeType::Cpt).is_empty());
        assert_eq!(search("j05", CodeType::Hcpcs)[0].code, "J0585");
    }
}

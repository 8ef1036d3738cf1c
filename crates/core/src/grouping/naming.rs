//! Sequential names for auto-created groups.

use std::collections::HashSet;

/// Generate `count` group names of the form `"{prefix} {n}"`.
///
/// Numbering continues from the highest numeric suffix already used with the
/// same prefix, and any name that is already taken is skipped.
///
/// ```
/// use trailhead_core::grouping::naming::next_group_names;
///
/// let existing = vec!["Tent 1".to_string(), "Tent 4".to_string(), "Bears".to_string()];
/// assert_eq!(next_group_names(&existing, "Tent", 2), vec!["Tent 5", "Tent 6"]);
/// ```
pub fn next_group_names(existing: &[String], prefix: &str, count: usize) -> Vec<String> {
    let taken: HashSet<&str> = existing.iter().map(String::as_str).collect();

    let highest = existing
        .iter()
        .filter_map(|name| numeric_suffix(name, prefix))
        .max()
        .unwrap_or(0);

    let mut names = Vec::with_capacity(count);
    let mut next = highest + 1;
    while names.len() < count {
        let candidate = format!("{prefix} {next}");
        if !taken.contains(candidate.as_str()) {
            names.push(candidate);
        }
        next += 1;
    }
    names
}

fn numeric_suffix(name: &str, prefix: &str) -> Option<u32> {
    name.trim()
        .strip_prefix(prefix)?
        .strip_prefix(' ')?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn starts_at_one_without_existing_groups() {
        assert_eq!(next_group_names(&[], "Tent", 3), vec!["Tent 1", "Tent 2", "Tent 3"]);
    }

    #[test]
    fn continues_from_highest_suffix() {
        let existing = names(&["Tent 2", "Tent 7", "Tent 3"]);
        assert_eq!(next_group_names(&existing, "Tent", 2), vec!["Tent 8", "Tent 9"]);
    }

    #[test]
    fn ignores_other_prefixes_and_non_numeric_suffixes() {
        let existing = names(&["Eating Group 9", "Tent A", "Tents 12"]);
        assert_eq!(next_group_names(&existing, "Tent", 1), vec!["Tent 1"]);
    }

    #[test]
    fn multi_word_prefix() {
        let existing = names(&["Eating Group 1"]);
        assert_eq!(
            next_group_names(&existing, "Eating Group", 1),
            vec!["Eating Group 2"]
        );
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(next_group_names(&names(&["Tent 1"]), "Tent", 0).is_empty());
    }
}
